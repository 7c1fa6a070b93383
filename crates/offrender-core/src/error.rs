/// Error taxonomy of the offscreen pipeline.
use std::fmt;
use std::path::PathBuf;

/// A specialized Result type for offrender operations.
pub type OffrenderResult<T> = Result<T, OffrenderError>;

/// Shader build stage that produced a [`OffrenderError::ShaderBuild`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Link,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
            ShaderStage::Link => write!(f, "link"),
        }
    }
}

/// Every failure of the pipeline. All of them are fatal to the current run.
#[derive(Debug, thiserror::Error)]
pub enum OffrenderError {
    #[error("context creation failed: {0}")]
    ContextCreation(String),

    #[error("failed to make the context current: {0}")]
    Bind(String),

    #[error("no current context: entry points and draw calls need a context made current first")]
    NotCurrent,

    #[error("couldn't obtain the address of function {0}")]
    UnresolvedSymbol(String),

    #[error("vertex attribute `{0}` not found in program")]
    AttributeNotFound(String),

    #[error("{stage} shader build failed: {log}")]
    ShaderBuild { stage: ShaderStage, log: String },

    #[error("GPU resource allocation failed: {0}")]
    Gpu(String),

    #[error("couldn't open output file {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("scene description error: {0}")]
    SceneParse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl OffrenderError {
    /// Create a shader build error for the given stage.
    pub fn shader(stage: ShaderStage, log: impl Into<String>) -> Self {
        OffrenderError::ShaderBuild {
            stage,
            log: log.into(),
        }
    }

    /// Create a file-open error.
    pub fn file_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OffrenderError::FileOpen {
            path: path.into(),
            source,
        }
    }
}
