use serde::{Deserialize, Serialize};

/// OpenGL profile requested from the offscreen backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Core,
    Compat,
}

/// Attributes requested when creating the offscreen context.
///
/// `None` bit depths are left out of the request and the backend picks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContextAttributes {
    pub profile: Profile,
    pub major_version: u8,
    pub minor_version: u8,
    #[serde(default)]
    pub depth_bits: Option<u8>,
    #[serde(default)]
    pub stencil_bits: Option<u8>,
    #[serde(default)]
    pub accum_bits: Option<u8>,
    /// Install the driver debug-message callback.
    #[serde(default = "enabled")]
    pub debug_output: bool,
}

fn enabled() -> bool {
    true
}

impl ContextAttributes {
    /// Core 4.5 with a 24-bit depth buffer and no stencil/accum planes.
    pub fn canonical() -> Self {
        Self {
            profile: Profile::Core,
            major_version: 4,
            minor_version: 5,
            depth_bits: Some(24),
            stencil_bits: Some(0),
            accum_bits: Some(0),
            debug_output: true,
        }
    }

    /// Core 4.5 with only a color buffer requested.
    pub fn minimal() -> Self {
        Self {
            depth_bits: None,
            stencil_bits: None,
            accum_bits: None,
            ..Self::canonical()
        }
    }

    /// Whether the context was asked for a depth buffer.
    pub fn wants_depth(&self) -> bool {
        self.depth_bits.is_some_and(|bits| bits > 0)
    }
}

impl Default for ContextAttributes {
    fn default() -> Self {
        Self::canonical()
    }
}

/// How GL entry points are resolved once the context is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// Hand a loader callback to the GL bindings and let them request everything.
    #[default]
    Loader,
    /// Resolve a fixed list of names one at a time.
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub attributes: ContextAttributes,
    #[serde(default)]
    pub resolve_mode: ResolveMode,
}

impl RenderConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            attributes: ContextAttributes::default(),
            resolve_mode: ResolveMode::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: ContextAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_resolve_mode(mut self, mode: ResolveMode) -> Self {
        self.resolve_mode = mode;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new(512, 512)
    }
}
