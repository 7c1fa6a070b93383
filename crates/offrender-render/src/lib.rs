//! # offrender-render
//!
//! The offscreen GL side of the pipeline: the graphics backend seam and its
//! OSMesa implementation, the render context that owns the pixel buffer,
//! entry-point resolution, device setup, scene building and drawing.

pub mod backend;
pub mod context;
pub mod debug;
pub mod gpu;
pub mod osmesa;
pub mod pipeline;
pub mod renderer;
pub mod resolver;
pub mod scene;

#[cfg(test)]
mod test_support;

pub use backend::{GlBackend, ProcAddress, RawContext};
pub use context::RenderContext;
pub use gpu::DriverInfo;
pub use osmesa::OsMesa;
pub use pipeline::OffscreenPipeline;
pub use renderer::Renderer;
pub use resolver::{BulkLoader, EntryPointResolver, ExplicitList, FunctionTable, REQUIRED_ENTRY_POINTS};
pub use scene::{SceneBuilder, ShaderProgram, ShapeLayout, ShapeResource};
