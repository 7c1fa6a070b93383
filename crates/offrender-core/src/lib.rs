//! # offrender-core
//!
//! Core types shared across the offrender crates: the CPU-side pixel buffer,
//! colors, scene descriptions, render configuration, content hashing and the
//! error taxonomy of the offscreen pipeline.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod scene;

pub use color::Color;
pub use config::{ContextAttributes, Profile, RenderConfig, ResolveMode};
pub use error::{OffrenderError, OffrenderResult, ShaderStage};
pub use frame::{PixelBuffer, PixelFormat};
pub use hash::ContentHash;
pub use scene::{SceneDescription, ShapeDescription};
