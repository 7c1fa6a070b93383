//! # offrender-encode
//!
//! Writes a finished pixel buffer to disk as an 8-bit RGBA PNG, flipping
//! the bottom-up GL rows into top-down image order on the way out.

pub mod writer;

pub use writer::PngWriter;
