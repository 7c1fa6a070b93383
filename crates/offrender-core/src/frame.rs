use serde::{Deserialize, Serialize};

use crate::error::{OffrenderError, OffrenderResult};

/// Pixel format of a pixel buffer. The offscreen target is always 8-bit RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (4 bytes per pixel).
    Rgba8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// CPU-visible render target.
///
/// Rows are stored in the order the rasterizer writes them: row 0 is the
/// *bottom* row of the rendered picture. Use [`PixelBuffer::rows_top_down`]
/// to walk rows in image order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Byte size of a `width`×`height` RGBA8 buffer.
    ///
    /// Both dimensions must be non-zero and fit a GL `int`, and the total
    /// must fit in memory addressing.
    pub fn checked_size(width: u32, height: u32) -> OffrenderResult<usize> {
        if width == 0 || height == 0 {
            return Err(OffrenderError::InvalidArgument(format!(
                "pixel buffer dimensions must be non-zero, got {}x{}",
                width, height
            )));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(OffrenderError::InvalidArgument(format!(
                "pixel buffer dimensions {}x{} exceed the GL size range",
                width, height
            )));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(PixelFormat::Rgba8.bytes_per_pixel()))
            .ok_or_else(|| {
                OffrenderError::InvalidArgument(format!(
                    "a {}x{} RGBA buffer does not fit in memory",
                    width, height
                ))
            })
    }

    /// Allocate a zero-filled (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> OffrenderResult<Self> {
        let size = Self::checked_size(width, height)?;
        Ok(Self {
            data: vec![0u8; size],
            width,
            height,
        })
    }

    /// Wrap existing RGBA bytes laid out bottom row first.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> OffrenderResult<Self> {
        let expected = Self::checked_size(width, height)?;
        if data.len() != expected {
            return Err(OffrenderError::InvalidArgument(format!(
                "{} bytes do not describe a {}x{} RGBA buffer",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::Rgba8
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * PixelFormat::Rgba8.bytes_per_pixel()
    }

    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Raw pointer handed to the graphics backend as its render target.
    ///
    /// The allocation never grows or moves for the lifetime of the buffer.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    /// Row `y` in storage order (0 = bottom). Panics if out of range.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Rows in storage order, bottom row first.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, u8> {
        self.data.chunks_exact(self.stride())
    }

    /// Rows in image order, top row first. Each item borrows the buffer.
    pub fn rows_top_down(&self) -> std::iter::Rev<std::slice::ChunksExact<'_, u8>> {
        self.rows().rev()
    }

    /// Row `y` reinterpreted as RGBA cells.
    pub fn pixel_row(&self, y: u32) -> &[[u8; 4]] {
        bytemuck::cast_slice(self.row(y))
    }

    /// RGBA value at `(x, y)` with a bottom-left origin. None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixel_row(y)[x as usize])
    }

    /// RGBA value at `(x, y)` with a top-left origin, as the image file sees it.
    pub fn get_image_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if y >= self.height {
            return None;
        }
        self.get_pixel(x, self.height - 1 - y)
    }

    /// Set the RGBA value at `(x, y)` (bottom-left origin). No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = y as usize * self.stride() + x as usize * 4;
        self.data[offset..offset + 4].copy_from_slice(&rgba);
    }

    /// Copy of this buffer with the row order reversed.
    pub fn flipped(&self) -> PixelBuffer {
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.rows_top_down() {
            data.extend_from_slice(row);
        }
        Self {
            data,
            width: self.width,
            height: self.height,
        }
    }
}
