use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use offrender_core::{ContentHash, OffrenderError, OffrenderResult, PixelBuffer};

/// PNG output for a rendered [`PixelBuffer`].
///
/// The buffer stores its bottom row first; the image is written top row
/// first by streaming the rows in reverse, straight out of the buffer.
pub struct PngWriter;

impl PngWriter {
    /// Encode `pixels` into the file at `path`.
    ///
    /// The file is created (or truncated) but its parent directory must
    /// already exist.
    pub fn write(pixels: &PixelBuffer, path: &Path) -> OffrenderResult<()> {
        let file = File::create(path).map_err(|e| OffrenderError::file_open(path, e))?;
        let mut writer = BufWriter::new(file);
        Self::encode_to(pixels, &mut writer)?;
        writer
            .flush()
            .map_err(|e| OffrenderError::Encode(format!("failed to flush {}: {}", path.display(), e)))?;

        tracing::info!(
            "Wrote {}x{} PNG to {} (content hash {})",
            pixels.width(),
            pixels.height(),
            path.display(),
            ContentHash::of(pixels)
        );
        Ok(())
    }

    /// Encode `pixels` as an 8-bit RGBA, non-interlaced PNG into `out`.
    pub fn encode_to<W: Write>(pixels: &PixelBuffer, out: W) -> OffrenderResult<()> {
        let mut encoder = png::Encoder::new(out, pixels.width(), pixels.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| OffrenderError::Encode(format!("failed to write PNG header: {}", e)))?;
        let mut stream = writer
            .stream_writer()
            .map_err(|e| OffrenderError::Encode(format!("failed to start PNG stream: {}", e)))?;

        for (i, row) in pixels.rows_top_down().enumerate() {
            stream
                .write_all(row)
                .map_err(|e| OffrenderError::Encode(format!("failed to write PNG row {}: {}", i, e)))?;
        }

        stream
            .finish()
            .map_err(|e| OffrenderError::Encode(format!("failed to finish PNG data: {}", e)))?;
        writer
            .finish()
            .map_err(|e| OffrenderError::Encode(format!("failed to finalize PNG: {}", e)))?;
        Ok(())
    }
}
