use crate::error::{AtlasError, Result};

/// A single glyph to rasterize.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlyphRequest {
    pub codepoint: char,
    pub pixel_size: u32,
}

impl GlyphRequest {
    pub fn new(codepoint: char, pixel_size: u32) -> Self {
        Self {
            codepoint,
            pixel_size,
        }
    }
}

/// Rasterized glyph coverage plus the metrics needed to position it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Row-major coverage, `width * height` bytes
    pub pixels: Vec<u8>,
    /// Pen origin to the left edge of the bitmap
    pub bearing_x: i32,
    /// Baseline to the top edge of the bitmap, positive upwards
    pub bearing_y: i32,
    /// Horizontal pen movement after the glyph
    pub advance: u32,
    /// Vertical pen movement after the glyph, 0 for horizontal layouts
    pub advance_y: u32,
}

impl GlyphBitmap {
    /// A glyph with metrics but no pixels (space, missing slots).
    pub fn empty(advance: u32) -> Self {
        Self {
            advance,
            ..Default::default()
        }
    }

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let glyph = Self {
            width,
            height,
            pixels,
            ..Default::default()
        };
        glyph.validate()?;
        Ok(glyph)
    }

    pub fn with_metrics(mut self, bearing_x: i32, bearing_y: i32, advance: u32) -> Self {
        self.bearing_x = bearing_x;
        self.bearing_y = bearing_y;
        self.advance = advance;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Checks that the pixel buffer matches the declared dimensions.
    pub fn validate(&self) -> Result<()> {
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() != expected {
            return Err(AtlasError::InvariantViolation(format!(
                "glyph bitmap {}x{} carries {} bytes, expected {expected}",
                self.width,
                self.height,
                self.pixels.len()
            )));
        }
        Ok(())
    }

    /// Space this glyph needs above the baseline minus what it hangs below.
    pub(crate) fn line_extent(&self) -> i64 {
        2 * self.bearing_y as i64 - self.height as i64
    }
}
