//! Test support utilities for glyphatlas.
//!
//! This module provides helper types and functions that are useful for testing
//! the pipeline without a real font, but are not part of the public API.

use std::collections::HashMap;

use crate::{GlyphBitmap, GlyphRequest, GlyphSource, Result};

/// A glyph source serving fixed bitmaps from memory.
///
/// Characters without an explicit glyph fall back to a solid block whose
/// size derives from the codepoint, so every request succeeds.
#[derive(Default)]
pub struct MemoryGlyphSource {
    pub glyphs: HashMap<char, GlyphBitmap>,
}

impl MemoryGlyphSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyph(mut self, ch: char, glyph: GlyphBitmap) -> Self {
        self.glyphs.insert(ch, glyph);
        self
    }
}

impl GlyphSource for MemoryGlyphSource {
    fn rasterize(&self, request: GlyphRequest) -> Result<GlyphBitmap> {
        if let Some(g) = self.glyphs.get(&request.codepoint) {
            return Ok(g.clone());
        }
        if request.codepoint == ' ' {
            return Ok(GlyphBitmap::empty(request.pixel_size / 2));
        }
        Ok(solid_glyph(request.codepoint, request.pixel_size))
    }
}

/// A filled bitmap, pixel value = low byte of the codepoint (never 0).
pub fn solid_glyph(ch: char, pixel_size: u32) -> GlyphBitmap {
    let cp = ch as u32;
    let width = 1 + cp % pixel_size.max(1);
    let height = 1 + (cp / 3) % pixel_size.max(1);
    let value = (cp % 255) as u8 + 1;
    GlyphBitmap {
        width,
        height,
        pixels: vec![value; (width * height) as usize],
        bearing_x: (cp % 3) as i32 - 1,
        bearing_y: height as i32 - (cp % 4) as i32,
        advance: width + 1,
        advance_y: 0,
    }
}

/// Bitmap whose pixels count up from 1, handy to spot misplaced rows.
pub fn gradient_glyph(width: u32, height: u32) -> GlyphBitmap {
    let pixels = (0..width * height).map(|i| (i % 255) as u8 + 1).collect();
    GlyphBitmap {
        width,
        height,
        pixels,
        ..Default::default()
    }
}
