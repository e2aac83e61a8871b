use log::debug;

use crate::{
    error::{AtlasError, Result},
    glyph::GlyphBitmap,
    packer::Packing,
};

/// Value of atlas pixels no glyph covers.
pub const BACKGROUND: u8 = 0;

/// Single-channel 8-bit pixel buffer, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Atlas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Atlas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    /// Wraps an existing buffer, e.g. a decoded grayscale image.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(AtlasError::InvariantViolation(format!(
                "{}-byte buffer cannot back a {width}x{height} atlas",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Copies a glyph bitmap to `(x, y)`. The whole bitmap must lie inside the atlas.
    pub fn write(&mut self, x: u32, y: u32, glyph: &GlyphBitmap) -> Result<()> {
        glyph.validate()?;
        let fits_x = x.checked_add(glyph.width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(glyph.height).is_some_and(|b| b <= self.height);
        if !(fits_x && fits_y) {
            return Err(AtlasError::InvariantViolation(format!(
                "{}x{} bitmap at ({x}, {y}) leaves the {}x{} atlas",
                glyph.width, glyph.height, self.width, self.height
            )));
        }
        let w = glyph.width as usize;
        let stride = self.width as usize;
        for (row, src) in glyph.pixels.chunks_exact(w.max(1)).enumerate() {
            let start = (y as usize + row) * stride + x as usize;
            self.pixels[start..start + w].copy_from_slice(src);
        }
        Ok(())
    }

    /// Copies `w x h` pixels from `src` to `(x, y)`, dropping whatever falls outside.
    /// Zero source pixels leave the destination untouched.
    pub fn blit(&mut self, x: i64, y: i64, w: u32, h: u32, src: &[u8]) -> Result<()> {
        if src.len() < w as usize * h as usize {
            return Err(AtlasError::InvariantViolation(format!(
                "{}-byte source cannot fill a {w}x{h} blit",
                src.len()
            )));
        }
        for row in 0..h as i64 {
            let dy = y + row;
            if dy < 0 || dy >= self.height as i64 {
                continue;
            }
            for col in 0..w as i64 {
                let dx = x + col;
                if dx < 0 || dx >= self.width as i64 {
                    continue;
                }
                let value = src[(row * w as i64 + col) as usize];
                if value != BACKGROUND {
                    self.pixels[dy as usize * self.width as usize + dx as usize] = value;
                }
            }
        }
        Ok(())
    }

    /// Copies the `w x h` region at `(x, y)` out of the atlas.
    pub fn region(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Vec<u8>> {
        let inside = x.checked_add(w).is_some_and(|r| r <= self.width)
            && y.checked_add(h).is_some_and(|b| b <= self.height);
        if !inside {
            return Err(AtlasError::InvariantViolation(format!(
                "region {w}x{h} at ({x}, {y}) leaves the {}x{} atlas",
                self.width, self.height
            )));
        }
        let stride = self.width as usize;
        let mut out = Vec::with_capacity(w as usize * h as usize);
        for row in y as usize..(y + h) as usize {
            let start = row * stride + x as usize;
            out.extend_from_slice(&self.pixels[start..start + w as usize]);
        }
        Ok(out)
    }
}

/// Builds the atlas image: every bitmap copied into its packed rect.
///
/// `glyphs[i]` belongs to the placement with id `i`. Any disagreement between
/// the packing and the bitmaps is an invariant violation.
pub fn composite(packing: &Packing, glyphs: &[GlyphBitmap]) -> Result<Atlas> {
    if packing.len() != glyphs.len() {
        return Err(AtlasError::InvariantViolation(format!(
            "{} placements for {} glyphs",
            packing.len(),
            glyphs.len()
        )));
    }
    let mut atlas = Atlas::new(packing.width, packing.height);
    for (rect, glyph) in packing.rects().iter().zip(glyphs) {
        if (rect.width, rect.height) != (glyph.width, glyph.height) {
            return Err(AtlasError::InvariantViolation(format!(
                "glyph {} placed as {}x{} but rasterized as {}x{}",
                rect.id, rect.width, rect.height, glyph.width, glyph.height
            )));
        }
        if glyph.is_empty() {
            continue;
        }
        atlas.write(rect.x, rect.y, glyph)?;
    }
    debug!(
        "composited {} glyphs into {}x{} atlas",
        glyphs.iter().filter(|g| !g.is_empty()).count(),
        atlas.width,
        atlas.height
    );
    Ok(atlas)
}
