//! fontdue-backed glyph rasterization.
use std::io::{Cursor, Read};
use std::{fs, path::Path};

use fontdue::{Font, FontSettings};
use log::{debug, trace};
use zip::ZipArchive;

use crate::{
    error::{AtlasError, Result},
    glyph::{GlyphBitmap, GlyphRequest},
    GlyphSource,
};

const FONT_EXTENSIONS: [&str; 4] = [".ttf", ".otf", ".ttc", ".otc"];

/// A parsed TrueType/OpenType font. Owns the font data for the whole run.
pub struct FontdueSource {
    font: Font,
}

impl FontdueSource {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_index(bytes, 0)
    }

    /// `collection_index` picks a face inside `.ttc`/`.otc` collections.
    pub fn from_bytes_with_index(bytes: &[u8], collection_index: u32) -> Result<Self> {
        // Fonts shipped inside a zip archive: use the first font entry.
        if bytes.len() >= 4 && &bytes[0..4] == b"PK\x03\x04" {
            let inner = read_font_from_zip(bytes)?;
            return Self::from_bytes_with_index(&inner, collection_index);
        }
        let settings = FontSettings {
            collection_index,
            ..FontSettings::default()
        };
        let font = Font::from_bytes(bytes, settings)
            .map_err(|e| AtlasError::Font(format!("failed to parse font: {e}")))?;
        debug!(
            "loaded font {:?} with {} glyphs",
            font.name().unwrap_or("<unnamed>"),
            font.glyph_count()
        );
        Ok(Self { font })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn name(&self) -> Option<&str> {
        self.font.name()
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.lookup_glyph_index(ch) != 0
    }
}

fn read_font_from_zip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AtlasError::Font(format!("zip open error: {e}")))?;
    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| AtlasError::Font(format!("zip entry error: {e}")))?;
        let name = file.name().to_ascii_lowercase();
        if FONT_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            debug!("using {} from zip archive", file.name());
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)?;
            return Ok(buf);
        }
    }
    Err(AtlasError::Font("zip archive contained no font file".into()))
}

impl GlyphSource for FontdueSource {
    fn rasterize(&self, request: GlyphRequest) -> Result<GlyphBitmap> {
        let ch = request.codepoint;
        if !self.has_glyph(ch) {
            trace!("U+{:04X} missing from font, rendering .notdef", ch as u32);
        }
        let (metrics, pixels) = self.font.rasterize(ch, request.pixel_size as f32);
        let width = u32::try_from(metrics.width)
            .map_err(|_| AtlasError::Font(format!("glyph U+{:04X} too wide", ch as u32)))?;
        let height = u32::try_from(metrics.height)
            .map_err(|_| AtlasError::Font(format!("glyph U+{:04X} too tall", ch as u32)))?;
        let glyph = GlyphBitmap {
            width,
            height,
            pixels,
            bearing_x: metrics.xmin,
            bearing_y: metrics.ymin + height as i32,
            advance: metrics.advance_width.round().max(0.0) as u32,
            advance_y: metrics.advance_height.round().max(0.0) as u32,
        };
        glyph.validate()?;
        Ok(glyph)
    }
}
