use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    atlas::{composite, Atlas},
    charset::CharSet,
    codec::{Description, DescriptionEntry, FieldConfig},
    error::Result,
    glyph::{GlyphBitmap, GlyphRequest},
    packer::{Packer, Packing, RectRequest},
    GlyphSource,
};

/// Both artifacts of a generation run.
#[derive(Clone, Debug)]
pub struct GeneratedFont {
    pub atlas: Atlas,
    pub description: Description,
    pub packing: Packing,
}

impl GeneratedFont {
    pub fn description_bytes(&self, config: &FieldConfig) -> Result<Vec<u8>> {
        self.description.to_bytes(config)
    }
}

/// Rasterizes every slot of `charset`, packs the bitmaps and builds the atlas
/// and the description (records in slot order, laid out for `fields`).
pub fn generate(
    source: &dyn GlyphSource,
    charset: &CharSet,
    pixel_size: u32,
    packer: &dyn Packer,
    fields: &FieldConfig,
) -> Result<GeneratedFont> {
    let glyphs = charset
        .slots()
        .iter()
        .map(|slot| match slot {
            Some(ch) => source.rasterize(GlyphRequest::new(*ch, pixel_size)),
            None => Ok(GlyphBitmap::default()),
        })
        .collect::<Result<Vec<_>>>()?;

    let line_spacing = line_spacing(&glyphs);
    debug!("rasterized {} glyphs, line spacing {line_spacing}", glyphs.len());

    let rects: Vec<RectRequest> = glyphs
        .iter()
        .enumerate()
        .map(|(id, g)| RectRequest::new(id, g.width, g.height))
        .collect();
    let packing = packer.pack(&rects)?;
    let atlas = composite(&packing, &glyphs)?;

    let entries = charset
        .slots()
        .iter()
        .zip(packing.rects())
        .zip(&glyphs)
        .map(|((ch, rect), glyph)| DescriptionEntry::from_glyph(*ch, rect, glyph, fields))
        .collect();
    let description = Description {
        line_spacing: fields.line_spacing.map(|_| line_spacing),
        entries,
    };

    info!(
        "atlas {}x{} holds {} glyphs ({:.1}% coverage)",
        packing.width,
        packing.height,
        glyphs.iter().filter(|g| !g.is_empty()).count(),
        packing.coverage() * 100.0
    );
    Ok(GeneratedFont {
        atlas,
        description,
        packing,
    })
}

/// Smallest line advance keeping lines apart: the largest `2 * bearing_y - height`
/// over all glyphs, never negative.
pub fn line_spacing(glyphs: &[GlyphBitmap]) -> u32 {
    glyphs
        .iter()
        .map(GlyphBitmap::line_extent)
        .max()
        .unwrap_or(0)
        .clamp(0, u32::MAX as i64) as u32
}

/// Where a run's artifacts live: `<basedir>/textures/<stem>.png` and
/// `<basedir>/fonts/<stem>.ftd`, with `stem = <font>_<size>_<charset>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPaths {
    pub atlas: PathBuf,
    pub description: PathBuf,
}

impl OutputPaths {
    pub fn new(basedir: &Path, font_path: &Path, pixel_size: u32, charset_label: &str) -> Self {
        let stem = output_stem(font_path, pixel_size, charset_label);
        Self {
            atlas: basedir.join("textures").join(format!("{stem}.png")),
            description: basedir.join("fonts").join(format!("{stem}.ftd")),
        }
    }

    /// Creates missing parent directories of both outputs.
    pub fn create_dirs(&self) -> Result<()> {
        for path in [&self.atlas, &self.description] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

pub fn output_stem(font_path: &Path, pixel_size: u32, charset_label: &str) -> String {
    let font_name = font_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "font".to_string());
    format!("{font_name}_{pixel_size}_{charset_label}")
}
