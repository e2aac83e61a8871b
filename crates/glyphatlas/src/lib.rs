//! glyphatlas: bitmap font atlas toolkit.
//! Rasterizes a vector font, packs the glyph bitmaps into one atlas image and
//! writes a binary description of every glyph's placement and metrics.

pub mod atlas;
pub mod charset;
pub mod codec;
mod error;
mod glyph;
pub mod packer;
pub mod pipeline;
pub mod preview;
#[cfg(feature = "fontdue")]
pub mod source;

pub use atlas::{composite, Atlas};
pub use charset::{CharSet, Encoding};
pub use codec::{
    decode, decode_description, encode, encode_description, Description, DescriptionEntry,
    Endianness, Field, FieldConfig, FieldSpec,
};
pub use error::{AtlasError, DescriptionError, PackingError, Result};
pub use glyph::{GlyphBitmap, GlyphRequest};
pub use packer::{
    AtlasSizing, CornerPacker, PackedRect, Packer, PackerConfig, PackerKind, Packing,
    RectRequest, ShelfPacker,
};
pub use pipeline::{generate, GeneratedFont, OutputPaths};
#[cfg(feature = "fontdue")]
pub use source::FontdueSource;

// Test utilities
pub mod test_support;

/// Produces glyph bitmaps and metrics. Any rasterizer can back the pipeline.
pub trait GlyphSource {
    fn rasterize(&self, request: GlyphRequest) -> Result<GlyphBitmap>;
}
