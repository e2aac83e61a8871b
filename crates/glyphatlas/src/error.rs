use thiserror::Error;

use crate::codec::{Field, FieldSpec};

/// A glyph that cannot be placed within the configured atlas bounds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackingError {
    #[error(
        "glyph {glyph} is {width}x{height} which can never fit a {max_width}x{bound} atlas",
        bound = display_bound(.max_height)
    )]
    RectTooLarge {
        glyph: usize,
        width: u32,
        height: u32,
        max_width: u32,
        max_height: Option<u32>,
    },
    #[error("atlas too small: glyph {glyph} needs {required_height}px of height, {max_height}px available")]
    AtlasTooSmall {
        glyph: usize,
        required_height: u32,
        max_height: u32,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("malformed description: {len} bytes is not a whole number of {stride}-byte records")]
    Malformed { len: usize, stride: usize },
    #[error("malformed description: {len} bytes is shorter than the {header}-byte header")]
    MissingHeader { len: usize, header: usize },
    #[error("value {value} of field {field} does not fit {spec}")]
    FieldOverflow {
        field: Field,
        value: i64,
        spec: FieldSpec,
    },
    #[error("entry {index}: optional field {field} present in one of entry and layout only")]
    PresenceMismatch { index: usize, field: Field },
    #[error("line spacing header present in one of description and layout only")]
    HeaderMismatch,
    #[error("invalid field spec: {0}")]
    InvalidFieldSpec(String),
}

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error(transparent)]
    Packing(#[from] PackingError),
    #[error(transparent)]
    Description(#[from] DescriptionError),
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("invalid charset: {0}")]
    InvalidCharset(String),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
    #[error("unknown character: {0:?}")]
    UnknownChar(char),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn display_bound(max_height: &Option<u32>) -> String {
    match max_height {
        Some(h) => h.to_string(),
        None => "unbounded".into(),
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
