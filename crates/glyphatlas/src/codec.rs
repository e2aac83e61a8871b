//! Binary glyph description files.
//!
//! A description is an optional header (the font's line spacing) followed by
//! fixed-stride records, one per glyph slot, with no padding anywhere:
//!
//! ```text
//! [line_spacing]
//! [codepoint] x y width height bearing_x bearing_y advance [advance_y]
//! ...
//! ```
//!
//! Bracketed values are optional. Every value's width (8/16/32 bit),
//! signedness and the byte order are part of [`FieldConfig`]. Values that do
//! not fit their field are rejected rather than truncated.
use std::{fmt, str::FromStr};

use crate::{
    error::{AtlasError, DescriptionError, Result},
    glyph::GlyphBitmap,
    packer::PackedRect,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl FromStr for Endianness {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Endianness::Little),
            "big" | "be" => Ok(Endianness::Big),
            other => Err(AtlasError::InvalidOption(format!(
                "unknown endianness '{other}' (expected little or big)"
            ))),
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => f.write_str("little"),
            Endianness::Big => f.write_str("big"),
        }
    }
}

/// Storage of one value: 8, 16 or 32 bits, two's complement when signed.
/// Serialized in its text form (`"u16"`, `"i32"`, ...).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct FieldSpec {
    bits: u8,
    signed: bool,
}

impl FieldSpec {
    pub const U8: FieldSpec = FieldSpec::unchecked(8, false);
    pub const U16: FieldSpec = FieldSpec::unchecked(16, false);
    pub const U32: FieldSpec = FieldSpec::unchecked(32, false);
    pub const I8: FieldSpec = FieldSpec::unchecked(8, true);
    pub const I16: FieldSpec = FieldSpec::unchecked(16, true);
    pub const I32: FieldSpec = FieldSpec::unchecked(32, true);

    const fn unchecked(bits: u8, signed: bool) -> Self {
        Self { bits, signed }
    }

    pub fn new(bits: u8, signed: bool) -> std::result::Result<Self, DescriptionError> {
        match bits {
            8 | 16 | 32 => Ok(Self { bits, signed }),
            _ => Err(DescriptionError::InvalidFieldSpec(format!(
                "{bits}-bit fields are not supported (use 8, 16 or 32)"
            ))),
        }
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }

    pub const fn size(&self) -> usize {
        self.bits as usize / 8
    }

    /// Inclusive range of representable values.
    pub fn range(&self) -> (i64, i64) {
        if self.signed {
            let half = 1i64 << (self.bits - 1);
            (-half, half - 1)
        } else {
            (0, (1i64 << self.bits) - 1)
        }
    }

    pub fn fits(&self, value: i64) -> bool {
        let (lo, hi) = self.range();
        (lo..=hi).contains(&value)
    }

    fn write(
        &self,
        field: Field,
        value: i64,
        endian: Endianness,
        out: &mut Vec<u8>,
    ) -> std::result::Result<(), DescriptionError> {
        if !self.fits(value) {
            return Err(DescriptionError::FieldOverflow {
                field,
                value,
                spec: *self,
            });
        }
        // in range, so the low bytes are the two's complement representation
        let raw = (value as u64).to_le_bytes();
        let bytes = &raw[..self.size()];
        match endian {
            Endianness::Little => out.extend_from_slice(bytes),
            Endianness::Big => out.extend(bytes.iter().rev()),
        }
        Ok(())
    }

    fn read(&self, bytes: &[u8], endian: Endianness) -> i64 {
        let mut raw = 0u64;
        let mut push = |b: u8| raw = (raw << 8) | b as u64;
        match endian {
            Endianness::Little => bytes.iter().rev().copied().for_each(&mut push),
            Endianness::Big => bytes.iter().copied().for_each(&mut push),
        }
        if self.signed {
            let shift = 64 - self.bits as u32;
            ((raw << shift) as i64) >> shift
        } else {
            raw as i64
        }
    }
}

impl FromStr for FieldSpec {
    type Err = DescriptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (signed, bits) = match s.split_at_checked(1) {
            Some(("u", bits)) => (false, bits),
            Some(("i", bits)) => (true, bits),
            _ => {
                return Err(DescriptionError::InvalidFieldSpec(format!(
                    "'{s}' (expected u8, u16, u32, i8, i16 or i32)"
                )));
            }
        };
        let bits = bits
            .parse::<u8>()
            .map_err(|_| DescriptionError::InvalidFieldSpec(format!("'{s}': bad bit width")))?;
        FieldSpec::new(bits, signed)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.signed { 'i' } else { 'u' };
        write!(f, "{prefix}{}", self.bits)
    }
}

impl TryFrom<String> for FieldSpec {
    type Error = DescriptionError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldSpec> for String {
    fn from(spec: FieldSpec) -> Self {
        spec.to_string()
    }
}

/// Named values of the description layout, in file order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    LineSpacing,
    Codepoint,
    X,
    Y,
    Width,
    Height,
    BearingX,
    BearingY,
    Advance,
    AdvanceY,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::LineSpacing,
        Field::Codepoint,
        Field::X,
        Field::Y,
        Field::Width,
        Field::Height,
        Field::BearingX,
        Field::BearingY,
        Field::Advance,
        Field::AdvanceY,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::LineSpacing => "line_spacing",
            Field::Codepoint => "codepoint",
            Field::X => "x",
            Field::Y => "y",
            Field::Width => "width",
            Field::Height => "height",
            Field::BearingX => "bearing_x",
            Field::BearingY => "bearing_y",
            Field::Advance => "advance",
            Field::AdvanceY => "advance_y",
        }
    }

    /// Fields that may be left out of the layout.
    pub fn is_optional(&self) -> bool {
        matches!(self, Field::LineSpacing | Field::Codepoint | Field::AdvanceY)
    }
}

impl FromStr for Field {
    type Err = DescriptionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| DescriptionError::InvalidFieldSpec(format!("unknown field '{s}'")))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte layout of a description file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldConfig {
    pub endianness: Endianness,
    pub line_spacing: Option<FieldSpec>,
    pub codepoint: Option<FieldSpec>,
    pub x: FieldSpec,
    pub y: FieldSpec,
    pub width: FieldSpec,
    pub height: FieldSpec,
    pub bearing_x: FieldSpec,
    pub bearing_y: FieldSpec,
    pub advance: FieldSpec,
    pub advance_y: Option<FieldSpec>,
}

impl Default for FieldConfig {
    /// Little endian, `u32` line spacing header, `u32 u32 u32 u32 i32 i32 u32 u32` records.
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            line_spacing: Some(FieldSpec::U32),
            codepoint: None,
            x: FieldSpec::U32,
            y: FieldSpec::U32,
            width: FieldSpec::U32,
            height: FieldSpec::U32,
            bearing_x: FieldSpec::I32,
            bearing_y: FieldSpec::I32,
            advance: FieldSpec::U32,
            advance_y: Some(FieldSpec::U32),
        }
    }
}

impl FieldConfig {
    /// 16-bit records with no header and no vertical advance (14 bytes per glyph).
    pub fn compact() -> Self {
        Self {
            endianness: Endianness::Little,
            line_spacing: None,
            codepoint: None,
            x: FieldSpec::U16,
            y: FieldSpec::U16,
            width: FieldSpec::U16,
            height: FieldSpec::U16,
            bearing_x: FieldSpec::I16,
            bearing_y: FieldSpec::I16,
            advance: FieldSpec::U16,
            advance_y: None,
        }
    }

    pub fn spec(&self, field: Field) -> Option<FieldSpec> {
        match field {
            Field::LineSpacing => self.line_spacing,
            Field::Codepoint => self.codepoint,
            Field::X => Some(self.x),
            Field::Y => Some(self.y),
            Field::Width => Some(self.width),
            Field::Height => Some(self.height),
            Field::BearingX => Some(self.bearing_x),
            Field::BearingY => Some(self.bearing_y),
            Field::Advance => Some(self.advance),
            Field::AdvanceY => self.advance_y,
        }
    }

    /// Changes or removes one field. Mandatory fields cannot be removed.
    pub fn set(
        &mut self,
        field: Field,
        spec: Option<FieldSpec>,
    ) -> std::result::Result<(), DescriptionError> {
        let required = |spec: Option<FieldSpec>| {
            spec.ok_or_else(|| {
                DescriptionError::InvalidFieldSpec(format!("field {field} cannot be removed"))
            })
        };
        match field {
            Field::LineSpacing => self.line_spacing = spec,
            Field::Codepoint => self.codepoint = spec,
            Field::AdvanceY => self.advance_y = spec,
            Field::X => self.x = required(spec)?,
            Field::Y => self.y = required(spec)?,
            Field::Width => self.width = required(spec)?,
            Field::Height => self.height = required(spec)?,
            Field::BearingX => self.bearing_x = required(spec)?,
            Field::BearingY => self.bearing_y = required(spec)?,
            Field::Advance => self.advance = required(spec)?,
        }
        Ok(())
    }

    /// Record fields in file order, header excluded.
    pub fn record_layout(&self) -> Vec<(Field, FieldSpec)> {
        Field::ALL
            .into_iter()
            .filter(|f| *f != Field::LineSpacing)
            .filter_map(|f| self.spec(f).map(|s| (f, s)))
            .collect()
    }

    /// Bytes per record.
    pub fn stride(&self) -> usize {
        self.record_layout().iter().map(|(_, s)| s.size()).sum()
    }

    pub fn header_len(&self) -> usize {
        self.line_spacing.map_or(0, |s| s.size())
    }
}

/// One glyph's record: where its bitmap sits in the atlas and how to place it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptionEntry {
    /// Only stored when the layout has a codepoint field.
    pub codepoint: Option<u32>,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub advance: u32,
    /// Only stored when the layout has an advance_y field.
    pub advance_y: Option<u32>,
}

impl DescriptionEntry {
    /// Builds the record for a placed glyph, filling optional values the layout asks for.
    pub fn from_glyph(
        ch: Option<char>,
        rect: &PackedRect,
        glyph: &GlyphBitmap,
        config: &FieldConfig,
    ) -> Self {
        Self {
            codepoint: config.codepoint.map(|_| ch.map_or(0, u32::from)),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            bearing_x: glyph.bearing_x,
            bearing_y: glyph.bearing_y,
            advance: glyph.advance,
            advance_y: config.advance_y.map(|_| glyph.advance_y),
        }
    }

    fn value(&self, field: Field) -> Option<i64> {
        match field {
            Field::LineSpacing => None,
            Field::Codepoint => self.codepoint.map(i64::from),
            Field::X => Some(self.x as i64),
            Field::Y => Some(self.y as i64),
            Field::Width => Some(self.width as i64),
            Field::Height => Some(self.height as i64),
            Field::BearingX => Some(self.bearing_x as i64),
            Field::BearingY => Some(self.bearing_y as i64),
            Field::Advance => Some(self.advance as i64),
            Field::AdvanceY => self.advance_y.map(i64::from),
        }
    }

    fn set_value(&mut self, field: Field, value: i64) {
        // decoded values come from fields no wider than 32 bits
        match field {
            Field::LineSpacing => {}
            Field::Codepoint => self.codepoint = Some(value as u32),
            Field::X => self.x = value as u32,
            Field::Y => self.y = value as u32,
            Field::Width => self.width = value as u32,
            Field::Height => self.height = value as u32,
            Field::BearingX => self.bearing_x = value as i32,
            Field::BearingY => self.bearing_y = value as i32,
            Field::Advance => self.advance = value as u32,
            Field::AdvanceY => self.advance_y = Some(value as u32),
        }
    }
}

/// A complete description file: optional header plus records in slot order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Description {
    pub line_spacing: Option<u32>,
    pub entries: Vec<DescriptionEntry>,
}

impl Description {
    pub fn get(&self, slot: usize) -> Option<&DescriptionEntry> {
        self.entries.get(slot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_bytes(&self, config: &FieldConfig) -> Result<Vec<u8>> {
        encode_description(self, config)
    }

    pub fn from_bytes(bytes: &[u8], config: &FieldConfig) -> Result<Self> {
        decode_description(bytes, config)
    }
}

/// Encodes records only, no header.
pub fn encode(entries: &[DescriptionEntry], config: &FieldConfig) -> Result<Vec<u8>> {
    let layout = config.record_layout();
    let mut out = Vec::with_capacity(entries.len() * config.stride());
    for (index, entry) in entries.iter().enumerate() {
        append_entry(entry, index, &layout, config, &mut out)?;
    }
    Ok(out)
}

fn append_entry(
    entry: &DescriptionEntry,
    index: usize,
    layout: &[(Field, FieldSpec)],
    config: &FieldConfig,
    out: &mut Vec<u8>,
) -> Result<()> {
    for optional in [Field::Codepoint, Field::AdvanceY] {
        if entry.value(optional).is_some() != config.spec(optional).is_some() {
            return Err(DescriptionError::PresenceMismatch {
                index,
                field: optional,
            }
            .into());
        }
    }
    for &(field, spec) in layout {
        let value = entry.value(field).unwrap_or_default();
        spec.write(field, value, config.endianness, out)?;
    }
    Ok(())
}

/// Decodes records only, no header. Fails unless `bytes` holds whole records.
pub fn decode(bytes: &[u8], config: &FieldConfig) -> Result<Vec<DescriptionEntry>> {
    let layout = config.record_layout();
    let stride = config.stride();
    if bytes.len() % stride != 0 {
        return Err(DescriptionError::Malformed {
            len: bytes.len(),
            stride,
        }
        .into());
    }
    let entries = bytes
        .chunks_exact(stride)
        .map(|record| {
            let mut entry = DescriptionEntry::default();
            let mut o = 0usize;
            for &(field, spec) in &layout {
                let value = spec.read(&record[o..o + spec.size()], config.endianness);
                entry.set_value(field, value);
                o += spec.size();
            }
            entry
        })
        .collect();
    Ok(entries)
}

pub fn encode_description(description: &Description, config: &FieldConfig) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(config.header_len() + description.len() * config.stride());
    match (config.line_spacing, description.line_spacing) {
        (Some(spec), Some(spacing)) => {
            spec.write(Field::LineSpacing, spacing as i64, config.endianness, &mut out)?
        }
        (None, None) => {}
        _ => return Err(DescriptionError::HeaderMismatch.into()),
    }
    out.extend(encode(&description.entries, config)?);
    Ok(out)
}

pub fn decode_description(bytes: &[u8], config: &FieldConfig) -> Result<Description> {
    let header = config.header_len();
    if bytes.len() < header {
        return Err(DescriptionError::MissingHeader {
            len: bytes.len(),
            header,
        }
        .into());
    }
    let line_spacing = config
        .line_spacing
        .map(|spec| spec.read(&bytes[..header], config.endianness) as u32);
    let entries = decode(&bytes[header..], config)?;
    Ok(Description {
        line_spacing,
        entries,
    })
}
