//! Character sets: which codepoints get a glyph, and in which order.
//!
//! The slot order is the record order of the description file, so a renderer
//! finds a glyph's record by its slot index alone.
use std::{collections::HashMap, fmt, str::FromStr};

use once_cell::sync::Lazy;

use crate::error::{AtlasError, Result};

/// 8-bit encodings whose 256 byte values become the slots of a charset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Latin1,
    Ascii,
    Cp437,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Latin1 => "latin-1",
            Encoding::Ascii => "ascii",
            Encoding::Cp437 => "cp437",
        }
    }

    /// The character byte `b` stands for, `None` when the encoding leaves it undefined.
    pub fn decode(&self, b: u8) -> Option<char> {
        match self {
            Encoding::Latin1 => Some(char::from(b)),
            Encoding::Ascii => b.is_ascii().then_some(char::from(b)),
            Encoding::Cp437 => Some(CP437_TO_UNICODE[b as usize]),
        }
    }

    pub fn encode(&self, ch: char) -> Option<u8> {
        match self {
            Encoding::Latin1 => u8::try_from(u32::from(ch)).ok(),
            Encoding::Ascii => ch.is_ascii().then_some(ch as u8),
            Encoding::Cp437 => UNICODE_TO_CP437.get(&ch).copied(),
        }
    }
}

impl FromStr for Encoding {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            "cp437" | "ibm437" => Ok(Encoding::Cp437),
            _ => Err(AtlasError::UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered glyph slots. `None` marks a slot without a character; it still
/// gets an (empty) record so later indices keep their meaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharSet {
    label: String,
    encoding: Option<Encoding>,
    slots: Vec<Option<char>>,
}

impl CharSet {
    /// All 256 byte values of `encoding`, in byte order.
    pub fn from_encoding(encoding: Encoding) -> Self {
        Self {
            label: encoding.name().to_string(),
            encoding: Some(encoding),
            slots: (0..=255u8).map(|b| encoding.decode(b)).collect(),
        }
    }

    /// Parses `32-126,0x400-0x4ff,65` style lists: decimal or `0x` hex
    /// codepoints and inclusive ranges. Result is ascending and de-duplicated.
    pub fn from_ranges(spec: &str) -> Result<Self> {
        let mut chars = Vec::new();
        for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (lo, hi) = match part.split_once('-') {
                Some((lo, hi)) => (parse_codepoint(lo)?, parse_codepoint(hi)?),
                None => {
                    let cp = parse_codepoint(part)?;
                    (cp, cp)
                }
            };
            if lo > hi {
                return Err(AtlasError::InvalidCharset(format!("reversed range '{part}'")));
            }
            for cp in lo..=hi {
                let ch = char::from_u32(cp).ok_or_else(|| {
                    AtlasError::InvalidCharset(format!("U+{cp:04X} is not a character"))
                })?;
                chars.push(ch);
            }
        }
        if chars.is_empty() {
            return Err(AtlasError::InvalidCharset("no codepoints given".into()));
        }
        Ok(Self::sorted("custom", chars))
    }

    /// The distinct characters of `text`, ascending.
    pub fn from_chars(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Err(AtlasError::InvalidCharset("no characters given".into()));
        }
        Ok(Self::sorted("custom", text.chars().collect()))
    }

    fn sorted(label: &str, mut chars: Vec<char>) -> Self {
        chars.sort_unstable();
        chars.dedup();
        Self {
            label: label.to_string(),
            encoding: None,
            slots: chars.into_iter().map(Some).collect(),
        }
    }

    /// Short name used in output file names.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn slots(&self) -> &[Option<char>] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record index of `ch`, if the set contains it.
    pub fn slot_of(&self, ch: char) -> Option<usize> {
        match self.encoding {
            Some(encoding) => encoding.encode(ch).map(usize::from),
            None => self.slots.binary_search(&Some(ch)).ok(),
        }
    }
}

fn parse_codepoint(s: &str) -> Result<u32> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse::<u32>(),
    };
    parsed.map_err(|_| AtlasError::InvalidCharset(format!("bad codepoint '{s}'")))
}

/// Code page 437 as drawn on DOS screens: every control byte and 0x7F map to their glyphs,
/// only 0x00 stays NUL.
pub const CP437_TO_UNICODE: [char; 256] = [
    '\x00', '\u{263a}', '\u{263b}', '\u{2665}', '\u{2666}', '\u{2663}', '\u{2660}', '\u{2022}',
    '\u{25d8}', '\u{25cb}', '\u{25d9}', '\u{2642}', '\u{2640}', '\u{266a}', '\u{266b}', '\u{263c}',
    '\u{25ba}', '\u{25c4}', '\u{2195}', '\u{203c}', '\u{00b6}', '\u{00a7}', '\u{25ac}', '\u{21a8}',
    '\u{2191}', '\u{2193}', '\u{2192}', '\u{2190}', '\u{221f}', '\u{2194}', '\u{25b2}', '\u{25bc}',
    '\u{0020}', '\u{0021}', '\u{0022}', '\u{0023}', '\u{0024}', '\u{0025}', '\u{0026}', '\u{0027}',
    '\u{0028}', '\u{0029}', '\u{002a}', '\u{002b}', '\u{002c}', '\u{002d}', '\u{002e}', '\u{002f}',
    '\u{0030}', '\u{0031}', '\u{0032}', '\u{0033}', '\u{0034}', '\u{0035}', '\u{0036}', '\u{0037}',
    '\u{0038}', '\u{0039}', '\u{003a}', '\u{003b}', '\u{003c}', '\u{003d}', '\u{003e}', '\u{003f}',
    '\u{0040}', '\u{0041}', '\u{0042}', '\u{0043}', '\u{0044}', '\u{0045}', '\u{0046}', '\u{0047}',
    '\u{0048}', '\u{0049}', '\u{004a}', '\u{004b}', '\u{004c}', '\u{004d}', '\u{004e}', '\u{004f}',
    '\u{0050}', '\u{0051}', '\u{0052}', '\u{0053}', '\u{0054}', '\u{0055}', '\u{0056}', '\u{0057}',
    '\u{0058}', '\u{0059}', '\u{005a}', '\u{005b}', '\u{005c}', '\u{005d}', '\u{005e}', '\u{005f}',
    '\u{0060}', '\u{0061}', '\u{0062}', '\u{0063}', '\u{0064}', '\u{0065}', '\u{0066}', '\u{0067}',
    '\u{0068}', '\u{0069}', '\u{006a}', '\u{006b}', '\u{006c}', '\u{006d}', '\u{006e}', '\u{006f}',
    '\u{0070}', '\u{0071}', '\u{0072}', '\u{0073}', '\u{0074}', '\u{0075}', '\u{0076}', '\u{0077}',
    '\u{0078}', '\u{0079}', '\u{007a}', '\u{007b}', '\u{007c}', '\u{007d}', '\u{007e}', '\u{2302}',
    '\u{00c7}', '\u{00fc}', '\u{00e9}', '\u{00e2}', '\u{00e4}', '\u{00e0}', '\u{00e5}', '\u{00e7}',
    '\u{00ea}', '\u{00eb}', '\u{00e8}', '\u{00ef}', '\u{00ee}', '\u{00ec}', '\u{00c4}', '\u{00c5}',
    '\u{00c9}', '\u{00e6}', '\u{00c6}', '\u{00f4}', '\u{00f6}', '\u{00f2}', '\u{00fb}', '\u{00f9}',
    '\u{00ff}', '\u{00d6}', '\u{00dc}', '\u{00a2}', '\u{00a3}', '\u{00a5}', '\u{20a7}', '\u{0192}',
    '\u{00e1}', '\u{00ed}', '\u{00f3}', '\u{00fa}', '\u{00f1}', '\u{00d1}', '\u{00aa}', '\u{00ba}',
    '\u{00bf}', '\u{2310}', '\u{00ac}', '\u{00bd}', '\u{00bc}', '\u{00a1}', '\u{00ab}', '\u{00bb}',
    '\u{2591}', '\u{2592}', '\u{2593}', '\u{2502}', '\u{2524}', '\u{2561}', '\u{2562}', '\u{2556}',
    '\u{2555}', '\u{2563}', '\u{2551}', '\u{2557}', '\u{255d}', '\u{255c}', '\u{255b}', '\u{2510}',
    '\u{2514}', '\u{2534}', '\u{252c}', '\u{251c}', '\u{2500}', '\u{253c}', '\u{255e}', '\u{255f}',
    '\u{255a}', '\u{2554}', '\u{2569}', '\u{2566}', '\u{2560}', '\u{2550}', '\u{256c}', '\u{2567}',
    '\u{2568}', '\u{2564}', '\u{2565}', '\u{2559}', '\u{2558}', '\u{2552}', '\u{2553}', '\u{256b}',
    '\u{256a}', '\u{2518}', '\u{250c}', '\u{2588}', '\u{2584}', '\u{258c}', '\u{2590}', '\u{2580}',
    '\u{03b1}', '\u{00df}', '\u{0393}', '\u{03c0}', '\u{03a3}', '\u{03c3}', '\u{00b5}', '\u{03c4}',
    '\u{03a6}', '\u{0398}', '\u{03a9}', '\u{03b4}', '\u{221e}', '\u{03c6}', '\u{03b5}', '\u{2229}',
    '\u{2261}', '\u{00b1}', '\u{2265}', '\u{2264}', '\u{2320}', '\u{2321}', '\u{00f7}', '\u{2248}',
    '\u{00b0}', '\u{2219}', '\u{00b7}', '\u{221a}', '\u{207f}', '\u{00b2}', '\u{25a0}', '\u{00a0}',
];

// Reverse lookup Unicode char -> CP437 byte, built on first use.
static UNICODE_TO_CP437: Lazy<HashMap<char, u8>> = Lazy::new(|| {
    let mut m = HashMap::with_capacity(256);
    for (i, c) in CP437_TO_UNICODE.iter().enumerate() {
        m.insert(*c, i as u8);
    }
    m
});
