//! Rectangle packing for glyph atlases.
//!
//! Two strategies share the [`Packer`] trait:
//! - [`ShelfPacker`]: rows ("shelves") filled left to right, tallest glyphs first.
//! - [`CornerPacker`]: corner candidates closest to the origin, largest glyphs first.
//!
//! Both produce a [`Packing`] that the compositor and the description codec consume.
use std::{fmt, str::FromStr};

use log::{debug, trace};

use crate::error::{AtlasError, PackingError, Result};

/// A rectangle to place. `id` is the glyph's index in the ordered glyph list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RectRequest {
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

impl RectRequest {
    pub fn new(id: usize, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A placed rectangle. Top-left origin, y grows downwards.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedRect {
    pub id: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PackedRect {
    /// Right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Half-open intersection test; rects sharing an edge do not overlap.
    pub fn overlaps(&self, other: &PackedRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Result of a packing run: atlas size plus one placement per input rect, indexed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packing {
    pub width: u32,
    pub height: u32,
    rects: Vec<PackedRect>,
}

impl Packing {
    pub fn new(width: u32, height: u32, rects: Vec<PackedRect>) -> Self {
        Self {
            width,
            height,
            rects,
        }
    }

    pub fn rects(&self) -> &[PackedRect] {
        &self.rects
    }

    pub fn get(&self, id: usize) -> Option<&PackedRect> {
        self.rects.get(id)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Fraction of the atlas covered by glyph pixels.
    pub fn coverage(&self) -> f64 {
        let area = self.width as u64 * self.height as u64;
        if area == 0 {
            return 0.0;
        }
        let used: u64 = self
            .rects
            .iter()
            .map(|r| r.width as u64 * r.height as u64)
            .sum();
        used as f64 / area as f64
    }

    /// Verifies containment and pairwise disjointness of every placement.
    pub fn validate(&self) -> Result<()> {
        for r in &self.rects {
            if r.is_empty() {
                continue;
            }
            if r.right() > self.width || r.bottom() > self.height {
                return Err(AtlasError::InvariantViolation(format!(
                    "glyph {} at ({}, {}) size {}x{} leaves the {}x{} atlas",
                    r.id, r.x, r.y, r.width, r.height, self.width, self.height
                )));
            }
        }
        for (i, a) in self.rects.iter().enumerate() {
            for b in &self.rects[i + 1..] {
                if a.overlaps(b) {
                    return Err(AtlasError::InvariantViolation(format!(
                        "glyphs {} and {} overlap",
                        a.id, b.id
                    )));
                }
            }
        }
        Ok(())
    }
}

/// How the final atlas dimensions are derived from the used extents.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtlasSizing {
    /// Width is the configured maximum, height the used height.
    #[default]
    MaxWidth,
    /// Exactly the used extents.
    Tight,
    /// Used extents rounded up to powers of two.
    PowerOfTwo,
    /// A power-of-two square covering the larger extent.
    Square,
}

impl AtlasSizing {
    fn resolve(self, used_w: u32, used_h: u32, config: &PackerConfig) -> (u32, u32) {
        let cap_h = |h: u32| config.max_height.map_or(h, |max| h.min(max));
        match self {
            AtlasSizing::MaxWidth => (config.max_width, used_h),
            AtlasSizing::Tight => (used_w, used_h),
            AtlasSizing::PowerOfTwo => (
                next_pow2(used_w).min(config.max_width),
                cap_h(next_pow2(used_h)),
            ),
            AtlasSizing::Square => {
                let side = next_pow2(used_w.max(used_h));
                (side.min(config.max_width), cap_h(side))
            }
        }
    }
}

impl FromStr for AtlasSizing {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "max-width" | "maxwidth" => Ok(AtlasSizing::MaxWidth),
            "tight" => Ok(AtlasSizing::Tight),
            "pow2" | "power-of-two" => Ok(AtlasSizing::PowerOfTwo),
            "square" => Ok(AtlasSizing::Square),
            other => Err(AtlasError::InvalidOption(format!(
                "unknown atlas sizing '{other}' (expected max-width, tight, pow2 or square)"
            ))),
        }
    }
}

impl fmt::Display for AtlasSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtlasSizing::MaxWidth => "max-width",
            AtlasSizing::Tight => "tight",
            AtlasSizing::PowerOfTwo => "pow2",
            AtlasSizing::Square => "square",
        };
        f.write_str(name)
    }
}

/// Smallest power of two >= `x` (1 for 0), saturating at `u32::MAX`.
pub fn next_pow2(x: u32) -> u32 {
    x.max(1).checked_next_power_of_two().unwrap_or(u32::MAX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackerConfig {
    pub max_width: u32,
    /// `None` lets the atlas grow downwards without limit.
    pub max_height: Option<u32>,
    /// Gap kept between neighbouring glyphs.
    pub padding: u32,
    pub sizing: AtlasSizing,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: None,
            padding: 0,
            sizing: AtlasSizing::MaxWidth,
        }
    }
}

impl PackerConfig {
    pub fn with_max_width(max_width: u32) -> Self {
        Self {
            max_width,
            ..Default::default()
        }
    }

    fn check_fits(&self, rect: &RectRequest) -> std::result::Result<(), PackingError> {
        let too_wide = rect.width > self.max_width;
        let too_tall = self.max_height.is_some_and(|h| rect.height > h);
        if too_wide || too_tall {
            return Err(PackingError::RectTooLarge {
                glyph: rect.id,
                width: rect.width,
                height: rect.height,
                max_width: self.max_width,
                max_height: self.max_height,
            });
        }
        Ok(())
    }

    /// Height error for a glyph that cannot go below what is already placed.
    fn too_small(&self, glyph: usize, required_height: u32) -> PackingError {
        PackingError::AtlasTooSmall {
            glyph,
            required_height,
            max_height: self.max_height.unwrap_or(u32::MAX),
        }
    }

    fn finish(&self, rects: Vec<PackedRect>) -> Result<Packing> {
        let used_w = rects.iter().map(PackedRect::right).max().unwrap_or(0);
        let used_h = rects.iter().map(PackedRect::bottom).max().unwrap_or(0);
        let (width, height) = self.sizing.resolve(used_w, used_h, self);
        debug!(
            "packed {} rects into {width}x{height} (used {used_w}x{used_h}, {})",
            rects.len(),
            self.sizing
        );
        let packing = Packing::new(width, height, rects);
        packing.validate()?;
        Ok(packing)
    }
}

/// A packing strategy. Implementations must return one placement per input,
/// indexed by `RectRequest::id`, honoring containment and non-overlap.
pub trait Packer {
    fn pack(&self, rects: &[RectRequest]) -> Result<Packing>;
}

/// Ids must be exactly `0..rects.len()` so placements can be indexed by id.
fn check_ids(rects: &[RectRequest]) -> Result<()> {
    let mut seen = vec![false; rects.len()];
    for r in rects {
        match seen.get_mut(r.id) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(AtlasError::InvariantViolation(format!(
                    "rect id {} is duplicated or outside 0..{}",
                    r.id,
                    rects.len()
                )));
            }
        }
    }
    Ok(())
}

#[derive(Copy, Clone, Debug)]
struct Shelf {
    y: u32,
    height: u32,
    x_cursor: u32,
}

/// Greedy shelf (row) packer.
///
/// Rects are sorted tallest first; each goes on the first shelf with enough
/// horizontal room and height, otherwise a new shelf is opened below.
#[derive(Clone, Debug, Default)]
pub struct ShelfPacker {
    pub config: PackerConfig,
}

impl ShelfPacker {
    pub fn new(config: PackerConfig) -> Self {
        Self { config }
    }
}

impl Packer for ShelfPacker {
    fn pack(&self, rects: &[RectRequest]) -> Result<Packing> {
        check_ids(rects)?;
        let cfg = &self.config;
        let pad = cfg.padding;

        let mut order: Vec<&RectRequest> = rects.iter().filter(|r| !r.is_empty()).collect();
        for r in &order {
            cfg.check_fits(r)?;
        }
        order.sort_by(|a, b| {
            b.height
                .cmp(&a.height)
                .then(b.width.cmp(&a.width))
                .then(a.id.cmp(&b.id))
        });

        let mut placed = vec![PackedRect::default(); rects.len()];
        for r in rects {
            // zero-area rects keep a degenerate placement at the origin
            placed[r.id] = PackedRect {
                id: r.id,
                width: r.width,
                height: r.height,
                ..Default::default()
            };
        }

        let mut shelves: Vec<Shelf> = Vec::new();
        let mut next_shelf_y = 0u32;

        for r in order {
            let mut spot = None;
            for shelf in &mut shelves {
                let fits_x = shelf
                    .x_cursor
                    .checked_add(r.width)
                    .is_some_and(|end| end <= cfg.max_width);
                if r.height <= shelf.height && fits_x {
                    spot = Some((shelf.x_cursor, shelf.y));
                    // a saturated cursor fits nothing more
                    shelf.x_cursor = shelf.x_cursor.saturating_add(r.width).saturating_add(pad);
                    break;
                }
            }

            let (x, y) = match spot {
                Some(spot) => spot,
                None => {
                    let y = next_shelf_y;
                    let required_height = y
                        .checked_add(r.height)
                        .ok_or_else(|| cfg.too_small(r.id, u32::MAX))?;
                    if cfg.max_height.is_some_and(|max| required_height > max) {
                        return Err(cfg.too_small(r.id, required_height).into());
                    }
                    trace!("opening shelf {} at y={y} height={}", shelves.len(), r.height);
                    shelves.push(Shelf {
                        y,
                        height: r.height,
                        x_cursor: r.width.saturating_add(pad),
                    });
                    next_shelf_y = required_height.saturating_add(pad);
                    (0, y)
                }
            };
            placed[r.id].x = x;
            placed[r.id].y = y;
        }

        cfg.finish(placed)
    }
}

/// Corner-candidate packer.
///
/// Rects are sorted by decreasing area. Each one is tried at the free corners
/// of the rects already placed and put at the candidate closest to the origin,
/// weighting distance by the power-of-two extent it would force. Slower than
/// [`ShelfPacker`] (quadratic per rect) but tends towards square atlases.
#[derive(Clone, Debug, Default)]
pub struct CornerPacker {
    pub config: PackerConfig,
}

impl CornerPacker {
    pub fn new(config: PackerConfig) -> Self {
        Self { config }
    }

    fn collides(&self, placed: &[PackedRect], x: u32, y: u32, r: &RectRequest) -> bool {
        let pad = self.config.padding;
        let probe = PackedRect {
            id: r.id,
            x,
            y,
            width: r.width.saturating_add(pad),
            height: r.height.saturating_add(pad),
        };
        placed.iter().any(|p| {
            let grown = PackedRect {
                width: p.width.saturating_add(pad),
                height: p.height.saturating_add(pad),
                ..*p
            };
            probe.overlaps(&grown)
        })
    }

    fn candidates(&self, placed: &[PackedRect]) -> Vec<(u32, u32)> {
        let pad = self.config.padding;
        let mut corners: Vec<(u32, u32)> = Vec::with_capacity(placed.len() * 2);
        // corners pushed past u32::MAX by the padding cannot hold anything
        for p in placed {
            if let Some(x) = p.right().checked_add(pad) {
                corners.push((x, p.y));
            }
            if let Some(y) = p.bottom().checked_add(pad) {
                corners.push((p.x, y));
            }
        }
        corners.retain(|c| !placed.iter().any(|p| (p.x, p.y) == *c));
        match placed.iter().map(PackedRect::bottom).max() {
            // always-free row below everything placed so far
            Some(bottom) => corners.extend(bottom.checked_add(pad).map(|y| (0, y))),
            None => corners.push((0, 0)),
        }
        corners.sort_unstable();
        corners.dedup();
        corners
    }
}

/// Squared distance from the origin, weighted by the power-of-two extent the
/// placement would force on each axis.
fn corner_cost(x: u32, y: u32, r: &RectRequest) -> u128 {
    let xw = next_pow2(x.saturating_add(r.width)) as u128;
    let yh = next_pow2(y.saturating_add(r.height)) as u128;
    let (x, y) = (x as u128, y as u128);
    x * x * xw + y * y * yh
}

impl Packer for CornerPacker {
    fn pack(&self, rects: &[RectRequest]) -> Result<Packing> {
        check_ids(rects)?;
        let cfg = &self.config;

        let mut order: Vec<&RectRequest> = rects.iter().filter(|r| !r.is_empty()).collect();
        for r in &order {
            cfg.check_fits(r)?;
        }
        order.sort_by(|a, b| {
            let area_a = a.width as u64 * a.height as u64;
            let area_b = b.width as u64 * b.height as u64;
            area_b.cmp(&area_a).then(a.id.cmp(&b.id))
        });

        let mut result = vec![PackedRect::default(); rects.len()];
        for r in rects {
            result[r.id] = PackedRect {
                id: r.id,
                width: r.width,
                height: r.height,
                ..Default::default()
            };
        }

        let mut placed: Vec<PackedRect> = Vec::with_capacity(order.len());
        for r in order {
            let best = self
                .candidates(&placed)
                .into_iter()
                .filter(|&(x, y)| {
                    let fits_x = x.checked_add(r.width).is_some_and(|end| end <= cfg.max_width);
                    let fits_y = y
                        .checked_add(r.height)
                        .is_some_and(|end| cfg.max_height.is_none_or(|h| end <= h));
                    fits_x && fits_y && !self.collides(&placed, x, y, r)
                })
                .min_by_key(|&(x, y)| (corner_cost(x, y, r), y, x));

            let Some((x, y)) = best else {
                let used_h = placed.iter().map(PackedRect::bottom).max().unwrap_or(0);
                let required_height = used_h.saturating_add(cfg.padding).saturating_add(r.height);
                return Err(cfg.too_small(r.id, required_height).into());
            };
            trace!("glyph {} -> ({x}, {y})", r.id);
            let rect = PackedRect {
                id: r.id,
                x,
                y,
                width: r.width,
                height: r.height,
            };
            result[r.id] = rect;
            placed.push(rect);
        }

        cfg.finish(result)
    }
}

/// Strategy selector for callers that pick a packer at runtime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackerKind {
    #[default]
    Shelf,
    Corner,
}

impl PackerKind {
    pub fn build(self, config: PackerConfig) -> Box<dyn Packer> {
        match self {
            PackerKind::Shelf => Box::new(ShelfPacker::new(config)),
            PackerKind::Corner => Box::new(CornerPacker::new(config)),
        }
    }
}

impl FromStr for PackerKind {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "shelf" => Ok(PackerKind::Shelf),
            "corner" => Ok(PackerKind::Corner),
            other => Err(AtlasError::InvalidOption(format!(
                "unknown packer '{other}' (expected shelf or corner)"
            ))),
        }
    }
}
