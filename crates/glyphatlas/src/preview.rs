//! Draws text with a finished atlas and description, the way a game renderer would.
use log::trace;

use crate::{
    atlas::Atlas,
    charset::CharSet,
    codec::Description,
    error::{AtlasError, Result},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PreviewOptions {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Pen start, also the left edge lines return to.
    pub margin: (u32, u32),
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            canvas_width: 1000,
            canvas_height: 1000,
            margin: (100, 100),
        }
    }
}

/// Renders `text` onto a fresh canvas. Pixels landing outside the canvas are dropped.
pub fn render_text(
    atlas: &Atlas,
    description: &Description,
    charset: &CharSet,
    text: &str,
    options: &PreviewOptions,
) -> Result<Atlas> {
    let mut canvas = Atlas::new(options.canvas_width, options.canvas_height);
    let line_spacing = description.line_spacing.unwrap_or(0) as i64;
    let (left, top) = (options.margin.0 as i64, options.margin.1 as i64);
    let (mut pen_x, mut pen_y) = (left, top);

    for ch in text.chars() {
        if ch == '\n' {
            pen_x = left;
            pen_y += line_spacing;
            continue;
        }
        let entry = charset
            .slot_of(ch)
            .and_then(|slot| description.get(slot))
            .ok_or(AtlasError::UnknownChar(ch))?;

        if entry.width > 0 && entry.height > 0 {
            let pixels = atlas.region(entry.x, entry.y, entry.width, entry.height)?;
            let x = pen_x + entry.bearing_x as i64;
            let y = pen_y - entry.bearing_y as i64;
            trace!("{ch:?} at ({x}, {y})");
            canvas.blit(x, y, entry.width, entry.height, &pixels)?;
        }
        pen_x += entry.advance as i64;
        pen_y += entry.advance_y.unwrap_or(0) as i64;
    }
    Ok(canvas)
}
