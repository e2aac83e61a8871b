use glyphatlas::{Atlas, CharSet, Description};
use std::fmt::Write;

/// One line per record, labelled with the slot's character when it is printable.
pub fn description_table(description: &Description, charset: &CharSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5} {:>8} {:>6} {:>6} {:>5} {:>5} {:>6} {:>6} {:>7}",
        "slot", "char", "x", "y", "w", "h", "bx", "by", "advance"
    );
    for (slot, entry) in description.entries.iter().enumerate() {
        let label = match entry
            .codepoint
            .and_then(char::from_u32)
            .or_else(|| charset.slots().get(slot).copied().flatten())
        {
            Some(ch) if !ch.is_control() => format!("{ch:?}"),
            Some(ch) => format!("U+{:04X}", ch as u32),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>5} {:>8} {:>6} {:>6} {:>5} {:>5} {:>6} {:>6} {:>7}",
            slot,
            label,
            entry.x,
            entry.y,
            entry.width,
            entry.height,
            entry.bearing_x,
            entry.bearing_y,
            entry.advance
        );
    }
    out
}

/// Downsamples an atlas into terminal cells shaded with the 24-step grayscale ramp.
/// Each cell covers `scale x 2*scale` pixels (terminal cells are about twice as tall as wide).
pub fn shade_to_ansi(atlas: &Atlas, scale: u32) -> String {
    let scale = scale.max(1);
    let (cell_w, cell_h) = (scale, scale * 2);
    let mut out = String::new();
    let mut y = 0;
    while y < atlas.height() {
        if y > 0 {
            out.push('\n');
        }
        let mut x = 0;
        while x < atlas.width() {
            let mut sum = 0u32;
            let mut count = 0u32;
            for py in y..(y + cell_h).min(atlas.height()) {
                for px in x..(x + cell_w).min(atlas.width()) {
                    sum += atlas.pixel(px, py).unwrap_or(0) as u32;
                    count += 1;
                }
            }
            let avg = sum / count.max(1);
            if avg == 0 {
                out.push(' ');
            } else {
                // 232..=255 is black..white in the 256-color palette
                let shade = 232 + avg * 23 / 255;
                let _ = write!(out, "\x1B[48;5;{shade}m \x1B[0m");
            }
            x += cell_w;
        }
        y += cell_h;
    }
    out
}
