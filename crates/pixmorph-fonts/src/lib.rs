//! Block glyph font and text rasterizer for pixmorph.
//!
//! Text is laid out from 5x7 block glyphs, each cell scaled up to a square
//! of pixels, and drawn into a [`PixelBuffer`] the size of the target
//! surface. The result is what the text source samples particles from.

mod glyphs;

use pixmorph_core::{PixelBuffer, Rgba};
use serde::{Deserialize, Serialize};

pub use glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, Glyph, glyph};

/// Blank cells between two glyphs on a line.
const LETTER_SPACING: usize = 1;

/// Blank cells between two lines.
const LINE_SPACING: usize = 2;

/// Horizontal placement of each line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// How text is laid out on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Pixels per glyph cell.
    pub scale: u32,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale: 2,
            align: TextAlign::Center,
        }
    }
}

/// Build block art for a single line of text.
///
/// # Returns
/// [`GLYPH_HEIGHT`] strings, one per row, with one blank cell between glyphs.
pub fn build_text_art(text: &str) -> Vec<String> {
    let mut lines = vec![String::new(); GLYPH_HEIGHT];

    for (i, ch) in text.chars().enumerate() {
        let g = glyph(ch);
        for (row, line) in lines.iter_mut().enumerate() {
            if i > 0 {
                line.push_str(&" ".repeat(LETTER_SPACING));
            }
            line.push_str(g[row]);
        }
    }

    lines
}

/// Width in cells of a line of `chars` glyphs.
fn line_cells(chars: usize) -> usize {
    if chars == 0 {
        0
    } else {
        chars * GLYPH_WIDTH + (chars - 1) * LETTER_SPACING
    }
}

/// Rasterize `text` into a `width` x `height` buffer.
///
/// Lines are split on `\n`, aligned horizontally according to `style`, and
/// the whole block is centred vertically. `offset` shifts everything.
pub fn rasterize_text(
    text: &str,
    style: TextStyle,
    color: Rgba,
    width: u32,
    height: u32,
    offset: (i32, i32),
) -> PixelBuffer {
    let mut buffer = PixelBuffer::new(width, height);
    // a glyph cell larger than the surface only draws off-screen
    let scale = style.scale.clamp(1, width.max(height).max(1)) as i64;
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return buffer;
    }

    let block_cells = lines.len() * GLYPH_HEIGHT + (lines.len() - 1) * LINE_SPACING;
    let block_height = (block_cells as i64).saturating_mul(scale);
    let top = (height as i64 - block_height) / 2 + offset.1 as i64;

    for (line_no, line) in lines.iter().enumerate() {
        let line_width = (line_cells(line.chars().count()) as i64).saturating_mul(scale);
        let left = match style.align {
            TextAlign::Left => 0,
            TextAlign::Center => (width as i64 - line_width) / 2,
            TextAlign::Right => width as i64 - line_width,
        } + offset.0 as i64;
        let line_top = top.saturating_add(
            ((line_no * (GLYPH_HEIGHT + LINE_SPACING)) as i64).saturating_mul(scale),
        );

        for (row, art) in build_text_art(line).iter().enumerate() {
            for (col, cell) in art.chars().enumerate() {
                if cell != '█' {
                    continue;
                }
                let x = left.saturating_add(col as i64 * scale);
                let y = line_top.saturating_add(row as i64 * scale);
                buffer.fill_rect(x, y, scale as u32, scale as u32, color);
            }
        }
    }

    buffer
}
