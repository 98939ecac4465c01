//! Presenting a surface in the terminal.

use pixmorph_core::Rgba;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

const UPPER_HALF: &str = "▀";
const LOWER_HALF: &str = "▄";

/// Draws a [`Surface`](crate::Surface) two pixels per cell: the upper pixel
/// as the foreground of `▀`, the lower one as its background.
///
/// Transparent pixels leave the underlying cell untouched.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceWidget<'a> {
    surface: &'a crate::Surface,
}

impl<'a> SurfaceWidget<'a> {
    pub fn new(surface: &'a crate::Surface) -> Self {
        Self { surface }
    }
}

/// Terminal colour of a pixel, composited over black.
fn to_color(px: Rgba) -> Color {
    let a = px.a as u16;
    let scale = |c: u8| ((c as u16 * a + 127) / 255) as u8;
    Color::Rgb(scale(px.r), scale(px.g), scale(px.b))
}

impl Widget for SurfaceWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let surface = self.surface;

        for row in 0..area.height {
            for col in 0..area.width {
                let x = col as u32;
                let y = row as u32 * 2;
                let top = surface.get(x, y).filter(|p| !p.is_transparent());
                let bottom = surface.get(x, y + 1).filter(|p| !p.is_transparent());

                let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) else {
                    continue;
                };
                match (top, bottom) {
                    (Some(t), Some(b)) => {
                        cell.set_symbol(UPPER_HALF).set_fg(to_color(t)).set_bg(to_color(b));
                    }
                    (Some(t), None) => {
                        cell.set_symbol(UPPER_HALF).set_fg(to_color(t));
                    }
                    (None, Some(b)) => {
                        cell.set_symbol(LOWER_HALF).set_fg(to_color(b));
                    }
                    (None, None) => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Surface;

    #[test]
    fn packs_two_pixels_per_cell() {
        let mut surface = Surface::new(3, 4);
        surface.blend(0, 0, Rgba::WHITE);
        surface.blend(0, 1, Rgba::rgb(255, 0, 0));
        surface.blend(1, 3, Rgba::rgb(0, 0, 255));

        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        SurfaceWidget::new(&surface).render(area, &mut buf);

        let both = &buf[(0, 0)];
        assert_eq!(both.symbol(), UPPER_HALF);
        assert_eq!(both.fg, Color::Rgb(255, 255, 255));
        assert_eq!(both.bg, Color::Rgb(255, 0, 0));

        let lower = &buf[(1, 1)];
        assert_eq!(lower.symbol(), LOWER_HALF);
        assert_eq!(lower.fg, Color::Rgb(0, 0, 255));

        assert_eq!(buf[(2, 0)].symbol(), " ");
    }

    #[test]
    fn clips_to_the_smaller_of_area_and_surface() {
        let mut surface = Surface::new(10, 10);
        surface.blend(9, 9, Rgba::WHITE);

        let area = Rect::new(2, 1, 4, 2);
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 4));
        SurfaceWidget::new(&surface).render(area, &mut buf);
        assert!(buf.content().iter().all(|c| c.symbol() == " "));
    }

    #[test]
    fn alpha_darkens_towards_black() {
        assert_eq!(to_color(Rgba::new(255, 255, 255, 0)), Color::Rgb(0, 0, 0));
        assert_eq!(to_color(Rgba::new(200, 100, 0, 255)), Color::Rgb(200, 100, 0));
    }
}
