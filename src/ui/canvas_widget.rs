//! Paints a retained [`DrawList`] with ratatui's braille canvas.
//!
//! The draw list is in section-local pixels with `y` growing downward;
//! ratatui's canvas grows upward, so `y` is flipped on the way in.  Only the
//! on-screen slice of the section is painted.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line, Points},
        Widget,
    },
};

use scroll_choreo::core::canvas::{DrawCmd, DrawList};
use scroll_choreo::core::canvas::field::Fill;
use scroll_choreo::core::geometry;

use crate::ui::layout::to_cells;
use crate::ui::theme::Theme;

/// Glow discs at or above this radius are drawn as rings, smaller ones as dots.
const RING_RADIUS: f64 = 6.0;

pub struct SignalCanvas<'a> {
    pub list: Option<&'a DrawList>,
    /// Section rectangle in viewport pixels (may extend off screen).
    pub section: geometry::Rect,
    /// Viewport height in pixels.
    pub viewport_height: f64,
    pub theme: Theme,
}

impl Widget for SignalCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(list) = self.list else {
            return;
        };
        let top = (-self.section.y).max(0.0);
        let bottom = (self.viewport_height - self.section.y).min(self.section.height);
        if bottom <= top {
            return;
        }
        let visible = geometry::Rect::new(
            self.section.x,
            self.section.y + top,
            self.section.width,
            bottom - top,
        );
        let Some(cells) = to_cells(visible, area) else {
            return;
        };

        let height = self.section.height;
        let theme = self.theme;
        Canvas::default()
            .marker(Marker::Braille)
            .background_color(theme.color(theme.background()))
            .x_bounds([0.0, self.section.width])
            .y_bounds([height - bottom, height - top])
            .paint(|ctx| paint(ctx, list, height, theme))
            .render(cells, buf);
    }
}

fn paint(ctx: &mut Context<'_>, list: &DrawList, height: f64, theme: Theme) {
    let flip = |p: &geometry::Point| (p.x, height - p.y);
    for cmd in &list.commands {
        match cmd {
            DrawCmd::Clear => {}
            DrawCmd::Stroke { points, color, .. } => {
                let color = theme.blend(*color);
                for pair in points.windows(2) {
                    let (x1, y1) = flip(&pair[0]);
                    let (x2, y2) = flip(&pair[1]);
                    ctx.draw(&Line::new(x1, y1, x2, y2, color));
                }
            }
            DrawCmd::Trail { points, color, .. } => {
                let segments = points.len().saturating_sub(1).max(1) as f64;
                for (i, pair) in points.windows(2).enumerate() {
                    let fade = (i + 1) as f64 / segments;
                    let color = theme.blend(color.with_alpha(color.a * fade));
                    let (x1, y1) = flip(&pair[0]);
                    let (x2, y2) = flip(&pair[1]);
                    ctx.draw(&Line::new(x1, y1, x2, y2, color));
                }
            }
            DrawCmd::Disc {
                center,
                radius,
                fill,
            } => {
                let rgba = match fill {
                    Fill::Solid(c) => *c,
                    Fill::Radial { inner, .. } => *inner,
                };
                let color = theme.blend(rgba);
                let (x, y) = flip(center);
                if *radius >= RING_RADIUS {
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: *radius,
                        color,
                    });
                } else {
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color,
                    });
                }
            }
        }
    }
}
