//! Colour palette and text styles used across the UI.
//!
//! Terminals have no alpha channel, so translucent colours are blended
//! against the page background before they reach ratatui.

use ratatui::style::{Color, Modifier, Style};

use scroll_choreo::core::canvas::FieldPalette;
use scroll_choreo::core::context::ColorScheme;
use scroll_choreo::core::keyframe::{Interpolate, Rgba};

/// Central theme: change colours here and they propagate everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub scheme: ColorScheme,
}

impl Theme {
    pub fn new(scheme: ColorScheme) -> Self {
        Self { scheme }
    }

    pub fn background(self) -> Rgba {
        match self.scheme {
            ColorScheme::Dark => Rgba::rgb(12, 14, 20),
            ColorScheme::Light => Rgba::rgb(246, 244, 238),
        }
    }

    pub fn foreground(self) -> Rgba {
        match self.scheme {
            ColorScheme::Dark => Rgba::rgb(226, 230, 238),
            ColorScheme::Light => Rgba::rgb(28, 30, 36),
        }
    }

    pub fn accent(self) -> Rgba {
        match self.scheme {
            ColorScheme::Dark => Rgba::rgb(120, 220, 255),
            ColorScheme::Light => Rgba::rgb(0, 110, 170),
        }
    }

    /// Flatten `color` (with its alpha) onto the background.
    pub fn blend(self, color: Rgba) -> Color {
        let bg = self.background();
        let (r, g, b) = Interpolate::lerp(&bg, &color.with_alpha(1.0), color.a).to_rgb8();
        Color::Rgb(r, g, b)
    }

    pub fn color(self, color: Rgba) -> Color {
        let (r, g, b) = color.to_rgb8();
        Color::Rgb(r, g, b)
    }

    // ── page ───────────────────────────────────────────────────
    pub fn page_style(self) -> Style {
        Style::default()
            .bg(self.color(self.background()))
            .fg(self.color(self.foreground()))
    }

    /// Text faded toward the background by `opacity`.
    pub fn faded_style(self, opacity: f64) -> Style {
        Style::default().fg(self.blend(self.foreground().with_alpha(opacity)))
    }

    pub fn headline_style(self, opacity: f64) -> Style {
        self.faded_style(opacity).add_modifier(Modifier::BOLD)
    }

    pub fn accent_style(self) -> Style {
        Style::default().fg(self.color(self.accent()))
    }

    pub fn logo_style(self) -> Style {
        self.accent_style().add_modifier(Modifier::BOLD)
    }

    /// Palettes for the two canvas sections.
    pub fn field_palette(self, neural: bool) -> FieldPalette {
        let (path, signal, glow) = match (self.scheme, neural) {
            (ColorScheme::Dark, false) => (
                Rgba::rgb(70, 90, 110).with_alpha(0.5),
                Rgba::rgb(120, 255, 200),
                Rgba::rgb(120, 255, 200).with_alpha(0.3),
            ),
            (ColorScheme::Dark, true) => (
                Rgba::rgb(90, 80, 130).with_alpha(0.5),
                Rgba::rgb(200, 160, 255),
                Rgba::rgb(255, 200, 120).with_alpha(0.6),
            ),
            (ColorScheme::Light, false) => (
                Rgba::rgb(150, 160, 170).with_alpha(0.6),
                Rgba::rgb(0, 140, 110),
                Rgba::rgb(0, 140, 110).with_alpha(0.3),
            ),
            (ColorScheme::Light, true) => (
                Rgba::rgb(170, 160, 200).with_alpha(0.6),
                Rgba::rgb(110, 60, 190),
                Rgba::rgb(220, 130, 30).with_alpha(0.5),
            ),
        };
        FieldPalette { path, signal, glow }
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn nav_style(self) -> Style {
        let bg = match self.scheme {
            ColorScheme::Dark => Rgba::rgb(20, 24, 32),
            ColorScheme::Light => Rgba::rgb(232, 229, 220),
        };
        Style::default()
            .bg(self.color(bg))
            .fg(self.color(self.foreground()))
    }

    pub fn border_style(self) -> Style {
        self.faded_style(0.35)
    }

    pub fn status_bar_style(self) -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }

    pub fn spinner_style(self) -> Style {
        self.accent_style().add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_alpha_blends_to_background() {
        let theme = Theme::new(ColorScheme::Dark);
        assert_eq!(theme.blend(Rgba::rgb(255, 255, 255).with_alpha(0.0)), Color::Rgb(12, 14, 20));
        assert_eq!(theme.blend(Rgba::rgb(255, 255, 255)), Color::Rgb(255, 255, 255));
    }
}
