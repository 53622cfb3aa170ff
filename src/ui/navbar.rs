//! Sticky navbar: the logo slot the floating logo docks into, and the link
//! row that collapses once the hero scrolls away.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::app::page::CELL_WIDTH;
use crate::ui::theme::Theme;

pub const NAV_LINKS: &str = "Work · Services · Studio · Contact";
pub const LOGO_TEXT: &str = "◆ CHOREO";

/// Column the logo slot starts at (matches the page's anchor rectangle).
const LOGO_COL: u16 = 2;

pub struct Navbar {
    pub theme: Theme,
    /// The navbar's own logo is shown only once the handshake completes.
    pub show_logo: bool,
    /// Current max-width of the link row in virtual pixels.
    pub links_width: f64,
    pub links_opacity: f64,
}

impl Widget for Navbar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.theme.border_style())
            .style(self.theme.nav_style())
            .render(area, buf);

        let mid = area.y + area.height.saturating_sub(1) / 2;
        if self.show_logo && area.width > LOGO_COL + 1 {
            let line = Line::from(Span::styled(LOGO_TEXT, self.theme.logo_style()));
            buf.set_line(area.x + LOGO_COL, mid, &line, area.width - LOGO_COL);
        }

        // Links are clipped from the left as max-width shrinks, so they
        // appear to slide out toward the right edge.
        let visible = (self.links_width / CELL_WIDTH).floor().max(0.0) as usize;
        if visible == 0 || self.links_opacity <= 0.0 {
            return;
        }
        let total = NAV_LINKS.chars().count();
        let shown: String = NAV_LINKS.chars().skip(total.saturating_sub(visible)).collect();
        let width = shown.chars().count() as u16;
        if width + 2 > area.width {
            return;
        }
        let x = area.x + area.width - width - 2;
        let line = Line::from(Span::styled(
            shown,
            self.theme.faded_style(self.links_opacity),
        ));
        buf.set_line(x, mid, &line, width);
    }
}
