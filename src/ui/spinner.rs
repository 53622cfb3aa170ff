//! Preloader overlay: a spinner and label centred over the page while the
//! intro phase runs.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Widget},
};

use crate::ui::theme::Theme;

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct PreloadOverlay {
    pub visible: bool,
    /// Monotonically increasing frame counter (drives the spinner frame).
    pub tick: u64,
    pub theme: Theme,
}

impl Widget for PreloadOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.visible || area.width < 12 || area.height == 0 {
            return;
        }
        Clear.render(area, buf);
        buf.set_style(area, self.theme.page_style());

        let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        let label = format!("{frame}  loading");
        let width = label.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height / 2;
        let line = Line::from(Span::styled(label, self.theme.spinner_style()));
        buf.set_line(x, y, &line, width);
    }
}
