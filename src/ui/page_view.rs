//! The scrolling page: hero, the two canvas sections, contact, and the
//! floating logo on top of all of them.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use scroll_choreo::core::canvas::WrapPolicy;
use scroll_choreo::core::geometry;

use crate::app::page::{SectionKind, CELL_HEIGHT, CELL_WIDTH};
use crate::app::state::ShowcaseState;
use crate::ui::canvas_widget::SignalCanvas;
use crate::ui::layout::{row_at, to_cells};
use crate::ui::navbar::LOGO_TEXT;

const HEADLINE: &str = "Motion that follows your scroll.";
const SUBTITLE: &str = "Keyframes, docking handshakes and living canvases.";

pub struct PageView<'a> {
    pub state: &'a ShowcaseState,
}

impl Widget for PageView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let theme = state.theme();
        buf.set_style(area, theme.page_style());

        self.render_hero(area, buf);
        for (kind, title) in [
            (SectionKind::Circuits, "Circuits"),
            (SectionKind::Neural, "Neural"),
        ] {
            self.render_canvas_section(kind, title, area, buf);
        }
        self.render_contact(area, buf);
        self.render_logo(area, buf);
    }
}

impl PageView<'_> {
    fn render_hero(&self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let theme = state.theme();
        let hero = state.page.on_screen(SectionKind::Hero, state.scroll);
        let opacity = state.hero_frame.get("opacity").copied().unwrap_or(1.0);
        let lift = state.hero_frame.get("lift").copied().unwrap_or(0.0) * hero.height;
        if opacity <= 0.0 {
            return;
        }

        let total = HEADLINE.chars().count();
        let shown = ((total as f64) * state.reveal).ceil() as usize;
        let headline: String = HEADLINE.chars().take(shown).collect();
        let width = total as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = hero.y + hero.height * 0.62 - lift;

        if let Some(row) = row_at(y, area) {
            let line = Line::from(Span::styled(headline, theme.headline_style(opacity)));
            buf.set_line(x, row, &line, width.min(area.width));
        }
        if let Some(row) = row_at(y + CELL_HEIGHT, area) {
            // Underline width is a percentage of the headline.
            let percent = state
                .underline_frame
                .get("width")
                .map_or(100.0, |len| len.value);
            let cells = ((f64::from(width) * percent / 100.0).round() as usize).min(total);
            let line = Line::from(Span::styled("━".repeat(cells), theme.accent_style()));
            buf.set_line(x, row, &line, width.min(area.width));
        }
        if let Some(row) = row_at(y + 3.0 * CELL_HEIGHT, area) {
            let sub_width = SUBTITLE.chars().count() as u16;
            let sx = area.x + area.width.saturating_sub(sub_width) / 2;
            let line = Line::from(Span::styled(SUBTITLE, theme.faded_style(opacity * 0.7)));
            buf.set_line(sx, row, &line, sub_width.min(area.width));
        }
    }

    fn render_canvas_section(&self, kind: SectionKind, title: &str, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let theme = state.theme();
        let section = state.page.on_screen(kind, state.scroll);
        let animator = match kind {
            SectionKind::Neural => &state.neural,
            _ => &state.circuits,
        };

        SignalCanvas {
            list: animator.surface().and_then(|s| s.last.as_ref()),
            section,
            viewport_height: state.page.viewport().size.height,
            theme,
        }
        .render(area, buf);

        let Some(row) = row_at(section.y + 4.0 * CELL_HEIGHT, area) else {
            return;
        };
        let heading_style = match kind {
            SectionKind::Neural => state
                .heading_frame
                .get("color")
                .map_or(theme.accent_style(), |c| Style::default().fg(theme.color(*c))),
            _ => theme.accent_style(),
        }
        .add_modifier(Modifier::BOLD);
        let policy = animator
            .field()
            .map(|f| match f.policy() {
                WrapPolicy::InPlace => "wrap in place",
                WrapPolicy::Reassign => "reassign on wrap",
            })
            .unwrap_or("no surface");
        let signals = animator.field().map_or(0, |f| f.signals().len());
        let line = Line::from(vec![
            Span::styled(format!(" {title} "), heading_style),
            Span::styled(
                format!(" {signals} signals · {policy} "),
                theme.faded_style(0.6),
            ),
        ]);
        buf.set_line(area.x + 4, row, &line, area.width.saturating_sub(4));
    }

    fn render_contact(&self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let theme = state.theme();
        let contact = state.page.on_screen(SectionKind::Contact, state.scroll);
        let Some(cells) = to_cells(contact, area) else {
            return;
        };
        let text = vec![
            Line::default(),
            Line::from(Span::styled("Let's build something.", theme.headline_style(1.0))),
            Line::from(Span::styled("hello@studio.example", theme.accent_style())),
        ];
        Paragraph::new(text)
            .centered()
            .block(Block::default().borders(Borders::TOP).border_style(theme.border_style()))
            .render(cells, buf);
    }

    fn render_logo(&self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let pose = state.logo;
        if pose.opacity <= 0.0 {
            return;
        }
        let theme = state.theme();
        let rect: geometry::Rect = pose.rect(state.coordinator.config().logo_size);
        let Some(cells) = to_cells(rect, area) else {
            return;
        };
        let style = theme.logo_style();
        if cells.height >= 3 && rect.width >= (LOGO_TEXT.chars().count() as f64 + 2.0) * CELL_WIDTH {
            let inner_rows = cells.height.saturating_sub(2);
            let mut text: Vec<Line> = (0..inner_rows / 2).map(|_| Line::default()).collect();
            text.push(Line::from(Span::styled(LOGO_TEXT, style)));
            Paragraph::new(text)
                .centered()
                .block(Block::default().borders(Borders::ALL).border_style(style))
                .render(cells, buf);
        } else {
            let line = Line::from(Span::styled(LOGO_TEXT, style));
            buf.set_line(cells.x, cells.y, &line, cells.width.max(1));
        }
    }
}
