//! Input handling: maps key/mouse events to scroll and preference changes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::config::Action;

use super::state::ShowcaseState;

/// Process a key event.
pub fn handle_key(state: &mut ShowcaseState, key: KeyEvent) {
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    // A keypress clears the last transient message.
    state.status_message = None;

    let step = state.config.scroll_step;
    match action {
        Action::ScrollUp => state.scroll_by(-step),
        Action::ScrollDown => state.scroll_by(step),
        Action::PageUp => state.scroll_by(-state.page_step()),
        Action::PageDown => state.scroll_by(state.page_step()),
        Action::Top => state.scroll_to(0.0),
        Action::Bottom => state.scroll_to(state.page.max_scroll()),
        Action::ToggleMotion => state.toggle_motion(),
        Action::ToggleTheme => state.toggle_theme(),
        Action::Quit => state.should_quit = true,
    }
}

/// Mouse wheel scrolls; everything else is ignored.
pub fn handle_mouse(state: &mut ShowcaseState, mouse: MouseEvent) {
    let step = state.config.scroll_step;
    match mouse.kind {
        MouseEventKind::ScrollDown => state.scroll_by(step),
        MouseEventKind::ScrollUp => state.scroll_by(-step),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use rstest::rstest;
    use scroll_choreo::core::context::{ColorScheme, Environment};

    use crate::app::page::viewport_for_cells;
    use crate::config::AppConfig;

    fn state() -> ShowcaseState {
        let env = Environment::new(ColorScheme::Dark, true, false);
        let mut state = ShowcaseState::new(AppConfig::default(), env, viewport_for_cells(100, 30))
            .expect("state");
        state.mount(Duration::ZERO);
        state
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn wheel(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[rstest]
    #[case(KeyCode::Down, 48.0)]
    #[case(KeyCode::Char('j'), 48.0)]
    #[case(KeyCode::Up, 0.0)]
    fn arrow_keys_scroll_by_step(#[case] code: KeyCode, #[case] expected: f64) {
        let mut state = state();
        handle_key(&mut state, press(code));
        assert_eq!(state.scroll, expected);
    }

    #[test]
    fn end_and_home_jump() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::End));
        assert_eq!(state.scroll, state.page.max_scroll());
        handle_key(&mut state, press(KeyCode::Home));
        assert_eq!(state.scroll, 0.0);
    }

    #[test]
    fn wheel_scrolls() {
        let mut state = state();
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollDown));
        handle_mouse(&mut state, wheel(MouseEventKind::ScrollUp));
        assert_eq!(state.scroll, 48.0);
    }

    #[test]
    fn toggles_flip_preferences() {
        let mut state = state();
        handle_key(&mut state, press(KeyCode::Char('t')));
        assert_eq!(state.env.theme.get(), ColorScheme::Light);
        handle_key(&mut state, press(KeyCode::Char('m')));
        assert!(!state.env.reduced_motion.get());
    }

    #[test]
    fn ctrl_c_quits() {
        let mut state = state();
        handle_key(&mut state, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(state.should_quit);
    }
}
