//! Showcase configuration: choreography tuning, keybindings and persistence.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/scroll-choreo/config.toml`
//! (default `~/.config/scroll-choreo/config.toml`).  Command-line flags
//! override whatever the file says.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use scroll_choreo::core::canvas::WrapPolicy;
use scroll_choreo::core::context::ColorScheme;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the showcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    ToggleMotion,
    ToggleTheme,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when writing the config file).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::Bottom,
        Action::ToggleMotion,
        Action::ToggleTheme,
        Action::Quit,
    ];

    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::ToggleMotion => "toggle_motion",
            Action::ToggleTheme => "toggle_theme",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code
            && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Short label for the status bar (e.g. `"↓"`, `"Ctrl+c"`).
    pub fn display(&self) -> String {
        let key = match self.code {
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            other => key_name(other),
        };
        format!("{}{key}", modifier_prefix(self.modifiers))
    }

    fn to_config_string(&self) -> String {
        format!("{}{}", modifier_prefix(self.modifiers), key_name(self.code))
    }

    /// Parse `"Ctrl+c"`, `"PageDown"`, `"j"` and friends.
    fn parse(s: &str) -> Option<Self> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key_part = parts.pop()?;
        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            s if s.starts_with('f') && s.len() > 1 => KeyCode::F(s[1..].parse().ok()?),
            // Single characters keep their case: `G` and `g` differ.
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── theme ─────────────

/// Theme choice as written by the user.  `System` defers to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemePreference {
    #[default]
    System,
    Dark,
    Light,
}

impl ThemePreference {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_matches('"').to_lowercase().as_str() {
            "system" => Some(Self::System),
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Resolve `System` from `COLORFGBG` (`"fg;bg"`); light backgrounds are
    /// palette slots 7 and 15.
    pub fn resolve(self, colorfgbg: Option<&str>) -> ColorScheme {
        match self {
            Self::Dark => ColorScheme::Dark,
            Self::Light => ColorScheme::Light,
            Self::System => match colorfgbg
                .and_then(|v| v.rsplit(';').next())
                .and_then(|bg| bg.parse::<u8>().ok())
            {
                Some(7 | 15) => ColorScheme::Light,
                _ => ColorScheme::Dark,
            },
        }
    }
}

// ───────────────────────────────────────── config ────────────

/// Showcase configuration: choreography tuning plus keybindings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Page progress at which the floating logo docks.
    pub dock_threshold: f64,
    /// Undock margin below the threshold.
    pub dock_hysteresis: f64,
    /// Multiplier on the canvas path/signal counts.
    pub signal_density: f64,
    pub reduced_motion: bool,
    pub theme: ThemePreference,
    /// Frame rate of the render loop.
    pub fps: u32,
    /// Virtual pixels moved per scroll step.
    pub scroll_step: f64,
    /// What a neural-section signal does when it reaches the end of its path.
    pub neural_wrap: WrapPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            dock_threshold: 0.15,
            dock_hysteresis: 0.01,
            signal_density: 1.0,
            reduced_motion: false,
            theme: ThemePreference::System,
            fps: 30,
            scroll_step: 48.0,
            neural_wrap: WrapPolicy::Reassign,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        let n = KeyModifiers::NONE;
        let shift = KeyModifiers::SHIFT;
        let key = |code| KeyBind::new(code, n);
        let ch = |c| KeyBind::new(KeyCode::Char(c), n);
        let mut m = HashMap::new();

        m.insert(Action::ScrollUp, vec![key(KeyCode::Up), ch('k')]);
        m.insert(Action::ScrollDown, vec![key(KeyCode::Down), ch('j')]);
        m.insert(Action::PageUp, vec![key(KeyCode::PageUp)]);
        m.insert(Action::PageDown, vec![key(KeyCode::PageDown), ch(' ')]);
        m.insert(Action::Top, vec![key(KeyCode::Home), ch('g')]);
        m.insert(
            Action::Bottom,
            vec![key(KeyCode::End), KeyBind::new(KeyCode::Char('G'), shift)],
        );
        m.insert(Action::ToggleMotion, vec![ch('m')]);
        m.insert(Action::ToggleTheme, vec![ch('t')]);
        m.insert(Action::Quit, vec![ch('q'), key(KeyCode::Esc)]);

        m
    }

    /// Find the action bound to a key event; the binding with the most
    /// modifiers wins a tie.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, bind)| bind.matches(event))
            .max_by_key(|(_, bind)| bind.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: page | {}: motion | {}: theme | {}: quit",
            self.short_binding(Action::ScrollUp),
            self.short_binding(Action::ScrollDown),
            self.short_binding(Action::PageDown),
            self.short_binding(Action::ToggleMotion),
            self.short_binding(Action::ToggleTheme),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                warn!(%err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "dock_threshold" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.dock_threshold = v.clamp(0.01, 0.95);
                    }
                    continue;
                }
                "dock_hysteresis" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.dock_hysteresis = v.clamp(0.0, 0.1);
                    }
                    continue;
                }
                "signal_density" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.signal_density = v.clamp(0.1, 4.0);
                    }
                    continue;
                }
                "reduced_motion" => {
                    config.reduced_motion = value == "true";
                    continue;
                }
                "theme" => {
                    if let Some(theme) = ThemePreference::parse(value) {
                        config.theme = theme;
                    }
                    continue;
                }
                "fps" => {
                    if let Ok(v) = value.parse::<u32>() {
                        config.fps = v.clamp(5, 120);
                    }
                    continue;
                }
                "scroll_step" => {
                    if let Ok(v) = value.parse::<f64>() {
                        config.scroll_step = v.clamp(4.0, 400.0);
                    }
                    continue;
                }
                "neural_wrap" => {
                    if let Some(policy) = parse_wrap(value) {
                        config.neural_wrap = policy;
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                continue;
            };
            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# scroll-choreo configuration".to_string(),
            String::new(),
            "# Choreography".to_string(),
            format!("dock_threshold = {}", self.dock_threshold),
            format!("dock_hysteresis = {}", self.dock_hysteresis),
            format!("signal_density = {}", self.signal_density),
            format!("reduced_motion = {}", self.reduced_motion),
            format!("theme = {}", self.theme.as_str()),
            format!("fps = {}", self.fps),
            format!("scroll_step = {}", self.scroll_step),
            format!("neural_wrap = {}", wrap_name(self.neural_wrap)),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

fn parse_wrap(s: &str) -> Option<WrapPolicy> {
    match s.trim().trim_matches('"') {
        "in-place" | "in_place" => Some(WrapPolicy::InPlace),
        "reassign" => Some(WrapPolicy::Reassign),
        _ => None,
    }
}

fn wrap_name(policy: WrapPolicy) -> &'static str {
    match policy {
        WrapPolicy::InPlace => "in-place",
        WrapPolicy::Reassign => "reassign",
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/scroll-choreo/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("scroll-choreo").join("config.toml")
}
