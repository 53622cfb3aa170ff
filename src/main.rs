//! Terminal showcase for the scroll choreography engine.
//!
//! Scroll a virtual page with the keyboard or mouse wheel and watch the
//! logo dock into the navbar, the nav links collapse and the canvas
//! sections run their signal fields.

mod app;
mod config;
mod ui;

use std::io::{self, stderr, Stderr};
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Terminal};
use tokio::time::MissedTickBehavior;
use tracing::info;

use scroll_choreo::core::canvas::WrapPolicy;
use scroll_choreo::core::context::Environment;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    page::viewport_for_cells,
    preloader::PreloadPhase,
    state::ShowcaseState,
};
use crate::config::{AppConfig, ThemePreference};
use crate::ui::{
    layout::AppLayout, navbar::Navbar, page_view::PageView, spinner::PreloadOverlay,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    about = "Scroll-driven animation choreography showcase"
)]
struct Cli {
    /// Render every canvas once and skip the intro and transitions.
    #[arg(long)]
    reduced_motion: bool,

    /// Colour scheme; `system` reads the terminal background.
    #[arg(long, value_enum)]
    theme: Option<ThemePreference>,

    /// Canvas path/signal density multiplier.
    #[arg(long)]
    density: Option<f64>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Page progress at which the logo docks.
    #[arg(long)]
    dock_threshold: Option<f64>,

    /// Wrap policy of the neural canvas.
    #[arg(long, value_enum)]
    wrap: Option<WrapArg>,

    /// Treat the pointer as coarse (touch); halves canvas density.
    #[arg(long)]
    coarse_pointer: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long)]
    write_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WrapArg {
    InPlace,
    Reassign,
}

impl From<WrapArg> for WrapPolicy {
    fn from(arg: WrapArg) -> Self {
        match arg {
            WrapArg::InPlace => WrapPolicy::InPlace,
            WrapArg::Reassign => WrapPolicy::Reassign,
        }
    }
}

/// Command-line flags win over the config file.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if cli.reduced_motion {
        config.reduced_motion = true;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(density) = cli.density.filter(|d| d.is_finite()) {
        config.signal_density = density.clamp(0.1, 4.0);
    }
    if let Some(fps) = cli.fps {
        config.fps = fps.clamp(5, 120);
    }
    if let Some(threshold) = cli.dock_threshold.filter(|t| t.is_finite()) {
        config.dock_threshold = threshold.clamp(0.01, 0.95);
    }
    if let Some(wrap) = cli.wrap {
        config.neural_wrap = wrap.into();
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing (only when RUST_LOG is set).
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load();
    apply_overrides(&mut config, &cli);

    if cli.write_config {
        config.save()?;
        return Ok(());
    }

    let colorfgbg = std::env::var("COLORFGBG").ok();
    let env = Environment::new(
        config.theme.resolve(colorfgbg.as_deref()),
        config.reduced_motion,
        cli.coarse_pointer,
    );
    let fps = config.fps;

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let viewport = viewport_for_cells(size.width, size.height.saturating_sub(1));
    let mut state = ShowcaseState::new(config, env, viewport)?;

    let result = run(&mut terminal, &mut state, fps).await;

    // ── teardown ──────────────────────────────────────────────
    state.unmount();
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    info!(
        listeners = state.listener_count(),
        frames = state.pending_frames(),
        "showcase closed"
    );

    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    state: &mut ShowcaseState,
    fps: u32,
) -> Result<()> {
    let start = Instant::now();
    state.mount(start.elapsed());

    let mut events = spawn_event_reader(Duration::from_millis(50));
    let mut frame_clock = tokio::time::interval(Duration::from_secs(1) / fps.max(1));
    frame_clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: u64 = 0;

    loop {
        terminal.draw(|frame| {
            let layout = AppLayout::from_area(frame.area());
            let theme = state.theme();

            frame.render_widget(PageView { state: &*state }, layout.page_area);
            frame.render_widget(
                Navbar {
                    theme,
                    show_logo: state.nav_logo_visible,
                    links_width: state.nav_width.value(),
                    links_opacity: state.nav_opacity.value(),
                },
                layout.nav_area,
            );
            frame.render_widget(
                PreloadOverlay {
                    visible: state.preloader.phase() == PreloadPhase::Intro,
                    tick,
                    theme,
                },
                layout.page_area,
            );

            let hint = state.config.status_bar_hint();
            let message = state.status_message.as_deref().unwrap_or(&hint);
            let status = format!(
                " {message}  │ {:>3.0}% │ {:?} │ {} ",
                state.progress * 100.0,
                state.coordinator.phase(),
                state.preloader.phase().label(),
            );
            frame.render_widget(
                Paragraph::new(status).style(theme.status_bar_style()),
                layout.status_area,
            );
        })?;

        tokio::select! {
            biased;

            Some(event) = events.recv() => {
                match event {
                    AppEvent::Key(k) => handler::handle_key(state, k),
                    AppEvent::Mouse(m) => handler::handle_mouse(state, m),
                    AppEvent::Resize(w, h) => {
                        state.resize(viewport_for_cells(w, h.saturating_sub(1)));
                    }
                }
            }

            _ = frame_clock.tick() => {
                state.frame(start.elapsed());
                tick = tick.wrapping_add(1);
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}
