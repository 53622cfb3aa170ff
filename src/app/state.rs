//! Central showcase state.
//!
//! Owns every engine component the page uses and runs them in a fixed
//! per-frame order:
//!
//! 1. timers (debounced scroll-settle, preloader phases)
//! 2. due animation frames (canvas animators)
//! 3. coordinator tick (deferred measurement, settle)
//! 4. scroll timelines, docking sample and collapse observation
//!
//! Rendering then reads the results as plain data.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, trace};

use scroll_choreo::core::canvas::animator::AnimatorConfig;
use scroll_choreo::core::canvas::{
    CanvasAnimator, CircuitTraces, Motion, NeuralPaths, RetainedSurface, WrapPolicy,
};
use scroll_choreo::core::collapse::{CollapseTrigger, RootMargin};
use scroll_choreo::core::context::{ColorScheme, Environment, Subscriber};
use scroll_choreo::core::docking::{DockPhase, DockingConfig, DockingCoordinator, LogoPose};
use scroll_choreo::core::geometry::Viewport;
use scroll_choreo::core::host::{ListenerId, ListenerKind, ListenerRegistry, OwnerId};
use scroll_choreo::core::keyframe::{KeyframeTrack, Length, Rgba};
use scroll_choreo::core::schedule::{FrameScheduler, LoopId, TimerHandle, TimerQueue};
use scroll_choreo::core::scroll::{Boundary, ScrollRegion, ScrollTimeline, TimelineFrame};

use super::page::{PageLayout, SectionKind, CELL_HEIGHT, CELL_WIDTH, NAV_ROWS};
use super::preloader::{PreloadPhase, Preloader};
use crate::config::AppConfig;
use crate::ui::navbar::NAV_LINKS;
use crate::ui::theme::Theme;
use crate::ui::transition::Transition;

const COORDINATOR: OwnerId = OwnerId(1);
const COLLAPSE: OwnerId = OwnerId(2);
const CIRCUITS: OwnerId = OwnerId(3);
const NEURAL: OwnerId = OwnerId(4);
const PREFERENCES: OwnerId = OwnerId(5);

const CIRCUITS_LOOP: LoopId = LoopId(1);
const NEURAL_LOOP: LoopId = LoopId(2);

/// Quiet period after the last scroll event before the anchor is re-measured.
const SCROLL_SETTLE: Duration = Duration::from_millis(150);

/// Work deferred through the timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    ScrollSettled,
}

/// Top-level showcase state.
pub struct ShowcaseState {
    pub config: AppConfig,
    pub env: Environment,
    pub page: PageLayout,
    pub scroll: f64,

    pub coordinator: DockingCoordinator,
    pub circuits: CanvasAnimator<RetainedSurface>,
    pub neural: CanvasAnimator<RetainedSurface>,
    pub collapse: CollapseTrigger,
    pub preloader: Preloader,

    frames: FrameScheduler,
    timers: TimerQueue<Deferred>,
    settle_timer: Option<TimerHandle>,
    listeners: ListenerRegistry,
    registrations: Vec<ListenerId>,

    handshake: Option<Subscriber<bool>>,
    theme_watch: Subscriber<ColorScheme>,
    motion_watch: Subscriber<bool>,
    pointer_watch: Subscriber<bool>,

    hero: ScrollTimeline<f64>,
    underline: ScrollTimeline<Length>,
    neural_heading: ScrollTimeline<Rgba>,

    // ── per-frame results read by the renderer ─────────────────
    pub clock: Duration,
    pub progress: f64,
    pub logo: LogoPose,
    pub nav_logo_visible: bool,
    pub hero_frame: TimelineFrame<f64>,
    pub underline_frame: TimelineFrame<Length>,
    pub heading_frame: TimelineFrame<Rgba>,
    pub nav_width: Transition,
    pub nav_opacity: Transition,
    pub reveal: f64,

    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl ShowcaseState {
    pub fn new(config: AppConfig, env: Environment, viewport: Viewport) -> Result<Self> {
        let page = PageLayout::new(viewport);
        let docking = DockingConfig {
            threshold: config.dock_threshold,
            hysteresis: config.dock_hysteresis,
            ..DockingConfig::default()
        };
        let coordinator = DockingCoordinator::new(docking, viewport);
        let logo = coordinator.pose(0.0);

        let theme = Theme::new(env.theme.get());
        let animator_config = |policy, neural, seed| AnimatorConfig {
            density: config.signal_density,
            policy,
            palette: theme.field_palette(neural),
            seed,
            ..AnimatorConfig::default()
        };
        let circuits = CanvasAnimator::new(
            CIRCUITS_LOOP,
            CIRCUITS,
            Box::new(CircuitTraces::default()),
            animator_config(WrapPolicy::InPlace, false, 0xc1c1),
            Some(RetainedSurface::default()),
        );
        let neural = CanvasAnimator::new(
            NEURAL_LOOP,
            NEURAL,
            Box::new(NeuralPaths::default()),
            animator_config(config.neural_wrap, true, 0x4e75),
            Some(RetainedSurface::default()),
        );

        let expanded = nav_links_width();
        let collapse = CollapseTrigger::new(
            0.25,
            RootMargin::vertical(-f64::from(NAV_ROWS) * CELL_HEIGHT, 0.0),
            expanded,
        );

        // Hero fades and lifts as its bottom edge travels to the top.
        let mut hero = ScrollTimeline::new(ScrollRegion::new(
            Boundary::START_START,
            Boundary::END_START,
        ));
        hero.bind("opacity", KeyframeTrack::new([(0.0, 1.0), (0.6, 0.0)])?)
            .bind("lift", KeyframeTrack::new([(0.0, 0.0), (1.0, 0.35)])?);

        let mut underline = ScrollTimeline::new(ScrollRegion::page());
        underline.bind(
            "width",
            KeyframeTrack::<Length>::parse(&[(0.0, "100%"), (0.25, "10%")])?,
        );

        // Heading colour sweeps while the neural section crosses the viewport.
        let mut neural_heading = ScrollTimeline::new(ScrollRegion::new(
            Boundary::START_END,
            Boundary::END_START,
        ));
        neural_heading.bind(
            "color",
            KeyframeTrack::new([
                (0.0, "#7f8ca0".parse::<Rgba>()?),
                (0.5, "#c8a0ff".parse::<Rgba>()?),
                (1.0, "#ffc878".parse::<Rgba>()?),
            ])?,
        );

        let geometry = page.page_geometry(0.0);
        let hero_frame = hero.sample(&page.section_geometry(SectionKind::Hero, 0.0));
        let underline_frame = underline.sample(&geometry);
        let heading_frame = neural_heading.sample(&page.section_geometry(SectionKind::Neural, 0.0));
        let theme_watch = env.theme.subscribe();
        let motion_watch = env.reduced_motion.subscribe();
        let pointer_watch = env.coarse_pointer.subscribe();

        Ok(Self {
            config,
            env,
            page,
            scroll: 0.0,
            coordinator,
            circuits,
            neural,
            collapse,
            preloader: Preloader::new(),
            frames: FrameScheduler::new(),
            timers: TimerQueue::new(),
            settle_timer: None,
            listeners: ListenerRegistry::new(),
            registrations: Vec::new(),
            handshake: None,
            theme_watch,
            motion_watch,
            pointer_watch,
            hero,
            underline,
            neural_heading,
            clock: Duration::ZERO,
            progress: 0.0,
            logo,
            nav_logo_visible: false,
            hero_frame,
            underline_frame,
            heading_frame,
            nav_width: Transition::new(expanded, 0.25).with_epsilon(0.5),
            nav_opacity: Transition::new(1.0, 0.25),
            reveal: 0.0,
            should_quit: false,
            status_message: None,
        })
    }

    // ── lifecycle ───────────────────────────────────────────────

    /// Register listeners and start every component.
    pub fn mount(&mut self, now: Duration) {
        self.clock = now;
        for (kind, owner) in [
            (ListenerKind::Scroll, COORDINATOR),
            (ListenerKind::Resize, COORDINATOR),
            (ListenerKind::Intersection, COLLAPSE),
            (ListenerKind::MediaQuery, PREFERENCES),
        ] {
            self.registrations.push(self.listeners.add(kind, owner));
        }

        self.coordinator.mount(now);
        // The navbar subscribes after the coordinator exists; it reads the
        // current value instead of waiting for the next edge.
        let handshake = self.coordinator.subscribe();
        self.nav_logo_visible = handshake.current();
        self.handshake = Some(handshake);

        let motion = self.motion();
        let coarse = self.env.coarse_pointer.get();
        self.circuits.mount(
            now,
            self.page.canvas_viewport(SectionKind::Circuits),
            motion,
            coarse,
            &mut self.frames,
            &mut self.listeners,
        );
        self.neural.mount(
            now,
            self.page.canvas_viewport(SectionKind::Neural),
            motion,
            coarse,
            &mut self.frames,
            &mut self.listeners,
        );

        self.preloader.start(now, self.env.reduced_motion.get());
        self.observe_collapse(true);
        debug!(listeners = self.listeners.count(), "showcase mounted");
    }

    /// Tear everything down.  Leaves no listeners, frames or timers behind.
    pub fn unmount(&mut self) {
        self.circuits.unmount(&mut self.frames, &mut self.listeners);
        self.neural.unmount(&mut self.frames, &mut self.listeners);
        for id in self.registrations.drain(..) {
            self.listeners.remove(id);
        }
        self.preloader.teardown();
        self.timers.clear();
        self.settle_timer = None;
        self.coordinator.unmount();
        self.handshake = None;
        debug!(
            listeners = self.listeners.count(),
            frames = self.frames.pending(),
            "showcase unmounted"
        );
    }

    // ── host events ─────────────────────────────────────────────

    pub fn scroll_by(&mut self, delta: f64) {
        self.scroll_to(self.scroll + delta);
    }

    pub fn scroll_to(&mut self, offset: f64) {
        let offset = self.page.clamp_scroll(offset);
        if offset == self.scroll {
            return;
        }
        self.scroll = offset;
        if self.listeners.listeners(ListenerKind::Scroll).is_empty() {
            return;
        }
        // Debounce: only the last scroll in a burst re-measures.
        if let Some(handle) = self.settle_timer.take() {
            self.timers.cancel(handle);
        }
        self.settle_timer = Some(self.timers.schedule(
            self.clock,
            SCROLL_SETTLE,
            Deferred::ScrollSettled,
        ));
    }

    pub fn page_step(&self) -> f64 {
        (self.page.viewport().size.height - f64::from(NAV_ROWS) * CELL_HEIGHT).max(CELL_HEIGHT)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.page = PageLayout::new(viewport);
        self.scroll = self.page.clamp_scroll(self.scroll);
        for owner in self.listeners.listeners(ListenerKind::Resize) {
            match owner {
                COORDINATOR => self.coordinator.resize(viewport),
                CIRCUITS => self
                    .circuits
                    .resize(self.page.canvas_viewport(SectionKind::Circuits)),
                NEURAL => self
                    .neural
                    .resize(self.page.canvas_viewport(SectionKind::Neural)),
                _ => {}
            }
        }
        debug!(
            width = viewport.size.width,
            height = viewport.size.height,
            "viewport resized"
        );
    }

    pub fn toggle_motion(&mut self) {
        let reduced = !self.env.reduced_motion.get();
        self.env.reduced_motion.set(reduced);
    }

    pub fn toggle_theme(&mut self) {
        let scheme = self.env.theme.get().toggled();
        self.env.theme.set(scheme);
    }

    pub fn theme(&self) -> Theme {
        Theme::new(self.env.theme.get())
    }

    pub fn motion(&self) -> Motion {
        if self.env.reduced_motion.get() {
            Motion::Static
        } else {
            Motion::Animated
        }
    }

    // ── frame ───────────────────────────────────────────────────

    pub fn frame(&mut self, now: Duration) {
        self.clock = now;
        self.apply_preferences(now);

        // 1. timers
        for deferred in self.timers.advance(now) {
            match deferred {
                Deferred::ScrollSettled => {
                    self.settle_timer = None;
                    if self.listeners.listeners(ListenerKind::Scroll).contains(&COORDINATOR) {
                        self.coordinator.request_measure();
                    }
                }
            }
        }
        self.preloader.advance(now);
        self.reveal = self.preloader.reveal_fraction(now);

        // 2. animation frames
        for id in self.frames.take_due() {
            match id {
                CIRCUITS_LOOP => self.circuits.on_frame(now, &mut self.frames),
                NEURAL_LOOP => self.neural.on_frame(now, &mut self.frames),
                other => trace!(id = other.0, "frame for unknown loop"),
            }
        }

        // 3. coordinator
        self.coordinator.tick(now, &self.page);

        // 4. timelines
        let geometry = self.page.page_geometry(self.scroll);
        self.progress = self.coordinator_progress();
        let before = self.coordinator.phase();
        let after = self.coordinator.sample(self.progress);
        if before != after && after == DockPhase::Approaching {
            self.status_message = Some("logo released".into());
        }
        self.logo = self.coordinator.pose(self.progress);
        self.hero_frame = self.hero.sample(&self.page.section_geometry(SectionKind::Hero, self.scroll));
        self.underline_frame = self.underline.sample(&geometry);
        self.heading_frame = self
            .neural_heading
            .sample(&self.page.section_geometry(SectionKind::Neural, self.scroll));
        self.observe_collapse(false);

        if let Some(done) = self.handshake.as_mut().and_then(Subscriber::take_change) {
            self.nav_logo_visible = done;
            if done {
                self.status_message = Some("logo docked".into());
            }
        }

        trace!(progress = self.progress, phase = ?self.coordinator.phase(), "frame");
    }

    fn coordinator_progress(&self) -> f64 {
        ScrollRegion::page().progress(&self.page.page_geometry(self.scroll))
    }

    fn observe_collapse(&mut self, force: bool) {
        if !self.listeners.listeners(ListenerKind::Intersection).contains(&COLLAPSE) {
            return;
        }
        let target = self.page.on_screen(SectionKind::Hero, self.scroll);
        let flipped = self.collapse.observe(target, self.page.viewport().bounds());
        if flipped || force {
            let style = self.collapse.style();
            debug!(collapsed = self.collapse.is_collapsed(), "nav collapse");
            if self.motion() == Motion::Static || force {
                self.nav_width.jump(style.max_width);
                self.nav_opacity.jump(style.opacity);
            } else {
                self.nav_width.set_target(style.max_width);
                self.nav_opacity.set_target(style.opacity);
            }
        }
        self.nav_width.tick();
        self.nav_opacity.tick();
    }

    /// React to preference edges published since the last frame.
    fn apply_preferences(&mut self, now: Duration) {
        if !self.listeners.listeners(ListenerKind::MediaQuery).contains(&PREFERENCES) {
            return;
        }
        if let Some(scheme) = self.theme_watch.take_change() {
            let theme = Theme::new(scheme);
            self.circuits.set_palette(theme.field_palette(false));
            self.neural.set_palette(theme.field_palette(true));
            self.status_message = Some(format!("theme: {}", scheme.label()));
        }
        if let Some(reduced) = self.motion_watch.take_change() {
            let motion = if reduced { Motion::Static } else { Motion::Animated };
            self.circuits.set_motion(motion, now, &mut self.frames);
            self.neural.set_motion(motion, now, &mut self.frames);
            if reduced && self.preloader.phase() != PreloadPhase::Done {
                self.preloader.skip();
            }
            self.status_message = Some(
                if reduced { "reduced motion" } else { "motion on" }.into(),
            );
        }
        if let Some(coarse) = self.pointer_watch.take_change() {
            self.circuits.set_coarse_pointer(coarse);
            self.neural.set_coarse_pointer(coarse);
        }
    }

    // ── read-only views for rendering and tests ─────────────────

    pub fn listener_count(&self) -> usize {
        self.listeners.count()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.pending()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

/// Pixel width of the navbar link row when expanded.
fn nav_links_width() -> f64 {
    NAV_LINKS.chars().count() as f64 * CELL_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::page::viewport_for_cells;

    const FRAME: Duration = Duration::from_millis(33);

    fn state(reduced_motion: bool) -> ShowcaseState {
        let env = Environment::new(ColorScheme::Dark, reduced_motion, false);
        let mut state =
            ShowcaseState::new(AppConfig::default(), env, viewport_for_cells(120, 40)).expect("state");
        state.mount(Duration::ZERO);
        state
    }

    fn run_frames(state: &mut ShowcaseState, from: u32, count: u32) {
        for i in from..from + count {
            state.frame(FRAME * i);
        }
    }

    #[test]
    fn teardown_leaves_nothing_registered() {
        let mut state = state(false);
        run_frames(&mut state, 1, 3);
        state.scroll_by(100.0);
        assert!(state.listener_count() > 0);
        assert!(state.pending_frames() > 0);
        assert_eq!(state.pending_timers(), 1);

        state.unmount();
        assert_eq!(state.listener_count(), 0);
        assert_eq!(state.pending_frames(), 0);
        assert_eq!(state.pending_timers(), 0);
    }

    #[test]
    fn scrolling_past_threshold_docks_then_settles() {
        let mut state = state(true);
        run_frames(&mut state, 1, 2);
        assert!(!state.nav_logo_visible);

        let max = state.page.max_scroll();
        state.scroll_to(max * 0.5);
        state.frame(FRAME * 3);
        assert_eq!(state.coordinator.phase(), DockPhase::Docked);
        assert!(!state.nav_logo_visible);

        state.frame(FRAME * 4);
        assert_eq!(state.coordinator.phase(), DockPhase::Settled);
        assert!(state.nav_logo_visible);
        assert_eq!(state.logo.opacity, 0.0);
    }

    #[test]
    fn unmount_retracts_a_settled_handshake() {
        let mut state = state(true);
        run_frames(&mut state, 1, 2);
        let mut late = state.coordinator.subscribe();
        state.scroll_to(state.page.max_scroll() * 0.5);
        run_frames(&mut state, 3, 2);
        assert_eq!(late.take_change(), Some(true));

        state.unmount();
        assert_eq!(state.coordinator.phase(), DockPhase::Approaching);
        assert_eq!(late.take_change(), Some(false));
        assert!(!late.current());
    }

    #[test]
    fn logo_targets_the_measured_nav_slot() {
        let mut state = state(true);
        run_frames(&mut state, 1, 1);
        let (target, _) = state.coordinator.target();
        assert_eq!(Some(target), state.page.nav_logo_slot());
    }

    #[test]
    fn hero_leaving_collapses_nav_links() {
        let mut state = state(true);
        run_frames(&mut state, 1, 1);
        assert!(!state.collapse.is_collapsed());
        assert_eq!(state.nav_width.value(), nav_links_width());

        state.scroll_to(state.page.section(SectionKind::Circuits).top);
        state.frame(FRAME * 2);
        assert!(state.collapse.is_collapsed());
        // Reduced motion skips the transition.
        assert_eq!(state.nav_width.value(), 0.0);
        assert_eq!(state.nav_opacity.value(), 0.0);
    }

    #[test]
    fn reduced_motion_canvases_never_loop() {
        let mut state = state(true);
        run_frames(&mut state, 1, 5);
        assert_eq!(state.pending_frames(), 0);
        assert_eq!(state.circuits.frames_drawn(), 1);
        assert_eq!(state.neural.frames_drawn(), 1);
        assert_eq!(state.preloader.phase(), PreloadPhase::Done);
    }

    #[test]
    fn toggling_motion_restarts_loops() {
        let mut state = state(true);
        state.toggle_motion();
        state.frame(FRAME);
        assert_eq!(state.pending_frames(), 2);
        state.toggle_motion();
        state.frame(FRAME * 2);
        assert_eq!(state.pending_frames(), 0);
    }

    #[test]
    fn coarse_pointer_preference_thins_both_canvases() {
        let mut state = state(true);
        run_frames(&mut state, 1, 1);
        let paths = |s: &ShowcaseState| {
            (
                s.circuits.field().map(|f| f.paths().len()).unwrap_or_default(),
                s.neural.field().map(|f| f.paths().len()).unwrap_or_default(),
            )
        };
        let (circuits, neural) = paths(&state);

        state.env.coarse_pointer.set(true);
        state.frame(FRAME * 2);
        let (thin_circuits, thin_neural) = paths(&state);
        assert!(thin_circuits < circuits);
        assert!(thin_neural < neural);
        assert_eq!(state.pending_frames(), 0);
    }

    #[test]
    fn underline_follows_page_progress() {
        let mut state = state(true);
        let max = state.page.max_scroll();
        state.scroll_to(max * 0.15);
        state.frame(FRAME);
        let width = state.underline_frame.get("width").expect("bound track");
        assert!((width.value - 46.0).abs() < 1e-9);
    }

    #[test]
    fn resize_remeasures_on_next_frame() {
        let mut state = state(true);
        run_frames(&mut state, 1, 1);
        state.resize(viewport_for_cells(30, 20));
        state.frame(FRAME * 2);
        let (_, source) = state.coordinator.target();
        assert_eq!(source, scroll_choreo::core::docking::TargetSource::Estimated);
    }
}
