//! The docking handshake.
//!
//! A floating logo starts in the middle of the viewport and flies into a
//! slot owned by the navbar as the page scrolls.  Three parties take part:
//!
//! 1. the floating logo, which reads [`DockingCoordinator::pose`];
//! 2. the navbar anchor, whose rectangle the coordinator measures;
//! 3. the navbar, which swaps in its own logo once the handshake broadcast
//!    says the floating one has settled.
//!
//! ```text
//!               progress >= threshold            next frame
//!  Approaching ───────────────────────▶ Docked ─────────────▶ Settled
//!       ▲                                 │                      │
//!       └──── progress < threshold - ε ───┴──────────────────────┘
//! ```
//!
//! Settling one frame after docking lets the floating logo's final transform
//! land before the navbar reacts, so both logos are never shown at once.

use std::time::Duration;

use tracing::{debug, warn};

use super::context::{Observable, Subscriber};
use super::geometry::{Point, Rect, Size, Viewport};
use super::host::AnchorLookup;
use super::keyframe::{Easing, KeyframeTrack};

/// Name of the navbar slot the logo docks into.
pub const NAV_LOGO_ANCHOR: &str = "nav-logo";

// ───────────────────────────────────────── state ─────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DockPhase {
    #[default]
    Approaching,
    Docked,
    Settled,
}

impl DockPhase {
    pub fn has_docked(self) -> bool {
        !matches!(self, DockPhase::Approaching)
    }

    pub fn handshake_complete(self) -> bool {
        matches!(self, DockPhase::Settled)
    }
}

/// Where the current target rectangle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Measured,
    Estimated,
}

#[derive(Debug, Clone)]
pub struct DockingConfig {
    /// Page progress at which the logo counts as arrived.
    pub threshold: f64,
    /// Extra distance below `threshold` required before undocking.
    pub hysteresis: f64,
    /// Delay after mount before the anchor is measured again.
    pub settle_delay: Duration,
    /// Natural (unscaled) size of the floating logo.
    pub logo_size: Size,
    /// Anchor name to measure.
    pub anchor: String,
    pub easing: Easing,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            hysteresis: 0.01,
            settle_delay: Duration::from_millis(100),
            logo_size: Size::new(320.0, 96.0),
            anchor: NAV_LOGO_ANCHOR.to_string(),
            easing: Easing::EaseOut,
        }
    }
}

impl DockingConfig {
    /// Threshold kept inside `(0, 1]`, hysteresis inside `[0, threshold]`.
    pub fn sanitized(mut self) -> Self {
        self.threshold = if self.threshold.is_finite() {
            self.threshold.clamp(0.01, 1.0)
        } else {
            0.15
        };
        self.hysteresis = if self.hysteresis.is_finite() {
            self.hysteresis.clamp(0.0, self.threshold)
        } else {
            0.0
        };
        self
    }

    fn undock_below(&self) -> f64 {
        self.threshold - self.hysteresis
    }
}

/// Where and how the floating logo is drawn for a given progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoPose {
    pub center: Point,
    pub scale: f64,
    pub opacity: f64,
}

impl LogoPose {
    /// Bounding box of the logo at this pose.
    pub fn rect(&self, natural: Size) -> Rect {
        let w = natural.width * self.scale;
        let h = natural.height * self.scale;
        Rect::new(self.center.x - w / 2.0, self.center.y - h / 2.0, w, h)
    }
}

#[derive(Debug, Clone)]
struct PoseTracks {
    center: KeyframeTrack<Point>,
    scale: KeyframeTrack<f64>,
}

// ───────────────────────────────────────── coordinator ───────

#[derive(Debug)]
pub struct DockingCoordinator {
    config: DockingConfig,
    phase: DockPhase,
    viewport: Viewport,
    target: Rect,
    source: TargetSource,
    measure_requested: bool,
    remeasure_at: Option<Duration>,
    tracks: Option<PoseTracks>,
    handshake: Observable<bool>,
}

impl DockingCoordinator {
    pub fn new(config: DockingConfig, viewport: Viewport) -> Self {
        let config = config.sanitized();
        let target = estimate_anchor(&viewport);
        let mut coordinator = Self {
            config,
            phase: DockPhase::Approaching,
            viewport,
            target,
            source: TargetSource::Estimated,
            measure_requested: false,
            remeasure_at: None,
            tracks: None,
            handshake: Observable::new(false),
        };
        coordinator.rebuild_tracks();
        coordinator
    }

    /// Component mounted: measure on the next frame and once more after the
    /// settle delay, since the anchor's layout may still be moving.
    pub fn mount(&mut self, now: Duration) {
        self.measure_requested = true;
        self.remeasure_at = Some(now + self.config.settle_delay);
    }

    /// Component unmounted: drop pending measurements and retract the
    /// handshake so subscribers that outlive us read `false`.
    pub fn unmount(&mut self) {
        self.measure_requested = false;
        self.remeasure_at = None;
        if self.phase != DockPhase::Approaching {
            debug!(from = ?self.phase, "docking torn down");
        }
        self.phase = DockPhase::Approaching;
        self.handshake.set(false);
    }

    /// Viewport changed size.  Re-measure on the next frame.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.source == TargetSource::Estimated {
            self.target = estimate_anchor(&viewport);
        }
        self.rebuild_tracks();
        self.request_measure();
    }

    /// Mark the target stale.  Coalesced: at most one measurement per frame.
    pub fn request_measure(&mut self) {
        self.measure_requested = true;
    }

    /// Feed a fresh page progress sample.  Returns the resulting phase.
    pub fn sample(&mut self, progress: f64) -> DockPhase {
        let progress = if progress.is_nan() { 0.0 } else { progress };
        match self.phase {
            DockPhase::Approaching if progress >= self.config.threshold => {
                debug!(progress, "logo docked");
                self.phase = DockPhase::Docked;
            }
            DockPhase::Docked | DockPhase::Settled if progress < self.config.undock_below() => {
                debug!(progress, from = ?self.phase, "logo undocked");
                if self.phase == DockPhase::Settled {
                    self.handshake.set(false);
                }
                self.phase = DockPhase::Approaching;
            }
            _ => {}
        }
        self.phase
    }

    /// Once per rendering frame: run deferred measurement and settle a dock
    /// that happened before this frame.
    pub fn tick(&mut self, now: Duration, anchors: &dyn AnchorLookup) {
        if self.remeasure_at.is_some_and(|at| now >= at) {
            self.remeasure_at = None;
            self.measure_requested = true;
        }
        if self.measure_requested {
            self.measure_requested = false;
            self.measure(anchors);
        }
        if self.phase == DockPhase::Docked {
            self.phase = DockPhase::Settled;
            if self.handshake.set(true) {
                debug!("handshake complete");
            }
        }
    }

    fn measure(&mut self, anchors: &dyn AnchorLookup) {
        let (target, source) = match anchors.anchor_rect(&self.config.anchor) {
            Some(rect) if !rect.is_empty() => (rect, TargetSource::Measured),
            _ => {
                debug!(anchor = %self.config.anchor, "anchor missing, using estimate");
                (estimate_anchor(&self.viewport), TargetSource::Estimated)
            }
        };
        if target != self.target || source != self.source {
            self.target = target;
            self.source = source;
            self.rebuild_tracks();
        }
    }

    fn rebuild_tracks(&mut self) {
        let threshold = self.config.threshold;
        let from = self.viewport.size.center();
        let to = self.target.center();
        let end_scale = if self.config.logo_size.width > 0.0 {
            self.target.width / self.config.logo_size.width
        } else {
            1.0
        };
        let tracks = KeyframeTrack::between(0.0, from, threshold, to).and_then(|center| {
            KeyframeTrack::between(0.0, 1.0, threshold, end_scale).map(|scale| PoseTracks {
                center: center.with_easing(self.config.easing),
                scale: scale.with_easing(self.config.easing),
            })
        });
        match tracks {
            Ok(tracks) => self.tracks = Some(tracks),
            Err(err) => warn!(%err, "could not build docking tracks"),
        }
    }

    /// Floating-logo pose for `progress`.
    ///
    /// Once the handshake completes the floating logo is hidden outright,
    /// since the navbar is drawing its own copy from then on.
    pub fn pose(&self, progress: f64) -> LogoPose {
        let opacity = if self.phase.handshake_complete() { 0.0 } else { 1.0 };
        match &self.tracks {
            Some(tracks) => LogoPose {
                center: tracks.center.evaluate(progress),
                scale: tracks.scale.evaluate(progress),
                opacity,
            },
            None => LogoPose {
                center: self.viewport.size.center(),
                scale: 1.0,
                opacity,
            },
        }
    }

    pub fn phase(&self) -> DockPhase {
        self.phase
    }

    pub fn has_docked(&self) -> bool {
        self.phase.has_docked()
    }

    pub fn handshake_complete(&self) -> bool {
        self.phase.handshake_complete()
    }

    pub fn target(&self) -> (Rect, TargetSource) {
        (self.target, self.source)
    }

    pub fn config(&self) -> &DockingConfig {
        &self.config
    }

    /// Watch the handshake.  Late subscribers read the current state.
    pub fn subscribe(&self) -> Subscriber<bool> {
        self.handshake.subscribe()
    }

    /// Edges broadcast so far (completion + retraction).
    pub fn broadcasts(&self) -> u64 {
        self.handshake.edges()
    }
}

/// Static guess at the navbar logo slot: top-left, sized off the viewport.
pub fn estimate_anchor(viewport: &Viewport) -> Rect {
    let Size { width, height } = viewport.size;
    let slot_w = (width * 0.12).max(1.0);
    let slot_h = (slot_w * 0.3).max(1.0);
    Rect::new(width * 0.03, (height * 0.02).max(0.0), slot_w, slot_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::NoAnchors;

    fn viewport() -> Viewport {
        Viewport::new(Size::new(1000.0, 800.0))
    }

    fn coordinator() -> DockingCoordinator {
        DockingCoordinator::new(DockingConfig::default(), viewport())
    }

    const SLOT: Rect = Rect::new(20.0, 10.0, 160.0, 48.0);

    fn anchors() -> [(&'static str, Rect); 1] {
        [(NAV_LOGO_ANCHOR, SLOT)]
    }

    #[test]
    fn hysteresis_holds_until_below_the_band() {
        let mut dock = coordinator();
        let seq = [0.10, 0.16, 0.145, 0.14, 0.1399, 0.145, 0.15];
        let docked: Vec<bool> = seq.iter().map(|p| dock.sample(*p).has_docked()).collect();
        assert_eq!(docked, vec![false, true, true, true, false, false, true]);
    }

    #[test]
    fn thirteen_percent_is_below_the_band() {
        // threshold 0.15, ε 0.01: undocking happens below 0.14.
        let mut dock = coordinator();
        let docked: Vec<bool> = [0.10, 0.16, 0.14, 0.13]
            .iter()
            .map(|p| dock.sample(*p).has_docked())
            .collect();
        assert_eq!(docked, vec![false, true, true, false]);
    }

    #[test]
    fn settle_lags_dock_by_one_tick() {
        let mut dock = coordinator();
        let seq = [0.0, 0.2, 0.3, 0.3, 0.05, 0.2, 0.2];
        let mut prev_docked = false;
        for (frame, p) in seq.iter().enumerate() {
            dock.sample(*p);
            let docked = dock.has_docked();
            let complete = dock.handshake_complete();
            assert!(!complete || docked, "settled while undocked at {frame}");
            assert_eq!(complete, docked && prev_docked, "frame {frame}");
            prev_docked = docked;
            dock.tick(Duration::from_millis(16 * frame as u64), &NoAnchors);
        }
    }

    #[test]
    fn broadcasts_once_per_edge() {
        let mut dock = coordinator();
        let mut nav = dock.subscribe();
        dock.sample(0.5);
        for _ in 0..5 {
            dock.tick(Duration::ZERO, &NoAnchors);
            dock.sample(0.5);
        }
        assert_eq!(dock.broadcasts(), 1);
        assert_eq!(nav.take_change(), Some(true));

        dock.sample(0.0);
        dock.tick(Duration::ZERO, &NoAnchors);
        assert_eq!(dock.broadcasts(), 2);
        assert_eq!(nav.take_change(), Some(false));
        assert_eq!(nav.take_change(), None);
    }

    #[test]
    fn undocking_before_settle_sends_nothing() {
        let mut dock = coordinator();
        dock.sample(0.2);
        dock.sample(0.0);
        dock.tick(Duration::ZERO, &NoAnchors);
        assert_eq!(dock.broadcasts(), 0);
        assert_eq!(dock.phase(), DockPhase::Approaching);
    }

    #[test]
    fn late_subscriber_sees_completed_handshake() {
        let mut dock = coordinator();
        dock.sample(1.0);
        dock.tick(Duration::ZERO, &NoAnchors);
        let navbar = dock.subscribe();
        assert!(navbar.current());
    }

    #[test]
    fn missing_anchor_falls_back_to_estimate() {
        let mut dock = coordinator();
        dock.mount(Duration::ZERO);
        dock.tick(Duration::ZERO, &NoAnchors);
        let (rect, source) = dock.target();
        assert_eq!(source, TargetSource::Estimated);
        assert_eq!(rect, estimate_anchor(&viewport()));
        assert!(!rect.is_empty());
    }

    #[test]
    fn measures_on_next_frame_after_request() {
        let mut dock = coordinator();
        dock.mount(Duration::ZERO);
        dock.tick(Duration::ZERO, &anchors());
        assert_eq!(dock.target(), (SLOT, TargetSource::Measured));

        // Anchor moves; nothing happens until someone asks.
        let moved = [(NAV_LOGO_ANCHOR, Rect::new(40.0, 10.0, 160.0, 48.0))];
        dock.tick(Duration::from_millis(16), &moved);
        assert_eq!(dock.target().0, SLOT);
        dock.request_measure();
        dock.tick(Duration::from_millis(32), &moved);
        assert_eq!(dock.target().0, moved[0].1);
    }

    #[test]
    fn unmount_cancels_measurement_and_retracts_handshake() {
        let mut dock = coordinator();
        let mut watcher = dock.subscribe();
        dock.mount(Duration::ZERO);
        dock.tick(Duration::ZERO, &NoAnchors);
        dock.sample(0.5);
        dock.tick(Duration::from_millis(16), &NoAnchors);
        assert_eq!(watcher.take_change(), Some(true));

        dock.unmount();
        assert_eq!(dock.phase(), DockPhase::Approaching);
        assert_eq!(watcher.take_change(), Some(false));

        // The post-mount re-measure never runs once torn down.
        dock.tick(Duration::from_millis(200), &anchors());
        assert_eq!(dock.target().1, TargetSource::Estimated);
        assert_eq!(dock.broadcasts(), 2);
    }

    #[test]
    fn remeasures_after_settle_delay() {
        let mut dock = coordinator();
        dock.mount(Duration::ZERO);
        dock.tick(Duration::ZERO, &NoAnchors);
        assert_eq!(dock.target().1, TargetSource::Estimated);
        // The anchor appears a little later; the post-mount pass picks it up.
        dock.tick(Duration::from_millis(50), &anchors());
        assert_eq!(dock.target().1, TargetSource::Estimated);
        dock.tick(Duration::from_millis(100), &anchors());
        assert_eq!(dock.target(), (SLOT, TargetSource::Measured));
    }

    #[test]
    fn pose_runs_from_viewport_centre_to_target() {
        let mut dock = coordinator();
        dock.mount(Duration::ZERO);
        dock.tick(Duration::ZERO, &anchors());

        let start = dock.pose(0.0);
        assert_eq!(start.center, Point::new(500.0, 400.0));
        assert_eq!(start.scale, 1.0);

        let end = dock.pose(0.15);
        assert_eq!(end.center, SLOT.center());
        assert!((end.scale - 0.5).abs() < 1e-12);
        assert_eq!(dock.pose(0.9).center, SLOT.center());
    }

    #[test]
    fn floating_logo_hides_once_settled() {
        let mut dock = coordinator();
        dock.sample(0.3);
        assert_eq!(dock.pose(0.3).opacity, 1.0);
        dock.tick(Duration::ZERO, &NoAnchors);
        assert_eq!(dock.pose(0.3).opacity, 0.0);
    }

    #[test]
    fn config_is_sanitized() {
        let config = DockingConfig {
            threshold: 7.0,
            hysteresis: -1.0,
            ..DockingConfig::default()
        }
        .sanitized();
        assert_eq!(config.threshold, 1.0);
        assert_eq!(config.hysteresis, 0.0);
    }
}
