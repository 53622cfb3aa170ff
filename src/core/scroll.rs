//! Scroll progress sampling.
//!
//! A [`ScrollRegion`] is described by two boundaries ("element top meets
//! viewport top", "element bottom meets viewport bottom", …).  Each sample
//! resolves those boundaries against the *current* layout, so nothing is
//! cached between frames: breakpoints and late image loads move elements
//! around and the next sample simply picks that up.

use tracing::trace;

use super::keyframe::{Interpolate, KeyframeTrack};

// ───────────────────────────────────────── boundaries ────────

/// The scroll offset at which a fraction of the element lines up with a
/// fraction of the viewport.  `0.0` is the top edge, `1.0` the bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub element: f64,
    pub viewport: f64,
}

impl Boundary {
    /// Element top meets viewport top.
    pub const START_START: Boundary = Boundary::new(0.0, 0.0);
    /// Element top meets viewport bottom (element starts entering).
    pub const START_END: Boundary = Boundary::new(0.0, 1.0);
    /// Element bottom meets viewport bottom.
    pub const END_END: Boundary = Boundary::new(1.0, 1.0);
    /// Element bottom meets viewport top (element has fully left).
    pub const END_START: Boundary = Boundary::new(1.0, 0.0);

    pub const fn new(element: f64, viewport: f64) -> Self {
        Self { element, viewport }
    }

    /// Resolve to an absolute page scroll offset.
    pub fn offset(&self, element: &ElementSpan, viewport_height: f64) -> f64 {
        element.top + self.element * element.height - self.viewport * viewport_height
    }
}

/// Vertical extent of the tracked element in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementSpan {
    pub top: f64,
    pub height: f64,
}

impl ElementSpan {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

/// Everything a sample reads from the live layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollGeometry {
    pub scroll: f64,
    pub viewport_height: f64,
    pub element: ElementSpan,
}

// ───────────────────────────────────────── region ────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRegion {
    pub start: Boundary,
    pub end: Boundary,
}

impl ScrollRegion {
    pub const fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    /// Whole-page tracking: element = document, from top to bottom.
    pub const fn page() -> Self {
        Self::new(Boundary::START_START, Boundary::END_END)
    }

    /// Resolved `(start, end)` scroll offsets for the given layout.
    pub fn offsets(&self, geometry: &ScrollGeometry) -> (f64, f64) {
        (
            self.start.offset(&geometry.element, geometry.viewport_height),
            self.end.offset(&geometry.element, geometry.viewport_height),
        )
    }

    /// Clamped progress in `[0, 1]`.
    ///
    /// A zero-length (or inverted) region snaps to whichever side of its
    /// start the scroll position is on, instead of dividing by zero.
    pub fn progress(&self, geometry: &ScrollGeometry) -> f64 {
        let (start, end) = self.offsets(geometry);
        progress_between(geometry.scroll, start, end)
    }
}

/// `clamp((offset - start) / (end - start), 0, 1)` with degenerate guards.
pub fn progress_between(offset: f64, start: f64, end: f64) -> f64 {
    if !(offset.is_finite() && start.is_finite() && end.is_finite()) {
        return 0.0;
    }
    let span = end - start;
    if span <= 0.0 {
        trace!(start, end, "degenerate scroll region");
        return if offset < start { 0.0 } else { 1.0 };
    }
    ((offset - start) / span).clamp(0.0, 1.0)
}

// ───────────────────────────────────────── timeline ──────────

/// A region plus every track that listens to it.
///
/// `sample` evaluates all tracks from one progress value, so values coming
/// out of a single frame are always mutually consistent.
#[derive(Debug, Clone)]
pub struct ScrollTimeline<T> {
    region: ScrollRegion,
    tracks: Vec<(String, KeyframeTrack<T>)>,
}

/// One consistent sample of a [`ScrollTimeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineFrame<T> {
    pub progress: f64,
    pub values: Vec<(String, T)>,
}

impl<T> TimelineFrame<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl<T: Interpolate> ScrollTimeline<T> {
    pub fn new(region: ScrollRegion) -> Self {
        Self {
            region,
            tracks: Vec::new(),
        }
    }

    /// Subscribe a named track.  Re-using a name replaces the old track.
    pub fn bind(&mut self, name: impl Into<String>, track: KeyframeTrack<T>) -> &mut Self {
        let name = name.into();
        if let Some(slot) = self.tracks.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = track;
        } else {
            self.tracks.push((name, track));
        }
        self
    }

    pub fn unbind(&mut self, name: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|(n, _)| n != name);
        self.tracks.len() != before
    }

    pub fn region(&self) -> &ScrollRegion {
        &self.region
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn sample(&self, geometry: &ScrollGeometry) -> TimelineFrame<T> {
        let progress = self.region.progress(geometry);
        TimelineFrame {
            progress,
            values: self
                .tracks
                .iter()
                .map(|(name, track)| (name.clone(), track.evaluate(progress)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::keyframe::Length;
    use rstest::rstest;

    fn page_geometry(scroll: f64) -> ScrollGeometry {
        // A 1800px page in an 800px viewport scrolls over [0, 1000].
        ScrollGeometry {
            scroll,
            viewport_height: 800.0,
            element: ElementSpan::new(0.0, 1800.0),
        }
    }

    #[rstest]
    #[case(-50.0, 0.0)]
    #[case(0.0, 0.0)]
    #[case(150.0, 0.15)]
    #[case(500.0, 0.5)]
    #[case(1000.0, 1.0)]
    #[case(1400.0, 1.0)]
    fn page_progress_is_clamped(#[case] scroll: f64, #[case] expected: f64) {
        let progress = ScrollRegion::page().progress(&page_geometry(scroll));
        assert!((progress - expected).abs() < 1e-12);
    }

    #[test]
    fn section_region_uses_element_offsets() {
        // Section at 2000..2600, tracked while it travels through the viewport.
        let region = ScrollRegion::new(Boundary::START_END, Boundary::END_START);
        let geometry = ScrollGeometry {
            scroll: 0.0,
            viewport_height: 1000.0,
            element: ElementSpan::new(2000.0, 600.0),
        };
        assert_eq!(region.offsets(&geometry), (1000.0, 2600.0));
        let halfway = ScrollGeometry {
            scroll: 1800.0,
            ..geometry
        };
        assert!((region.progress(&halfway) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_height_region_snaps_to_a_side() {
        let region = ScrollRegion::new(Boundary::START_START, Boundary::END_START);
        let mut geometry = ScrollGeometry {
            scroll: 99.0,
            viewport_height: 500.0,
            element: ElementSpan::new(100.0, 0.0),
        };
        assert_eq!(region.progress(&geometry), 0.0);
        geometry.scroll = 100.0;
        assert_eq!(region.progress(&geometry), 1.0);
    }

    #[test]
    fn non_finite_input_reads_as_zero() {
        assert_eq!(progress_between(f64::NAN, 0.0, 10.0), 0.0);
        assert_eq!(progress_between(5.0, 0.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn scroll_to_keyframe_end_to_end() {
        let mut timeline = ScrollTimeline::new(ScrollRegion::page());
        timeline.bind(
            "clip",
            KeyframeTrack::<Length>::parse(&[(0.0, "100%"), (0.25, "10%")]).expect("valid"),
        );
        let frame = timeline.sample(&page_geometry(150.0));
        assert!((frame.progress - 0.15).abs() < 1e-12);

        let clip = frame.get("clip").expect("bound track");
        let expected = 100.0 + (10.0 - 100.0) * (0.15 / 0.25);
        assert!((clip.value - expected).abs() < 1e-9);
        assert_eq!(clip.to_string(), "46%");
    }

    #[test]
    fn every_track_reads_the_same_progress() {
        let mut timeline = ScrollTimeline::new(ScrollRegion::page());
        timeline
            .bind("a", KeyframeTrack::between(0.0, Length::px(0.0), 1.0, Length::px(100.0)).expect("valid"))
            .bind("b", KeyframeTrack::between(0.0, Length::px(100.0), 1.0, Length::px(0.0)).expect("valid"));
        let frame = timeline.sample(&page_geometry(420.0));
        let a = frame.get("a").expect("a").value;
        let b = frame.get("b").expect("b").value;
        assert!((a + b - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rebinding_replaces_and_unbind_removes() {
        let mut timeline = ScrollTimeline::new(ScrollRegion::page());
        timeline.bind("x", KeyframeTrack::new([(0.0, 1.0)]).expect("valid"));
        timeline.bind("x", KeyframeTrack::new([(0.0, 2.0)]).expect("valid"));
        assert_eq!(timeline.track_count(), 1);
        assert_eq!(timeline.sample(&page_geometry(0.0)).get("x"), Some(&2.0));
        assert!(timeline.unbind("x"));
        assert!(!timeline.unbind("x"));
    }
}
