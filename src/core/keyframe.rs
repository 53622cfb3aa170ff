//! Piecewise-linear keyframe tracks.
//!
//! A [`KeyframeTrack`] is a pure function of progress: given a value in
//! `[0, 1]` it finds the two bracketing keyframes and interpolates between
//! their outputs.  Tracks hold no mutable state, so any number of them can
//! share one scroll region's progress.
//!
//! Two keyframes with the same input form a *jump cut*: the output switches
//! instantly at that input (the later keyframe wins at exactly that point).

use std::fmt;
use std::str::FromStr;

use super::error::{ChoreoError, Result};
use super::geometry::Point;

// ───────────────────────────────────────── interpolation ─────

/// Values a track can produce.
pub trait Interpolate: Clone {
    /// Blend toward `to` by `t` (0 = `self`, 1 = `to`).
    fn lerp(&self, to: &Self, t: f64) -> Self;

    /// Unit tag for values that carry one.  Every keyframe in a track must
    /// agree on it.
    fn unit(&self) -> Option<Unit> {
        None
    }
}

impl Interpolate for f64 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for Point {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Point::lerp(*self, *to, t)
    }
}

// ───────────────────────────────────────── easing ────────────

/// Shaping applied to the local segment ratio before interpolating.
///
/// Every curve maps 0 → 0 and 1 → 1, so keyframe boundaries stay continuous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    SmoothStep,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

// ───────────────────────────────────────── track ─────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe<T> {
    pub input: f64,
    pub output: T,
}

/// Ordered keyframes over progress `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    frames: Vec<Keyframe<T>>,
    easing: Easing,
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Build a track from `(input, output)` pairs.
    ///
    /// Inputs must be finite, inside `[0, 1]` and non-decreasing; outputs
    /// must agree on their unit.
    pub fn new(frames: impl IntoIterator<Item = (f64, T)>) -> Result<Self> {
        let frames: Vec<Keyframe<T>> = frames
            .into_iter()
            .map(|(input, output)| Keyframe { input, output })
            .collect();

        let first = frames.first().ok_or(ChoreoError::EmptyTrack)?;
        let expected_unit = first.output.unit();

        let mut previous = f64::NEG_INFINITY;
        for (index, frame) in frames.iter().enumerate() {
            let input = frame.input;
            if !input.is_finite() || !(0.0..=1.0).contains(&input) {
                return Err(ChoreoError::InputOutOfRange { index, input });
            }
            if input < previous {
                return Err(ChoreoError::DecreasingInput {
                    index,
                    input,
                    previous,
                });
            }
            previous = input;

            if let (Some(expected), Some(found)) = (expected_unit, frame.output.unit()) {
                if expected != found {
                    return Err(ChoreoError::UnitMismatch {
                        index,
                        expected,
                        found,
                    });
                }
            }
        }

        Ok(Self {
            frames,
            easing: Easing::Linear,
        })
    }

    /// Shorthand for a two-keyframe track spanning `[from_input, to_input]`.
    pub fn between(from_input: f64, from: T, to_input: f64, to: T) -> Result<Self> {
        Self::new([(from_input, from), (to_input, to)])
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.frames
    }

    /// Map `progress` through the track.
    pub fn evaluate(&self, progress: f64) -> T {
        let progress = if progress.is_nan() { 0.0 } else { progress };
        let frames = &self.frames;
        let first = &frames[0];
        let last = &frames[frames.len() - 1];

        if frames.len() == 1 || progress < first.input {
            return first.output.clone();
        }
        if progress == first.input {
            // A leading jump cut resolves like any other: the later frame wins.
            return frames
                .iter()
                .take_while(|f| f.input == first.input)
                .last()
                .unwrap_or(first)
                .output
                .clone();
        }
        if progress >= last.input {
            return last.output.clone();
        }

        // Last segment start with `input <= progress`.  Scanning past equal
        // inputs is what makes duplicated keyframes behave as a jump cut.
        let mut i = 0;
        while i + 2 < frames.len() && frames[i + 1].input <= progress {
            i += 1;
        }

        let (from, to) = (&frames[i], &frames[i + 1]);
        let span = to.input - from.input;
        if span <= 0.0 {
            return to.output.clone();
        }
        let t = self.easing.apply((progress - from.input) / span);
        from.output.lerp(&to.output, t)
    }
}

impl KeyframeTrack<Length> {
    /// Build a length track from string outputs such as `"30px"`.
    pub fn parse(frames: &[(f64, &str)]) -> Result<Self> {
        let parsed = frames
            .iter()
            .map(|(input, s)| s.parse::<Length>().map(|len| (*input, len)))
            .collect::<Result<Vec<_>>>()?;
        Self::new(parsed)
    }
}

// ───────────────────────────────────────── lengths ───────────

/// CSS-style unit attached to a [`Length`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    None,
    Px,
    Percent,
    Rem,
    Em,
    Vw,
    Vh,
    Deg,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Unit::None => "",
            Unit::Px => "px",
            Unit::Percent => "%",
            Unit::Rem => "rem",
            Unit::Em => "em",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::Deg => "deg",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "" => Unit::None,
            "px" => Unit::Px,
            "%" => Unit::Percent,
            "rem" => Unit::Rem,
            "em" => Unit::Em,
            "vw" => Unit::Vw,
            "vh" => Unit::Vh,
            "deg" => Unit::Deg,
            _ => return None,
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::None => f.write_str("<unitless>"),
            other => f.write_str(other.suffix()),
        }
    }
}

/// A number with a unit, e.g. `30px` or `-12.5%`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn px(value: f64) -> Self {
        Self::new(value, Unit::Px)
    }

    pub const fn percent(value: f64) -> Self {
        Self::new(value, Unit::Percent)
    }
}

impl Interpolate for Length {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Length::new(Interpolate::lerp(&self.value, &to.value, t), self.unit)
    }

    fn unit(&self) -> Option<Unit> {
        Some(self.unit)
    }
}

impl FromStr for Length {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
            .unwrap_or(trimmed.len());
        // `1em` would otherwise swallow the `e` as an exponent marker.
        let split = if trimmed[..split].ends_with(['e', 'E']) {
            split - 1
        } else {
            split
        };
        let (number, suffix) = trimmed.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| ChoreoError::InvalidLength(s.to_string()))?;
        let unit = Unit::from_suffix(suffix.trim())
            .ok_or_else(|| ChoreoError::InvalidLength(s.to_string()))?;
        if !value.is_finite() {
            return Err(ChoreoError::InvalidLength(s.to_string()));
        }
        Ok(Length::new(value, unit))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit.suffix())
    }
}

/// Four decimal places, trailing zeros trimmed (`46.0000` → `46`).
fn format_number(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    let mut s = format!("{rounded:.4}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    if s == "-0" {
        s = "0".into();
    }
    s
}

// ───────────────────────────────────────── colours ───────────

/// RGBA colour; channels in `0..=255`, alpha in `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Quantised channels for hosts that only take bytes.
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let q = |c: f64| c.round().clamp(0.0, 255.0) as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

impl Interpolate for Rgba {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Rgba {
            r: Interpolate::lerp(&self.r, &to.r, t),
            g: Interpolate::lerp(&self.g, &to.g, t),
            b: Interpolate::lerp(&self.b, &to.b, t),
            a: Interpolate::lerp(&self.a, &to.a, t),
        }
    }
}

impl FromStr for Rgba {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ChoreoError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
        let a = if hex.len() == 8 {
            channel(6)? as f64 / 255.0
        } else {
            1.0
        };
        Ok(Rgba::rgb(r, g, b).with_alpha(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn numbers(frames: &[(f64, f64)]) -> KeyframeTrack<f64> {
        KeyframeTrack::new(frames.iter().copied()).expect("valid track")
    }

    #[test]
    fn endpoints_match_first_and_last_outputs() {
        let track = numbers(&[(0.0, 10.0), (0.5, 30.0), (1.0, -4.0)]);
        assert_eq!(track.evaluate(0.0), 10.0);
        assert_eq!(track.evaluate(1.0), -4.0);
    }

    #[rstest]
    #[case(-1.0, 5.0)]
    #[case(0.1, 5.0)]
    #[case(0.2, 5.0)]
    #[case(0.5, 7.5)]
    #[case(0.8, 10.0)]
    #[case(3.0, 10.0)]
    fn clamps_outside_the_input_range(#[case] progress: f64, #[case] expected: f64) {
        let track = numbers(&[(0.2, 5.0), (0.8, 10.0)]);
        assert!((track.evaluate(progress) - expected).abs() < 1e-12);
    }

    #[test]
    fn single_keyframe_is_constant() {
        let track = numbers(&[(0.4, 3.0)]);
        for p in [0.0, 0.4, 0.9, 1.0] {
            assert_eq!(track.evaluate(p), 3.0);
        }
    }

    #[test]
    fn output_is_continuous_across_keyframes() {
        let track = numbers(&[(0.0, 0.0), (0.3, 90.0), (0.6, 20.0), (1.0, 50.0)]);
        for boundary in [0.3, 0.6] {
            let before = track.evaluate(boundary - 1e-9);
            let after = track.evaluate(boundary + 1e-9);
            assert!((before - after).abs() < 1e-4, "jump at {boundary}");
        }
    }

    #[test]
    fn duplicated_input_is_a_jump_cut() {
        let track = numbers(&[(0.0, 1.0), (0.5, 1.0), (0.5, 0.0), (1.0, 0.0)]);
        assert_eq!(track.evaluate(0.4999), 1.0);
        assert_eq!(track.evaluate(0.5), 0.0);
        assert_eq!(track.evaluate(0.75), 0.0);
    }

    #[test]
    fn leading_jump_cut_resolves_to_the_later_frame() {
        let leading = numbers(&[(0.3, 1.0), (0.3, 0.0), (1.0, 0.0)]);
        assert_eq!(leading.evaluate(0.2), 1.0);
        assert_eq!(leading.evaluate(0.3), 0.0);
        assert_eq!(leading.evaluate(0.3000001), 0.0);

        let middle = numbers(&[(0.0, 1.0), (0.3, 1.0), (0.3, 0.0), (1.0, 0.0)]);
        assert_eq!(middle.evaluate(0.3), leading.evaluate(0.3));
    }

    #[test]
    fn evaluate_is_idempotent() {
        let track = numbers(&[(0.0, 1.0), (1.0, 2.0)]).with_easing(Easing::EaseInOut);
        assert_eq!(track.evaluate(0.37), track.evaluate(0.37));
    }

    #[test]
    fn easing_keeps_segment_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::SmoothStep,
        ] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn nan_progress_reads_as_zero() {
        let track = numbers(&[(0.0, 2.0), (1.0, 4.0)]);
        assert_eq!(track.evaluate(f64::NAN), 2.0);
    }

    #[test]
    fn percentage_track_interpolates_numeric_part() {
        let track = KeyframeTrack::<Length>::parse(&[(0.0, "100%"), (0.25, "10%")]).expect("valid");
        let value = track.evaluate(0.15);
        let expected = 100.0 + (10.0 - 100.0) * (0.15 / 0.25);
        assert!((value.value - expected).abs() < 1e-9);
        assert_eq!(value.to_string(), "46%");
    }

    #[rstest]
    #[case("30px", Length::px(30.0))]
    #[case("-12.5%", Length::percent(-12.5))]
    #[case("1.5rem", Length::new(1.5, Unit::Rem))]
    #[case("2em", Length::new(2.0, Unit::Em))]
    #[case("1e2px", Length::px(100.0))]
    #[case("45deg", Length::new(45.0, Unit::Deg))]
    #[case(" 0.5 ", Length::new(0.5, Unit::None))]
    fn parses_lengths(#[case] input: &str, #[case] expected: Length) {
        assert_eq!(input.parse::<Length>(), Ok(expected));
    }

    #[rstest]
    #[case("px")]
    #[case("12parsecs")]
    #[case("")]
    fn rejects_malformed_lengths(#[case] input: &str) {
        assert!(matches!(
            input.parse::<Length>(),
            Err(ChoreoError::InvalidLength(_))
        ));
    }

    #[test]
    fn formats_lengths_without_trailing_zeros() {
        assert_eq!(Length::px(30.0).to_string(), "30px");
        assert_eq!(Length::px(12.125).to_string(), "12.125px");
        assert_eq!(Length::new(-0.00001, Unit::Vh).to_string(), "0vh");
    }

    #[test]
    fn rejects_mixed_units() {
        let err = KeyframeTrack::<Length>::parse(&[(0.0, "10px"), (1.0, "50%")]).unwrap_err();
        assert_eq!(
            err,
            ChoreoError::UnitMismatch {
                index: 1,
                expected: Unit::Px,
                found: Unit::Percent,
            }
        );
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert_eq!(
            KeyframeTrack::<f64>::new([]).unwrap_err(),
            ChoreoError::EmptyTrack
        );
        assert!(matches!(
            KeyframeTrack::new([(0.5, 1.0), (0.2, 2.0)]),
            Err(ChoreoError::DecreasingInput { index: 1, .. })
        ));
        assert!(matches!(
            KeyframeTrack::new([(0.0, 1.0), (1.5, 2.0)]),
            Err(ChoreoError::InputOutOfRange { index: 1, .. })
        ));
    }

    #[test]
    fn colours_interpolate_per_channel() {
        let from: Rgba = "#000000".parse().expect("colour");
        let to: Rgba = "#ff800080".parse().expect("colour");
        let track = KeyframeTrack::between(0.0, from, 1.0, to).expect("valid");
        let mid = track.evaluate(0.5);
        assert_eq!(mid.to_rgb8(), (128, 64, 0));
        assert!((mid.a - (1.0 + 128.0 / 255.0) / 2.0).abs() < 1e-9);
    }

    #[rstest]
    #[case("#12345")]
    #[case("123456")]
    #[case("#gg0000")]
    #[case("rgb(1, 2, 3)")]
    fn colour_literals_are_hex_only(#[case] literal: &str) {
        assert!(matches!(
            literal.parse::<Rgba>(),
            Err(ChoreoError::InvalidColor(_))
        ));
    }

    #[test]
    fn points_interpolate_component_wise() {
        let track =
            KeyframeTrack::between(0.0, Point::new(0.0, 100.0), 1.0, Point::new(50.0, 0.0))
                .expect("valid");
        assert_eq!(track.evaluate(0.5), Point::new(25.0, 50.0));
    }
}
