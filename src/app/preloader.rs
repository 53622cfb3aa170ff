//! Intro choreography shown before the page becomes interactive.
//!
//! A fixed timer sequence: `Intro` (spinner), `Reveal` (headline types
//! itself in), `Done`.  Reduced motion skips straight to `Done`.

use std::time::Duration;

use tracing::debug;

use scroll_choreo::core::schedule::PhaseSequence;

pub const INTRO: Duration = Duration::from_millis(900);
pub const REVEAL: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloadPhase {
    Intro,
    Reveal,
    Done,
}

impl PreloadPhase {
    pub fn label(self) -> &'static str {
        match self {
            PreloadPhase::Intro => "intro",
            PreloadPhase::Reveal => "reveal",
            PreloadPhase::Done => "ready",
        }
    }
}

#[derive(Debug)]
pub struct Preloader {
    sequence: PhaseSequence<PreloadPhase>,
    phase: PreloadPhase,
    reveal_started: Option<Duration>,
}

impl Default for Preloader {
    fn default() -> Self {
        Self::new()
    }
}

impl Preloader {
    pub fn new() -> Self {
        Self {
            sequence: PhaseSequence::new(vec![
                (Duration::ZERO, PreloadPhase::Intro),
                (INTRO, PreloadPhase::Reveal),
                (INTRO + REVEAL, PreloadPhase::Done),
            ]),
            phase: PreloadPhase::Intro,
            reveal_started: None,
        }
    }

    pub fn start(&mut self, now: Duration, reduced_motion: bool) {
        if reduced_motion {
            self.skip();
            return;
        }
        self.phase = PreloadPhase::Intro;
        self.reveal_started = None;
        self.sequence.start(now);
    }

    /// Apply every phase whose timer has fired.  Returns the newest one.
    pub fn advance(&mut self, now: Duration) -> Option<PreloadPhase> {
        let reached = self.sequence.advance(now);
        for &phase in &reached {
            debug!(phase = phase.label(), "preloader phase");
            if phase == PreloadPhase::Reveal {
                self.reveal_started = Some(now);
            }
            self.phase = phase;
        }
        reached.last().copied()
    }

    /// Jump to `Done`, dropping pending timers.
    pub fn skip(&mut self) {
        self.phase = self.sequence.finish().unwrap_or(PreloadPhase::Done);
        self.reveal_started = None;
    }

    pub fn teardown(&mut self) {
        self.sequence.teardown();
    }

    pub fn phase(&self) -> PreloadPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.sequence.is_running()
    }

    /// How much of the headline is shown, 0–1.
    pub fn reveal_fraction(&self, now: Duration) -> f64 {
        match (self.phase, self.reveal_started) {
            (PreloadPhase::Intro, _) => 0.0,
            (PreloadPhase::Reveal, Some(start)) => {
                (now.saturating_sub(start).as_secs_f64() / REVEAL.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }
}
