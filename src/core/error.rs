//! Construction-time errors.
//!
//! Runtime degradations (missing anchors, empty regions, lost surfaces) are
//! recovered in place and never surface here.  Only malformed inputs that a
//! caller hands us up-front are reported.

use thiserror::Error;

use super::keyframe::Unit;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChoreoError {
    #[error("keyframe track needs at least one keyframe")]
    EmptyTrack,

    #[error("keyframe {index} has input {input}, expected a finite value in [0, 1]")]
    InputOutOfRange { index: usize, input: f64 },

    #[error("keyframe {index} input {input} is smaller than the previous input {previous}")]
    DecreasingInput {
        index: usize,
        input: f64,
        previous: f64,
    },

    #[error("keyframe {index} uses unit `{found}` but the track uses `{expected}`")]
    UnitMismatch {
        index: usize,
        expected: Unit,
        found: Unit,
    },

    #[error("cannot parse `{0}` as a length")]
    InvalidLength(String),

    #[error("cannot parse `{0}` as a colour (expected #rrggbb or #rrggbbaa)")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, ChoreoError>;
