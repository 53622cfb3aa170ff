//! Scroll-driven animation choreography.
//!
//! Maps scroll position to coordinated visual state: keyframe tracks over
//! scroll timelines, the floating-logo docking handshake, canvas signal
//! animators and visibility-driven collapse.  Hosts feed in geometry, time
//! and drawing surfaces; see the `scroll-choreo` binary for a terminal host.

pub mod core;

pub use crate::core::error::{ChoreoError, Result};
