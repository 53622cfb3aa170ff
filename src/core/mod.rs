//! Core choreography – keyframe tracks, scroll timelines, the logo docking
//! handshake, collapse triggers and canvas animation.
//!
//! Nothing in this module depends on any TUI or rendering crate.  Time is
//! always passed in by the host, so every state machine here is
//! deterministic under test.

pub mod canvas;
pub mod collapse;
pub mod context;
pub mod docking;
pub mod error;
pub mod geometry;
pub mod host;
pub mod keyframe;
pub mod schedule;
pub mod scroll;
