//! Showcase orchestration: page model, state, event loop plumbing and
//! input handling.

pub mod event;
pub mod handler;
pub mod page;
pub mod preloader;
pub mod state;
