//! UI / rendering layer: everything that touches Ratatui widgets.
//!
//! This layer takes the state the engine produced for the current frame and
//! turns it into cells on the terminal.  No choreography is computed here.

pub mod canvas_widget;
pub mod layout;
pub mod navbar;
pub mod page_view;
pub mod spinner;
pub mod theme;
pub mod transition;
