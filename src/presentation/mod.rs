//! Presentation layer handling terminal UI and user input.
//!
//! This module draws the grid with ratatui, routes crossterm input to the
//! application state, and emulates an input method for composed text.

pub mod ime;
pub mod ui;
pub mod input;

pub use ime::*;
pub use ui::*;
pub use input::*;
