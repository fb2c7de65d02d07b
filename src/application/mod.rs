//! Application layer managing grid state and the cell editor.
//!
//! This module coordinates between the domain layer and presentation layer:
//! it owns the row collection while the UI runs and turns editor outcomes
//! into row replacements.

pub mod editor;
pub mod state;

pub use editor::*;
pub use state::*;
