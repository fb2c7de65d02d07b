//! rowgrid - editable data grid for the terminal
//!
//! Sample rows in a spreadsheet-like table with locale-aware date, date-time
//! and currency formatting, a row selection column, and an in-place cell
//! editor that understands composed (IME) input.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
