//! Infrastructure layer providing external service integrations.
//!
//! This module contains command-line configuration, log setup, and row
//! persistence (JSON files and CSV export).

pub mod config;
pub mod logging;
pub mod persistence;

pub use config::*;
pub use logging::*;
pub use persistence::*;
