pub mod models;
pub mod columns;
pub mod format;
pub mod errors;

pub use models::*;
pub use columns::*;
pub use format::*;
pub use errors::*;
