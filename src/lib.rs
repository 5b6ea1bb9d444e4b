// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod celebration;
pub mod collab;
pub mod config;
pub mod error;
pub mod focus;
pub mod logging;
pub mod report;
pub mod row;
pub mod runtime;
pub mod session;
pub mod store;
pub mod timer;
pub mod words;

pub use error::{EartleError, Result};
