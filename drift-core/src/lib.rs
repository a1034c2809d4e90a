pub mod config;
pub mod constants;
pub mod error;
pub mod recorder;
pub mod report;
pub mod schema_drift;
pub mod sources;
pub mod tracking;
pub mod walker;

pub use error::{DriftError, Result};
