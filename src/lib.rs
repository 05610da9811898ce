pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod observability;
pub mod preprocessing;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export common types
pub use error::{InferenceError, StartupError};
