//! Shared utilities for the identity-verification client.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
