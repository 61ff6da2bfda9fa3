//! Shared utilities for the token-holder distribution binaries.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
