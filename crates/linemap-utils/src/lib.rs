//! # linemap Utilities
//!
//! Shared logging setup for the linemap workspace.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! left to binaries through [`init_logging`] or one of its variants.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with_config, init_logging_with_level, LogFormat, LogLevel, LoggingConfig, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
