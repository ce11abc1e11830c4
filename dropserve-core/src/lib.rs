//! Dropserve Core Library
//!
//! Shared configuration and error types for the dropserve file server.

pub mod config;
pub mod error;

pub use config::ServeConfig;
pub use error::{Error, Result};

/// Dropserve version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
