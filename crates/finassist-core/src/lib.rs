//! Core configuration and shared types for Finassist.
//!
//! This crate holds what every other crate needs at startup: environment
//! handling, the process configuration, and the configuration error type.

pub mod config;
pub mod env;
pub mod error;

pub use config::Config;
pub use error::{ConfigError, Result};
