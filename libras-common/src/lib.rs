//! # Libras Common Library
//!
//! Shared code for the Libras learning backend:
//! - Error types
//! - Configuration loading

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
