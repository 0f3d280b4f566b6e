// src/errors.rs

//! Crate-wide error type for the fatal startup path.
//!
//! Per-verb failures are `anyhow::Error`s reported by the dispatcher; only
//! loading the controller context can abort the whole run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServectlError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, ServectlError>;
