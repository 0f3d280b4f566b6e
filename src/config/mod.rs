// src/config/mod.rs

//! Configuration loading and validation for servectl.
//!
//! Responsibilities:
//! - Define the JSON-backed data model (`model.rs`).
//! - Load the config and deployment-profile files (`loader.rs`).
//! - Validate basic invariants and select the active profile (`validate.rs`).
//! - Resolve the server's base address (`address.rs`).

pub mod address;
pub mod loader;
pub mod model;
pub mod validate;

pub use address::ServerAddress;
pub use loader::{load_config, load_profiles};
pub use model::{
    AppConfig, DeploymentProfile, Ecosystem, RawAppConfig, RawEcosystem, DEFAULT_APP_NAME,
};
