// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Application identifier used to pick a deployment profile when the config
/// does not name one.
pub const DEFAULT_APP_NAME: &str = "HolyUB";

/// `config.json` as read from disk.
///
/// ```json
/// {
///   "host": "localhost",
///   "production": false
/// }
/// ```
///
/// Only `host` and `production` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAppConfig {
    /// Bare hostname (`"localhost"`, `"example.com:8080"`) or a full URL.
    pub host: String,

    pub production: bool,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Deployment profile file, relative to the project root.
    #[serde(default = "default_ecosystem")]
    pub ecosystem: String,

    /// Program that runs the server entry point. Also the image name that
    /// `kill` targets.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_ecosystem() -> String {
    "ecosystem.config.json".to_string()
}

fn default_runtime() -> String {
    "node".to_string()
}

fn default_entry_point() -> String {
    "backend.js".to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    5_000
}

/// Validated, frozen configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub production: bool,
    pub app_name: String,
    pub ecosystem: String,
    pub runtime: String,
    pub entry_point: String,
    pub shutdown_timeout_ms: u64,
}

impl AppConfig {
    pub(crate) fn new_unchecked(raw: RawAppConfig) -> Self {
        Self {
            host: raw.host,
            production: raw.production,
            app_name: raw.app_name,
            ecosystem: raw.ecosystem,
            runtime: raw.runtime,
            entry_point: raw.entry_point,
            shutdown_timeout_ms: raw.shutdown_timeout_ms,
        }
    }

    pub fn shutdown_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Deployment profile file, pm2 ecosystem layout:
///
/// ```json
/// {
///   "apps": [
///     {
///       "name": "HolyUB",
///       "script": "backend.js",
///       "env": { "PORT": 8080 },
///       "env_production": { "PORT": 80 }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawEcosystem {
    #[serde(default)]
    pub apps: Vec<DeploymentProfile>,
}

/// Non-empty list of deployment profiles.
#[derive(Debug, Clone)]
pub struct Ecosystem {
    apps: Vec<DeploymentProfile>,
}

impl Ecosystem {
    pub(crate) fn new_unchecked(apps: Vec<DeploymentProfile>) -> Self {
        Self { apps }
    }

    pub fn apps(&self) -> &[DeploymentProfile] {
        &self.apps
    }
}

/// One entry of the `apps` list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeploymentProfile {
    pub name: String,

    #[serde(default)]
    pub script: Option<String>,

    /// Variables for non-production runs.
    #[serde(default)]
    pub env: BTreeMap<String, Value>,

    /// Variables for production runs.
    #[serde(default)]
    pub env_production: BTreeMap<String, Value>,
}

impl DeploymentProfile {
    /// The variable map for the given mode.
    pub fn env_for(&self, production: bool) -> &BTreeMap<String, Value> {
        if production {
            &self.env_production
        } else {
            &self.env
        }
    }
}
