// src/config/validate.rs

use serde_json::Value;
use tracing::warn;

use crate::config::model::{AppConfig, DeploymentProfile, Ecosystem, RawAppConfig, RawEcosystem};
use crate::errors::{Result, ServectlError};

impl TryFrom<RawAppConfig> for AppConfig {
    type Error = ServectlError;

    fn try_from(raw: RawAppConfig) -> std::result::Result<Self, Self::Error> {
        if raw.host.trim().is_empty() {
            return Err(ServectlError::ConfigError(
                "`host` must not be empty".to_string(),
            ));
        }
        if raw.runtime.trim().is_empty() {
            return Err(ServectlError::ConfigError(
                "`runtime` must not be empty".to_string(),
            ));
        }
        if raw.entry_point.trim().is_empty() {
            return Err(ServectlError::ConfigError(
                "`entry_point` must not be empty".to_string(),
            ));
        }
        if raw.shutdown_timeout_ms == 0 {
            return Err(ServectlError::ConfigError(
                "`shutdown_timeout_ms` must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(AppConfig::new_unchecked(raw))
    }
}

impl TryFrom<RawEcosystem> for Ecosystem {
    type Error = ServectlError;

    fn try_from(raw: RawEcosystem) -> std::result::Result<Self, Self::Error> {
        if raw.apps.is_empty() {
            return Err(ServectlError::ConfigError(
                "deployment profile list must contain at least one entry in `apps`".to_string(),
            ));
        }
        Ok(Ecosystem::new_unchecked(raw.apps))
    }
}

impl Ecosystem {
    /// First profile named `app_name`, else the first profile in the list.
    ///
    /// The fallback is allowed but logged, since it usually means the profile
    /// file and `app_name` have drifted apart.
    pub fn select(&self, app_name: &str) -> &DeploymentProfile {
        match self.apps().iter().find(|app| app.name == app_name) {
            Some(profile) => profile,
            None => {
                let fallback = &self.apps()[0];
                warn!(
                    expected = %app_name,
                    using = %fallback.name,
                    "no deployment profile matches the application name; falling back to the first profile"
                );
                fallback
            }
        }
    }
}

impl DeploymentProfile {
    /// Resolve `PORT` for the given mode.
    ///
    /// Accepts a JSON number or a numeric string.
    pub fn port(&self, production: bool) -> Result<u16> {
        let section = if production { "env_production" } else { "env" };
        let value = self.env_for(production).get("PORT").ok_or_else(|| {
            ServectlError::ConfigError(format!(
                "profile '{}' has no PORT in `{section}`",
                self.name
            ))
        })?;

        let port = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u16>().ok(),
            _ => None,
        };

        match port {
            Some(p) if p != 0 => Ok(p),
            _ => Err(ServectlError::ConfigError(format!(
                "profile '{}' has an invalid PORT in `{section}`: {value}",
                self.name
            ))),
        }
    }
}
