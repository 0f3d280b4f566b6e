#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use servectl::config::{AppConfig, DeploymentProfile, RawAppConfig};
use servectl::context::{ControllerContext, ProjectPaths};
use servectl::types::Platform;

/// Builder for `AppConfig` to simplify test setup.
pub struct ConfigBuilder {
    raw: RawAppConfig,
}

impl ConfigBuilder {
    pub fn new(host: &str) -> Self {
        Self {
            raw: RawAppConfig {
                host: host.to_string(),
                production: false,
                app_name: "HolyUB".to_string(),
                ecosystem: "ecosystem.config.json".to_string(),
                runtime: "node".to_string(),
                entry_point: "backend.js".to_string(),
                shutdown_timeout_ms: 5_000,
            },
        }
    }

    pub fn production(mut self, val: bool) -> Self {
        self.raw.production = val;
        self
    }

    pub fn app_name(mut self, name: &str) -> Self {
        self.raw.app_name = name.to_string();
        self
    }

    pub fn runtime(mut self, runtime: &str) -> Self {
        self.raw.runtime = runtime.to_string();
        self
    }

    pub fn entry_point(mut self, entry: &str) -> Self {
        self.raw.entry_point = entry.to_string();
        self
    }

    pub fn shutdown_timeout_ms(mut self, ms: u64) -> Self {
        self.raw.shutdown_timeout_ms = ms;
        self
    }

    pub fn build(self) -> AppConfig {
        AppConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

/// Builder for `DeploymentProfile`.
pub struct ProfileBuilder {
    profile: DeploymentProfile,
}

impl ProfileBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            profile: DeploymentProfile {
                name: name.to_string(),
                script: Some("backend.js".to_string()),
                env: BTreeMap::new(),
                env_production: BTreeMap::new(),
            },
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.profile.env.insert("PORT".to_string(), port.into());
        self
    }

    pub fn production_port(mut self, port: u16) -> Self {
        self.profile
            .env_production
            .insert("PORT".to_string(), port.into());
        self
    }

    pub fn build(self) -> DeploymentProfile {
        self.profile
    }
}

/// Context rooted at `root` on the current platform.
pub fn context_at(
    root: impl Into<PathBuf>,
    config: AppConfig,
    profile: DeploymentProfile,
) -> ControllerContext {
    let paths = ProjectPaths::new(root, &config);
    ControllerContext::from_parts(config, profile, paths, Platform::current())
        .expect("Failed to build valid context from builder")
}

/// Context rooted at `.`, the layout `MockFileSystem` starts with.
pub fn mock_context(config: AppConfig, profile: DeploymentProfile) -> ControllerContext {
    context_at(".", config, profile)
}

/// Development-mode context for `localhost:8080`.
pub fn dev_context() -> ControllerContext {
    mock_context(
        ConfigBuilder::new("localhost").build(),
        ProfileBuilder::new("HolyUB").port(8080).production_port(80).build(),
    )
}

/// Production-mode context for `localhost:80`.
pub fn production_context() -> ControllerContext {
    mock_context(
        ConfigBuilder::new("localhost").production(true).build(),
        ProfileBuilder::new("HolyUB").port(8080).production_port(80).build(),
    )
}
