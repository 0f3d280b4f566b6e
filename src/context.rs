// src/context.rs

//! The frozen, per-invocation context every component reads from.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::loader::config_root_dir;
use crate::config::{AppConfig, DeploymentProfile, ServerAddress, load_config, load_profiles};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::Platform;

/// Sentinel marker, relative to the project root.
pub const SENTINEL_RELATIVE_PATH: &str = "src/.shutdown";

/// Build output directory, relative to the project root.
pub const DIST_RELATIVE_PATH: &str = "views/dist";

/// Filesystem locations the controller touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub sentinel: PathBuf,
    pub dist: PathBuf,
    pub entry_point: PathBuf,
    pub ecosystem: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, config: &AppConfig) -> Self {
        let root = root.into();
        Self {
            sentinel: root.join(SENTINEL_RELATIVE_PATH),
            dist: root.join(DIST_RELATIVE_PATH),
            entry_point: root.join(&config.entry_point),
            ecosystem: root.join(&config.ecosystem),
            root,
        }
    }
}

/// Everything resolved at startup. Built once, never mutated, passed by
/// reference into every command.
#[derive(Debug, Clone)]
pub struct ControllerContext {
    pub config: AppConfig,
    pub profile: DeploymentProfile,
    pub address: ServerAddress,
    pub paths: ProjectPaths,
    pub platform: Platform,
}

impl ControllerContext {
    /// Load config and deployment profiles from disk and resolve the address.
    pub fn load(fs: &dyn FileSystem, config_path: &Path) -> Result<Self> {
        let config = load_config(fs, config_path)?;
        let root = config_root_dir(config_path);
        let paths = ProjectPaths::new(root, &config);
        let ecosystem = load_profiles(fs, &paths.ecosystem)?;
        let profile = ecosystem.select(&config.app_name).clone();
        Self::from_parts(config, profile, paths, Platform::current())
    }

    /// Assemble a context from already-loaded parts.
    pub fn from_parts(
        config: AppConfig,
        profile: DeploymentProfile,
        paths: ProjectPaths,
        platform: Platform,
    ) -> Result<Self> {
        let port = profile.port(config.production)?;
        let address = ServerAddress::resolve(&config.host, port)?;

        info!(
            profile = %profile.name,
            production = config.production,
            address = %address,
            "resolved server address"
        );

        Ok(Self {
            config,
            profile,
            address,
            paths,
            platform,
        })
    }

    pub fn is_production(&self) -> bool {
        self.config.production
    }
}
