// src/bundle/mod.rs

//! Front-end asset build.
//!
//! `build` wipes and recreates the output directory, discovers entry files
//! from fixed glob patterns and hands them to a [`Bundler`]. The bundler
//! itself is an external tool; only its invocation lives here.

pub mod entries;
pub mod esbuild;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::context::ControllerContext;
use crate::fs::FileSystem;
use crate::types::BoxFuture;

pub use entries::{EntryPatterns, collect_entries};
pub use esbuild::EsbuildBundler;

/// Directory entry discovery starts from, relative to the project root.
pub const ENTRY_ROOT: &str = "views/assets";

/// Entry points, relative to the project root.
pub const ENTRY_GLOBS: &[&str] = &["views/assets/js/**/*.js", "views/assets/css/**/*.css"];

/// Asset types left as external references instead of being inlined.
pub const EXTERNAL_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "avif"];

/// Everything a bundler needs for one build. Paths are relative to the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub entries: Vec<PathBuf>,
    pub outdir: PathBuf,
    pub target_platform: String,
    pub bundle: bool,
    pub minify: bool,
    pub sourcemap: bool,
    pub external_extensions: Vec<String>,
}

impl BundleRequest {
    /// The fixed browser build: bundled, minified, with source maps.
    pub fn browser(entries: Vec<PathBuf>, outdir: PathBuf) -> Self {
        Self {
            entries,
            outdir,
            target_platform: "browser".to_string(),
            bundle: true,
            minify: true,
            sourcemap: true,
            external_extensions: EXTERNAL_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub trait Bundler: Send + Sync {
    /// Run one build with `cwd` as the working directory.
    fn bundle<'a>(&'a self, request: &'a BundleRequest, cwd: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// What a build did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildReport {
    Bundled { entries: usize },
    /// Output directory was reset but no entry matched, so the bundler was
    /// not run.
    NothingToBundle,
}

/// Remove `dir` (if present) and create it again, empty.
pub fn prepare_output_dir(fs: &dyn FileSystem, dir: &Path) -> Result<()> {
    fs.remove_dir_all(dir)
        .with_context(|| format!("clearing build directory {}", dir.display()))?;
    fs.create_dir_all(dir)
        .with_context(|| format!("creating build directory {}", dir.display()))?;
    info!(dir = %dir.display(), "build directory prepared");
    Ok(())
}

/// Run the full build.
pub async fn build(
    ctx: &ControllerContext,
    fs: &dyn FileSystem,
    bundler: &dyn Bundler,
) -> Result<BuildReport> {
    let root = &ctx.paths.root;
    let dist = &ctx.paths.dist;

    prepare_output_dir(fs, dist)?;

    let patterns = EntryPatterns::new(ENTRY_GLOBS, &[])?;
    let entries = collect_entries(
        fs,
        root,
        Path::new(ENTRY_ROOT),
        &patterns,
        std::slice::from_ref(dist),
    )?;

    if entries.is_empty() {
        warn!(patterns = ?ENTRY_GLOBS, "no bundler entry points found; skipping bundler");
        return Ok(BuildReport::NothingToBundle);
    }

    let outdir = dist.strip_prefix(root).unwrap_or(dist).to_path_buf();
    let request = BundleRequest::browser(entries, outdir);
    bundler.bundle(&request, root).await?;

    println!("Build complete.");
    Ok(BuildReport::Bundled {
        entries: request.entries.len(),
    })
}
