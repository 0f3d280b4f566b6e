// src/bundle/entries.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::fs::FileSystem;

/// Compiled include/exclude patterns for bundler entry discovery.
///
/// Patterns are relative to the project root and use `/` separators on all
/// platforms.
#[derive(Debug, Clone)]
pub struct EntryPatterns {
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl EntryPatterns {
    pub fn new(include: &[&str], exclude: &[&str]) -> Result<Self> {
        let include = build_globset(include).context("building entry include globset")?;
        let exclude = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building entry exclude globset")?)
        };
        Ok(Self { include, exclude })
    }

    /// Returns true if the path (relative to the root, e.g.
    /// `"views/assets/js/app.js"`) is an entry point.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Collect all files under `root/start` matching `patterns`, as paths
/// relative to `root`, sorted.
///
/// Only `start` is walked; a missing `start` yields no entries. `skip`
/// subtrees (the output directory) and symlinked directories are never
/// descended into.
pub fn collect_entries(
    fs: &dyn FileSystem,
    root: &Path,
    start: &Path,
    patterns: &EntryPatterns,
    skip: &[PathBuf],
) -> Result<Vec<PathBuf>> {
    let start_dir = root.join(start);
    if !fs.is_dir(&start_dir) {
        debug!(dir = %start_dir.display(), "entry directory missing");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    let mut stack = vec![start_dir];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if skip.iter().any(|s| path.starts_with(s)) {
                continue;
            }
            if fs.is_dir(&path) {
                if fs.is_symlink(&path) {
                    debug!(path = %path.display(), "not following symlinked directory");
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Ok(rel) = path.strip_prefix(root) {
                    let rel_str = rel.to_string_lossy().replace('\\', "/");
                    if patterns.matches(&rel_str) {
                        files.push(rel.to_path_buf());
                    }
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
