// src/bundle/esbuild.rs

use std::path::Path;

use anyhow::Result;
use tracing::info;

use super::{BundleRequest, Bundler};
use crate::exec::{echo_output, run_captured};
use crate::types::{BoxFuture, Platform};

/// esbuild driven through `npx esbuild`.
#[derive(Debug, Clone)]
pub struct EsbuildBundler {
    platform: Platform,
}

impl EsbuildBundler {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Command-line arguments after `npx`.
    pub fn args(request: &BundleRequest) -> Vec<String> {
        let mut args = vec!["esbuild".to_string()];
        args.extend(
            request
                .entries
                .iter()
                .map(|p| p.to_string_lossy().replace('\\', "/")),
        );
        if request.bundle {
            args.push("--bundle".to_string());
        }
        if request.minify {
            args.push("--minify".to_string());
        }
        if request.sourcemap {
            args.push("--sourcemap".to_string());
        }
        args.push(format!("--platform={}", request.target_platform));
        args.push(format!(
            "--outdir={}",
            request.outdir.to_string_lossy().replace('\\', "/")
        ));
        args.extend(
            request
                .external_extensions
                .iter()
                .map(|ext| format!("--external:*.{ext}")),
        );
        args
    }
}

impl Bundler for EsbuildBundler {
    fn bundle<'a>(&'a self, request: &'a BundleRequest, cwd: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let args = Self::args(request);
            let label = format!("npx esbuild ({} entries)", request.entries.len());
            info!(command = %label, outdir = %request.outdir.display(), "running bundler");

            let mut cmd = self.platform.npx_command(&args);
            cmd.current_dir(cwd);

            let output = run_captured(cmd, &label).await?;
            echo_output(&output);
            output.ensure_success(&label)?;
            Ok(())
        })
    }
}
