// src/supervisor.rs

//! External process supervisor adapter.
//!
//! Production deployments hand the server to pm2. The controller only ever
//! asks it to start, stop or forget the app described by the ecosystem file;
//! pm2's own restart and monitoring policy is its business.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::context::ControllerContext;
use crate::exec::{echo_output, run_captured};
use crate::types::{BoxFuture, Platform};

/// The three calls the controller makes into a supervisor.
pub trait Supervisor: Send + Sync {
    /// Start the managed service in production mode.
    fn start(&self) -> BoxFuture<'_, Result<()>>;
    /// Stop the managed service.
    fn stop(&self) -> BoxFuture<'_, Result<()>>;
    /// Remove the managed service from the supervisor's process list.
    fn delete(&self) -> BoxFuture<'_, Result<()>>;
}

/// pm2 driven through `npx pm2 <verb> <ecosystem file>`.
#[derive(Debug, Clone)]
pub struct Pm2Supervisor {
    ecosystem: PathBuf,
    cwd: PathBuf,
    platform: Platform,
}

impl Pm2Supervisor {
    pub fn new(ecosystem: PathBuf, cwd: PathBuf, platform: Platform) -> Self {
        Self {
            ecosystem,
            cwd,
            platform,
        }
    }

    pub fn from_context(ctx: &ControllerContext) -> Self {
        Self::new(
            ctx.paths.ecosystem.clone(),
            ctx.paths.root.clone(),
            ctx.platform,
        )
    }

    /// Arguments passed to `npx` for a given pm2 verb.
    pub fn args(&self, verb: &str) -> Vec<String> {
        let mut args = vec![
            "pm2".to_string(),
            verb.to_string(),
            self.ecosystem.to_string_lossy().into_owned(),
        ];
        if verb == "start" {
            args.push("--env".to_string());
            args.push("production".to_string());
        }
        args
    }

    async fn invoke(&self, verb: &str) -> Result<()> {
        let args = self.args(verb);
        let label = format!("npx {}", args.join(" "));
        info!(command = %label, "invoking supervisor");

        let mut cmd = self.platform.npx_command(&args);
        cmd.current_dir(&self.cwd);

        let output = run_captured(cmd, &label).await?;
        echo_output(&output);
        output.ensure_success(&label)?;
        Ok(())
    }
}

impl Supervisor for Pm2Supervisor {
    fn start(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.invoke("start"))
    }

    fn stop(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.invoke("stop"))
    }

    fn delete(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.invoke("delete"))
    }
}
