// src/exec/shell.rs

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::{debug, info};

/// Captured result of a one-shot command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Turn a non-zero exit into an error carrying the command's stderr.
    pub fn ensure_success(self, label: &str) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        let detail = self.stderr.trim();
        if detail.is_empty() {
            bail!("{label} exited with {code}");
        }
        bail!("{label} exited with {code}: {detail}");
    }
}

/// Run `cmd` to completion, capturing stdout and stderr.
///
/// Only a failure to spawn or wait is an error here; callers decide what a
/// non-zero exit means via [`CommandOutput::ensure_success`].
pub async fn run_captured(mut cmd: Command, label: &str) -> Result<CommandOutput> {
    debug!(command = %label, "running command");

    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("spawning '{label}'"))?;

    let result = CommandOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    info!(
        command = %label,
        exit_code = ?result.code,
        success = result.success(),
        "command exited"
    );

    Ok(result)
}

/// Echo a command's stdout to our stdout, the way an operator running the
/// underlying tool by hand would see it.
pub fn echo_output(output: &CommandOutput) {
    let stdout = output.stdout.trim_end();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
}
