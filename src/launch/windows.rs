// src/launch/windows.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

use super::{LaunchSpec, Launcher, MonitoredTrial, TokioTrial, spawn_output_readers};
use crate::exec::{CommandOutput, echo_output, run_captured};
use crate::types::BoxFuture;

/// Launch strategy for Windows, which has no `&`/`setsid` equivalent: the
/// detached server is started in a minimised window by `START`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsLauncher;

impl WindowsLauncher {
    /// `cmd /C START /MIN "" <program> <entry>`.
    ///
    /// The empty string is `START`'s window title; without it a quoted
    /// program path would be taken as the title.
    pub fn start_command(spec: &LaunchSpec) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C")
            .arg("START")
            .arg("/MIN")
            .arg("")
            .arg(&spec.program)
            .arg(&spec.entry_point)
            .current_dir(&spec.cwd);
        cmd
    }
}

impl Launcher for WindowsLauncher {
    fn spawn_detached<'a>(&'a self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let label = format!(
                "START /MIN \"\" {} {}",
                spec.program,
                spec.entry_point.display()
            );
            let output = run_captured(Self::start_command(spec), &label).await?;
            echo_output(&output);
            output.ensure_success(&label)?;
            info!(program = %spec.program, "started server in background window");
            Ok(())
        })
    }

    fn spawn_monitored(&self, spec: &LaunchSpec) -> Result<MonitoredTrial> {
        let mut cmd = Command::new(&spec.program);
        cmd.arg(&spec.entry_point)
            .current_dir(&spec.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        cmd.creation_flags(windows_sys::Win32::System::Threading::CREATE_NEW_PROCESS_GROUP);

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "spawning trial '{} {}'",
                spec.program,
                spec.entry_point.display()
            )
        })?;

        info!(pid = ?child.id(), program = %spec.program, "started trial server");

        let output = spawn_output_readers(child.stdout.take(), child.stderr.take());
        Ok(MonitoredTrial {
            output,
            control: Box::new(TokioTrial::new(child)),
        })
    }

    fn kill_all<'a>(&'a self, image: &'a str) -> BoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            let pattern = format!("{image}*");
            let mut cmd = Command::new("taskkill");
            cmd.args(["/F", "/IM", pattern.as_str()]);
            run_captured(cmd, &format!("taskkill /F /IM {pattern}")).await
        })
    }
}
