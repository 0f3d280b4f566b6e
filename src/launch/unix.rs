// src/launch/unix.rs

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::info;

use super::{LaunchSpec, Launcher, MonitoredTrial, TokioTrial, spawn_output_readers};
use crate::exec::{CommandOutput, run_captured};
use crate::types::BoxFuture;

/// Launch strategy for platforms with native background processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixLauncher;

impl UnixLauncher {
    fn detach(&self, spec: &LaunchSpec) -> Result<u32> {
        let mut cmd = std::process::Command::new(&spec.program);
        cmd.arg(&spec.entry_point)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // New session: no controlling terminal, own process group, so the
        // server outlives the controller and its shell.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        let child = cmd.spawn().with_context(|| {
            format!(
                "spawning detached '{} {}'",
                spec.program,
                spec.entry_point.display()
            )
        })?;

        let pid = child.id();
        // Don't keep the handle - it's detached.
        drop(child);
        Ok(pid)
    }
}

impl Launcher for UnixLauncher {
    fn spawn_detached<'a>(&'a self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let pid = self.detach(spec)?;
            info!(
                pid,
                program = %spec.program,
                entry = %spec.entry_point.display(),
                "started detached server"
            );
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

        #[cfg(unix)]
        cmd.process_group(0);

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
            let mut cmd = Command::new("pkill");
            cmd.arg(image);
            run_captured(cmd, &format!("pkill {image}")).await
        })
    }
}
