// src/launch/mod.rs

//! Platform-aware process launching.
//!
//! The dispatcher and the workflow validator only see the [`Launcher`]
//! trait. A strategy per platform family is picked once at startup by
//! [`for_platform`]:
//!
//! - [`unix::UnixLauncher`] disowns the server with `setsid`.
//! - [`windows::WindowsLauncher`] goes through `START /MIN` since there is
//!   no native background syntax.
//!
//! Tests substitute a fake launcher that never spawns anything.

pub mod trial;
pub mod unix;
pub mod windows;

use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::context::ControllerContext;
use crate::exec::CommandOutput;
use crate::types::{BoxFuture, Platform};

pub use trial::{TokioTrial, spawn_output_readers};
pub use unix::UnixLauncher;
pub use windows::WindowsLauncher;

/// What to run: `<program> <entry_point>` inside `cwd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub entry_point: PathBuf,
    pub cwd: PathBuf,
}

impl LaunchSpec {
    pub fn from_context(ctx: &ControllerContext) -> Self {
        Self {
            program: ctx.config.runtime.clone(),
            entry_point: ctx.paths.entry_point.clone(),
            cwd: ctx.paths.root.clone(),
        }
    }
}

/// One chunk of output from a monitored trial process, as read from the
/// pipe. May hold several lines, or part of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutput {
    Stdout(String),
    Stderr(String),
}

/// Handle on a running trial process.
pub trait TrialControl: Send {
    /// OS process id, if still known.
    fn id(&self) -> Option<u32>;

    /// Terminate the process.
    fn terminate(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Stop tracking the process without touching it.
    fn disown(self: Box<Self>);
}

/// A trial process under observation.
///
/// `output` yields stdout/stderr chunks in arrival order and closes once both
/// streams have reached EOF.
pub struct MonitoredTrial {
    pub output: mpsc::Receiver<TrialOutput>,
    pub control: Box<dyn TrialControl>,
}

impl std::fmt::Debug for MonitoredTrial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoredTrial")
            .field("pid", &self.control.id())
            .finish_non_exhaustive()
    }
}

/// Capability interface for starting and killing server processes.
pub trait Launcher: Send + Sync {
    /// Start the server as an independent process and forget about it.
    fn spawn_detached<'a>(&'a self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<()>>;

    /// Start the server with its stdout/stderr captured.
    ///
    /// Must be called from within a Tokio runtime.
    fn spawn_monitored(&self, spec: &LaunchSpec) -> Result<MonitoredTrial>;

    /// Forcibly kill every process whose image matches `image`.
    fn kill_all<'a>(&'a self, image: &'a str) -> BoxFuture<'a, Result<CommandOutput>>;
}

/// Pick the launch strategy for the given platform.
pub fn for_platform(platform: Platform) -> Box<dyn Launcher> {
    match platform {
        Platform::Unix => Box::new(UnixLauncher),
        Platform::Windows => Box::new(WindowsLauncher),
    }
}
