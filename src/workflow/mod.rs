// src/workflow/mod.rs

//! Validated restart: trial-run a new server instance and only start the
//! long-lived detached instance if the trial comes up cleanly.
//!
//! The pure state machine lives in [`machine`]; [`run`] is the async shell
//! that spawns the trial, feeds its output into the machine and executes the
//! resulting actions.

pub mod machine;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::launch::{LaunchSpec, Launcher, TrialOutput};

pub use machine::{
    BenignNoticeFilter, WorkflowAction, WorkflowEvent, WorkflowMachine, WorkflowState,
};

/// How a workflow run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Trial came up; a detached instance was started.
    Promoted,
    /// Trial misbehaved; nothing was started.
    Aborted { reason: String },
}

impl WorkflowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WorkflowOutcome::Promoted)
    }
}

/// Run the trial/promote/abort sequence.
///
/// Errors are spawn failures (trial or promoted instance); misbehaviour of
/// the trial is reported as [`WorkflowOutcome::Aborted`].
pub async fn run(launcher: &dyn Launcher, spec: &LaunchSpec) -> Result<WorkflowOutcome> {
    run_with(launcher, spec, WorkflowMachine::new()).await
}

/// [`run`] with a caller-supplied machine (e.g. a custom notice filter).
pub async fn run_with(
    launcher: &dyn Launcher,
    spec: &LaunchSpec,
    mut machine: WorkflowMachine,
) -> Result<WorkflowOutcome> {
    let mut trial = launcher.spawn_monitored(spec)?;
    info!(pid = ?trial.control.id(), "trial server running; waiting for first output");

    let mut failure: Option<String> = None;

    while !machine.is_decided() {
        let event = match trial.output.recv().await {
            Some(TrialOutput::Stdout(chunk)) => WorkflowEvent::StdoutReady(chunk),
            Some(TrialOutput::Stderr(chunk)) => WorkflowEvent::StderrLine(chunk),
            None => WorkflowEvent::TrialExited,
        };

        for action in machine.handle(event) {
            match action {
                WorkflowAction::ReportStderr(output) => {
                    eprintln!("{}", output.trim_end());
                }
                WorkflowAction::TerminateTrial => {
                    if let Err(e) = trial.control.terminate().await {
                        warn!(error = %e, "failed to terminate trial server");
                    }
                }
                WorkflowAction::SpawnDetached => {
                    info!("trial server reported ready; starting detached instance");
                    launcher.spawn_detached(spec).await?;
                }
                WorkflowAction::MarkFailed(reason) => {
                    error!(%reason, "workflow aborted");
                    failure = Some(reason);
                }
            }
        }
    }

    machine.finish();
    drop(trial.output);
    trial.control.disown();

    Ok(match failure {
        Some(reason) => WorkflowOutcome::Aborted { reason },
        None => WorkflowOutcome::Promoted,
    })
}
