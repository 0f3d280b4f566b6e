// src/workflow/machine.rs

//! Pure trial/promote/abort state machine.
//!
//! Consumes [`WorkflowEvent`]s and returns the [`WorkflowAction`]s the async
//! driver should perform. No Tokio, no processes, no IO.

use regex::RegexSet;
use tracing::debug;

/// Where the validation sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Trial instance running, waiting for its first verdict.
    TrialRunning,
    /// Trial reported ready; a fresh detached instance is being started.
    Promoting,
    /// Trial misbehaved; nothing else will be started.
    Aborting,
    Done,
}

/// Something observed on the trial process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Stderr output, one read chunk.
    StderrLine(String),
    /// First stdout output: the server reports it is up.
    StdoutReady(String),
    /// Both output streams closed before any verdict.
    TrialExited,
}

/// Side effect requested by the machine, executed in order by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowAction {
    /// Show the offending stderr output to the operator.
    ReportStderr(String),
    TerminateTrial,
    /// Start the real, independent server instance.
    SpawnDetached,
    MarkFailed(String),
}

/// Recognises stderr output that must not abort a trial: runtime deprecation
/// notices and the hint line the runtime prints right after them. Works on
/// raw chunks, so the hint may sit on any line of the chunk.
#[derive(Debug, Clone)]
pub struct BenignNoticeFilter {
    patterns: RegexSet,
}

impl BenignNoticeFilter {
    pub fn new() -> Self {
        let patterns = RegexSet::new([
            r"DeprecationWarning",
            r"(?m)^\s*\(Use `\S+ --trace-(deprecation|warnings) \.\.\.`",
        ])
        .unwrap_or_else(|_| RegexSet::empty());
        Self { patterns }
    }

    pub fn is_benign(&self, chunk: &str) -> bool {
        self.patterns.is_match(chunk)
    }
}

impl Default for BenignNoticeFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowMachine {
    state: WorkflowState,
    filter: BenignNoticeFilter,
}

impl WorkflowMachine {
    pub fn new() -> Self {
        Self::with_filter(BenignNoticeFilter::new())
    }

    pub fn with_filter(filter: BenignNoticeFilter) -> Self {
        Self {
            state: WorkflowState::TrialRunning,
            filter,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// True once a verdict has been reached.
    pub fn is_decided(&self) -> bool {
        self.state != WorkflowState::TrialRunning
    }

    /// Feed one event. Only the first verdict counts; anything after it is
    /// ignored.
    pub fn handle(&mut self, event: WorkflowEvent) -> Vec<WorkflowAction> {
        if self.state != WorkflowState::TrialRunning {
            debug!(state = ?self.state, ?event, "ignoring trial event after verdict");
            return Vec::new();
        }

        match event {
            WorkflowEvent::StderrLine(line) if self.filter.is_benign(&line) => {
                debug!(%line, "ignoring benign stderr notice from trial");
                Vec::new()
            }
            WorkflowEvent::StderrLine(line) => {
                self.state = WorkflowState::Aborting;
                vec![
                    WorkflowAction::ReportStderr(line),
                    WorkflowAction::TerminateTrial,
                    WorkflowAction::MarkFailed("trial server wrote to stderr".to_string()),
                ]
            }
            WorkflowEvent::StdoutReady(_) => {
                self.state = WorkflowState::Promoting;
                vec![WorkflowAction::TerminateTrial, WorkflowAction::SpawnDetached]
            }
            WorkflowEvent::TrialExited => {
                self.state = WorkflowState::Aborting;
                vec![WorkflowAction::MarkFailed(
                    "trial server exited before reporting ready".to_string(),
                )]
            }
        }
    }

    /// Move a decided machine to `Done`.
    pub fn finish(&mut self) {
        if self.is_decided() {
            self.state = WorkflowState::Done;
        }
    }
}

impl Default for WorkflowMachine {
    fn default() -> Self {
        Self::new()
    }
}
