// src/dispatch/mod.rs

//! Verb dispatcher.
//!
//! Runs the verbs from the command line strictly in order. A failing verb is
//! logged and recorded; it never prevents the following verbs from running.
//! The aggregated result decides the process exit code.

pub mod handlers;

use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use crate::bundle::{Bundler, EsbuildBundler};
use crate::context::ControllerContext;
use crate::fs::FileSystem;
use crate::launch::{self, Launcher};
use crate::shutdown::{HttpProbe, ShutdownProbe};
use crate::supervisor::{Pm2Supervisor, Supervisor};
use crate::types::{CommandOutcome, Verb};

/// External collaborators the verbs act on.
pub struct Services {
    pub fs: Arc<dyn FileSystem>,
    pub launcher: Box<dyn Launcher>,
    pub supervisor: Box<dyn Supervisor>,
    pub probe: Box<dyn ShutdownProbe>,
    pub bundler: Box<dyn Bundler>,
}

impl Services {
    /// Production wiring for the context's platform.
    pub fn for_context(ctx: &ControllerContext, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            launcher: launch::for_platform(ctx.platform),
            supervisor: Box::new(Pm2Supervisor::from_context(ctx)),
            probe: Box::new(HttpProbe::new()),
            bundler: Box::new(EsbuildBundler::new(ctx.platform)),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("fs", &self.fs)
            .finish_non_exhaustive()
    }
}

/// Per-verb results of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub results: Vec<(Verb, CommandOutcome)>,
}

impl RunSummary {
    pub fn failed(&self) -> bool {
        self.results
            .iter()
            .any(|(_, outcome)| *outcome == CommandOutcome::Failed)
    }

    /// 0 when every verb succeeded, 1 otherwise.
    pub fn exit_status(&self) -> u8 {
        if self.failed() { 1 } else { 0 }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    ctx: ControllerContext,
    services: Services,
}

impl Dispatcher {
    pub fn new(ctx: ControllerContext, services: Services) -> Self {
        Self { ctx, services }
    }

    /// Run every verb in order and collect the outcomes.
    pub async fn run(&self, verbs: &[Verb]) -> RunSummary {
        let mut summary = RunSummary::default();
        for &verb in verbs {
            let outcome = self.execute(verb).await;
            summary.results.push((verb, outcome));
        }
        info!(
            verbs = verbs.len(),
            failed = summary.failed(),
            "all commands finished"
        );
        summary
    }

    /// Run one verb, recovering any error at this boundary.
    pub async fn execute(&self, verb: Verb) -> CommandOutcome {
        info!(command = %verb, "running command");

        let result = match verb {
            Verb::Start => handlers::start(&self.ctx, &self.services).await,
            Verb::Stop => handlers::stop(&self.ctx, &self.services).await,
            Verb::Build => handlers::build(&self.ctx, &self.services).await,
            Verb::Kill => handlers::kill(&self.ctx, &self.services).await,
            Verb::Workflow => handlers::workflow(&self.ctx, &self.services).await,
        };

        match result {
            Ok(()) => {
                info!(command = %verb, "command succeeded");
                CommandOutcome::Success
            }
            Err(e) => {
                let message = format!("{e:#}");
                error!(command = %verb, error = %message, "command failed");
                CommandOutcome::Failed
            }
        }
    }
}
