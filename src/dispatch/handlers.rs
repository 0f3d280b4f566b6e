// src/dispatch/handlers.rs

//! One function per verb.
//!
//! Each returns `Err` when the verb failed; the dispatcher turns that into a
//! failed outcome and moves on to the next verb.

use anyhow::{Result, bail};
use tracing::{error, info};

use super::Services;
use crate::bundle::{self, BuildReport};
use crate::context::ControllerContext;
use crate::exec::echo_output;
use crate::launch::LaunchSpec;
use crate::shutdown::{self, ShutdownReport};
use crate::workflow::{self, WorkflowOutcome};

/// `start`: hand the app to the supervisor in production, otherwise launch a
/// detached instance ourselves.
pub async fn start(ctx: &ControllerContext, services: &Services) -> Result<()> {
    if ctx.is_production() {
        info!("production profile; delegating start to the supervisor");
        return services.supervisor.start().await;
    }

    let spec = LaunchSpec::from_context(ctx);
    services.launcher.spawn_detached(&spec).await
}

/// `stop`: graceful shutdown handshake.
pub async fn stop(ctx: &ControllerContext, services: &Services) -> Result<()> {
    let report = shutdown::request_shutdown(
        ctx,
        services.fs.as_ref(),
        services.probe.as_ref(),
        services.supervisor.as_ref(),
    )
    .await?;

    match report {
        ShutdownReport::Acknowledged => info!("server shut down"),
        ShutdownReport::AlreadyStopped => info!("server was already stopped"),
    }
    Ok(())
}

/// `build`: reset the output directory and run the bundler.
pub async fn build(ctx: &ControllerContext, services: &Services) -> Result<()> {
    let report =
        bundle::build(ctx, services.fs.as_ref(), services.bundler.as_ref()).await?;
    if let BuildReport::Bundled { entries } = report {
        info!(entries, "bundle written");
    }
    Ok(())
}

/// `kill`: forget the app in the supervisor, then kill every process of the
/// runtime's image. Best-effort; never fails.
pub async fn kill(ctx: &ControllerContext, services: &Services) -> Result<()> {
    if let Err(e) = services.supervisor.delete().await {
        error!(error = %e, "supervisor delete failed");
    }

    let image = ctx.config.runtime.as_str();
    match services.launcher.kill_all(image).await {
        Ok(output) => {
            echo_output(&output);
            if !output.success() {
                error!(image, exit_code = ?output.code, stderr = %output.stderr.trim(), "forced kill reported failure");
            }
        }
        Err(e) => error!(image, error = %e, "forced kill failed"),
    }
    Ok(())
}

/// `workflow`: trial run, then promote or abort.
pub async fn workflow(ctx: &ControllerContext, services: &Services) -> Result<()> {
    let spec = LaunchSpec::from_context(ctx);
    match workflow::run(services.launcher.as_ref(), &spec).await? {
        WorkflowOutcome::Promoted => {
            info!("workflow promoted a detached server instance");
            Ok(())
        }
        WorkflowOutcome::Aborted { reason } => bail!("workflow aborted: {reason}"),
    }
}
