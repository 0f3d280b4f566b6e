// src/shutdown/mod.rs

//! Graceful shutdown handshake.
//!
//! Two halves:
//! - [`sentinel`]: a marker file the server polls; its presence means "stop".
//! - [`probe`]: a deadline-bounded GET on the server's shutdown-check
//!   endpoint, telling the controller whether the server acknowledged.
//!
//! [`request_shutdown`] combines them and guarantees the marker is gone when
//! it returns.

pub mod probe;
pub mod sentinel;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::context::ControllerContext;
use crate::fs::FileSystem;
use crate::supervisor::Supervisor;

pub use probe::{HttpProbe, ProbeOutcome, ShutdownProbe};
pub use sentinel::SentinelGuard;

/// Path of the shutdown-check endpoint on the managed server.
pub const SHUTDOWN_CHECK_PATH: &str = "/test-shutdown";

/// Successful handshake results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReport {
    /// The server answered the probe.
    Acknowledged,
    /// The server could not be reached at all; it was already down.
    AlreadyStopped,
}

#[derive(Error, Debug)]
pub enum ShutdownError {
    #[error("Server is unresponsive: no answer from {url} within {timeout_ms}ms")]
    Unresponsive { url: String, timeout_ms: u128 },

    #[error("Server rejected shutdown: {url} answered HTTP {status}")]
    Rejected { url: String, status: u16 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Ask the managed server to stop.
///
/// 1. Create the sentinel.
/// 2. Probe `SHUTDOWN_CHECK_PATH` with the configured deadline.
/// 3. Remove the sentinel (whatever the outcome).
/// 4. On success under a production profile, tell the supervisor to stop
///    the service too. That last step is best-effort.
pub async fn request_shutdown(
    ctx: &ControllerContext,
    fs: &dyn FileSystem,
    probe: &dyn ShutdownProbe,
    supervisor: &dyn Supervisor,
) -> Result<ShutdownReport, ShutdownError> {
    let url = ctx.address.endpoint(SHUTDOWN_CHECK_PATH).map_err(anyhow::Error::from)?;
    let deadline = ctx.config.shutdown_timeout();

    let sentinel = SentinelGuard::arm(fs, &ctx.paths.sentinel)?;
    info!(url = %url, timeout_ms = deadline.as_millis(), "requesting shutdown");

    let outcome = probe.probe(&url, deadline).await;
    sentinel.clear()?;

    let report = match outcome {
        ProbeOutcome::Acknowledged => {
            info!("server acknowledged shutdown");
            ShutdownReport::Acknowledged
        }
        ProbeOutcome::ConnectionRefused => {
            info!("server is not reachable; treating it as already stopped");
            ShutdownReport::AlreadyStopped
        }
        ProbeOutcome::TimedOut => {
            return Err(ShutdownError::Unresponsive {
                url: url.to_string(),
                timeout_ms: deadline.as_millis(),
            });
        }
        ProbeOutcome::Rejected { status } => {
            warn!(status, "server answered the shutdown probe with an error status");
            return Err(ShutdownError::Rejected {
                url: url.to_string(),
                status,
            });
        }
    };

    if ctx.is_production() {
        if let Err(e) = supervisor.stop().await {
            error!(error = %e, "supervisor stop failed");
        }
    }

    Ok(report)
}
