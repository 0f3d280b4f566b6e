// src/launch/trial.rs

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{TrialControl, TrialOutput};
use crate::types::BoxFuture;

/// [`TrialControl`] over a real `tokio::process::Child`.
#[derive(Debug)]
pub struct TokioTrial {
    child: Child,
}

impl TokioTrial {
    pub fn new(child: Child) -> Self {
        Self { child }
    }
}

impl TrialControl for TokioTrial {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn terminate(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let pid = self.child.id();
            match self.child.kill().await {
                Ok(()) => {
                    debug!(?pid, "trial process terminated");
                    Ok(())
                }
                // Already exited and reaped.
                Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
                Err(e) => Err(e).with_context(|| format!("killing trial process {pid:?}")),
            }
        })
    }

    fn disown(self: Box<Self>) {
        // Dropping a Child without `kill_on_drop` leaves the process running.
        debug!(pid = ?self.child.id(), "disowning trial process");
    }
}

/// Forward every chunk read from `stdout` and `stderr` into one channel.
///
/// Output is not split into lines: a chunk is whatever one read returned,
/// decoded lossily, so a banner without a trailing newline or bytes that are
/// not UTF-8 still reach the receiver. The channel closes once both readers
/// have hit EOF or a read error (or the receiver side was dropped).
pub fn spawn_output_readers(
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
) -> mpsc::Receiver<TrialOutput> {
    let (tx, rx) = mpsc::channel::<TrialOutput>(64);

    match stdout {
        Some(stdout) => spawn_chunk_reader(stdout, tx.clone(), TrialOutput::Stdout, "stdout"),
        None => warn!("trial process has no stdout pipe"),
    }
    match stderr {
        Some(stderr) => spawn_chunk_reader(stderr, tx, TrialOutput::Stderr, "stderr"),
        None => warn!("trial process has no stderr pipe"),
    }

    rx
}

const READ_CHUNK_SIZE: usize = 8 * 1024;

fn spawn_chunk_reader<R>(
    mut stream: R,
    tx: mpsc::Sender<TrialOutput>,
    wrap: fn(String) -> TrialOutput,
    name: &'static str,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; READ_CHUNK_SIZE];

        loop {
            let n = match stream.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!(stream = name, error = %e, "reading trial output failed");
                    break;
                }
            };

            let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
            debug!(stream = name, bytes = n, "trial: {}", chunk.trim_end());
            if tx.send(wrap(chunk)).await.is_err() {
                break;
            }
        }

        debug!(stream = name, "trial stream monitor ended");
    });
}
