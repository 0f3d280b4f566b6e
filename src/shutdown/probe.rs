// src/shutdown/probe.rs

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::types::BoxFuture;

/// Result of one deadline-bounded shutdown probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with a success status.
    Acknowledged,
    /// No answer before the deadline.
    TimedOut,
    /// The request failed at the transport level before any response
    /// arrived (connection refused, reset, DNS failure). The server is
    /// considered already down.
    ConnectionRefused,
    /// The server answered with a non-success status.
    Rejected { status: u16 },
}

/// A single GET against the shutdown-check endpoint, raced against a
/// deadline.
pub trait ShutdownProbe: Send + Sync {
    fn probe<'a>(&'a self, url: &'a Url, deadline: Duration) -> BoxFuture<'a, ProbeOutcome>;
}

/// Production probe backed by `reqwest`.
///
/// The managed server is contacted directly; proxy settings from the
/// environment are ignored.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self::with_client(client)
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownProbe for HttpProbe {
    fn probe<'a>(&'a self, url: &'a Url, deadline: Duration) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            let request = self.client.get(url.clone()).send();

            match tokio::time::timeout(deadline, request).await {
                Err(_elapsed) => ProbeOutcome::TimedOut,
                Ok(Ok(response)) if response.status().is_success() => ProbeOutcome::Acknowledged,
                Ok(Ok(response)) => ProbeOutcome::Rejected {
                    status: response.status().as_u16(),
                },
                Ok(Err(e)) if e.is_timeout() => ProbeOutcome::TimedOut,
                Ok(Err(e)) => {
                    debug!(url = %url, error = %e, "shutdown probe failed before a response");
                    ProbeOutcome::ConnectionRefused
                }
            }
        })
    }
}
