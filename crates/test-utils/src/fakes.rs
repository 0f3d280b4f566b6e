#![allow(dead_code)]

//! In-memory stand-ins for the controller's external collaborators.
//!
//! Every fake is `Clone` and shares its recording state between clones, so a
//! test can box one copy into `Services` and keep another for assertions.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use reqwest::Url;
use tokio::sync::mpsc;

use servectl::bundle::{BundleRequest, Bundler};
use servectl::exec::CommandOutput;
use servectl::fs::FileSystem;
use servectl::launch::{LaunchSpec, Launcher, MonitoredTrial, TrialControl, TrialOutput};
use servectl::shutdown::{ProbeOutcome, ShutdownProbe};
use servectl::supervisor::Supervisor;
use servectl::types::BoxFuture;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// Everything a [`FakeLauncher`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    Detached(LaunchSpec),
    Monitored(LaunchSpec),
    TrialTerminated,
    TrialDisowned,
    KillAll(String),
}

/// Launcher that never spawns a process.
///
/// `spawn_monitored` replays a scripted list of output lines. Once the script
/// is exhausted the output channel closes, as if the trial had exited, unless
/// [`FakeLauncher::hold_trial_open`] was called.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    events: Arc<Mutex<Vec<LaunchEvent>>>,
    script: Arc<Mutex<Vec<TrialOutput>>>,
    open_senders: Arc<Mutex<Vec<mpsc::Sender<TrialOutput>>>>,
    hold_open: bool,
    fail_detached: bool,
    fail_monitored: bool,
    kill_output: Option<CommandOutput>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trial_output(self, lines: Vec<TrialOutput>) -> Self {
        *lock(&self.script) = lines;
        self
    }

    pub fn hold_trial_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn failing_detached(mut self) -> Self {
        self.fail_detached = true;
        self
    }

    pub fn failing_monitored(mut self) -> Self {
        self.fail_monitored = true;
        self
    }

    /// Make `kill_all` return a command result with this exit code.
    pub fn with_kill_exit_code(mut self, code: i32) -> Self {
        self.kill_output = Some(CommandOutput {
            code: Some(code),
            stdout: String::new(),
            stderr: if code == 0 {
                String::new()
            } else {
                "no process found".to_string()
            },
        });
        self
    }

    pub fn events(&self) -> Vec<LaunchEvent> {
        lock(&self.events).clone()
    }

    pub fn detached_spawns(&self) -> Vec<LaunchSpec> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LaunchEvent::Detached(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    pub fn trial_terminated(&self) -> bool {
        self.events().contains(&LaunchEvent::TrialTerminated)
    }

    fn record(&self, event: LaunchEvent) {
        lock(&self.events).push(event);
    }
}

impl Launcher for FakeLauncher {
    fn spawn_detached<'a>(&'a self, spec: &'a LaunchSpec) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.fail_detached {
                bail!("fake detached spawn failed for {}", spec.program);
            }
            self.record(LaunchEvent::Detached(spec.clone()));
            Ok(())
        })
    }

    fn spawn_monitored(&self, spec: &LaunchSpec) -> Result<MonitoredTrial> {
        if self.fail_monitored {
            bail!("fake monitored spawn failed for {}", spec.program);
        }
        self.record(LaunchEvent::Monitored(spec.clone()));

        let script = lock(&self.script).clone();
        let (tx, rx) = mpsc::channel(script.len().max(1));
        for line in script {
            tx.try_send(line)
                .map_err(|e| anyhow!("fake trial script overflow: {e}"))?;
        }
        if self.hold_open {
            lock(&self.open_senders).push(tx);
        }

        Ok(MonitoredTrial {
            output: rx,
            control: Box::new(FakeTrial {
                events: Arc::clone(&self.events),
            }),
        })
    }

    fn kill_all<'a>(&'a self, image: &'a str) -> BoxFuture<'a, Result<CommandOutput>> {
        Box::pin(async move {
            self.record(LaunchEvent::KillAll(image.to_string()));
            match &self.kill_output {
                Some(output) => Ok(output.clone()),
                None => bail!("fake kill_all: no such command"),
            }
        })
    }
}

struct FakeTrial {
    events: Arc<Mutex<Vec<LaunchEvent>>>,
}

impl TrialControl for FakeTrial {
    fn id(&self) -> Option<u32> {
        Some(4242)
    }

    fn terminate(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            lock(&self.events).push(LaunchEvent::TrialTerminated);
            Ok(())
        })
    }

    fn disown(self: Box<Self>) {
        lock(&self.events).push(LaunchEvent::TrialDisowned);
    }
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// Supervisor that records `start`/`stop`/`delete` calls.
#[derive(Debug, Clone, Default)]
pub struct FakeSupervisor {
    calls: Arc<Mutex<Vec<&'static str>>>,
    failing: HashSet<&'static str>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given call (`"start"`, `"stop"` or `"delete"`) fail.
    pub fn failing_on(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    fn call(&self, name: &'static str) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            lock(&self.calls).push(name);
            if self.failing.contains(name) {
                bail!("fake supervisor {name} failed");
            }
            Ok(())
        })
    }
}

impl Supervisor for FakeSupervisor {
    fn start(&self) -> BoxFuture<'_, Result<()>> {
        self.call("start")
    }

    fn stop(&self) -> BoxFuture<'_, Result<()>> {
        self.call("stop")
    }

    fn delete(&self) -> BoxFuture<'_, Result<()>> {
        self.call("delete")
    }
}

// ---------------------------------------------------------------------------
// Bundler
// ---------------------------------------------------------------------------

/// Bundler that records requests instead of running esbuild.
#[derive(Debug, Clone, Default)]
pub struct FakeBundler {
    requests: Arc<Mutex<Vec<(BundleRequest, PathBuf)>>>,
    fail: bool,
    observe: Option<(Arc<dyn FileSystem>, PathBuf)>,
    observed: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl FakeBundler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// On every call, record the entries of `dir` as seen at that moment.
    pub fn observing(mut self, fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        self.observe = Some((fs, dir.into()));
        self
    }

    pub fn requests(&self) -> Vec<(BundleRequest, PathBuf)> {
        lock(&self.requests).clone()
    }

    /// Directory listings captured by [`FakeBundler::observing`].
    pub fn observed(&self) -> Vec<Vec<PathBuf>> {
        lock(&self.observed).clone()
    }
}

impl Bundler for FakeBundler {
    fn bundle<'a>(&'a self, request: &'a BundleRequest, cwd: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some((fs, dir)) = &self.observe {
                let listing = fs.read_dir(dir)?;
                lock(&self.observed).push(listing);
            }
            lock(&self.requests).push((request.clone(), cwd.to_path_buf()));
            if self.fail {
                bail!("fake bundler failed");
            }
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Shutdown probe
// ---------------------------------------------------------------------------

/// One recorded probe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCall {
    pub url: Url,
    pub deadline: Duration,
    /// Whether the sentinel existed while the probe ran (only tracked when
    /// the probe was built with [`ScriptedProbe::watching_sentinel`]).
    pub sentinel_present: Option<bool>,
}

/// Probe that returns a fixed outcome without touching the network.
#[derive(Debug, Clone)]
pub struct ScriptedProbe {
    outcome: ProbeOutcome,
    calls: Arc<Mutex<Vec<ProbeCall>>>,
    sentinel: Option<(Arc<dyn FileSystem>, PathBuf)>,
    consume_sentinel: bool,
}

impl ScriptedProbe {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            calls: Arc::default(),
            sentinel: None,
            consume_sentinel: false,
        }
    }

    pub fn watching_sentinel(mut self, fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        self.sentinel = Some((fs, path.into()));
        self
    }

    /// Delete the sentinel during the probe, the way a server that noticed
    /// it would.
    pub fn consuming_sentinel(mut self) -> Self {
        self.consume_sentinel = true;
        self
    }

    pub fn calls(&self) -> Vec<ProbeCall> {
        lock(&self.calls).clone()
    }
}

impl ShutdownProbe for ScriptedProbe {
    fn probe<'a>(&'a self, url: &'a Url, deadline: Duration) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            let sentinel_present = self.sentinel.as_ref().map(|(fs, path)| {
                let present = fs.exists(path);
                if present && self.consume_sentinel {
                    let _ = fs.remove_file(path);
                }
                present
            });
            lock(&self.calls).push(ProbeCall {
                url: url.clone(),
                deadline,
                sentinel_present,
            });
            self.outcome.clone()
        })
    }
}
