use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use tokio::process::Command;

/// Boxed, sendable future used at the trait seams (launcher, supervisor,
/// bundler, probe) so they stay object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single verb from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Start,
    Stop,
    Build,
    Kill,
    Workflow,
}

impl Verb {
    /// Parse every recognised verb from the raw positional arguments, keeping
    /// their order. Unknown words are dropped.
    pub fn parse_all<S: AsRef<str>>(args: &[S]) -> Vec<Verb> {
        args.iter()
            .filter_map(|arg| match Verb::from_str(arg.as_ref()) {
                Ok(verb) => Some(verb),
                Err(e) => {
                    tracing::debug!(arg = %arg.as_ref(), reason = %e, "ignoring argument");
                    None
                }
            })
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Start => "start",
            Verb::Stop => "stop",
            Verb::Build => "build",
            Verb::Kill => "kill",
            Verb::Workflow => "workflow",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "start" => Ok(Verb::Start),
            "stop" => Ok(Verb::Stop),
            "build" => Ok(Verb::Build),
            "kill" => Ok(Verb::Kill),
            "workflow" => Ok(Verb::Workflow),
            other => Err(format!(
                "unknown command: {other} (expected start, stop, build, kill or workflow)"
            )),
        }
    }
}

/// Outcome of one verb, as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    Failed,
}

/// Host platform family. Decides which launch strategy is used and how
/// `npx` is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Build an `npx <args..>` command. On Windows `npx` is a `.cmd` shim and
    /// has to go through `cmd /C`.
    pub fn npx_command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut c = match self {
            Platform::Windows => {
                let mut c = Command::new("cmd");
                c.arg("/C").arg("npx");
                c
            }
            Platform::Unix => Command::new("npx"),
        };
        c.args(args);
        c
    }
}
