// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `servectl`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "servectl",
    version,
    about = "Start, stop, build, kill and validate a long-running server process.",
    long_about = None
)]
pub struct CliArgs {
    /// Commands to run, in order: start, stop, build, kill, workflow.
    ///
    /// Unknown words are ignored.
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,

    /// Path to the config file (JSON).
    ///
    /// The directory containing it is treated as the project root.
    #[arg(long, value_name = "PATH", default_value = "config.json")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SERVECTL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve configuration and print the plan, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
