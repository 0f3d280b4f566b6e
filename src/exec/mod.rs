// src/exec/mod.rs

//! Subprocess helpers shared by the supervisor adapter, the launchers and the
//! bundler.
//!
//! - [`shell`] runs one-shot commands to completion and captures their output.

pub mod shell;

pub use shell::{CommandOutput, echo_output, run_captured};
