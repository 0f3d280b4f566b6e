// src/lib.rs

pub mod bundle;
pub mod cli;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod shutdown;
pub mod supervisor;
pub mod types;
pub mod workflow;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::context::ControllerContext;
use crate::dispatch::{Dispatcher, Services};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::shutdown::SHUTDOWN_CHECK_PATH;
use crate::types::Verb;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - verb parsing
/// - config + deployment profile loading (fatal on error)
/// - platform launcher / supervisor / probe / bundler
/// - the dispatcher, whose summary becomes the exit code
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let verbs = Verb::parse_all(&args.commands);
    let config_path = PathBuf::from(&args.config);

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let ctx = ControllerContext::load(fs.as_ref(), &config_path)?;

    if args.dry_run {
        print_dry_run(&ctx, &verbs);
        return Ok(ExitCode::SUCCESS);
    }

    if verbs.is_empty() {
        info!("no commands given; nothing to do");
        return Ok(ExitCode::SUCCESS);
    }

    let services = Services::for_context(&ctx, fs);
    let dispatcher = Dispatcher::new(ctx, services);
    let summary = dispatcher.run(&verbs).await;
    Ok(summary.exit_code())
}

/// Simple dry-run output: print the resolved context and the verb plan.
fn print_dry_run(ctx: &ControllerContext, verbs: &[Verb]) {
    println!("servectl dry-run");
    println!("  platform = {:?}", ctx.platform);
    println!("  production = {}", ctx.config.production);
    println!("  profile = {}", ctx.profile.name);
    println!("  address = {}", ctx.address);
    println!(
        "  shutdown check = {} (timeout {}ms)",
        ctx.address
            .endpoint(SHUTDOWN_CHECK_PATH)
            .map(|u| u.to_string())
            .unwrap_or_else(|e| format!("<invalid: {e}>")),
        ctx.config.shutdown_timeout_ms
    );
    println!("  root = {}", ctx.paths.root.display());
    println!("  sentinel = {}", ctx.paths.sentinel.display());
    println!("  build output = {}", ctx.paths.dist.display());
    println!(
        "  server = {} {}",
        ctx.config.runtime,
        ctx.paths.entry_point.display()
    );
    println!();

    println!("commands ({}):", verbs.len());
    for verb in verbs {
        println!("  - {verb}");
    }

    debug!("dry-run complete (no execution)");
}
