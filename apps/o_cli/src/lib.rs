//! Process entry point for the `o` tick-driven entity runtime.
//!
//! Wires the library crates together — `o_data`'s world model, `o_system`'s
//! VFS and cancellation primitives, `o_runtime`'s scheduler — into a single
//! long-running binary per `spec.md` §6's "Process surface": tick interval,
//! max-ticks, state directory, memory directory, graceful shutdown on
//! SIGINT/SIGTERM.
//!
//! No concrete inference provider lives here (out of scope per `spec.md`
//! §1); the binary runs [`o_runtime::NullThinker`] and
//! [`o_runtime::NullChannelSubstrate`], making it useful for bootstrap,
//! smoke-testing the persisted directory layout, and as a template for a
//! binary that substitutes a real provider.

pub mod cli;

use std::sync::Arc;

use o_runtime::{NullChannelSubstrate, NullThinker, RuntimeError, Scheduler};
use o_system::{Cancellation, NativeVfs, SystemClock};

pub use cli::{Args, ArgsError, RunConfig};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Parses arguments, sets up tracing, and runs the scheduler to completion
/// (cancellation or `max_ticks` exhaustion). Returns `Err` only for
/// initialization or persistence failures (`spec.md` §7 `FatalError`) —
/// a clean cancellation is `Ok(())`.
pub async fn run() -> Result<(), CliError> {
    init_tracing();

    let args = <Args as clap::Parser>::parse();
    let config = args.into_config()?;

    tracing::info!(
        tick_interval = ?config.tick_interval,
        max_ticks = ?config.max_ticks,
        state_dir = %config.state_dir.display(),
        memory_dir = %config.memory_dir.display(),
        output_dir = %config.output_dir.display(),
        "starting runtime"
    );

    let store = o_runtime::Store::new(
        Arc::new(NativeVfs::new(config.state_dir)),
        Arc::new(NativeVfs::new(config.memory_dir)),
        Arc::new(NativeVfs::new(config.output_dir)),
    );

    let mut scheduler = Scheduler::new(
        store,
        Arc::new(SystemClock),
        Arc::new(NullThinker),
        Arc::new(NullChannelSubstrate),
    )
    .with_tick_interval(config.tick_interval);

    let cancellation = Cancellation::new();
    spawn_signal_watcher(cancellation.clone());

    scheduler.run(&cancellation, config.max_ticks).await?;

    tracing::info!(clock = scheduler.world().clock, "runtime stopped");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{filter::EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();
}

/// Requests cancellation on SIGINT or (on unix) SIGTERM, matching
/// `spec.md` §6's "Signals SIGINT/SIGTERM trigger graceful shutdown".
fn spawn_signal_watcher(cancellation: Cancellation) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to install SIGTERM handler");
                    let _ = tokio::signal::ctrl_c().await;
                    cancellation.cancel();
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("shutdown signal received, finishing in-flight tick");
        cancellation.cancel();
    });
}
