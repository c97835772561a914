//! Process entry point for the tick-driven entity runtime.
//!
//! Command-line argument parsing for the `omind` binary. Mirrors
//! `logicaffeine_cli`'s use of `clap::Parser` with `derive`: a single flat
//! struct, no subcommands, since the process surface (`spec.md` §6) is one
//! thing — run the scheduler loop against a state/memory/output directory
//! triple.

use std::path::PathBuf;

use clap::Parser;

/// Autonomous tick-driven runtime for entities communicating through a
/// bipartite graph of spaces.
///
/// No concrete inference provider ships with this binary — entities spawned
/// and driven purely through `state`/`memory` bootstrap data will wake (if
/// their conditions are satisfiable without a provider, e.g. `\up---`) but
/// never receive a `think` response, since [`o_runtime::NullThinker`] is
/// wired in by default. Embedding a real provider means depending on this
/// crate's library surface directly rather than invoking this binary.
#[derive(Parser, Debug)]
#[command(name = "omind")]
#[command(about = "Tick-driven cooperative runtime for autonomous entities", long_about = None)]
#[command(version)]
pub struct Args {
    /// Seconds to wait between ticks. Must be positive.
    #[arg(long, default_value_t = 1.0)]
    pub tick_interval: f64,

    /// Number of ticks to run, or "forever" to run until cancelled.
    #[arg(long, default_value = "forever")]
    pub max_ticks: String,

    /// Directory for `logs/log_<tick>.json` (spec.md §6).
    #[arg(long, default_value = "state")]
    pub state_dir: PathBuf,

    /// Directory for `spaces/`, `stdout/`, `listen/`, `incoming/`, `read/`,
    /// `wake/` (spec.md §6).
    #[arg(long, default_value = "memory")]
    pub memory_dir: PathBuf,

    /// Directory `\publish` writes artifacts into (spec.md §6).
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
}

/// A validated, parsed form of [`Args`] ready to hand to the scheduler.
pub struct RunConfig {
    pub tick_interval: std::time::Duration,
    pub max_ticks: Option<u64>,
    pub state_dir: PathBuf,
    pub memory_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("tick-interval must be a positive number of seconds, got {0}")]
    NonPositiveTickInterval(f64),
    #[error("max-ticks must be \"forever\" or a non-negative integer, got \"{0}\"")]
    InvalidMaxTicks(String),
}

impl Args {
    pub fn into_config(self) -> Result<RunConfig, ArgsError> {
        if !self.tick_interval.is_finite() || self.tick_interval <= 0.0 {
            return Err(ArgsError::NonPositiveTickInterval(self.tick_interval));
        }
        let max_ticks = match self.max_ticks.trim().to_lowercase().as_str() {
            "forever" => None,
            other => Some(
                other
                    .parse::<u64>()
                    .map_err(|_| ArgsError::InvalidMaxTicks(self.max_ticks.clone()))?,
            ),
        };
        Ok(RunConfig {
            tick_interval: std::time::Duration::from_secs_f64(self.tick_interval),
            max_ticks,
            state_dir: self.state_dir,
            memory_dir: self.memory_dir,
            output_dir: self.output_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(max_ticks: &str) -> Args {
        Args {
            tick_interval: 1.0,
            max_ticks: max_ticks.to_string(),
            state_dir: "state".into(),
            memory_dir: "memory".into(),
            output_dir: "output".into(),
        }
    }

    #[test]
    fn forever_parses_to_none() {
        let config = args("forever").into_config().unwrap();
        assert_eq!(config.max_ticks, None);
    }

    #[test]
    fn forever_is_case_insensitive() {
        let config = args("FOREVER").into_config().unwrap();
        assert_eq!(config.max_ticks, None);
    }

    #[test]
    fn numeric_max_ticks_parses() {
        let config = args("50").into_config().unwrap();
        assert_eq!(config.max_ticks, Some(50));
    }

    #[test]
    fn negative_max_ticks_is_rejected() {
        let err = args("-1").into_config().unwrap_err();
        assert!(matches!(err, ArgsError::InvalidMaxTicks(_)));
    }

    #[test]
    fn non_positive_tick_interval_is_rejected() {
        let mut a = args("forever");
        a.tick_interval = 0.0;
        assert!(matches!(
            a.into_config().unwrap_err(),
            ArgsError::NonPositiveTickInterval(_)
        ));
    }
}
