//! Failure modes that are allowed to propagate out of the runtime, as
//! opposed to the textual `ERROR: ...` results operations return for
//! user-visible validation failures (`spec.md` §7).

use thiserror::Error;

/// Errors that abort a `Scheduler::run` loop. Every other failure surfaces
/// as a string inside an `ExecutionRecord` and the tick continues.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to persist tick {tick}: {source}")]
    PersistTick {
        tick: u64,
        #[source]
        source: o_system::VfsError,
    },
    #[error("filesystem error: {0}")]
    Vfs(#[from] o_system::VfsError),
}
