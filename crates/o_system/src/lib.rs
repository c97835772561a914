//! Platform IO and concurrency services for the o runtime.
//!
//! Trimmed down from `logicaffeine-system`'s feature-gated, multi-target
//! surface to exactly what a native tokio daemon needs: a sandboxed async
//! `Vfs`, cooperative task spawning, a cancellation signal, and a clock.
//! See `DESIGN.md` for the dependency families dropped in the trim
//! (networking, mmap persistence, rayon, WASM/OPFS).

pub mod cancellation;
pub mod clock;
pub mod concurrency;
pub mod fs;

pub use cancellation::Cancellation;
pub use clock::{Clock, SystemClock};
pub use concurrency::{spawn, TaskHandle};
pub use fs::{DirEntry, NativeVfs, Vfs, VfsError, VfsResult};
