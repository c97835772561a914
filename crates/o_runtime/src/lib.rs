//! World mutators, operations, condition evaluator, dispatcher, and
//! scheduler for the o runtime. Ties `o_data`'s pure world model to
//! `o_system`'s IO/concurrency primitives and `o_grammar`'s parser.

pub mod dispatcher;
pub mod error;
pub mod eval;
pub mod operations;
pub mod provider;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod test_support;

pub use dispatcher::Dispatcher;
pub use error::RuntimeError;
pub use eval::evaluate;
pub use operations::{check_and_consume, OpContext, Operation};
pub use provider::{ChannelOutput, ChannelSubstrate, NullChannelSubstrate, NullThinker, ThinkContext, Thinker};
pub use scheduler::Scheduler;
pub use store::{PublishError, Store, WakeFile};
