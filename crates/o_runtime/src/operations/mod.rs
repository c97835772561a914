//! The closed, small set of operations dispatched by command name
//! (`spec.md` §4.3). Modeled as a table keyed by name to a handler value
//! rather than an open class hierarchy, per `spec.md` §9.

mod echo;
mod incoming;
mod listen;
mod name;
mod publish;
mod read;
mod say;
mod spawn;
mod stdout;
mod up;
mod wake;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use o_data::{Command, World};
use o_system::Clock;

use crate::dispatcher::Dispatcher;
use crate::store::Store;

pub use wake::check_and_consume;

/// Everything an operation needs besides the parsed `Command` itself.
/// Borrowed fresh for each dispatch; never stored.
pub struct OpContext<'a> {
    pub world: &'a mut World,
    pub store: &'a Store,
    pub clock: &'a dyn Clock,
    pub dispatcher: &'a Dispatcher,
}

/// A side-effecting command handler. `(Command, executor, World, Mind)`
/// from `spec.md` §4.3, with `World` and `Mind` (the dispatcher) folded
/// into `OpContext`.
///
/// Implementations never unwind: a user-visible failure is communicated by
/// returning a string beginning with `ERROR`, never by panicking or
/// returning a `Result`.
#[async_trait]
pub trait Operation: Send + Sync {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String;
}

/// Builds the name -> operation table used by every `Dispatcher`.
pub fn build_table() -> HashMap<String, Arc<dyn Operation>> {
    let mut table: HashMap<String, Arc<dyn Operation>> = HashMap::new();
    table.insert("echo".into(), Arc::new(echo::Echo));
    table.insert("up".into(), Arc::new(up::Up));
    table.insert("spawn".into(), Arc::new(spawn::Spawn));
    table.insert("name".into(), Arc::new(name::Name));
    table.insert("say".into(), Arc::new(say::Say));
    table.insert("listen".into(), Arc::new(listen::Listen));
    table.insert("read".into(), Arc::new(read::Read));
    table.insert("incoming".into(), Arc::new(incoming::Incoming));
    table.insert("wake".into(), Arc::new(wake::Wake));
    table.insert("publish".into(), Arc::new(publish::Publish));
    table.insert("stdout".into(), Arc::new(stdout::Stdout));
    table.insert("eval".into(), Arc::new(crate::eval::Eval));
    table
}

/// Shared target-extraction helper: entity/space refs resolved to their
/// sigiled form (`@name` / `#name`), in surface order.
pub(crate) fn entity_targets(cmd: &Command) -> Vec<String> {
    cmd.entity_refs().into_iter().map(|n| format!("@{n}")).collect()
}

pub(crate) fn space_targets(cmd: &Command) -> Vec<String> {
    cmd.space_refs().into_iter().map(|n| format!("#{n}")).collect()
}
