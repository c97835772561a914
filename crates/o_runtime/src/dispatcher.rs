//! The Dispatcher (Mind, C5): parses a command string, looks up the
//! operation by name, and invokes it with executor context. Stateless and
//! reentrant — operations (notably the condition evaluator) call back
//! into it to execute embedded queries, and no per-call state leaks
//! between invocations (`spec.md` §4.5).

use std::collections::HashMap;
use std::sync::Arc;

use o_data::{Command, World};
use o_system::Clock;

use crate::operations::{build_table, OpContext, Operation};
use crate::store::Store;

pub struct Dispatcher {
    operations: HashMap<String, Arc<dyn Operation>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            operations: build_table(),
        }
    }

    /// Parses `text`, looks up `Command.name` in the operation table, and
    /// invokes it. Parse failures and unknown names are converted to
    /// `ERROR: ...` strings rather than propagated (`spec.md` §4.5, §7).
    pub async fn dispatch(
        &self,
        text: &str,
        executor: Option<&str>,
        world: &mut World,
        store: &Store,
        clock: &dyn Clock,
    ) -> String {
        let cmd = match o_grammar::parse(text) {
            Ok(cmd) => cmd,
            Err(e) => return format!("ERROR: {e}"),
        };
        self.dispatch_command(&cmd, executor, world, store, clock).await
    }

    /// Invokes an already-parsed command directly. Used by the condition
    /// evaluator to re-enter dispatch for embedded `$( ... )` queries
    /// without a stringify/reparse round trip, since the query's `Command`
    /// is already sitting in the syntax tree.
    pub async fn dispatch_command(
        &self,
        cmd: &Command,
        executor: Option<&str>,
        world: &mut World,
        store: &Store,
        clock: &dyn Clock,
    ) -> String {
        let Some(operation) = self.operations.get(&cmd.name) else {
            return format!("ERROR: Unknown command '{}'", cmd.name);
        };
        let mut ctx = OpContext {
            world,
            store,
            clock,
            dispatcher: self,
        };
        operation.execute(cmd, executor, &mut ctx).await
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn unknown_command_name_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\never ---", Some("@a")).await;
        assert_eq!(out, "ERROR: Unknown command 'never'");
    }

    #[tokio::test]
    async fn parse_failure_is_converted_to_error_string() {
        let mut h = harness().await;
        let out = h.dispatch("\\echo hi", Some("@a")).await;
        assert!(out.starts_with("ERROR:"));
    }
}
