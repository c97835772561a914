//! `\read ---` / `\read @bob ---` / `\read #general ---` -> returns the
//! messages the executor hasn't yet read, advancing its read cursor
//! (`original_source/interactors/read.py`). Complements `\incoming`, which
//! only answers "are there any?" without consuming them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use o_data::{canonical_pair_space_id, Command};

use super::{entity_targets, space_targets, OpContext, Operation};

fn resolve_space_id(executor: &str, target: &str) -> Option<String> {
    if let Some(peer) = target.strip_prefix('@') {
        Some(canonical_pair_space_id([
            executor.to_string(),
            format!("@{peer}"),
        ]))
    } else if target.starts_with('#') {
        Some(target.to_string())
    } else {
        None
    }
}

pub struct Read;

#[async_trait]
impl Operation for Read {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(executor) = executor else {
            return "ERROR: Read requires executor context".to_string();
        };

        let mut targets = entity_targets(cmd);
        targets.extend(space_targets(cmd));

        let mut space_ids: Vec<String> = if targets.is_empty() {
            ctx.world.spaces_of(executor).into_iter().collect()
        } else {
            let mut ids: Vec<String> = targets
                .iter()
                .filter_map(|t| resolve_space_id(executor, t))
                .collect();
            ids.sort();
            ids.dedup();
            ids
        };
        space_ids.sort();

        if space_ids.is_empty() {
            return "No subscribed spaces".to_string();
        }

        let mut lines = Vec::new();
        for space_id in &space_ids {
            let start = ctx.world.read_cursor_of(executor, space_id);
            if let Some(log) = ctx.world.space_log.get(space_id) {
                for message in log.iter().skip(start) {
                    lines.push(format!("[{space_id}] {}: {}", message.sender, message.content));
                }
            }
            let total = ctx.world.log_len(space_id);
            ctx.world.set_read_cursor(executor, space_id, total);
        }

        // Persist the entity's full cursor map, not just the spaces scanned
        // this call, so a filtered `\read @bob ---` doesn't clobber other
        // spaces' last-read counts on disk (original_source/interactors/read.py
        // load-merges via `new_state = dict(state)`).
        let cursors: BTreeMap<String, usize> = ctx
            .world
            .read_cursor
            .get(executor)
            .map(|m| m.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();

        if let Err(e) = ctx.store.save_read(executor, &cursors).await {
            return format!("ERROR: Failed to persist read cursor: {e}");
        }

        if lines.is_empty() {
            "No new messages".to_string()
        } else {
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn reads_unread_messages_then_reports_none() {
        let mut h = harness().await;
        h.dispatch("\\say @bob hello ---", Some("@alice")).await;
        let out = h.dispatch("\\read @bob ---", Some("@alice")).await;
        assert_eq!(out, "[@alice-@bob] @alice: hello");

        let out = h.dispatch("\\read @bob ---", Some("@alice")).await;
        assert_eq!(out, "No new messages");
    }

    #[tokio::test]
    async fn filtered_read_does_not_clobber_other_spaces_persisted_cursor() {
        use std::sync::Arc;

        use o_data::World;
        use o_system::{NativeVfs, SystemClock};

        use crate::dispatcher::Dispatcher;
        use crate::store::Store;

        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(
            Arc::new(NativeVfs::new(dir.path().join("state"))),
            Arc::new(NativeVfs::new(dir.path().join("memory"))),
            Arc::new(NativeVfs::new(dir.path().join("output"))),
        );
        let mut world = World::new();
        let dispatcher = Dispatcher::new();
        let clock = Arc::new(SystemClock);

        dispatcher
            .dispatch("\\say @bob hi ---", Some("@alice"), &mut world, &store, clock.as_ref())
            .await;
        dispatcher
            .dispatch("\\say @carol hi ---", Some("@alice"), &mut world, &store, clock.as_ref())
            .await;

        // Reads everything once, populating both spaces' cursors on disk.
        dispatcher
            .dispatch("\\read ---", Some("@alice"), &mut world, &store, clock.as_ref())
            .await;

        // A filtered read of just @bob must not drop @carol's entry from
        // the persisted `memory/read/alice.json` map.
        dispatcher
            .dispatch("\\say @bob again ---", Some("@alice"), &mut world, &store, clock.as_ref())
            .await;
        dispatcher
            .dispatch("\\read @bob ---", Some("@alice"), &mut world, &store, clock.as_ref())
            .await;

        let path = dir.path().join("memory/read/alice.json");
        let text = std::fs::read_to_string(path).unwrap();
        let persisted: std::collections::BTreeMap<String, usize> = serde_json::from_str(&text).unwrap();
        assert!(persisted.contains_key("@alice-@bob"));
        assert!(persisted.contains_key("@alice-@carol"));
    }

    #[tokio::test]
    async fn reading_with_no_targets_and_no_subscriptions_reports_none_subscribed() {
        let mut h = harness().await;
        let out = h.dispatch("\\read ---", Some("@alice")).await;
        assert_eq!(out, "No subscribed spaces");
    }

    #[tokio::test]
    async fn missing_executor_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\read ---", None).await;
        assert_eq!(out, "ERROR: Read requires executor context");
    }
}
