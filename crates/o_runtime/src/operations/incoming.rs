//! `\incoming ---` -> `"true"`/`"false"`: has the executor's set of
//! subscribed spaces grown since the last check? Unlike `\read`, this
//! never returns message content and is meant to sit inside a `\wake`
//! condition (`original_source/interactors/incoming.py`).

use async_trait::async_trait;
use o_data::Command;

use super::{OpContext, Operation};

pub struct Incoming;

#[async_trait]
impl Operation for Incoming {
    async fn execute(&self, _cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(executor) = executor else {
            return "ERROR: Incoming requires executor context".to_string();
        };

        let space_ids = ctx.world.spaces_of(executor);
        if space_ids.is_empty() {
            return "false".to_string();
        }

        let mut has_new = false;
        let mut cursors = std::collections::BTreeMap::new();
        for space_id in &space_ids {
            let previous = ctx.world.incoming_cursor_of(executor, space_id);
            let current = ctx.world.log_len(space_id);
            if current > previous {
                has_new = true;
            }
            ctx.world.set_incoming_cursor(executor, space_id, current);
            cursors.insert(space_id.clone(), current);
        }

        if let Err(e) = ctx.store.save_incoming(executor, &cursors).await {
            return format!("ERROR: Failed to persist incoming cursor: {e}");
        }

        if has_new { "true" } else { "false" }.to_string()
    }
}
