//! `\say @bob hello ---` / `\say #general hello ---` -> appends a message
//! to one or more spaces (`original_source/interactors/say.py`).
//!
//! Entity targets resolve to the canonical pair-space for
//! `{executor, target}` (created implicitly, never registered in
//! `World::spaces`); named-space targets must already exist and the
//! executor must be a member.

use async_trait::async_trait;
use o_data::{canonical_pair_space_id, Command, Message};

use super::{entity_targets, space_targets, OpContext, Operation};

pub struct Say;

#[async_trait]
impl Operation for Say {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(executor) = executor else {
            return "ERROR: Say requires executor context".to_string();
        };

        let entities = entity_targets(cmd);
        let spaces = space_targets(cmd);
        if entities.is_empty() && spaces.is_empty() {
            return "ERROR: No target specified. Usage: \\say @entity|#space message ---".to_string();
        }

        let message = cmd.text_parts().join(" ").trim().to_string();
        if message.is_empty() {
            return "ERROR: No message content. Usage: \\say @entity|#space message ---".to_string();
        }

        let mut destinations = Vec::new();
        for entity in &entities {
            let pair = canonical_pair_space_id([executor.to_string(), entity.clone()]);
            if !destinations.contains(&pair) {
                destinations.push(pair);
            }
        }
        for space_id in &spaces {
            match ctx.world.spaces.get(space_id) {
                None => return format!("ERROR: Space {space_id} does not exist"),
                Some(data) if !data.members.contains(executor) => {
                    return format!("ERROR: Not a member of {space_id}")
                }
                Some(_) => {}
            }
            if !destinations.contains(space_id) {
                destinations.push(space_id.clone());
            }
        }

        let tick = ctx.world.clock;
        let timestamp = ctx.clock.now_iso8601();
        for dest in &destinations {
            let entry = Message {
                sender: executor.to_string(),
                content: message.clone(),
                tick,
                timestamp: timestamp.clone(),
            };
            ctx.world.append_message(dest, entry.clone());
            if let Err(e) = ctx.store.append_space_message(dest, &entry).await {
                return format!("ERROR: Failed to write to {dest}: {e}");
            }
        }

        if destinations.len() == 1 {
            format!("Sent to {}", destinations[0])
        } else {
            format!("Sent to {}", destinations.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn says_to_an_entity_creates_pair_space() {
        let mut h = harness().await;
        let out = h.dispatch("\\say @bob hello there ---", Some("@alice")).await;
        assert_eq!(out, "Sent to @alice-@bob");
        assert_eq!(h.world.log_len("@alice-@bob"), 1);
    }

    #[tokio::test]
    async fn says_to_a_named_space_requires_membership() {
        let mut h = harness().await;
        h.dispatch("\\name #team @(alice, bob) ---", Some("@alice")).await;
        let out = h.dispatch("\\say #team hi team ---", Some("@alice")).await;
        assert_eq!(out, "Sent to #team");

        let out = h.dispatch("\\say #team hi again ---", Some("@carol")).await;
        assert_eq!(out, "ERROR: Not a member of #team");
    }

    #[tokio::test]
    async fn says_to_a_missing_named_space_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\say #ghost hi ---", Some("@alice")).await;
        assert_eq!(out, "ERROR: Space #ghost does not exist");
    }

    #[tokio::test]
    async fn missing_executor_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\say @bob hi ---", None).await;
        assert_eq!(out, "ERROR: Say requires executor context");
    }
}
