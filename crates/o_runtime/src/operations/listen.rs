//! `\listen @bob #general ---` -> subscribes the executor to one or more
//! targets, so `\wake` can bundle their messages into a self-prompt
//! (`original_source/interactors/listen.py`). Subscriptions accumulate
//! across calls rather than replacing the previous set.

use async_trait::async_trait;
use o_data::Command;

use super::{entity_targets, space_targets, OpContext, Operation};

pub struct Listen;

#[async_trait]
impl Operation for Listen {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(executor) = executor else {
            return "ERROR: Listen requires executor context".to_string();
        };

        let mut targets = entity_targets(cmd);
        targets.extend(space_targets(cmd));
        if targets.is_empty() {
            return "ERROR: No targets specified. Usage: \\listen @entity #space ---".to_string();
        }

        for target in &targets {
            ctx.world.add_subscription(executor, target);
        }

        let mut subscribed: Vec<String> = ctx.world.subscriptions_of(executor).into_iter().collect();
        subscribed.sort();
        if let Err(e) = ctx.store.save_listen(executor, &subscribed.iter().cloned().collect()).await {
            return format!("ERROR: Failed to persist subscriptions: {e}");
        }

        format!("Listening to: {}", subscribed.join(", "))
    }
}
