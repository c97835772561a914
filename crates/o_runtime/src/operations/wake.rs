//! `\wake ?(condition) self-prompt ---` -> registers a one-shot wake
//! condition for the executor (`original_source/interactors/wake.py`).
//! The Scheduler polls `World::has_wake` / evaluates the stored condition
//! each tick and consumes the registration when it fires; this operation
//! only ever writes it.

use async_trait::async_trait;
use o_data::{Command, Node, WakeRegistration};

use super::{OpContext, Operation};
use crate::store::WakeFile;

pub struct Wake;

#[async_trait]
impl Operation for Wake {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(executor) = executor else {
            return "ERROR: Wake requires executor (who is sleeping?)".to_string();
        };

        let condition_idx = cmd.content.iter().position(|n| matches!(n, Node::Condition { .. }));
        let Some(condition_idx) = condition_idx else {
            return "ERROR: No condition found. Usage: \\wake ?(condition) prompt ---".to_string();
        };
        let Node::Condition { expr: condition } = &cmd.content[condition_idx] else {
            unreachable!("position() just matched a Condition node");
        };

        let self_prompt_parts: Vec<&str> = cmd.content[condition_idx + 1..]
            .iter()
            .filter_map(|n| match n {
                Node::Text { text } => {
                    let t = text.trim();
                    if t.is_empty() {
                        None
                    } else {
                        Some(t)
                    }
                }
                _ => None,
            })
            .collect();
        let self_prompt = if self_prompt_parts.is_empty() {
            None
        } else {
            Some(self_prompt_parts.join(" "))
        };

        ctx.world.set_wake(
            executor,
            WakeRegistration {
                condition: condition.clone(),
                self_prompt: self_prompt.clone(),
            },
        );

        if let Err(e) = ctx
            .store
            .save_wake(&WakeFile {
                entity: executor.to_string(),
                condition: condition.clone(),
                self_prompt: self_prompt.clone(),
            })
            .await
        {
            return format!("ERROR: Failed to persist wake registration: {e}");
        }

        match &self_prompt {
            Some(prompt) if prompt.chars().count() > 50 => {
                let preview: String = prompt.chars().take(50).collect();
                format!("Wake registered: {preview}...")
            }
            Some(prompt) => format!("Wake registered: {prompt}"),
            None => "Wake registered".to_string(),
        }
    }
}

/// Per-space tail limit when bundling subscribed messages into a fired
/// wake's prompt (`spec.md` §4.4 "Wake firing").
const MESSAGE_TAIL_LIMIT: usize = 10;

/// Checks whether `entity`'s registered wake condition is satisfied; if so,
/// consumes the registration and returns the prompt to hand the provider
/// (self-prompt plus a tail of messages from every subscribed space). Used
/// by the scheduler's "select wakers" step, never by the `\wake` operation
/// itself.
pub async fn check_and_consume(entity: &str, ctx: &mut crate::operations::OpContext<'_>) -> Option<String> {
    let registration = ctx.world.wake_registration.get(entity)?.clone();

    if !crate::eval::evaluate(&registration.condition, Some(entity), ctx).await {
        return None;
    }
    ctx.world.take_wake(entity);
    ctx.store.clear_wake(entity).await;

    let mut messages = Vec::new();
    for space_id in ctx.world.subscriptions_of(entity) {
        let space_id = if let Some(peer) = space_id.strip_prefix('@') {
            o_data::canonical_pair_space_id([entity.to_string(), format!("@{peer}")])
        } else {
            space_id
        };
        if let Some(log) = ctx.world.space_log.get(&space_id) {
            let start = log.len().saturating_sub(MESSAGE_TAIL_LIMIT);
            for message in &log[start..] {
                messages.push(format!("{}: {}", message.sender, message.content));
            }
        }
    }

    let mut parts = Vec::new();
    if let Some(prompt) = registration.self_prompt {
        parts.push(prompt);
    }
    if !messages.is_empty() {
        parts.push(format!("--- Messages ---\n{}", messages.join("\n")));
    }
    Some(parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn registers_a_condition_with_self_prompt() {
        let mut h = harness().await;
        let out = h.dispatch("\\wake ?(true) Check messages ---", Some("@alice")).await;
        assert_eq!(out, "Wake registered: Check messages");
        assert!(h.world.has_wake("@alice"));
    }

    #[tokio::test]
    async fn registers_a_condition_without_self_prompt() {
        let mut h = harness().await;
        let out = h.dispatch("\\wake ?(true) ---", Some("@alice")).await;
        assert_eq!(out, "Wake registered");
    }

    #[tokio::test]
    async fn missing_condition_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\wake hello ---", Some("@alice")).await;
        assert_eq!(out, "ERROR: No condition found. Usage: \\wake ?(condition) prompt ---");
    }

    #[tokio::test]
    async fn missing_executor_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\wake ?(true) ---", None).await;
        assert_eq!(out, "ERROR: Wake requires executor (who is sleeping?)");
    }

    #[tokio::test]
    async fn check_and_consume_fires_and_bundles_messages() {
        use super::check_and_consume;
        use crate::operations::OpContext;

        let mut h = harness().await;
        h.dispatch("\\listen @bob ---", Some("@alice")).await;
        h.dispatch("\\say @alice hi there ---", Some("@bob")).await;
        h.dispatch("\\wake ?($(\\up---)) hi-me ---", Some("@alice")).await;

        let mut ctx = OpContext {
            world: &mut h.world,
            store: &h.store,
            clock: h.clock.as_ref(),
            dispatcher: &h.dispatcher,
        };
        let prompt = check_and_consume("@alice", &mut ctx).await;
        assert_eq!(
            prompt.as_deref(),
            Some("hi-me\n--- Messages ---\n@bob: hi there")
        );
        assert!(!ctx.world.has_wake("@alice"));
    }

    #[tokio::test]
    async fn check_and_consume_returns_none_when_condition_unmet() {
        use super::check_and_consume;
        use crate::operations::OpContext;

        let mut h = harness().await;
        h.dispatch("\\wake ?(false) never ---", Some("@alice")).await;

        let mut ctx = OpContext {
            world: &mut h.world,
            store: &h.store,
            clock: h.clock.as_ref(),
            dispatcher: &h.dispatcher,
        };
        assert!(check_and_consume("@alice", &mut ctx).await.is_none());
        assert!(ctx.world.has_wake("@alice"));
    }

    #[tokio::test]
    async fn check_and_consume_with_no_registration_is_none() {
        let mut h = harness().await;
        let mut ctx = crate::operations::OpContext {
            world: &mut h.world,
            store: &h.store,
            clock: h.clock.as_ref(),
            dispatcher: &h.dispatcher,
        };
        assert!(super::check_and_consume("@nobody", &mut ctx).await.is_none());
    }
}
