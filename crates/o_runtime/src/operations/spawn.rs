//! `\spawn @alice ---` / `\spawn @(alice, bob) ---` -> registers one or more
//! entities in the world graph (`original_source/interactors/spawn.py`).
//! Already-existing entities are reported, not treated as a hard failure,
//! so a batch spawn partially succeeds rather than aborting.

use async_trait::async_trait;
use o_data::Command;

use super::{entity_targets, OpContext, Operation};

pub struct Spawn;

#[async_trait]
impl Operation for Spawn {
    async fn execute(&self, cmd: &Command, _executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let entities = entity_targets(cmd);
        if entities.is_empty() {
            return "ERROR: No entity specified. Usage: \\spawn @entity ---".to_string();
        }

        let mut created = Vec::new();
        let mut errors = Vec::new();
        for entity in entities {
            if ctx.world.spawn_entity(&entity) {
                created.push(entity);
            } else {
                errors.push(format!("{entity} already exists"));
            }
        }

        let mut parts = Vec::new();
        if !created.is_empty() {
            parts.push(format!("Spawned: {}", created.join(", ")));
        }
        if !errors.is_empty() {
            parts.push(format!("Errors: {}", errors.join("; ")));
        }
        if parts.is_empty() {
            "No entities processed".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn spawns_new_entity() {
        let mut h = harness().await;
        let out = h.dispatch("\\spawn @alice ---", Some("@a")).await;
        assert_eq!(out, "Spawned: @alice");
        assert!(h.world.has_entity("@alice"));
    }

    #[tokio::test]
    async fn spawning_twice_reports_already_exists() {
        let mut h = harness().await;
        h.dispatch("\\spawn @alice ---", Some("@a")).await;
        let out = h.dispatch("\\spawn @alice ---", Some("@a")).await;
        assert_eq!(out, "Errors: @alice already exists");
    }

    #[tokio::test]
    async fn spawning_a_batch_mixes_success_and_error() {
        let mut h = harness().await;
        h.dispatch("\\spawn @alice ---", Some("@a")).await;
        let out = h.dispatch("\\spawn @(alice, bob) ---", Some("@a")).await;
        assert_eq!(out, "Spawned: @bob | Errors: @alice already exists");
        assert!(h.world.has_entity("@bob"));
    }

    #[tokio::test]
    async fn no_entities_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\spawn ---", Some("@a")).await;
        assert_eq!(out, "ERROR: No entity specified. Usage: \\spawn @entity ---");
    }
}
