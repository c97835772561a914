//! `\name #family @(me, mom, dad) ---` -> binds a named space to a member
//! set, creating the space -> entities and entity -> spaces edges
//! (`original_source/interactors/name.py`). Re-naming an existing space
//! overwrites its membership; `World::name_space` keeps the reverse index
//! consistent.

use std::collections::HashSet;

use async_trait::async_trait;
use o_data::Command;

use super::{entity_targets, space_targets, OpContext, Operation};

pub struct Name;

#[async_trait]
impl Operation for Name {
    async fn execute(&self, cmd: &Command, _executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let spaces = space_targets(cmd);
        let Some(space_id) = spaces.first() else {
            return "ERROR: No space specified. Usage: \\name #space @(entities) ---".to_string();
        };

        let entities = entity_targets(cmd);
        if entities.is_empty() {
            return "ERROR: No entities specified. Usage: \\name #space @(entities) ---".to_string();
        }

        let members: HashSet<String> = entities.iter().cloned().collect();
        ctx.world.name_space(space_id, space_id, members);

        format!("Named {space_id} as ({})", entities.join(", "))
    }
}
