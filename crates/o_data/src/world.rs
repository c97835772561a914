//! The world model (C2): the spaces/entities bipartite graph, message logs,
//! subscriptions, cursors, wake registrations, and the logical clock.
//!
//! Pure data plus invariant-preserving mutators, in the style of the
//! `logicaffeine-data` "NO IO" discipline: no file access, no wall-clock
//! reads. Timestamps and the tick number are injected by callers (the
//! Scheduler).

use crate::ast::BoolExpr;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A single message appended to a space's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub sender: String,
    pub content: String,
    pub tick: u64,
    pub timestamp: String,
}

/// A named space: `spaces[id]`. Entity-pair spaces are *not* stored here —
/// see [`canonical_pair_space_id`] — they live only in `space_log`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceData {
    pub display_name: String,
    pub members: HashSet<String>,
}

/// A pending one-shot wake registration for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakeRegistration {
    pub condition: BoolExpr,
    pub self_prompt: Option<String>,
}

/// A single recorded command execution: `{executor, command, output}`.
/// The tick number is stored once per log file, not per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub executor: String,
    pub command: String,
    pub output: String,
}

/// The process-wide world state. Single-owner: pass `&mut World` explicitly
/// to whatever needs to mutate it; never reach for a module-level singleton.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub spaces: HashMap<String, SpaceData>,
    pub entity_spaces: HashMap<String, HashSet<String>>,
    pub space_log: HashMap<String, Vec<Message>>,
    pub subscriptions: HashMap<String, HashSet<String>>,
    pub read_cursor: HashMap<String, HashMap<String, usize>>,
    pub incoming_cursor: HashMap<String, HashMap<String, usize>>,
    pub wake_registration: HashMap<String, WakeRegistration>,
    pub clock: u64,
    pub tick_buffer: Vec<ExecutionRecord>,
}

/// The canonical pair-space id for a set of entity references: the
/// lexicographic sort of the refs (including their `@` sigil), joined by
/// `-`. `{@alice, @bob}` -> `@alice-@bob`, regardless of argument order.
pub fn canonical_pair_space_id<I, S>(members: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut members: Vec<String> = members.into_iter().map(Into::into).collect();
    members.sort();
    members.dedup();
    members.join("-")
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `entity` has been spawned.
    pub fn has_entity(&self, entity: &str) -> bool {
        self.entity_spaces.contains_key(entity)
    }

    /// Registers `entity` with an empty space set if absent. Returns `true`
    /// if this call newly spawned the entity, `false` if it already existed.
    pub fn spawn_entity(&mut self, entity: &str) -> bool {
        if self.entity_spaces.contains_key(entity) {
            return false;
        }
        self.entity_spaces.insert(entity.to_string(), HashSet::new());
        true
    }

    /// Creates or overwrites a named space's membership, keeping
    /// `entity_spaces` consistent: entities removed from the member set lose
    /// this space from their reverse index, entities added to it gain it.
    pub fn name_space(&mut self, space_id: &str, display_name: &str, members: HashSet<String>) {
        if let Some(previous) = self.spaces.get(space_id) {
            for old_member in previous.members.difference(&members) {
                if let Some(set) = self.entity_spaces.get_mut(old_member) {
                    set.remove(space_id);
                }
            }
        }
        for member in &members {
            self.entity_spaces
                .entry(member.clone())
                .or_default()
                .insert(space_id.to_string());
        }
        self.spaces.insert(
            space_id.to_string(),
            SpaceData {
                display_name: display_name.to_string(),
                members,
            },
        );
    }

    /// Ensures a pair-space's log exists (lazily, on first `say`) without
    /// registering it in `spaces` — pair-spaces are implicit, not named.
    pub fn ensure_space_log(&mut self, space_id: &str) {
        self.space_log.entry(space_id.to_string()).or_default();
    }

    /// Appends a message to a space's log, creating the log if absent.
    pub fn append_message(&mut self, space_id: &str, message: Message) {
        self.space_log
            .entry(space_id.to_string())
            .or_default()
            .push(message);
    }

    /// Adds a subscription target (`@peer` or `#space`) for `entity`. If the
    /// target is an entity reference, also ensures `entity_spaces[entity]`
    /// contains the canonical pair-space id for `{entity, peer}`.
    pub fn add_subscription(&mut self, entity: &str, target: &str) {
        self.subscriptions
            .entry(entity.to_string())
            .or_default()
            .insert(target.to_string());

        if let Some(peer) = target.strip_prefix('@') {
            let pair = canonical_pair_space_id([format!("@{entity}"), format!("@{peer}")]);
            self.entity_spaces
                .entry(entity.to_string())
                .or_default()
                .insert(pair.clone());
            self.ensure_space_log(&pair);
        } else if target.starts_with('#') {
            self.entity_spaces
                .entry(entity.to_string())
                .or_default()
                .insert(target.to_string());
        }
    }

    pub fn subscriptions_of(&self, entity: &str) -> HashSet<String> {
        self.subscriptions.get(entity).cloned().unwrap_or_default()
    }

    pub fn spaces_of(&self, entity: &str) -> HashSet<String> {
        self.entity_spaces.get(entity).cloned().unwrap_or_default()
    }

    pub fn log_len(&self, space_id: &str) -> usize {
        self.space_log.get(space_id).map_or(0, |log| log.len())
    }

    pub fn read_cursor_of(&self, entity: &str, space_id: &str) -> usize {
        self.read_cursor
            .get(entity)
            .and_then(|m| m.get(space_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_read_cursor(&mut self, entity: &str, space_id: &str, value: usize) {
        self.read_cursor
            .entry(entity.to_string())
            .or_default()
            .insert(space_id.to_string(), value);
    }

    pub fn incoming_cursor_of(&self, entity: &str, space_id: &str) -> usize {
        self.incoming_cursor
            .get(entity)
            .and_then(|m| m.get(space_id))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_incoming_cursor(&mut self, entity: &str, space_id: &str, value: usize) {
        self.incoming_cursor
            .entry(entity.to_string())
            .or_default()
            .insert(space_id.to_string(), value);
    }

    pub fn set_wake(&mut self, entity: &str, registration: WakeRegistration) {
        self.wake_registration.insert(entity.to_string(), registration);
    }

    /// Removes and returns the entity's pending wake registration, if any
    /// (one-shot: firing consumes it).
    pub fn take_wake(&mut self, entity: &str) -> Option<WakeRegistration> {
        self.wake_registration.remove(entity)
    }

    pub fn has_wake(&self, entity: &str) -> bool {
        self.wake_registration.contains_key(entity)
    }

    pub fn record_execution(&mut self, record: ExecutionRecord) {
        self.tick_buffer.push(record);
    }

    /// Drains `tick_buffer` and increments `clock`. Returns the drained
    /// executions so the caller can persist them before they're lost.
    pub fn advance_tick(&mut self) -> Vec<ExecutionRecord> {
        let drained = std::mem::take(&mut self.tick_buffer);
        self.clock += 1;
        drained
    }

    /// Checks the invariants from `spec.md` §3/§8 that must hold between
    /// ticks. Returns the first violation found, if any.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (space_id, data) in &self.spaces {
            for member in &data.members {
                let reverse = self.entity_spaces.get(member);
                if !reverse.map_or(false, |s| s.contains(space_id)) {
                    return Err(format!(
                        "space {space_id} lists member {member} but entity_spaces[{member}] lacks {space_id}"
                    ));
                }
            }
        }
        for (entity, spaces) in &self.entity_spaces {
            for space_id in spaces {
                if let Some(data) = self.spaces.get(space_id) {
                    if !data.members.contains(entity) {
                        return Err(format!(
                            "entity_spaces[{entity}] lists {space_id} but it does not list {entity} as a member"
                        ));
                    }
                }
            }
        }
        for (entity, cursors) in &self.read_cursor {
            for (space_id, cursor) in cursors {
                let len = self.log_len(space_id);
                if *cursor > len {
                    return Err(format!(
                        "read_cursor[{entity}][{space_id}] = {cursor} exceeds log length {len}"
                    ));
                }
            }
        }
        Ok(())
    }
}
