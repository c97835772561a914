//! The inference provider interface (C7): two independent capabilities the
//! Scheduler uses to source command strings for entities, grounded in
//! `original_source/transformers/base.py` (`Transformer.think`) and
//! `transformers/human.py` (polling-based channel I/O). No concrete LLM or
//! human-input provider ships with this crate — only the contracts and a
//! `Null*` pair for tests and as a documented extension point, matching how
//! `logicaffeine-system` keeps networking providers behind trait boundaries.

use async_trait::async_trait;

/// A snapshot of world state handed to a thinker, scoped to one entity.
/// Built fresh each tick; never retained across calls.
#[derive(Debug, Clone)]
pub struct ThinkContext {
    pub clock: u64,
    pub spaces: Vec<String>,
    pub wake_reason: Option<String>,
}

/// A stateless command source for wake-triggered entities. Implementations
/// retain no per-entity memory across calls and must be cancellation-aware
/// if they perform blocking I/O (`spec.md` §4.7).
#[async_trait]
pub trait Thinker: Send + Sync {
    /// Returns the next command string for `entity`, or `None` if it has
    /// nothing to do this tick.
    async fn think(&self, entity: &str, context: &ThinkContext) -> Option<String>;
}

/// A bidirectional I/O channel for externally-initiated executions.
/// `read_command` is non-blocking: it returns `None` promptly when nothing
/// is pending rather than waiting for input.
#[async_trait]
pub trait ChannelSubstrate: Send + Sync {
    async fn read_command(&self, entity: &str) -> Option<String>;
    async fn write_output(&self, entity: &str, record: &ChannelOutput);
    async fn ensure_channels(&self, entity: &str);
}

/// What `write_output` delivers back to a channel's consumer after a
/// dispatch.
#[derive(Debug, Clone)]
pub struct ChannelOutput {
    pub clock: u64,
    pub command: String,
    pub output: String,
    pub timestamp: String,
}

/// A `Thinker` that never has anything to say. Used in tests and as the
/// default when a deployment runs channel-only (no autonomous thinking).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullThinker;

#[async_trait]
impl Thinker for NullThinker {
    async fn think(&self, _entity: &str, _context: &ThinkContext) -> Option<String> {
        None
    }
}

/// A `ChannelSubstrate` with no attached I/O: reads never yield a pending
/// command, writes are dropped silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChannelSubstrate;

#[async_trait]
impl ChannelSubstrate for NullChannelSubstrate {
    async fn read_command(&self, _entity: &str) -> Option<String> {
        None
    }

    async fn write_output(&self, _entity: &str, _record: &ChannelOutput) {}

    async fn ensure_channels(&self, _entity: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_thinker_never_thinks() {
        let ctx = ThinkContext {
            clock: 0,
            spaces: vec![],
            wake_reason: None,
        };
        assert!(NullThinker.think("@a", &ctx).await.is_none());
    }

    #[tokio::test]
    async fn null_channel_substrate_reads_nothing_and_accepts_writes() {
        let sub = NullChannelSubstrate;
        assert!(sub.read_command("@a").await.is_none());
        sub.write_output(
            "@a",
            &ChannelOutput {
                clock: 0,
                command: "\\echo hi ---".into(),
                output: "Echo: hi".into(),
                timestamp: "2024-01-01T00:00:00Z".into(),
            },
        )
        .await;
        sub.ensure_channels("@a").await;
    }
}
