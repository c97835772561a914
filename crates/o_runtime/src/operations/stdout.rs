//! `\stdout write: entry ---` / `\stdout read: last N ---` /
//! `\stdout between: A B ---` / `\stdout query: pattern ---` /
//! `\stdout help: [topic] ---` -> the per-entity append-only log that lets
//! an entity reconstruct its own history on wake
//! (`original_source/interactors/stdout.py`).
//!
//! Sub-operations are recognized only via an exact, case-insensitive
//! `op:` prefix; anything else is an implicit `write` (the resolved
//! simplification over the original's loose substring detection — see
//! `DESIGN.md`).

use async_trait::async_trait;
use o_data::Command;

use super::{OpContext, Operation};
use crate::store::StdoutRecord;

const PREFIXES: &[&str] = &["write:", "read:", "between:", "query:", "help:"];

pub struct Stdout;

#[async_trait]
impl Operation for Stdout {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(executor) = executor else {
            return "ERROR: Stdout requires executor context".to_string();
        };

        let full_text = cmd.text_parts().join(" ").trim().to_string();
        if full_text.is_empty() {
            return "ERROR: No content to write. Usage: \\stdout CONTENT --- or \\stdout write: CONTENT ---"
                .to_string();
        }

        let lower = full_text.to_lowercase();
        let matched = PREFIXES.iter().find(|p| lower.starts_with(*p));

        match matched {
            Some(prefix) => {
                let rest = full_text[prefix.len()..].trim();
                match *prefix {
                    "write:" => write(ctx, executor, rest).await,
                    "read:" => read(ctx, executor, rest).await,
                    "between:" => between(ctx, executor, rest).await,
                    "query:" => query(ctx, executor, rest).await,
                    "help:" => help(rest),
                    _ => unreachable!("PREFIXES is exhaustively matched above"),
                }
            }
            None => write(ctx, executor, &full_text).await,
        }
    }
}

async fn write(ctx: &mut OpContext<'_>, entity: &str, content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return "ERROR: No content to write. Usage: \\stdout write: message ---".to_string();
    }
    let tick = ctx.world.clock;
    let record = StdoutRecord {
        tick,
        entity: entity.to_string(),
        content: content.to_string(),
        timestamp: ctx.clock.now_iso8601(),
    };
    if let Err(e) = ctx.store.append_stdout(&record).await {
        return format!("ERROR: Failed to write stdout: {e}");
    }
    format!("Written to stdout (tick {tick})")
}

async fn read(ctx: &mut OpContext<'_>, entity: &str, params: &str) -> String {
    let params = params.trim();
    let n: usize = if params.is_empty() {
        1
    } else if let Some(count) = params.strip_prefix("last ") {
        match count.trim().parse() {
            Ok(n) => n,
            Err(_) => return "ERROR: Invalid read params. Usage: \\stdout read: last N ---".to_string(),
        }
    } else {
        return format!("ERROR: Unknown read pattern '{params}'. Try: last 10");
    };

    let entries = ctx.store.read_stdout(entity).await;
    if entries.is_empty() {
        return format!("No stdout for {entity} yet");
    }
    let start = entries.len().saturating_sub(n);
    let last_n = &entries[start..];

    let mut lines = vec![format!("Last {} stdout entries for {entity}:", last_n.len())];
    for entry in last_n {
        lines.push(format!("  [tick {}] {}", entry.tick, entry.content));
    }
    lines.join("\n")
}

async fn between(ctx: &mut OpContext<'_>, entity: &str, params: &str) -> String {
    let normalized = params.replace(" and ", " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 2 {
        return "ERROR: Invalid between params. Usage: \\stdout between: TICK_START TICK_END ---"
            .to_string();
    }
    let (Ok(start), Ok(end)) = (parts[0].parse::<u64>(), parts[1].parse::<u64>()) else {
        return "ERROR: Tick values must be integers. Usage: \\stdout between: TICK_START TICK_END ---"
            .to_string();
    };
    if start > end {
        return format!("ERROR: Start tick ({start}) must be <= end tick ({end})");
    }

    let entries = ctx.store.read_stdout(entity).await;
    let matching: Vec<_> = entries.into_iter().filter(|e| e.tick >= start && e.tick <= end).collect();
    if matching.is_empty() {
        return format!("No entries between tick {start} and {end}");
    }

    let mut lines = vec![format!("Entries between tick {start} and {end} for {entity}:")];
    for entry in matching {
        lines.push(format!("  [tick {}] {}", entry.tick, entry.content));
    }
    lines.join("\n")
}

async fn query(ctx: &mut OpContext<'_>, entity: &str, pattern: &str) -> String {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return "ERROR: No query pattern. Usage: \\stdout query: PATTERN ---".to_string();
    }

    let entries = ctx.store.read_stdout(entity).await;
    if entries.is_empty() {
        return format!("No stdout for {entity} yet");
    }
    let needle = pattern.to_lowercase();
    let matching: Vec<_> = entries
        .into_iter()
        .filter(|e| e.content.to_lowercase().contains(&needle))
        .collect();
    if matching.is_empty() {
        return format!("No entries matching '{pattern}'");
    }

    let mut lines = vec![format!("Entries matching '{pattern}' for {entity}:")];
    for entry in matching {
        lines.push(format!("  [tick {}] {}", entry.tick, entry.content));
    }
    lines.join("\n")
}

fn help(topic: &str) -> String {
    match topic.trim().to_lowercase().as_str() {
        "write" => "write: Persist a log entry to your stdout stream\n\nUsage:\n  \\stdout write: Your message here ---\n  \\stdout Your message here ---              (implicit write)".to_string(),
        "read" => "read: Query your stdout history\n\nUsage:\n  \\stdout read: last N ---                   (last N entries)\n  \\stdout read: ---                          (defaults to last 1)".to_string(),
        "between" => "between: Query temporal range by tick\n\nUsage:\n  \\stdout between: TICK_START TICK_END ---\n  \\stdout between: TICK_START and TICK_END ---   (natural language)".to_string(),
        "query" => "query: Search entries by content pattern\n\nUsage:\n  \\stdout query: PATTERN ---                (case-insensitive substring match)".to_string(),
        _ => "\\stdout - per-entity log\n\nUsage: \\stdout OPERATION: [ARGS] ---\n\nOperations:\n  write:    Persist a log entry (default if no operation)\n  read:     Last N entries\n  between:  Entries between two ticks\n  query:    Substring search\n  help:     This text, or help: <operation> for detail".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn implicit_write_with_no_prefix() {
        let mut h = harness().await;
        let out = h.dispatch("\\stdout Task complete ---", Some("@a")).await;
        assert_eq!(out, "Written to stdout (tick 0)");
    }

    #[tokio::test]
    async fn explicit_write_then_read_last_one() {
        let mut h = harness().await;
        h.dispatch("\\stdout write: first entry ---", Some("@a")).await;
        h.dispatch("\\stdout write: second entry ---", Some("@a")).await;
        let out = h.dispatch("\\stdout read: ---", Some("@a")).await;
        assert_eq!(out, "Last 1 stdout entries for @a:\n  [tick 0] second entry");
    }

    #[tokio::test]
    async fn between_filters_by_tick_range() {
        let mut h = harness().await;
        h.dispatch("\\stdout write: only entry ---", Some("@a")).await;
        let out = h.dispatch("\\stdout between: 0 0 ---", Some("@a")).await;
        assert_eq!(out, "Entries between tick 0 and 0 for @a:\n  [tick 0] only entry");
    }

    #[tokio::test]
    async fn query_is_case_insensitive_substring_match() {
        let mut h = harness().await;
        h.dispatch("\\stdout write: Connection ERROR detected ---", Some("@a")).await;
        let out = h.dispatch("\\stdout query: error ---", Some("@a")).await;
        assert_eq!(out, "Entries matching 'error' for @a:\n  [tick 0] Connection ERROR detected");
    }

    #[tokio::test]
    async fn help_with_no_topic_is_general() {
        let mut h = harness().await;
        let out = h.dispatch("\\stdout help: ---", Some("@a")).await;
        assert!(out.starts_with("\\stdout - per-entity log"));
    }

    #[tokio::test]
    async fn missing_executor_is_an_error() {
        let mut h = harness().await;
        let out = h.dispatch("\\stdout hi ---", None).await;
        assert_eq!(out, "ERROR: Stdout requires executor context");
    }
}
