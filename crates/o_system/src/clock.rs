//! Wall-clock access, isolated behind a trait so `o_data::World` and the
//! operations that mutate it never read the clock directly (see the
//! "NO IO" discipline noted on `World`'s doc comment) — the Scheduler
//! injects a timestamp, and tests can substitute a fixed one.

/// A source of wall-clock timestamps, rendered as ISO-8601 UTC strings to
/// match every `timestamp` field in `spec.md` §6.
pub trait Clock: Send + Sync {
    fn now_iso8601(&self) -> String;
}

/// `Clock` backed by the real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso8601(&self) -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_produces_rfc3339() {
        let ts = SystemClock.now_iso8601();
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }
}
