//! `\up ---` -> `"true"`, unconditionally. The simplest possible wake
//! condition: paired with `\wake`, it fires on the very next tick
//! (`original_source/interactors/up.py`).

use async_trait::async_trait;
use o_data::Command;

use super::{OpContext, Operation};

pub struct Up;

#[async_trait]
impl Operation for Up {
    async fn execute(&self, _cmd: &Command, _executor: Option<&str>, _ctx: &mut OpContext<'_>) -> String {
        "true".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::harness;

    #[tokio::test]
    async fn always_returns_true() {
        let mut h = harness().await;
        let out = h.dispatch("\\up ---", Some("@a")).await;
        assert_eq!(out, "true");
    }
}
