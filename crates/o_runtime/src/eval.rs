//! The condition evaluator (C4): walks a `BoolExpr` tree, short-circuiting
//! `or`/`and`, dispatching `$( \cmd--- )` queries back through the
//! dispatcher, and falling back from numeric to string comparison.
//! Grounded in `original_source/interactors/eval.py`'s `_evaluate` /
//! `_evaluate_compare` / `_get_value`, and in the recursive-async-dispatch
//! pattern `logicaffeine_compile::interpreter` uses for its own expression
//! tree (`#[async_recursion(?Send)]` rather than a manual trampoline).

use async_recursion::async_recursion;
use async_trait::async_trait;
use o_data::{BoolExpr, Command, CompareOp};

use crate::operations::{OpContext, Operation};

pub struct Eval;

#[async_trait]
impl Operation for Eval {
    async fn execute(&self, cmd: &Command, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let Some(expr) = cmd.condition().cloned() else {
            return "ERROR: No condition found. Usage: \\eval ?(condition) ---".to_string();
        };
        if evaluate(&expr, executor, ctx).await {
            "true".to_string()
        } else {
            "false".to_string()
        }
    }
}

/// Evaluates a condition tree to a boolean. Exposed for `wake`, which
/// evaluates a stored `BoolExpr` outside of an `\eval` command.
#[async_recursion(?Send)]
pub async fn evaluate(expr: &BoolExpr, executor: Option<&str>, ctx: &mut OpContext<'_>) -> bool {
    match expr {
        BoolExpr::Or { l, r } => evaluate(l, executor, ctx).await || evaluate(r, executor, ctx).await,
        BoolExpr::And { l, r } => evaluate(l, executor, ctx).await && evaluate(r, executor, ctx).await,
        BoolExpr::Not { x } => !evaluate(x, executor, ctx).await,
        BoolExpr::Compare { l, op, r } => evaluate_compare(l, *op, r, executor, ctx).await,
        BoolExpr::Query { command } => {
            let result = ctx
                .dispatcher
                .dispatch_command(command, executor, ctx.world, ctx.store, ctx.clock)
                .await;
            result.trim().eq_ignore_ascii_case("true")
        }
        BoolExpr::Text { text } => text.trim().eq_ignore_ascii_case("true"),
        BoolExpr::Entity { .. } | BoolExpr::Space { .. } => false,
    }
}

#[async_recursion(?Send)]
async fn evaluate_compare(
    left: &BoolExpr,
    op: CompareOp,
    right: &BoolExpr,
    executor: Option<&str>,
    ctx: &mut OpContext<'_>,
) -> bool {
    let left_val = value_of(left, executor, ctx).await;
    let right_val = value_of(right, executor, ctx).await;

    if let (Ok(l), Ok(r)) = (left_val.parse::<f64>(), right_val.parse::<f64>()) {
        return match op {
            CompareOp::Lt => l < r,
            CompareOp::Gt => l > r,
            CompareOp::Eq => l == r,
        };
    }

    match op {
        CompareOp::Lt => left_val < right_val,
        CompareOp::Gt => left_val > right_val,
        CompareOp::Eq => left_val == right_val,
    }
}

#[async_recursion(?Send)]
async fn value_of(expr: &BoolExpr, executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
    match expr {
        BoolExpr::Query { command } => {
            ctx.dispatcher
                .dispatch_command(command, executor, ctx.world, ctx.store, ctx.clock)
                .await
        }
        BoolExpr::Text { text } => text.trim().to_string(),
        BoolExpr::Entity { name } => format!("@{name}"),
        BoolExpr::Space { name } => format!("#{name}"),
        // Boolean subtrees used as a comparison operand collapse to their
        // own truth value, stringified.
        other => evaluate(other, executor, ctx).await.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use o_data::Command;

    use super::{Eval, Operation};
    use crate::operations::OpContext;
    use crate::test_support::harness;

    #[tokio::test]
    async fn literal_true_evaluates_true() {
        let mut h = harness().await;
        let out = h.dispatch("\\eval ?(true) ---", Some("@a")).await;
        assert_eq!(out, "true");
    }

    #[tokio::test]
    async fn literal_false_evaluates_false() {
        let mut h = harness().await;
        let out = h.dispatch("\\eval ?(false) ---", Some("@a")).await;
        assert_eq!(out, "false");
    }

    #[tokio::test]
    async fn missing_condition_is_an_error() {
        let mut h = harness().await;
        let cmd = Command::new("eval", vec![]);
        let mut ctx = OpContext {
            world: &mut h.world,
            store: &h.store,
            clock: h.clock.as_ref(),
            dispatcher: &h.dispatcher,
        };
        let out = Eval.execute(&cmd, Some("@a"), &mut ctx).await;
        assert!(out.starts_with("ERROR:"));
    }

    #[tokio::test]
    async fn embedded_query_is_dispatched_and_compared() {
        let mut h = harness().await;
        // \up--- always returns "true"; an embedded query reuses it.
        let out = h.dispatch("\\eval ?($(\\up---)) ---", Some("@a")).await;
        assert_eq!(out, "true");
    }
}
