//! `\echo text ---` -> `Echo: text`. The smallest possible operation;
//! exists to exercise the provider -> dispatcher -> operation chain in
//! isolation (`original_source/interactors/echo.py`).

use async_trait::async_trait;
use o_data::Command;

use super::{OpContext, Operation};

pub struct Echo;

#[async_trait]
impl Operation for Echo {
    async fn execute(&self, cmd: &Command, _executor: Option<&str>, _ctx: &mut OpContext<'_>) -> String {
        let message = cmd.text_parts().join(" ").trim().to_string();
        format!("Echo: {message}")
    }
}
