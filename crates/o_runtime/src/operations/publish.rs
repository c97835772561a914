//! `\publish report.md content here ---` -> appends `content here` to
//! `output/report.md`, creating parent directories as needed
//! (`original_source/interactors/publish.py`). The first whitespace-
//! separated token of the text is the filename; everything after it is
//! the content. Traversal outside `output/` is rejected by `Store::publish`.

use async_trait::async_trait;
use o_data::Command;

use super::{OpContext, Operation};

pub struct Publish;

#[async_trait]
impl Operation for Publish {
    async fn execute(&self, cmd: &Command, _executor: Option<&str>, ctx: &mut OpContext<'_>) -> String {
        let full_text = cmd.text_parts().join(" ").trim().to_string();
        if full_text.is_empty() {
            return "ERROR: No content. Usage: \\publish filename content ---".to_string();
        }

        let Some((filename, content)) = full_text.split_once(char::is_whitespace) else {
            return "ERROR: Need filename and content. Usage: \\publish filename content ---".to_string();
        };
        let content = content.trim_start();
        if content.is_empty() {
            return "ERROR: Need filename and content. Usage: \\publish filename content ---".to_string();
        }

        match ctx.store.publish(filename, content).await {
            Ok(()) => format!("Published to {filename} (tick {})", ctx.world.clock),
            Err(crate::store::PublishError::InvalidFilename) => {
                format!("ERROR: Invalid filename: {filename}")
            }
            Err(e) => format!("ERROR: Failed to write {filename}: {e}"),
        }
    }
}
