//! Clean command handler.
//!
//! Deletes the persisted index. Rebuilding means running `build` again;
//! there is no incremental update path.

use clap::Args;
use poliqa_core::{config::AppConfig, AppResult};
use poliqa_rag::Assistant;

/// Delete the persisted index
#[derive(Args, Debug)]
pub struct CleanCommand {}

impl CleanCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing clean command");

        let assistant = Assistant::new(config.clone())?;

        if assistant.clean()? {
            println!("Deleted index at {}", config.index_path().display());
        } else {
            println!("No index to delete at {}", config.index_path().display());
        }

        Ok(())
    }
}
