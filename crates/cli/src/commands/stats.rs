//! Stats command handler.
//!
//! Displays the persisted index manifest.

use clap::Args;
use poliqa_core::{config::AppConfig, AppResult};
use poliqa_rag::Assistant;

/// Show the persisted index manifest
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let assistant = Assistant::new(config.clone())?;
        let manifest = assistant.manifest()?;

        let db_size_bytes = std::fs::metadata(config.index_path())
            .map(|m| m.len())
            .unwrap_or(0);

        if self.json {
            let output = serde_json::json!({
                "indexPath": config.index_path(),
                "provider": manifest.provider,
                "model": manifest.model,
                "dimensions": manifest.dimensions,
                "chunkCount": manifest.chunk_count,
                "builtAt": manifest.built_at,
                "dbSizeBytes": db_size_bytes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Index: {}", config.index_path().display());
            println!("  Provider: {}/{}", manifest.provider, manifest.model);
            println!("  Dimensions: {}", manifest.dimensions);
            println!("  Chunks: {}", manifest.chunk_count);
            println!("  Built at: {}", manifest.built_at);
            println!("  Size: {} bytes", db_size_bytes);
        }

        Ok(())
    }
}
