//! Build command handler.
//!
//! Scans the policy corpus and (re)builds the persisted vector index.

use clap::Args;
use poliqa_core::{config::AppConfig, AppResult};
use poliqa_rag::{Assistant, DocumentOutcome, ProgressEvent, ProgressReporter};
use std::sync::Arc;

/// Index the policy corpus into the persisted vector index
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Suppress per-document progress lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing build command");

        let assistant = Assistant::new(config.clone())?;

        let progress = if self.quiet {
            ProgressReporter::noop()
        } else {
            ProgressReporter::new(Arc::new(|event: ProgressEvent| {
                eprintln!("{}", event.format_simple());
            }))
        };

        let report = assistant.build(&progress).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if !report.built {
            println!(
                "No documents to index in {}.",
                config.corpus_path().display()
            );
            return Ok(());
        }

        println!(
            "Indexed {} chunks from {} documents into {}",
            report.chunk_count,
            report.documents.len(),
            config.index_path().display()
        );

        println!("Sources:");
        for source in &report.sources {
            println!("- {}", source);
        }

        let skipped: Vec<_> = report
            .documents
            .iter()
            .filter_map(|outcome| match outcome {
                DocumentOutcome::Skipped { file, reason } => Some((file, reason)),
                DocumentOutcome::Indexed { .. } => None,
            })
            .collect();

        if !skipped.is_empty() {
            println!("Skipped:");
            for (file, reason) in skipped {
                println!("- {} ({})", file, reason);
            }
        }

        Ok(())
    }
}
