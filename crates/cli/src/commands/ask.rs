//! Ask command handler.
//!
//! Runs the full answer pipeline for a single question.

use clap::Args;
use poliqa_core::{config::AppConfig, AppResult};
use poliqa_rag::Assistant;

/// Ask a question against the indexed corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Number of passages to retrieve
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let mut config = config.clone();
        if let Some(top_k) = self.top_k {
            config.retrieval_k = top_k;
        }

        let assistant = Assistant::new(config)?;

        // The answer API returns either a cited answer, the fixed refusal
        // sentence, or an error-description string. It never faults.
        let answer = assistant.answer(&self.question).await;

        if self.json {
            let output = serde_json::json!({
                "question": self.question,
                "answer": answer,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}
