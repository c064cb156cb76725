//! Answer orchestration.
//!
//! Wires the pipeline end to end: corpus scan → index build on one side,
//! retrieve → assemble → generate → post-process on the other. The
//! caller-facing [`Assistant::answer`] converts every failure into an
//! error-description string; no fault crosses that boundary.

use crate::embeddings::{self, EmbeddingProvider};
use crate::progress::ProgressReporter;
use crate::types::BuildReport;
use crate::{chunker, index, postprocess, prompt};
use crate::retriever::Retriever;
use poliqa_core::{AppConfig, AppError, AppResult};
use poliqa_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Sampling temperature for answer generation. Low, for factual answers
/// grounded in the supplied context.
const ANSWER_TEMPERATURE: f32 = 0.3;

/// The assembled pipeline. Stateless per query: no conversation history
/// enters the prompt, and queries only share the read-only index.
pub struct Assistant {
    config: AppConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn LlmClient>,
}

impl Assistant {
    /// Create an assistant from configuration, resolving the embedding
    /// provider and answer generator.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = embeddings::create_provider(&config.embedding)?;
        let generator = poliqa_llm::create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;

        Ok(Self {
            config,
            embedder,
            generator,
        })
    }

    /// Create an assistant with explicit collaborators.
    pub fn with_clients(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            config,
            embedder,
            generator,
        }
    }

    /// Scan the corpus and (re)build the persisted index.
    ///
    /// Blocking batch operation; a failure partway through leaves the
    /// previous artifact in place (the new file only lands once complete).
    pub async fn build(&self, progress: &ProgressReporter) -> AppResult<BuildReport> {
        let scan = chunker::chunk_corpus(&self.config.corpus_path(), progress)?;

        let outcome = index::build_index(
            &scan.chunks,
            self.embedder.as_ref(),
            &self.config.index_path(),
            progress,
        )
        .await?;

        Ok(BuildReport {
            built: outcome.built,
            sources: outcome.sources,
            chunk_count: scan.chunks.len(),
            documents: scan.outcomes,
        })
    }

    /// Delete the persisted index. Returns whether an artifact existed.
    pub fn clean(&self) -> AppResult<bool> {
        index::delete_index(&self.config.index_path())
    }

    /// Read the manifest of the persisted index.
    pub fn manifest(&self) -> AppResult<index::IndexManifest> {
        index::read_manifest(&self.config.index_path())
    }

    /// Run the full answer pipeline, propagating typed errors.
    pub async fn try_answer(&self, question: &str) -> AppResult<String> {
        let retriever = Retriever::load(&self.config.index_path(), Arc::clone(&self.embedder))?;
        let passages = retriever.search(question, self.config.retrieval_k).await?;

        tracing::info!(
            "Retrieved {} passages for question ({} chars)",
            passages.len(),
            question.chars().count()
        );

        let prompt_text = prompt::assemble(question, &passages)?;

        let request = LlmRequest::new(prompt_text, self.config.model.clone())
            .with_temperature(ANSWER_TEMPERATURE);

        let response = self.generator.complete(&request).await?;

        Ok(postprocess::postprocess(&response.content))
    }

    /// Caller-facing entry point: returns either a cited answer, the fixed
    /// refusal sentence, or an error-description string. Never raises
    /// across this boundary.
    pub async fn answer(&self, question: &str) -> String {
        match self.try_answer(question).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!("Answer pipeline failed: {}", err);
                describe_error(err)
            }
        }
    }
}

/// Turn a pipeline error into the user-facing instruction or description.
fn describe_error(err: AppError) -> String {
    match err {
        AppError::IndexMissing(path) => format!(
            "No document index found at {}. Run `poliqa build` to index the policy corpus, then ask again.",
            path.display()
        ),
        AppError::IndexIncompatible(reason) => format!(
            "The persisted index no longer matches the active embedding configuration ({}). Delete the index file and run `poliqa build` to recreate it.",
            reason
        ),
        other => format!("Error: {}", other),
    }
}
