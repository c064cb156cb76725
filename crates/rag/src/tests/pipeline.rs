//! End-to-end tests for the answer pipeline.
//!
//! Uses the deterministic hash embedding provider and a scripted generator
//! so the full retrieve → assemble → generate → post-process path runs
//! without external services.

use crate::answer::Assistant;
use crate::embeddings::providers::hash::HashProvider;
use crate::embeddings::EmbeddingProvider;
use crate::index::build_index;
use crate::postprocess::PAGINATION_DISCLAIMER;
use crate::progress::ProgressReporter;
use crate::prompt::{REFERENCES_HEADER, REFUSAL_SENTENCE};
use crate::types::Chunk;
use poliqa_core::config::EmbeddingSettings;
use poliqa_core::{AppConfig, AppResult};
use poliqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::sync::{Arc, Mutex};

/// Generator that returns a canned response and records the prompts it
/// was called with.
struct ScriptedGenerator {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedGenerator {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(LlmResponse {
            content: self.response.clone(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }
}

fn test_config(workspace: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.workspace = workspace.to_path_buf();
    config.embedding = EmbeddingSettings {
        provider: "hash".to_string(),
        model: "hash-v1".to_string(),
        dimensions: 96,
        endpoint: None,
    };
    config
}

fn test_corpus() -> Vec<Chunk> {
    vec![
        Chunk {
            text: "Malicious code incidents are contained by the response team.".to_string(),
            source: "Incident Response Plan".to_string(),
            page: 2,
        },
        Chunk {
            text: "Backups are retained for ninety days.".to_string(),
            source: "Backup and Data Retention Standard".to_string(),
            page: 5,
        },
    ]
}

async fn build_test_index(config: &AppConfig) {
    let provider = HashProvider::new("hash-v1".to_string(), 96);
    build_index(
        &test_corpus(),
        &provider,
        &config.index_path(),
        &ProgressReporter::noop(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_cited_answer_gets_disclaimer_and_context_has_provenance() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = test_config(temp.path());
    build_test_index(&config).await;

    let generator = Arc::new(ScriptedGenerator::new(format!(
        "Incidents involving ransomware fall under malicious code handling.\n\n\n{}\n* Incident Response Plan (Page 2)",
        REFERENCES_HEADER
    )));
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashProvider::new("hash-v1".to_string(), 96));

    let assistant = Assistant::with_clients(config, embedder, generator.clone());
    let answer = assistant.answer("how do we handle ransomware?").await;

    // Disclaimer appended exactly once, after the citation block
    assert!(answer.ends_with(PAGINATION_DISCLAIMER));
    assert_eq!(answer.matches(PAGINATION_DISCLAIMER).count(), 1);
    assert!(answer.contains("* Incident Response Plan (Page 2)"));

    // The prompt carried every retrieved passage with full provenance
    let prompt = generator.last_prompt();
    assert!(prompt.contains("Source: Incident Response Plan"));
    assert!(prompt.contains("Page: 2"));
    assert!(prompt.contains("Source: Backup and Data Retention Standard"));
    assert!(prompt.contains("Page: 5"));
    assert!(prompt.contains("how do we handle ransomware?"));
}

#[tokio::test]
async fn test_refusal_passes_through_exactly() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = test_config(temp.path());
    build_test_index(&config).await;

    let generator = Arc::new(ScriptedGenerator::new(REFUSAL_SENTENCE));
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashProvider::new("hash-v1".to_string(), 96));

    let assistant = Assistant::with_clients(config, embedder, generator);
    let answer = assistant.answer("what color is the sky?").await;

    assert_eq!(answer, REFUSAL_SENTENCE);
    assert!(!answer.contains(PAGINATION_DISCLAIMER));
}

#[tokio::test]
async fn test_missing_index_yields_build_instruction() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = test_config(temp.path());

    let generator = Arc::new(ScriptedGenerator::new("unused"));
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashProvider::new("hash-v1".to_string(), 96));

    let assistant = Assistant::with_clients(config, embedder, generator);
    let answer = assistant.answer("anything?").await;

    assert!(answer.contains("poliqa build"));
}

#[tokio::test]
async fn test_incompatible_index_yields_rebuild_instruction() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = test_config(temp.path());
    build_test_index(&config).await; // built at 96 dimensions

    let mut drifted = config.clone();
    drifted.embedding.dimensions = 768;

    let generator = Arc::new(ScriptedGenerator::new("unused"));
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashProvider::new("hash-v1".to_string(), 768));

    let assistant = Assistant::with_clients(drifted, embedder, generator);
    let answer = assistant.answer("anything?").await;

    assert!(answer.contains("Delete the index"));
    assert!(answer.contains("96"));
    assert!(answer.contains("768"));
}

#[tokio::test]
async fn test_build_report_on_empty_corpus() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = test_config(temp.path());

    let generator = Arc::new(ScriptedGenerator::new("unused"));
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashProvider::new("hash-v1".to_string(), 96));

    let assistant = Assistant::with_clients(config.clone(), embedder, generator);
    let report = assistant.build(&ProgressReporter::noop()).await.unwrap();

    assert!(!report.built);
    assert!(report.sources.is_empty());
    assert_eq!(report.chunk_count, 0);
    assert!(!config.index_path().exists());
}

#[tokio::test]
async fn test_clean_removes_artifact() {
    let temp = tempfile::TempDir::new().unwrap();
    let config = test_config(temp.path());
    build_test_index(&config).await;

    let generator = Arc::new(ScriptedGenerator::new("unused"));
    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(HashProvider::new("hash-v1".to_string(), 96));

    let assistant = Assistant::with_clients(config.clone(), embedder, generator);

    assert!(assistant.clean().unwrap());
    assert!(!config.index_path().exists());
    assert!(!assistant.clean().unwrap());
}
