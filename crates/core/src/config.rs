//! Configuration management for the poliqa CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.poliqa/config.yaml)
//!
//! The configuration is workspace-centric: the corpus directory, the persisted
//! index, and the config file all live relative to the workspace root.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default number of passages retrieved per question.
pub const DEFAULT_RETRIEVAL_K: usize = 4;

/// Embedding provider settings.
///
/// The same settings must be active at build time and query time; the
/// persisted index records them so drift is detectable on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("ollama", "hash")
    pub provider: String,

    /// Model identifier (e.g., "nomic-embed-text")
    pub model: String,

    /// Expected embedding vector dimensions
    pub dimensions: usize,

    /// Optional custom endpoint URL (HTTP providers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            endpoint: None,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .poliqa/ and the corpus dir)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Answer generator provider (e.g., "ollama")
    pub provider: String,

    /// Answer generator model identifier
    pub model: String,

    /// Optional custom generator endpoint URL
    pub endpoint: Option<String>,

    /// API key for hosted providers, if any
    pub api_key: Option<String>,

    /// Directory containing the policy PDF corpus, relative to the
    /// workspace unless absolute
    pub corpus_dir: PathBuf,

    /// Number of passages retrieved per question
    pub retrieval_k: usize,

    /// Embedding provider settings
    pub embedding: EmbeddingSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    corpus: Option<CorpusConfig>,
    retrieval: Option<RetrievalConfig>,
    generator: Option<GeneratorConfig>,
    embedding: Option<EmbeddingSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusConfig {
    dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalConfig {
    k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeneratorConfig {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(),
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            corpus_dir: PathBuf::from("policies"),
            retrieval_k: DEFAULT_RETRIEVAL_K,
            embedding: EmbeddingSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `POLIQA_WORKSPACE`: Override workspace path
    /// - `POLIQA_CONFIG`: Path to config file
    /// - `POLIQA_PROVIDER`: Generator provider
    /// - `POLIQA_MODEL`: Generator model identifier
    /// - `POLIQA_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("POLIQA_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("POLIQA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".poliqa/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("POLIQA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("POLIQA_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("POLIQA_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(corpus) = config_file.corpus {
            if let Some(dir) = corpus.dir {
                result.corpus_dir = PathBuf::from(dir);
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if let Some(k) = retrieval.k {
                result.retrieval_k = k;
            }
        }

        if let Some(generator) = config_file.generator {
            if let Some(provider) = generator.provider {
                result.provider = provider;
            }
            if let Some(model) = generator.model {
                result.model = model;
            }
            if let Some(endpoint) = generator.endpoint {
                result.endpoint = Some(endpoint);
            }
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .poliqa directory.
    pub fn poliqa_dir(&self) -> PathBuf {
        self.workspace.join(".poliqa")
    }

    /// Get the fixed path of the persisted index artifact.
    pub fn index_path(&self) -> PathBuf {
        self.poliqa_dir().join("index.sqlite")
    }

    /// Get the absolute corpus directory path.
    pub fn corpus_path(&self) -> PathBuf {
        if self.corpus_dir.is_absolute() {
            self.corpus_dir.clone()
        } else {
            self.workspace.join(&self.corpus_dir)
        }
    }

    /// Ensure the .poliqa directory exists.
    pub fn ensure_poliqa_dir(&self) -> AppResult<()> {
        let dir = self.poliqa_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .poliqa directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let known_generators = ["ollama"];
        if !known_generators.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown generator provider: {}. Supported: {}",
                self.provider,
                known_generators.join(", ")
            )));
        }

        let known_embedders = ["ollama", "hash"];
        if !known_embedders.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                known_embedders.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be non-zero".to_string(),
            ));
        }

        if self.retrieval_k == 0 {
            return Err(AppError::Config(
                "Retrieval k must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
