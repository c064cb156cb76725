//! Pipeline type definitions.

use serde::{Deserialize, Serialize};

/// A fixed-size slice of a single document page's text, tagged with its
/// provenance.
///
/// Immutable once created: produced by the chunker, owned by the index
/// after insertion, never mutated. `source` and `page` are non-optional by
/// construction, so a chunk without provenance cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Raw window of page text (no normalization applied)
    pub text: String,

    /// Display label of the source document
    pub source: String,

    /// 0-based page index within the source document
    pub page: u32,
}

/// A chunk returned by a similarity search. Ephemeral, produced per query,
/// never persisted.
#[derive(Debug, Clone)]
pub struct RetrievedPassage {
    /// The retrieved chunk with its provenance
    pub chunk: Chunk,

    /// 0-based position in the result list (0 = most similar)
    pub rank: usize,

    /// Cosine distance from the query vector (lower is more similar)
    pub distance: f32,
}

/// Per-document outcome of a corpus scan.
///
/// Replaces side-channel logging as the record of what happened to each
/// document: either it contributed chunks or it was skipped with a reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DocumentOutcome {
    /// The document was read and chunked
    Indexed {
        file: String,
        label: String,
        pages: usize,
        chunks: usize,
    },

    /// The document could not be read or parsed and was skipped
    Skipped { file: String, reason: String },
}

/// Result of scanning the corpus directory.
#[derive(Debug, Default)]
pub struct CorpusScan {
    /// All chunks, in document/page/window order
    pub chunks: Vec<Chunk>,

    /// One outcome per document found in the corpus
    pub outcomes: Vec<DocumentOutcome>,
}

impl CorpusScan {
    /// Number of documents that contributed chunks.
    pub fn indexed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Indexed { .. }))
            .count()
    }

    /// Documents that were skipped, with reasons.
    pub fn skipped(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Skipped { .. }))
    }
}

/// Report produced by a full index build.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    /// Whether an index was written. `false` means the corpus produced no
    /// chunks, a valid terminal state rather than an error.
    pub built: bool,

    /// Distinct source labels that entered the index, in first-seen order
    pub sources: Vec<String>,

    /// Total chunks indexed
    pub chunk_count: usize,

    /// Per-document outcomes from the corpus scan
    pub documents: Vec<DocumentOutcome>,
}
