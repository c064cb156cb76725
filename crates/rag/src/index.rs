//! Persisted vector index over chunk embeddings.
//!
//! The index is a single SQLite file holding a manifest (embedding
//! provider identity and dimensionality) and one row per chunk in
//! insertion order. It is fully self-contained: loadable without the
//! original documents. The build writes to a temporary path and renames
//! the finished file into place, so the artifact only ever exists as a
//! complete unit. There is no incremental update path; rebuilding means
//! deleting and recreating the whole file.

use crate::embeddings::EmbeddingProvider;
use crate::progress::ProgressReporter;
use crate::types::Chunk;
use poliqa_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

/// Chunks embedded per provider call between progress events.
const EMBED_BATCH: usize = 32;

/// Identity and shape of the index, written at build time and checked on
/// every load. Drift between the recorded values and the active embedding
/// provider makes the artifact unusable and must surface as
/// `IndexIncompatible`, never as silent corruption.
#[derive(Debug, Clone)]
pub struct IndexManifest {
    pub provider: String,
    pub model: String,
    pub dimensions: usize,
    pub chunk_count: usize,
    pub built_at: String,
}

/// Result of a build: whether an index was written, and the distinct
/// source labels it covers.
#[derive(Debug)]
pub struct BuildOutcome {
    pub built: bool,
    pub sources: Vec<String>,
}

/// A fully loaded, read-only index.
///
/// Rows are held in insertion order; the structure is immutable after
/// load and safe to share across concurrent queries.
#[derive(Debug)]
pub struct LoadedIndex {
    pub manifest: IndexManifest,
    pub rows: Vec<(Vec<f32>, Chunk)>,
}

impl LoadedIndex {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build and persist the index from chunks.
///
/// An empty chunk set returns `built = false` immediately and leaves any
/// existing artifact untouched ("nothing to do" is a valid terminal
/// state). Otherwise every chunk text is embedded with the active
/// provider and the finished file is atomically renamed over
/// `index_path`.
pub async fn build_index(
    chunks: &[Chunk],
    provider: &dyn EmbeddingProvider,
    index_path: &Path,
    progress: &ProgressReporter,
) -> AppResult<BuildOutcome> {
    if chunks.is_empty() {
        tracing::info!("No chunks to index; skipping build");
        return Ok(BuildOutcome {
            built: false,
            sources: Vec::new(),
        });
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let total = texts.len() as u64;

    let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH) {
        let vectors = provider.embed_batch(batch).await?;
        embeddings.extend(vectors);
        progress.embed(embeddings.len() as u64, Some(total), provider.model_name());
    }

    for (i, vector) in embeddings.iter().enumerate() {
        if vector.len() != provider.dimensions() {
            return Err(AppError::Embedding(format!(
                "Provider returned a {}-dimensional vector for chunk {} (expected {})",
                vector.len(),
                i,
                provider.dimensions()
            )));
        }
    }

    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = index_path.with_extension("tmp");
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path)?;
    }

    write_index(&tmp_path, chunks, &embeddings, provider)?;
    std::fs::rename(&tmp_path, index_path)?;
    progress.index(total, Some(total));

    tracing::info!(
        "Persisted index with {} chunks ({} dims) at {:?}",
        chunks.len(),
        provider.dimensions(),
        index_path
    );

    Ok(BuildOutcome {
        built: true,
        sources: distinct_sources(chunks),
    })
}

/// Distinct source labels in first-seen order.
fn distinct_sources(chunks: &[Chunk]) -> Vec<String> {
    let mut sources = Vec::new();
    for chunk in chunks {
        if !sources.contains(&chunk.source) {
            sources.push(chunk.source.clone());
        }
    }
    sources
}

/// Write the complete index file at `path`.
fn write_index(
    path: &Path,
    chunks: &[Chunk],
    embeddings: &[Vec<f32>],
    provider: &dyn EmbeddingProvider,
) -> AppResult<()> {
    let mut conn = Connection::open(path)
        .map_err(|e| AppError::Index(format!("Failed to create index file: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE manifest (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            dimensions INTEGER NOT NULL,
            chunk_count INTEGER NOT NULL,
            built_at TEXT NOT NULL
        );

        CREATE TABLE chunks (
            position INTEGER PRIMARY KEY,
            source TEXT NOT NULL,
            page INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Index(format!("Failed to create tables: {}", e)))?;

    conn.execute(
        "INSERT INTO manifest (id, provider, model, dimensions, chunk_count, built_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)",
        params![
            provider.provider_name(),
            provider.model_name(),
            provider.dimensions() as i64,
            chunks.len() as i64,
            chrono::Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| AppError::Index(format!("Failed to write manifest: {}", e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| AppError::Index(format!("Failed to start transaction: {}", e)))?;

    for (position, (chunk, embedding)) in chunks.iter().zip(embeddings.iter()).enumerate() {
        tx.execute(
            "INSERT INTO chunks (position, source, page, text, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                position as i64,
                chunk.source,
                chunk.page as i64,
                chunk.text,
                embedding_to_bytes(embedding),
            ],
        )
        .map_err(|e| AppError::Index(format!("Failed to insert chunk {}: {}", position, e)))?;
    }

    tx.commit()
        .map_err(|e| AppError::Index(format!("Failed to commit chunks: {}", e)))?;

    Ok(())
}

/// Load the persisted index read-only.
///
/// A missing artifact is `IndexMissing`; a structurally broken one is a
/// generic `Index` error. Provider compatibility is checked separately by
/// [`verify_compatibility`] so callers can distinguish the two.
pub fn load_index(index_path: &Path) -> AppResult<LoadedIndex> {
    if !index_path.exists() {
        return Err(AppError::IndexMissing(index_path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(index_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Index(format!("Failed to open index: {}", e)))?;

    let manifest = read_manifest_from(&conn)?;

    let mut stmt = conn
        .prepare("SELECT source, page, text, embedding FROM chunks ORDER BY position")
        .map_err(|e| AppError::Index(format!("Failed to prepare chunk query: {}", e)))?;

    let mapped = stmt
        .query_map([], |row| {
            let source: String = row.get(0)?;
            let page: i64 = row.get(1)?;
            let text: String = row.get(2)?;
            let blob: Vec<u8> = row.get(3)?;
            Ok((source, page, text, blob))
        })
        .map_err(|e| AppError::Index(format!("Failed to query chunks: {}", e)))?;

    let mut rows = Vec::with_capacity(manifest.chunk_count);
    for item in mapped {
        let (source, page, text, blob) =
            item.map_err(|e| AppError::Index(format!("Failed to read chunk row: {}", e)))?;
        let embedding = bytes_to_embedding(&blob)?;

        if embedding.len() != manifest.dimensions {
            return Err(AppError::IndexIncompatible(format!(
                "stored vector has {} dimensions but the manifest records {}",
                embedding.len(),
                manifest.dimensions
            )));
        }

        rows.push((
            embedding,
            Chunk {
                text,
                source,
                page: page as u32,
            },
        ));
    }

    tracing::debug!(
        "Loaded index: {} chunks, {} dims, provider {}/{}",
        rows.len(),
        manifest.dimensions,
        manifest.provider,
        manifest.model
    );

    Ok(LoadedIndex { manifest, rows })
}

/// Read only the manifest of the persisted index.
pub fn read_manifest(index_path: &Path) -> AppResult<IndexManifest> {
    if !index_path.exists() {
        return Err(AppError::IndexMissing(index_path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(index_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Index(format!("Failed to open index: {}", e)))?;

    read_manifest_from(&conn)
}

fn read_manifest_from(conn: &Connection) -> AppResult<IndexManifest> {
    conn.query_row(
        "SELECT provider, model, dimensions, chunk_count, built_at FROM manifest WHERE id = 1",
        [],
        |row| {
            Ok(IndexManifest {
                provider: row.get(0)?,
                model: row.get(1)?,
                dimensions: row.get::<_, i64>(2)? as usize,
                chunk_count: row.get::<_, i64>(3)? as usize,
                built_at: row.get(4)?,
            })
        },
    )
    .map_err(|e| AppError::Index(format!("Failed to read index manifest: {}", e)))
}

/// Check the manifest against the active embedding provider.
///
/// Provider, model, and dimensionality must all match what the index was
/// built with; any drift is an `IndexIncompatible` error telling the user
/// to delete and rebuild.
pub fn verify_compatibility(
    manifest: &IndexManifest,
    provider: &dyn EmbeddingProvider,
) -> AppResult<()> {
    if manifest.provider != provider.provider_name() || manifest.model != provider.model_name() {
        return Err(AppError::IndexIncompatible(format!(
            "index was built with {}/{} but the active provider is {}/{}",
            manifest.provider,
            manifest.model,
            provider.provider_name(),
            provider.model_name()
        )));
    }

    if manifest.dimensions != provider.dimensions() {
        return Err(AppError::IndexIncompatible(format!(
            "index vectors have {} dimensions but the active provider produces {}",
            manifest.dimensions,
            provider.dimensions()
        )));
    }

    Ok(())
}

/// Delete the persisted index artifact, if present.
///
/// This is the only rebuild path: there is no in-place update.
pub fn delete_index(index_path: &Path) -> AppResult<bool> {
    if index_path.exists() {
        std::fs::remove_file(index_path)?;
        tracing::info!("Deleted index at {:?}", index_path);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Convert an embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert stored bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Index(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        embedding.push(value);
    }

    Ok(embedding)
}
