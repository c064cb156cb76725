//! Corpus chunking with provenance tagging.
//!
//! Splits each document's per-page text into fixed-size character windows.
//! Each window becomes one [`Chunk`] tagged with the document's resolved
//! label and the page's 0-based index.

use crate::progress::ProgressReporter;
use crate::types::{Chunk, CorpusScan, DocumentOutcome};
use crate::{extract, labels};
use poliqa_core::AppResult;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Window size in characters. Windows do not overlap and page text is not
/// normalized before splitting.
pub const CHUNK_WINDOW: usize = 1000;

/// Scan the corpus directory and chunk every readable document.
///
/// - A missing corpus directory is created empty; the scan reports no
///   documents rather than failing.
/// - Pages with no extractable text contribute nothing.
/// - A per-document read/parse failure is recorded as a
///   [`DocumentOutcome::Skipped`] and the scan continues.
///
/// Progress (fraction of documents processed) is reported through the
/// observer as a side channel.
pub fn chunk_corpus(corpus_dir: &Path, progress: &ProgressReporter) -> AppResult<CorpusScan> {
    if !corpus_dir.exists() {
        std::fs::create_dir_all(corpus_dir)?;
        tracing::warn!(
            "Corpus directory {:?} did not exist; created it empty",
            corpus_dir
        );
        return Ok(CorpusScan::default());
    }

    let files = corpus_files(corpus_dir);
    let total = files.len() as u64;
    let mut scan = CorpusScan::default();

    for (i, path) in files.iter().enumerate() {
        let file = extract::file_name(path);

        match chunk_document(path, &file) {
            Ok((outcome, mut chunks)) => {
                scan.chunks.append(&mut chunks);
                scan.outcomes.push(outcome);
            }
            Err(err) => {
                tracing::warn!("Skipping {}: {}", file, err);
                scan.outcomes.push(DocumentOutcome::Skipped {
                    file: file.clone(),
                    reason: err.to_string(),
                });
            }
        }

        progress.document(i as u64 + 1, Some(total), &file);
    }

    tracing::info!(
        "Chunked {} documents into {} chunks ({} skipped)",
        scan.indexed_count(),
        scan.chunks.len(),
        scan.skipped().count()
    );

    Ok(scan)
}

/// Enumerate PDF files directly under the corpus directory, sorted by name.
fn corpus_files(corpus_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(corpus_dir)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// Chunk a single document into provenance-tagged windows.
fn chunk_document(path: &Path, file: &str) -> AppResult<(DocumentOutcome, Vec<Chunk>)> {
    let label = labels::resolve_label(file);
    let pages = extract::extract_pages(path)?;
    let page_count = pages.len();

    let mut chunks = Vec::new();
    for (page_num, page_text) in pages.iter().enumerate() {
        if page_text.is_empty() {
            // Scanned/image-only page: nothing to index.
            continue;
        }
        for window in window_text(page_text, CHUNK_WINDOW) {
            chunks.push(Chunk {
                text: window.to_string(),
                source: label.clone(),
                page: page_num as u32,
            });
        }
    }

    tracing::debug!("{}: {} pages, {} chunks", file, page_count, chunks.len());

    Ok((
        DocumentOutcome::Indexed {
            file: file.to_string(),
            label,
            pages: page_count,
            chunks: chunks.len(),
        },
        chunks,
    ))
}

/// Split text into consecutive windows of at most `window` characters.
///
/// Windows are counted in characters (not bytes) so multi-byte text never
/// splits inside a code point. For text of length L this yields
/// ceil(L / window) windows whose concatenation is exactly the input.
pub fn window_text(text: &str, window: usize) -> Vec<&str> {
    if text.is_empty() || window == 0 {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == window {
            windows.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    windows.push(&text[start..]);

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_count_is_ceil() {
        // L = 2500, W = 1000 -> ceil(2500/1000) = 3 windows
        let text = "a".repeat(2500);
        let windows = window_text(&text, 1000);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].chars().count(), 1000);
        assert_eq!(windows[1].chars().count(), 1000);
        assert_eq!(windows[2].chars().count(), 500);
    }

    #[test]
    fn test_windows_reconstruct_input() {
        let text = "The incident response plan defines escalation paths. ".repeat(40);
        let windows = window_text(&text, 1000);

        assert!(windows.iter().all(|w| w.chars().count() <= 1000));
        assert_eq!(windows.concat(), text);
    }

    #[test]
    fn test_window_exact_multiple() {
        let text = "x".repeat(2000);
        let windows = window_text(&text, 1000);
        assert_eq!(windows.len(), 2);
    }

    #[test]
    fn test_window_multibyte_boundaries() {
        let text = "política de segurança çãé".repeat(100);
        let windows = window_text(&text, 1000);

        let char_len = text.chars().count();
        assert_eq!(windows.len(), char_len.div_ceil(1000));
        assert_eq!(windows.concat(), text);
    }

    #[test]
    fn test_window_empty_text() {
        assert!(window_text("", 1000).is_empty());
    }

    #[test]
    fn test_missing_corpus_dir_created_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        let corpus = temp.path().join("policies");
        assert!(!corpus.exists());

        let scan = chunk_corpus(&corpus, &ProgressReporter::noop()).unwrap();

        assert!(corpus.exists());
        assert!(scan.chunks.is_empty());
        assert!(scan.outcomes.is_empty());
    }

    #[test]
    fn test_non_pdf_files_ignored() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "not a policy").unwrap();

        let scan = chunk_corpus(temp.path(), &ProgressReporter::noop()).unwrap();
        assert!(scan.outcomes.is_empty());
    }

    #[test]
    fn test_broken_document_skipped_with_reason() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("broken.pdf"), b"garbage bytes").unwrap();

        let scan = chunk_corpus(temp.path(), &ProgressReporter::noop()).unwrap();

        assert!(scan.chunks.is_empty());
        assert_eq!(scan.outcomes.len(), 1);
        match &scan.outcomes[0] {
            DocumentOutcome::Skipped { file, reason } => {
                assert_eq!(file, "broken.pdf");
                assert!(!reason.is_empty());
            }
            other => panic!("Expected Skipped outcome, got {:?}", other),
        }
    }
}
