//! Per-page PDF text extraction.

use poliqa_core::{AppError, AppResult};
use std::path::Path;

/// Extract the text of every page of a PDF document.
///
/// Returns one string per page; the vector index is the page's 0-based
/// number. Pages with no extractable text (scanned/image-only pages) come
/// back empty and are skipped by the chunker.
pub fn extract_pages(path: &Path) -> AppResult<Vec<String>> {
    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| AppError::Extract {
        file: file_name(path),
        reason: e.to_string(),
    })?;

    tracing::debug!("Extracted {} pages from {:?}", pages.len(), path);
    Ok(pages)
}

/// Best-effort filename for error reporting.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_extract_error() {
        let err = extract_pages(Path::new("/no/such/document.pdf")).unwrap_err();
        match err {
            AppError::Extract { file, .. } => assert_eq!(file, "document.pdf"),
            other => panic!("Expected Extract error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_file_is_extract_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("not_a_pdf.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let err = extract_pages(&path).unwrap_err();
        assert!(matches!(err, AppError::Extract { .. }));
    }
}
