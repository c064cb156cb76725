//! Answer post-processing.
//!
//! Normalizes line-break markup and reconciles the pipeline's 0-based
//! page numbering with human-facing viewers: answers that cite sources
//! get a fixed pagination disclaimer, everything else (including the
//! refusal sentence) passes through unchanged.

use crate::prompt::REFERENCES_HEADER;

/// Disclaimer appended after a citation block. Cited page numbers follow
/// the document's internal 0-based numbering; viewers count from 1.
pub const PAGINATION_DISCLAIMER: &str = "\n\n> Note: the page numbers cited above follow the document's internal numbering, which starts at 0. Add 1 to a cited page number to locate the page in a viewer.";

/// Post-process raw generator output into the final answer text.
pub fn postprocess(raw: &str) -> String {
    let clean = raw.replace("<br>", "\n").replace("<br/>", "\n");

    if clean.contains(REFERENCES_HEADER) {
        format!("{}{}", clean, PAGINATION_DISCLAIMER)
    } else {
        clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::REFUSAL_SENTENCE;

    #[test]
    fn test_line_break_markup_normalized() {
        let out = postprocess("first line<br>second line<br/>third line");
        assert_eq!(out, "first line\nsecond line\nthird line");
    }

    #[test]
    fn test_disclaimer_appended_once_after_citations() {
        let raw = format!(
            "Incidents are triaged by severity.\n\n\n{}\n* Policy A (Page 2)\n* Policy B (Page 5)",
            REFERENCES_HEADER
        );

        let out = postprocess(&raw);

        assert!(out.ends_with(PAGINATION_DISCLAIMER));
        assert_eq!(out.matches(PAGINATION_DISCLAIMER).count(), 1);
        assert!(out.contains("* Policy A (Page 2)"));
        assert!(out.contains("* Policy B (Page 5)"));
    }

    #[test]
    fn test_refusal_passes_through_without_disclaimer() {
        let out = postprocess(REFUSAL_SENTENCE);
        assert_eq!(out, REFUSAL_SENTENCE);
        assert!(!out.contains(PAGINATION_DISCLAIMER));
    }

    #[test]
    fn test_plain_answer_without_citations_unchanged() {
        let raw = "I could not determine an answer.";
        assert_eq!(postprocess(raw), raw);
    }
}
