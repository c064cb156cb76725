//! Document label resolution.
//!
//! Maps corpus filenames to the human-readable display names used in
//! citations. Known documents come from a static table; anything else gets
//! a deterministic title derived from its filename.

/// Display labels for the stock policy corpus.
const DOCUMENT_LABELS: &[(&str, &str)] = &[
    (
        "PSI_Information_Security_Policy.pdf",
        "Information Security Policy",
    ),
    ("PUA_Acceptable_Use_Policy.pdf", "Acceptable Use Policy"),
    (
        "PCI_Information_Classification_Policy.pdf",
        "Information Classification Policy",
    ),
    (
        "PGA_Access_Management_Policy.pdf",
        "Access Management Policy",
    ),
    (
        "Backup_and_Data_Retention_Standard.pdf",
        "Backup and Data Retention Standard",
    ),
    (
        "BCP_DRP_Business_Continuity_and_Disaster_Recovery_Plan.pdf",
        "Business Continuity and Disaster Recovery Plan",
    ),
    ("Incident_Response_Plan.pdf", "Incident Response Plan"),
    (
        "IoMT_Connected_Medical_Device_Security_Procedure.pdf",
        "Connected Medical Device Security (IoMT)",
    ),
];

/// Resolve a corpus filename to its display label.
///
/// Falls back to [`derive_label`] for filenames not in the static table.
pub fn resolve_label(filename: &str) -> String {
    DOCUMENT_LABELS
        .iter()
        .find(|(file, _)| *file == filename)
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| derive_label(filename))
}

/// Derive a display label from a filename: strip the extension, replace
/// separators with spaces, title-case each word.
pub fn derive_label(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(filename);

    stem.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
        }
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_filename_uses_table() {
        assert_eq!(
            resolve_label("Incident_Response_Plan.pdf"),
            "Incident Response Plan"
        );
        assert_eq!(
            resolve_label("IoMT_Connected_Medical_Device_Security_Procedure.pdf"),
            "Connected Medical Device Security (IoMT)"
        );
    }

    #[test]
    fn test_unknown_filename_derives_title() {
        assert_eq!(
            resolve_label("password_rotation-guideline.pdf"),
            "Password Rotation Guideline"
        );
    }

    #[test]
    fn test_derive_label_is_deterministic() {
        assert_eq!(derive_label("a_b.pdf"), derive_label("a_b.pdf"));
        assert_eq!(derive_label("MIXED_case_NAME.pdf"), "Mixed Case Name");
    }

    #[test]
    fn test_derive_label_without_extension() {
        assert_eq!(derive_label("plain_name"), "Plain Name");
    }
}
