//! Content hashing for approval drift detection
//!
//! Approvals store the hash of the literal rendered document. The
//! "has this document changed?" path normalizes line endings and
//! trims first, so a CRLF-only edit does not count as drift.

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of content, prefixed with algorithm name
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}

/// Normalize content for change detection: strip BOM, CRLF/CR → LF, trim
pub fn normalize_for_comparison(content: &str) -> String {
    let s = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    s.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Hash of the normalized content, for comparing against a stored hash
/// that was also computed over normalized text
pub fn normalized_hash(content: &str) -> String {
    content_hash(&normalize_for_comparison(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = content_hash("# RFC\n\nProblem statement");
        let b = content_hash("# RFC\n\nProblem statement");
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
    }

    #[test]
    fn test_hash_differs_for_different_content() {
        assert_ne!(content_hash("alpha"), content_hash("beta"));
    }

    #[test]
    fn test_normalization_ignores_line_endings() {
        let unix = "# RFC\n\n## Goals\n";
        let windows = "# RFC\r\n\r\n## Goals\r\n";
        assert_ne!(content_hash(unix), content_hash(windows));
        assert_eq!(normalized_hash(unix), normalized_hash(windows));
    }

    #[test]
    fn test_normalization_strips_bom() {
        let with_bom = "\u{FEFF}# RFC";
        assert_eq!(normalize_for_comparison(with_bom), "# RFC");
    }
}
