//! Validation result types for document structure checks

use serde::{Deserialize, Serialize};

/// One structural requirement for a document section. The pattern is a
/// regex matched against markdown heading text, case-insensitively;
/// extra words around the match are fine ("Proposed Approach" satisfies
/// a requirement whose pattern is `\bapproach\b`).
#[derive(Debug, Clone)]
pub struct SectionRequirement {
    pub name: &'static str,
    pub required: bool,
    pub pattern: &'static str,
}

/// Outcome of validating one document's rendered text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentValidation {
    pub valid: bool,
    /// Required sections with no matching heading
    pub missing_sections: Vec<String>,
    /// Optional sections with no matching heading
    pub warnings: Vec<String>,
}

impl DocumentValidation {
    pub fn passing() -> Self {
        Self {
            valid: true,
            missing_sections: Vec::new(),
            warnings: Vec::new(),
        }
    }
}
