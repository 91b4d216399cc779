//! Structural completeness checks for rendered documents
//!
//! Each document type owns an ordered list of section requirements.
//! A requirement is satisfied when any markdown heading matches its
//! regex, case-insensitively; extra words around the match are fine
//! ("Proposed Approach" satisfies the Approach requirement).

use crate::error::WorkflowError;
use crate::models::{DocumentType, DocumentValidation, ProjectState, SectionRequirement};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::RegexBuilder;

const RFC_SECTIONS: &[SectionRequirement] = &[
    SectionRequirement { name: "Problem", required: true, pattern: r"\bproblem\b" },
    SectionRequirement { name: "Goals", required: true, pattern: r"\bgoals\b" },
    SectionRequirement { name: "Approach", required: true, pattern: r"\bapproach\b" },
    SectionRequirement { name: "Open Questions", required: false, pattern: r"\bopen questions\b" },
];

const PLAN_SECTIONS: &[SectionRequirement] = &[
    SectionRequirement { name: "Stages", required: true, pattern: r"\bstages?\b" },
    SectionRequirement { name: "Dependencies", required: false, pattern: r"\bdependencies\b" },
];

const ROLLOUT_SECTIONS: &[SectionRequirement] = &[
    SectionRequirement { name: "Risks", required: true, pattern: r"\brisks?\b" },
    SectionRequirement { name: "Milestones", required: true, pattern: r"\bmilestones?\b" },
    SectionRequirement { name: "Rollback", required: false, pattern: r"\brollback\b" },
];

/// The ordered requirement list for a document type
pub fn section_requirements(document_type: DocumentType) -> &'static [SectionRequirement] {
    match document_type {
        DocumentType::Rfc => RFC_SECTIONS,
        DocumentType::Plan => PLAN_SECTIONS,
        DocumentType::Rollout => ROLLOUT_SECTIONS,
    }
}

/// Extract heading text (any level) from markdown
fn collect_headings(text: &str) -> Vec<String> {
    let parser = Parser::new_ext(text, Options::all());
    let mut headings = Vec::new();
    let mut in_heading = false;
    let mut current = String::new();

    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                in_heading = true;
                current.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                headings.push(current.trim().to_string());
            }
            Event::Text(t) | Event::Code(t) if in_heading => {
                current.push_str(t.as_ref());
            }
            _ => {}
        }
    }

    headings
}

/// Validate a rendered document against its section requirements.
/// Required-but-missing sections fail validation; optional-but-missing
/// sections only produce warnings.
pub fn validate(document_type: DocumentType, text: &str) -> DocumentValidation {
    let headings = collect_headings(text);

    let mut result = DocumentValidation::passing();

    for requirement in section_requirements(document_type) {
        let matcher = match RegexBuilder::new(requirement.pattern)
            .case_insensitive(true)
            .build()
        {
            Ok(re) => re,
            Err(_) => continue, // invalid pattern in the table
        };
        let satisfied = headings.iter().any(|h| matcher.is_match(h));
        if satisfied {
            continue;
        }
        if requirement.required {
            result.missing_sections.push(requirement.name.to_string());
            result.valid = false;
        } else {
            result.warnings.push(requirement.name.to_string());
        }
    }

    result
}

/// Strict-mode gate for approval. Passes trivially when strict mode is
/// off; otherwise fails with one error per missing required section.
pub fn strict_mode_check(
    state: &ProjectState,
    document_type: DocumentType,
    text: &str,
) -> Result<(), WorkflowError> {
    if !state.strict_mode {
        return Ok(());
    }

    let validation = validate(document_type, text);
    if validation.valid {
        return Ok(());
    }

    Err(WorkflowError::StrictModeBlocked {
        document: document_type.name().to_string(),
        errors: validation
            .missing_sections
            .iter()
            .map(|s| format!("Missing required section: {}", s))
            .collect(),
    })
}
