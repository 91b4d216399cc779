//! `planforge approve` - record content-hash approvals
//!
//! Renders the current document text, runs structural validation and
//! the strict-mode gate, then records the approval in the ledger.
//! Validation failures are recoverable with --force; the cross-document
//! consistency check (approve --all only) can be skipped outright.

use crate::models::DocumentType;
use crate::render;
use crate::state::ProjectStore;
use crate::validator;
use crate::{Result, WorkflowError};
use colored::Colorize;
use std::path::Path;

pub fn run(
    root: &Path,
    document: Option<DocumentType>,
    all: bool,
    force: bool,
    skip_consistency: bool,
) -> Result<()> {
    let store = ProjectStore::new(root);
    let state = store.load()?;

    let targets: Vec<DocumentType> = if all {
        DocumentType::ALL.to_vec()
    } else {
        match document {
            Some(doc) => vec![doc],
            None => {
                anyhow::bail!("Specify a document (rfc, plan, rollout) or pass --all");
            }
        }
    };

    if all && !skip_consistency {
        let findings = validator::check_consistency(&state);
        if !findings.is_empty() {
            for finding in &findings {
                eprintln!("{}", format!("⚠ {}", finding.message).yellow());
            }
            if !force {
                anyhow::bail!(
                    "Cross-document consistency check failed ({} findings). \
                     Fix them, or pass --force / --skip-consistency.",
                    findings.len()
                );
            }
            eprintln!("{}", "   proceeding despite findings (--force)".bright_black());
        }
    }

    for doc in targets {
        approve_one(&store, doc, force)?;
    }

    let state = store.load()?;
    if ProjectStore::are_all_documents_approved(&state) {
        println!("{}", "🏁 All documents approved.".green().bold());
    }

    Ok(())
}

fn approve_one(store: &ProjectStore, document: DocumentType, force: bool) -> Result<()> {
    let state = store.load()?;
    let text = render::render(document, &state);

    let validation = validator::validate(document, &text);
    if !validation.valid && !force {
        // Strict mode escalates the error kind; both are forceable
        if state.strict_mode {
            validator::strict_mode_check(&state, document, &text)?;
        }
        return Err(WorkflowError::ValidationFailed {
            document: document.name().to_string(),
            missing_sections: validation.missing_sections,
        }
        .into());
    }

    if !validation.valid {
        eprintln!(
            "{}",
            format!(
                "⚠ approving '{}' despite missing sections: {}",
                document,
                validation.missing_sections.join(", ")
            )
            .yellow()
        );
    }
    for warning in &validation.warnings {
        eprintln!("{}", format!("· optional section absent: {}", warning).bright_black());
    }

    store.record_approval(document, &text)?;
    println!("{}", format!("✅ approved {}", document).green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectMetadata;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup(strict: bool) -> (TempDir, ProjectStore) {
        let temp = TempDir::new().unwrap();
        let store = ProjectStore::new(temp.path());
        let mut state = store
            .initialize(ProjectMetadata {
                name: "p".to_string(),
                stack: vec![],
                constraints: vec![],
                created_at: Utc::now(),
            })
            .unwrap();
        state.strict_mode = strict;
        store.save(&state).unwrap();
        (temp, store)
    }

    #[test]
    fn test_approve_incomplete_rfc_blocked_without_force() {
        let (temp, _store) = setup(false);
        let err = run(temp.path(), Some(DocumentType::Rfc), false, false, false).unwrap_err();
        let workflow_err = err.downcast::<WorkflowError>().unwrap();
        assert!(matches!(workflow_err, WorkflowError::ValidationFailed { .. }));
    }

    #[test]
    fn test_strict_mode_blocks_with_distinct_error() {
        let (temp, _store) = setup(true);
        let err = run(temp.path(), Some(DocumentType::Rfc), false, false, false).unwrap_err();
        let workflow_err = err.downcast::<WorkflowError>().unwrap();
        assert!(matches!(workflow_err, WorkflowError::StrictModeBlocked { .. }));
    }

    #[test]
    fn test_force_approves_invalid_document() {
        let (temp, store) = setup(true);
        run(temp.path(), Some(DocumentType::Rfc), false, true, false).unwrap();

        let state = store.load().unwrap();
        assert!(ProjectStore::is_document_approved(&state, DocumentType::Rfc));
    }

    #[test]
    fn test_approve_valid_document_records_ledger_entry() {
        let (temp, store) = setup(false);
        let mut state = store.load().unwrap();
        state.document_progress.rfc.problem = Some("Slow".to_string());
        state.document_progress.rfc.goals = vec!["Fast".to_string()];
        state.document_progress.rfc.approach = Some("Cache".to_string());
        store.save(&state).unwrap();

        run(temp.path(), Some(DocumentType::Rfc), false, false, false).unwrap();

        let state = store.load().unwrap();
        assert!(ProjectStore::is_document_approved(&state, DocumentType::Rfc));
        let rendered = render::render(DocumentType::Rfc, &state);
        assert!(!ProjectStore::has_document_changed(
            &state,
            DocumentType::Rfc,
            &rendered
        ));
    }

    #[test]
    fn test_approve_all_consistency_findings_block() {
        // Fresh project: empty plan triggers a consistency finding
        let (temp, _store) = setup(false);
        assert!(run(temp.path(), None, true, false, false).is_err());
        // Skipping the check leaves only per-document validation, which
        // still fails without force
        assert!(run(temp.path(), None, true, false, true).is_err());
        // Force pushes everything through
        run(temp.path(), None, true, true, true).unwrap();
    }
}
