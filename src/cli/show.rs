//! `planforge show` - print a rendered document

use crate::models::DocumentType;
use crate::render;
use crate::state::ProjectStore;
use crate::validator;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, document: DocumentType) -> Result<()> {
    let store = ProjectStore::new(root);
    let state = store.load()?;

    let text = render::render(document, &state);
    println!("{}", text);

    let validation = validator::validate(document, &text);
    if !validation.valid {
        eprintln!(
            "{}",
            format!(
                "⚠ missing required sections: {}",
                validation.missing_sections.join(", ")
            )
            .yellow()
        );
    }
    for warning in &validation.warnings {
        eprintln!("{}", format!("· optional section absent: {}", warning).bright_black());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProjectMetadata;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_show_renders_each_document() {
        let temp = TempDir::new().unwrap();
        let store = ProjectStore::new(temp.path());
        store
            .initialize(ProjectMetadata {
                name: "p".to_string(),
                stack: vec![],
                constraints: vec![],
                created_at: Utc::now(),
            })
            .unwrap();

        for doc in DocumentType::ALL {
            run(temp.path(), doc).unwrap();
        }
    }
}
