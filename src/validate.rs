use std::collections::HashSet;

use serde::Serialize;

use crate::book_id::{MANIFEST_PATH, book_path};
use crate::schema::{parse_book_document, parse_manifest};
use crate::source::DataSource;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub manifest_version: Option<String>,
    pub books: Vec<BookReport>,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.books.iter().map(|b| b.warnings.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookReport {
    pub id: String,
    pub characters: usize,
    pub warnings: Vec<String>,
}

pub async fn validate(source: &dyn DataSource) -> ValidationReport {
    let mut report = ValidationReport::default();

    let manifest = match source.fetch_text(MANIFEST_PATH).await {
        Ok(text) => match parse_manifest(&text) {
            Ok(manifest) => manifest,
            Err(err) => {
                report.errors.push(format!("{MANIFEST_PATH}: {err:#}"));
                return report;
            }
        },
        Err(err) => {
            report.errors.push(format!("{MANIFEST_PATH}: {err:#}"));
            return report;
        }
    };
    report.manifest_version = Some(manifest.version.clone());

    for id in manifest.book_ids() {
        let path = book_path(&id);
        let text = match source.fetch_text(&path).await {
            Ok(text) => text,
            Err(err) => {
                report.errors.push(format!("{path}: {err:#}"));
                continue;
            }
        };
        let parsed = match parse_book_document(&id, &text) {
            Ok(parsed) => parsed,
            Err(err) => {
                report.errors.push(format!("{path}: {err:#}"));
                continue;
            }
        };

        let mut warnings = parsed.warnings;
        let doc = parsed.document;
        if doc.book.id != id {
            warnings.push(format!(
                "descriptor id {:?} does not match file id {id:?}",
                doc.book.id
            ));
        }
        if let Some(count) = doc.book.character_count {
            if count as usize != doc.characters.len() {
                warnings.push(format!(
                    "characterCount is {count} but {} characters are listed",
                    doc.characters.len()
                ));
            }
        }
        let mut seen = HashSet::new();
        for character in &doc.characters {
            if !seen.insert(character.id.as_str()) {
                warnings.push(format!("duplicate character id {:?}", character.id));
            }
        }

        tracing::debug!(book_id = %id, warnings = warnings.len(), "validated book");
        report.books.push(BookReport {
            id,
            characters: doc.characters.len(),
            warnings,
        });
    }

    report
}
