use std::collections::HashSet;

use crate::book_id::normalize_book_id;
use crate::formats::{CategoryMap, Manifest, ManifestBooks, Testament};

pub const BUILTIN_MANIFEST_VERSION: &str = "builtin";

/// Minimal book list used when the manifest cannot be fetched.
pub fn builtin_manifest() -> Manifest {
    let mut tanakh = CategoryMap::new();
    insert_category(
        &mut tanakh,
        "torah",
        &["genesis", "exodus", "leviticus", "numbers", "deuteronomy"],
    );
    insert_category(&mut tanakh, "neviim", &["joshua", "judges", "samuel", "kings"]);
    insert_category(&mut tanakh, "ketuvim", &["ruth", "esther", "daniel"]);

    let mut new_testament = CategoryMap::new();
    insert_category(&mut new_testament, "gospels", &["matthew", "mark", "luke", "john"]);
    insert_category(&mut new_testament, "history", &["acts"]);

    Manifest {
        version: BUILTIN_MANIFEST_VERSION.to_owned(),
        books: ManifestBooks {
            tanakh,
            new_testament,
        },
    }
}

pub fn insert_category(section: &mut CategoryMap, category: &str, ids: &[&str]) {
    section.insert(
        category.to_owned(),
        ids.iter().map(|id| (*id).to_owned()).collect(),
    );
}

impl Manifest {
    /// Every normalized book id, tanakh first, de-duplicated in first-seen
    /// order. Ids that fail normalization are dropped.
    pub fn book_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for ids in self
            .books
            .tanakh
            .values()
            .chain(self.books.new_testament.values())
        {
            for raw in ids {
                let id = match normalize_book_id(raw) {
                    Ok(id) => id,
                    Err(err) => {
                        tracing::warn!(book_id = %raw, %err, "ignoring invalid manifest book id");
                        continue;
                    }
                };
                if seen.insert(id.clone()) {
                    out.push(id);
                }
            }
        }
        out
    }

    /// Section holding `book_id` (compared after normalization).
    pub fn testament_of(&self, book_id: &str) -> Option<Testament> {
        let id = normalize_book_id(book_id).ok()?;
        if section_contains(&self.books.tanakh, &id) {
            Some(Testament::Tanakh)
        } else if section_contains(&self.books.new_testament, &id) {
            Some(Testament::NewTestament)
        } else {
            None
        }
    }
}

fn section_contains(section: &CategoryMap, id: &str) -> bool {
    section
        .values()
        .flatten()
        .any(|raw| normalize_book_id(raw).is_ok_and(|candidate| candidate == id))
}
