use std::sync::Arc;

use crate::formats::{
    BookDocument, CharacterEntry, CharacterRecord, Gender, Manifest, Statistics, Testament,
};

/// Restricts a document to one gender. Without a filter the same `Arc` is
/// returned; the input is never modified.
pub fn filter_document(doc: &Arc<BookDocument>, filter: Option<Gender>) -> Arc<BookDocument> {
    let Some(gender) = filter else {
        return Arc::clone(doc);
    };
    Arc::new(BookDocument {
        book: doc.book.clone(),
        characters: doc
            .characters
            .iter()
            .filter(|c| c.gender == gender)
            .cloned()
            .collect(),
    })
}

pub fn annotate(doc: &BookDocument) -> impl Iterator<Item = CharacterEntry> + '_ {
    doc.characters.iter().map(|character| CharacterEntry {
        character: character.clone(),
        book: doc.book.clone(),
    })
}

/// Case-folded match on name, meaning, summary and tags; exact-case match on
/// the Hebrew and Greek forms.
pub fn character_matches(character: &CharacterRecord, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }

    let folded = query.to_lowercase();
    let folded_hit = |text: &str| text.to_lowercase().contains(&folded);
    if folded_hit(&character.name)
        || character.meaning.as_deref().is_some_and(folded_hit)
        || character.summary.as_deref().is_some_and(folded_hit)
        || character.tags.iter().any(|tag| folded_hit(tag.as_str()))
    {
        return true;
    }

    [character.hebrew.as_deref(), character.greek.as_deref()]
        .into_iter()
        .flatten()
        .any(|original| original.contains(query))
}

pub fn search_entries(entries: Vec<CharacterEntry>, query: &str) -> Vec<CharacterEntry> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    entries
        .into_iter()
        .filter(|entry| character_matches(&entry.character, query))
        .collect()
}

/// Folds loaded (already filtered) books into totals. Characters of books
/// outside both manifest sections count toward the totals only.
pub fn tally<'a>(
    manifest: &Manifest,
    books: impl IntoIterator<Item = (&'a str, &'a BookDocument)>,
) -> Statistics {
    let mut stats = Statistics::default();
    for (book_id, doc) in books {
        stats.total_books += 1;
        stats.total_characters += doc.characters.len();
        for character in &doc.characters {
            stats.by_gender.add(character.gender);
        }
        match manifest.testament_of(book_id) {
            Some(Testament::Tanakh) => stats.by_testament.tanakh += doc.characters.len(),
            Some(Testament::NewTestament) => {
                stats.by_testament.new_testament += doc.characters.len()
            }
            None => {}
        }
    }
    stats
}
