/// Books stored as one document but numbered in references.
pub const SPLIT_BOOKS: &[&str] = &["samuel", "kings", "chronicles"];

/// Lowercased, charset-checked id. `samuel1`, `samuel2` and `samuel-2` fold to
/// `samuel`; other numbered ids such as `john1` stay distinct.
pub fn normalize_book_id(raw: &str) -> anyhow::Result<String> {
    let id = raw.trim().to_ascii_lowercase();
    if id.is_empty() {
        anyhow::bail!("book id is empty");
    }
    if let Some(ch) = id
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        anyhow::bail!("book id contains unsupported character {ch:?}: {raw:?}");
    }

    let stem = id.trim_end_matches(|ch: char| ch.is_ascii_digit());
    if stem.len() == id.len() {
        return Ok(id);
    }
    let stem = stem.trim_end_matches(['-', '_']);
    match SPLIT_BOOKS.iter().find(|split| **split == stem) {
        Some(split) => Ok((*split).to_owned()),
        None => Ok(id),
    }
}

/// Relative data path of a book document.
pub fn book_path(normalized_id: &str) -> String {
    format!("assets/data/books/{normalized_id}.json")
}

pub const MANIFEST_PATH: &str = "assets/data/manifest.json";
