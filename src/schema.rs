use anyhow::Context as _;
use serde_json::Value;

use crate::formats::{BookDescriptor, BookDocument, CharacterRecord, Manifest};

const SNIPPET_RADIUS: usize = 40;

#[derive(Debug, Clone)]
pub struct ParsedBook {
    pub document: BookDocument,
    pub warnings: Vec<String>,
}

/// Where and why a body failed to parse as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDiagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
    pub snippet: String,
}

impl std::fmt::Display for JsonDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {}, byte {}) near {:?}",
            self.message, self.line, self.column, self.offset, self.snippet
        )
    }
}

impl std::error::Error for JsonDiagnostic {}

pub fn diagnose_json_error(text: &str, err: &serde_json::Error) -> JsonDiagnostic {
    let offset = byte_offset(text, err.line(), err.column());
    JsonDiagnostic {
        message: err.to_string(),
        line: err.line(),
        column: err.column(),
        offset,
        snippet: snippet_around(text, offset),
    }
}

fn byte_offset(text: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (idx, current) in text.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            offset += column.saturating_sub(1).min(current.len());
            return offset.min(text.len());
        }
        offset += current.len();
    }
    text.len()
}

fn snippet_around(text: &str, offset: usize) -> String {
    let mut start = offset.saturating_sub(SNIPPET_RADIUS);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + SNIPPET_RADIUS).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_owned()
}

fn parse_value(text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).map_err(|err| anyhow::Error::new(diagnose_json_error(text, &err)))
}

pub fn parse_manifest(text: &str) -> anyhow::Result<Manifest> {
    let value = parse_value(text).context("parse manifest json")?;
    serde_json::from_value(value).context("deserialize manifest")
}

pub fn parse_book_document(requested_id: &str, text: &str) -> anyhow::Result<ParsedBook> {
    let value = parse_value(text).context("parse book json")?;
    let mut object = match value {
        Value::Object(object) => object,
        other => anyhow::bail!(
            "book document must be a JSON object, got {}",
            json_kind(&other)
        ),
    };

    let mut warnings = Vec::new();

    let book = match object.remove("book") {
        None | Some(Value::Null) => {
            warnings.push("missing `book` descriptor".to_owned());
            None
        }
        Some(raw) => match serde_json::from_value::<BookDescriptor>(raw) {
            Ok(book) => Some(book),
            Err(err) => {
                warnings.push(format!("malformed `book` descriptor: {err}"));
                None
            }
        },
    };

    let characters = match object.remove("characters") {
        None | Some(Value::Null) => {
            warnings.push("missing `characters` array".to_owned());
            Vec::new()
        }
        Some(Value::Array(items)) => {
            let mut characters = Vec::with_capacity(items.len());
            for (idx, mut item) in items.into_iter().enumerate() {
                drop_null_fields(&mut item);
                match serde_json::from_value::<CharacterRecord>(item) {
                    Ok(character) => characters.push(character),
                    Err(err) => warnings.push(format!("skipped character #{idx}: {err}")),
                }
            }
            characters
        }
        Some(other) => {
            warnings.push(format!(
                "`characters` must be an array, got {}",
                json_kind(&other)
            ));
            Vec::new()
        }
    };

    let book = book.unwrap_or_else(|| BookDescriptor {
        id: requested_id.to_owned(),
        name: requested_id.to_owned(),
        hebrew: None,
        character_count: None,
    });

    Ok(ParsedBook {
        document: BookDocument { book, characters },
        warnings,
    })
}

/// Null-valued keys read as absent, so `"tags": null` falls back to the field
/// default instead of rejecting the record.
fn drop_null_fields(item: &mut Value) {
    if let Value::Object(fields) = item {
        fields.retain(|_, value| !value.is_null());
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
