use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hebrew: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "unknown" => Ok(Gender::Unknown),
            other => anyhow::bail!("unknown gender: {other:?} (expected male, female or unknown)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hebrew: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greek: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_page: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDocument {
    pub book: BookDescriptor,
    pub characters: Vec<CharacterRecord>,
}

impl BookDocument {
    /// Empty-but-valid document standing in for a book that failed to load.
    pub fn fallback(book_id: &str) -> Self {
        Self {
            book: BookDescriptor {
                id: book_id.to_owned(),
                name: book_id.to_owned(),
                hebrew: None,
                character_count: Some(0),
            },
            characters: Vec::new(),
        }
    }

    pub fn character(&self, character_id: &str) -> Option<&CharacterRecord> {
        self.characters.iter().find(|c| c.id == character_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Testament {
    Tanakh,
    NewTestament,
}

/// Book ids grouped by category (e.g. `torah`, `gospels`).
pub type CategoryMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBooks {
    #[serde(default)]
    pub tanakh: CategoryMap,
    #[serde(default)]
    pub new_testament: CategoryMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(default)]
    pub books: ManifestBooks,
}

/// A character annotated with the book it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    #[serde(flatten)]
    pub character: CharacterRecord,
    pub book: BookDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
    pub unknown: usize,
}

impl GenderCounts {
    pub fn add(&mut self, gender: Gender) {
        match gender {
            Gender::Male => self.male += 1,
            Gender::Female => self.female += 1,
            Gender::Unknown => self.unknown += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.male + self.female + self.unknown
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestamentCounts {
    pub tanakh: usize,
    pub new_testament: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_characters: usize,
    pub total_books: usize,
    pub by_gender: GenderCounts,
    pub by_testament: TestamentCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedRef {
    pub book: String,
    pub character: String,
}

impl FeaturedRef {
    pub fn new(book: &str, character: &str) -> Self {
        Self {
            book: book.to_owned(),
            character: character.to_owned(),
        }
    }
}
