use crate::formats::{BookDescriptor, BookDocument, CharacterRecord, Gender};

pub const SEED_BOOKS: &[&str] = &["genesis", "matthew"];

pub fn offline_sample(book_id: &str) -> Option<BookDocument> {
    match book_id {
        "genesis" => Some(document(
            "genesis",
            "Genesis",
            Some("בְּרֵאשִׁית"),
            vec![
                character(
                    "adam",
                    "Adam",
                    Gender::Male,
                    Some("אָדָם"),
                    "Man; earth",
                    "The first man, formed from the dust of the ground.",
                    &["Genesis 2:7"],
                ),
                character(
                    "eve",
                    "Eve",
                    Gender::Female,
                    Some("חַוָּה"),
                    "Life; living",
                    "The first woman and mother of all the living.",
                    &["Genesis 3:20"],
                ),
                character(
                    "abraham",
                    "Abraham",
                    Gender::Male,
                    Some("אַבְרָהָם"),
                    "Father of a multitude",
                    "Called from Ur to a land God would show him.",
                    &["Genesis 12:1-3", "Genesis 17:5"],
                ),
                character(
                    "sarah",
                    "Sarah",
                    Gender::Female,
                    Some("שָׂרָה"),
                    "Princess",
                    "Wife of Abraham and mother of Isaac.",
                    &["Genesis 17:15", "Genesis 21:1-3"],
                ),
            ],
        )),
        "matthew" => Some(document(
            "matthew",
            "Matthew",
            None,
            vec![
                character(
                    "jesus",
                    "Jesus",
                    Gender::Male,
                    None,
                    "The LORD saves",
                    "Rabbi from Nazareth whose life the gospel records.",
                    &["Matthew 1:21"],
                ),
                character(
                    "mary",
                    "Mary",
                    Gender::Female,
                    None,
                    "Beloved",
                    "Mother of Jesus.",
                    &["Matthew 1:18"],
                ),
                character(
                    "peter",
                    "Peter",
                    Gender::Male,
                    None,
                    "Rock",
                    "Fisherman called to follow Jesus.",
                    &["Matthew 4:18", "Matthew 16:18"],
                ),
            ],
        )),
        _ => None,
    }
}

fn document(
    id: &str,
    name: &str,
    hebrew: Option<&str>,
    characters: Vec<CharacterRecord>,
) -> BookDocument {
    BookDocument {
        book: BookDescriptor {
            id: id.to_owned(),
            name: name.to_owned(),
            hebrew: hebrew.map(str::to_owned),
            character_count: u32::try_from(characters.len()).ok(),
        },
        characters,
    }
}

fn character(
    id: &str,
    name: &str,
    gender: Gender,
    hebrew: Option<&str>,
    meaning: &str,
    summary: &str,
    references: &[&str],
) -> CharacterRecord {
    CharacterRecord {
        id: id.to_owned(),
        name: name.to_owned(),
        hebrew: hebrew.map(str::to_owned),
        greek: None,
        gender,
        meaning: Some(meaning.to_owned()),
        summary: Some(summary.to_owned()),
        references: references.iter().map(|r| (*r).to_owned()).collect(),
        tags: vec!["sample".to_owned()],
        profile_path: None,
        multi_page: None,
    }
}
