mod data_stub;

use std::time::Duration;

use bible_characters::formats::Gender;
use bible_characters::{Loader, LoaderConfig};
use data_stub::{DataStub, GENESIS, LUKE, MANIFEST, Reply, SAMUEL};

const MANIFEST_PATH: &str = "assets/data/manifest.json";

fn full_stub() -> DataStub {
    DataStub::spawn(vec![
        (MANIFEST_PATH, Reply::Json(MANIFEST.to_owned())),
        ("assets/data/books/genesis.json", Reply::Json(GENESIS.to_owned())),
        ("assets/data/books/samuel.json", Reply::Json(SAMUEL.to_owned())),
        ("assets/data/books/luke.json", Reply::Json(LUKE.to_owned())),
        ("assets/data/books/broken.json", Reply::Json("{\"book\": [".to_owned())),
        ("assets/data/books/gone.json", Reply::Status(500)),
    ])
}

fn loader(stub: &DataStub, config: LoaderConfig) -> anyhow::Result<Loader> {
    let config = LoaderConfig {
        base_url: url::Url::parse(&stub.base_url)?,
        ..config
    };
    Loader::http(config)
}

#[tokio::test]
async fn manifest_is_fetched_once() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let first = loader.initialize().await.clone();
    let second = loader.initialize().await.clone();

    assert_eq!(first, second);
    assert_eq!(first.version, "stub-1");
    assert_eq!(stub.hits(MANIFEST_PATH), 1);
    Ok(())
}

#[tokio::test]
async fn repeated_book_loads_hit_the_network_once() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let first = loader.load_book("genesis").await;
    let second = loader.load_book("genesis").await;

    assert_eq!(first.characters.len(), 3);
    assert_eq!(first, second);
    assert_eq!(stub.hits("assets/data/books/genesis.json"), 1);
    Ok(())
}

#[tokio::test]
async fn split_book_halves_fetch_one_document() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let first = loader.load_book("samuel1").await;
    let second = loader.load_book("samuel2").await;

    assert_eq!(first.book.id, "samuel");
    assert_eq!(first, second);
    assert_eq!(stub.hits("assets/data/books/samuel.json"), 1);
    assert_eq!(stub.hits("assets/data/books/samuel1.json"), 0);
    Ok(())
}

#[tokio::test]
async fn invalid_json_resolves_to_empty_document() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let doc = loader.load_book("broken").await;
    assert!(doc.characters.is_empty());
    assert_eq!(doc.book.id, "broken");
    Ok(())
}

#[tokio::test]
async fn http_errors_resolve_to_empty_document() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    assert!(loader.load_book("gone").await.characters.is_empty());
    assert!(loader.load_book("unlisted").await.characters.is_empty());
    assert_eq!(stub.hits("assets/data/books/unlisted.json"), 1);
    Ok(())
}

#[tokio::test]
async fn slow_books_time_out_to_fallback() -> anyhow::Result<()> {
    let stub = DataStub::spawn(vec![
        (MANIFEST_PATH, Reply::Json(MANIFEST.to_owned())),
        (
            "assets/data/books/genesis.json",
            Reply::Slow(Duration::from_secs(3), GENESIS.to_owned()),
        ),
    ]);
    let config = LoaderConfig {
        request_timeout: Duration::from_millis(300),
        ..LoaderConfig::default()
    };
    let loader = loader(&stub, config)?;

    let doc = loader.load_book("genesis").await;
    assert!(doc.characters.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreachable_manifest_uses_builtin_book_list() -> anyhow::Result<()> {
    let stub = DataStub::spawn(vec![(
        "assets/data/books/genesis.json",
        Reply::Json(GENESIS.to_owned()),
    )]);
    let loader = loader(&stub, LoaderConfig::default())?;

    let manifest = loader.initialize().await;
    assert_eq!(manifest.version, "builtin");
    assert!(manifest.book_ids().contains(&"genesis".to_owned()));

    let stats = loader.get_statistics().await;
    assert_eq!(stats.total_books, 1);
    assert_eq!(stats.total_characters, 3);
    assert_eq!(stats.by_testament.tanakh, 3);
    Ok(())
}

#[tokio::test]
async fn search_spans_books_and_skips_blank_queries() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let names = loader
        .search_characters("abram")
        .await
        .into_iter()
        .map(|e| e.character.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Abraham", "Sarah"]);

    let greek = loader.search_characters("Μαρ").await;
    assert_eq!(greek.len(), 1);
    assert_eq!(greek[0].book.id, "luke");

    assert!(loader.search_characters("").await.is_empty());
    Ok(())
}

#[tokio::test]
async fn gender_filter_applies_to_every_operation() -> anyhow::Result<()> {
    let stub = full_stub();
    let config = LoaderConfig {
        filter: Some(Gender::Female),
        ..LoaderConfig::default()
    };
    let loader = loader(&stub, config)?;

    let all = loader.get_all_characters().await;
    assert!(all.iter().all(|e| e.character.gender == Gender::Female));
    assert_eq!(all.len(), 4);

    let stats = loader.get_statistics().await;
    assert_eq!(stats.total_characters, 4);
    assert_eq!(stats.by_gender.female, 4);
    assert_eq!(stats.by_gender.male + stats.by_gender.unknown, 0);

    let cached = loader
        .cached_document("genesis")
        .await
        .expect("genesis cached");
    assert_eq!(cached.characters.len(), 3);
    Ok(())
}

#[tokio::test]
async fn statistics_sum_matches_loaded_books() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let stats = loader.get_statistics().await;
    let all = loader.get_all_characters().await;

    assert_eq!(stats.total_books, 3);
    assert_eq!(stats.total_characters, all.len());
    assert_eq!(stats.total_characters, 8);
    assert_eq!(stats.by_gender.total(), stats.total_characters);
    assert_eq!(stats.by_testament.tanakh, 6);
    assert_eq!(stats.by_testament.new_testament, 2);
    Ok(())
}

#[tokio::test]
async fn default_featured_list_resolves_in_order() -> anyhow::Result<()> {
    let stub = full_stub();
    let loader = loader(&stub, LoaderConfig::default())?;

    let featured = loader
        .get_featured_characters(3)
        .await
        .into_iter()
        .map(|e| format!("{}/{}", e.book.id, e.character.id))
        .collect::<Vec<_>>();

    // exodus/moses and ruth/ruth are not in the data set.
    assert_eq!(
        featured,
        vec!["genesis/abraham", "genesis/sarah", "samuel/david"]
    );
    Ok(())
}
