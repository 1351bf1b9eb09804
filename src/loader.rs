use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::{Mutex, OnceCell, OwnedMutexGuard, RwLock, Semaphore};
use tokio::task::JoinSet;

use crate::book_id::{MANIFEST_PATH, book_path, normalize_book_id};
use crate::config::LoaderConfig;
use crate::formats::{BookDocument, CharacterEntry, Manifest, Statistics};
use crate::manifest::builtin_manifest;
use crate::schema::{JsonDiagnostic, parse_book_document, parse_manifest};
use crate::search::{annotate, filter_document, search_entries, tally};
use crate::source::{DataSource, HttpDataSource};

/// Handle to a shared loader. Clones share the manifest, cache and in-flight
/// table.
#[derive(Clone)]
pub struct Loader {
    inner: Arc<Inner>,
}

struct Inner {
    config: LoaderConfig,
    source: Arc<dyn DataSource>,
    manifest: OnceCell<Manifest>,
    cache: RwLock<HashMap<String, Arc<BookDocument>>>,
    inflight: InflightLocks,
}

/// One async lock per book id; holding it serializes fetches of that id so
/// concurrent callers share a single request.
struct InflightLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InflightLocks {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(
                locks
                    .entry(key.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Drops `guard` and forgets the key unless another task is waiting on it.
    async fn release(&self, key: &str, guard: OwnedMutexGuard<()>) {
        drop(guard);
        let mut locks = self.locks.lock().await;
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }
}

impl std::fmt::Debug for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Loader")
            .field("config", &self.inner.config)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl Loader {
    pub fn new(config: LoaderConfig, source: Arc<dyn DataSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                source,
                manifest: OnceCell::new(),
                cache: RwLock::new(HashMap::new()),
                inflight: InflightLocks::new(),
            }),
        }
    }

    /// Loader fetching from `config.base_url` over HTTP.
    pub fn http(config: LoaderConfig) -> anyhow::Result<Self> {
        let source = HttpDataSource::new(&config.base_url, config.request_timeout)
            .context("build http data source")?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.manifest.initialized()
    }

    /// Fetches the manifest once. Later and concurrent calls share the first
    /// result.
    pub async fn initialize(&self) -> &Manifest {
        self.inner
            .manifest
            .get_or_init(|| self.fetch_manifest())
            .await
    }

    async fn fetch_manifest(&self) -> Manifest {
        match self.try_fetch_manifest().await {
            Ok(manifest) => {
                tracing::info!(
                    version = %manifest.version,
                    books = manifest.book_ids().len(),
                    "loaded manifest"
                );
                manifest
            }
            Err(err) => {
                tracing::warn!(
                    location = %self.inner.source.describe(MANIFEST_PATH),
                    error = %format!("{err:#}"),
                    "manifest unavailable; using built-in manifest"
                );
                builtin_manifest()
            }
        }
    }

    async fn try_fetch_manifest(&self) -> anyhow::Result<Manifest> {
        let text = self
            .inner
            .source
            .fetch_text(MANIFEST_PATH)
            .await
            .context("fetch manifest")?;
        parse_manifest(&text).map_err(|err| {
            log_json_diagnostic(&err, MANIFEST_PATH);
            err
        })
    }

    /// Returns the (filtered) document for `book_id`, fetching it on the first
    /// request. Split-book ids such as `samuel2` share the `samuel` entry.
    pub async fn load_book(&self, book_id: &str) -> Arc<BookDocument> {
        self.initialize().await;

        let id = match normalize_book_id(book_id) {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!(book_id = %book_id, %err, "invalid book id; returning empty book");
                return Arc::new(BookDocument::fallback(book_id.trim()));
            }
        };

        let doc = match self.resolve_book(&id).await {
            Some(doc) => doc,
            None => Arc::new(BookDocument::fallback(&id)),
        };
        self.filter_data(&doc)
    }

    /// Applies the configured category filter without touching `doc`.
    pub fn filter_data(&self, doc: &Arc<BookDocument>) -> Arc<BookDocument> {
        filter_document(doc, self.inner.config.filter)
    }

    /// Unfiltered cached document for an id, if present.
    pub async fn cached_document(&self, book_id: &str) -> Option<Arc<BookDocument>> {
        let id = normalize_book_id(book_id).ok()?;
        self.inner.cache.read().await.get(&id).cloned()
    }

    pub async fn cached_book_ids(&self) -> Vec<String> {
        let mut ids = self
            .inner
            .cache
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        ids.sort();
        ids
    }

    pub async fn clear_cache(&self) {
        let mut cache = self.inner.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        tracing::debug!(dropped, "cleared book cache");
    }

    /// Every character of every manifest book, in manifest order. Books that
    /// fail to load are skipped.
    pub async fn get_all_characters(&self) -> Vec<CharacterEntry> {
        let book_ids = self.initialize().await.book_ids();
        let books = self.load_books(book_ids).await;

        let mut entries = Vec::new();
        for (_, doc) in &books {
            entries.extend(annotate(&self.filter_data(doc)));
        }
        entries
    }

    pub async fn search_characters(&self, query: &str) -> Vec<CharacterEntry> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let entries = self.get_all_characters().await;
        let hits = search_entries(entries, query);
        tracing::debug!(query, hits = hits.len(), "search");
        hits
    }

    /// Resolves the configured featured list in order, skipping entries whose
    /// book or character cannot be found.
    pub async fn get_featured_characters(&self, limit: usize) -> Vec<CharacterEntry> {
        self.initialize().await;

        let mut featured = Vec::new();
        if limit == 0 {
            return featured;
        }
        for reference in &self.inner.config.featured {
            let doc = self.load_book(&reference.book).await;
            match doc.character(&reference.character) {
                Some(character) => featured.push(CharacterEntry {
                    character: character.clone(),
                    book: doc.book.clone(),
                }),
                None => tracing::debug!(
                    book = %reference.book,
                    character = %reference.character,
                    "featured character not found; skipping"
                ),
            }
            if featured.len() >= limit {
                break;
            }
        }
        featured
    }

    pub async fn get_statistics(&self) -> Statistics {
        let manifest = self.initialize().await;
        let books = self.load_books(manifest.book_ids()).await;
        let filtered = books
            .iter()
            .map(|(id, doc)| (id.as_str(), self.filter_data(doc)))
            .collect::<Vec<_>>();
        tally(manifest, filtered.iter().map(|(id, doc)| (*id, &**doc)))
    }

    /// Loads `ids` with bounded concurrency and returns the ones that resolved,
    /// in input order.
    async fn load_books(&self, ids: Vec<String>) -> Vec<(String, Arc<BookDocument>)> {
        let semaphore = Arc::new(Semaphore::new(self.inner.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for (idx, id) in ids.into_iter().enumerate() {
            let loader = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let doc = loader.resolve_book(&id).await;
                (idx, id, doc)
            });
        }

        let mut loaded = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, id, Some(doc))) => loaded.push((idx, id, doc)),
                Ok((_, id, None)) => {
                    tracing::warn!(book_id = %id, "skipping book that failed to load");
                }
                Err(err) => tracing::warn!(%err, "book load task failed"),
            }
        }
        loaded.sort_by_key(|(idx, _, _)| *idx);
        loaded.into_iter().map(|(_, id, doc)| (id, doc)).collect()
    }

    /// Cached or freshly fetched document for a normalized id, falling back
    /// to offline samples when enabled. `None` means the book is unavailable.
    async fn resolve_book(&self, id: &str) -> Option<Arc<BookDocument>> {
        match self.fetch_book(id).await {
            Ok(doc) => Some(doc),
            Err(err) => {
                tracing::warn!(
                    book_id = %id,
                    error = %format!("{err:#}"),
                    "book unavailable"
                );
                self.offline_sample(id)
            }
        }
    }

    fn offline_sample(&self, id: &str) -> Option<Arc<BookDocument>> {
        if !self.inner.config.offline_samples {
            return None;
        }
        let sample = crate::samples::offline_sample(id)?;
        tracing::info!(book_id = %id, "serving offline sample data");
        Some(Arc::new(sample))
    }

    async fn fetch_book(&self, id: &str) -> anyhow::Result<Arc<BookDocument>> {
        if let Some(doc) = self.inner.cache.read().await.get(id) {
            return Ok(Arc::clone(doc));
        }

        let inflight = self.inner.inflight.acquire(id).await;
        let result = self.fetch_uncached(id).await;
        self.inner.inflight.release(id, inflight).await;
        result
    }

    async fn fetch_uncached(&self, id: &str) -> anyhow::Result<Arc<BookDocument>> {
        // Another task may have filled the entry while we waited.
        if let Some(doc) = self.inner.cache.read().await.get(id) {
            return Ok(Arc::clone(doc));
        }

        let path = book_path(id);
        let location = self.inner.source.describe(&path);
        tracing::debug!(book_id = %id, %location, "fetching book");

        let text = self
            .inner
            .source
            .fetch_text(&path)
            .await
            .with_context(|| format!("fetch book {id}"))?;
        let parsed = match parse_book_document(id, &text) {
            Ok(parsed) => parsed,
            Err(err) => {
                log_json_diagnostic(&err, &location);
                return Err(err).with_context(|| format!("parse book {id}"));
            }
        };
        for warning in &parsed.warnings {
            tracing::warn!(book_id = %id, %location, %warning, "book document shape problem");
        }

        let doc = Arc::new(parsed.document);
        self.inner
            .cache
            .write()
            .await
            .insert(id.to_owned(), Arc::clone(&doc));
        Ok(doc)
    }
}

fn log_json_diagnostic(err: &anyhow::Error, location: &str) {
    let Some(diagnostic) = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<JsonDiagnostic>())
    else {
        return;
    };
    tracing::warn!(
        %location,
        message = %diagnostic.message,
        line = diagnostic.line,
        column = diagnostic.column,
        offset = diagnostic.offset,
        snippet = %diagnostic.snippet,
        "malformed json"
    );
}
