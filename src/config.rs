use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::formats::{FeaturedRef, Gender};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Curated characters shown on the landing page, in display order.
pub const DEFAULT_FEATURED: &[(&str, &str)] = &[
    ("genesis", "abraham"),
    ("genesis", "sarah"),
    ("exodus", "moses"),
    ("ruth", "ruth"),
    ("samuel", "david"),
    ("esther", "esther"),
    ("luke", "mary"),
    ("john", "jesus"),
    ("matthew", "peter"),
    ("acts", "paul"),
];

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub base_url: Url,
    /// Restricts every returned character list to one gender.
    pub filter: Option<Gender>,
    /// Serve embedded sample documents for seed books that fail to load.
    pub offline_samples: bool,
    pub request_timeout: Duration,
    /// Maximum books fetched at once by aggregate operations.
    pub concurrency: usize,
    pub featured: Vec<FeaturedRef>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            filter: None,
            offline_samples: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            featured: DEFAULT_FEATURED
                .iter()
                .map(|(book, character)| FeaturedRef::new(book, character))
                .collect(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid url")
}

impl LoaderConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `BIBLE_CHARACTERS_*` variables resolved through
    /// `lookup`. Blank values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();
        if let Some(raw) = get("BIBLE_CHARACTERS_BASE_URL") {
            config.base_url = parse_base_url(&raw).context("BIBLE_CHARACTERS_BASE_URL")?;
        }
        if let Some(raw) = get("BIBLE_CHARACTERS_GENDER") {
            config.filter = Some(raw.parse::<Gender>().context("BIBLE_CHARACTERS_GENDER")?);
        }
        if let Some(raw) = get("BIBLE_CHARACTERS_OFFLINE_SAMPLES") {
            config.offline_samples = parse_flag(&raw).context("BIBLE_CHARACTERS_OFFLINE_SAMPLES")?;
        }
        if let Some(raw) = get("BIBLE_CHARACTERS_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("BIBLE_CHARACTERS_TIMEOUT_SECS: {raw:?}"))?;
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(raw) = get("BIBLE_CHARACTERS_CONCURRENCY") {
            let concurrency: usize = raw
                .parse()
                .with_context(|| format!("BIBLE_CHARACTERS_CONCURRENCY: {raw:?}"))?;
            config.concurrency = concurrency.max(1);
        }
        Ok(config)
    }
}

pub fn parse_base_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("parse base url: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("base url must be http/https: {url}");
    }
    Ok(url)
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
