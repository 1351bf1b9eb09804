use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

/// Supplies the raw text of data files addressed by a relative path such as
/// `assets/data/manifest.json`.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_text(&self, path: &str) -> anyhow::Result<String>;

    /// Human-readable location of `path`, used in log lines.
    fn describe(&self, path: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct HttpDataSource {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpDataSource {
    pub fn new(base_url: &Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build data http client")?;
        Ok(Self {
            base_url: with_trailing_slash(base_url),
            client,
        })
    }

    pub fn url_for(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("join {path} onto {}", self.base_url))
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut out = url.clone();
    out.set_query(None);
    out.set_fragment(None);
    let path = out.path().to_owned();
    if !path.ends_with('/') {
        out.set_path(&format!("{path}/"));
    }
    out
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch_text(&self, path: &str) -> anyhow::Result<String> {
        let url = self.url_for(path)?;
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, concat!("bible-characters/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {url} returned {status}");
        }

        response
            .text()
            .await
            .with_context(|| format!("read response body: {url}"))
    }

    fn describe(&self, path: &str) -> String {
        match self.url_for(path) {
            Ok(url) => url.to_string(),
            Err(_) => path.to_owned(),
        }
    }
}

/// Reads data files from a local site root (the directory that contains
/// `assets/`).
#[derive(Debug, Clone)]
pub struct DirDataSource {
    root: PathBuf,
}

impl DirDataSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &str) -> anyhow::Result<PathBuf> {
        let mut out = self.root.clone();
        for segment in path.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if segment == ".." {
                anyhow::bail!("data path must not contain '..': {path}");
            }
            out.push(segment);
        }
        Ok(out)
    }
}

#[async_trait]
impl DataSource for DirDataSource {
    async fn fetch_text(&self, path: &str) -> anyhow::Result<String> {
        let file = self.file_path(path)?;
        tokio::fs::read_to_string(&file)
            .await
            .with_context(|| format!("read data file: {}", file.display()))
    }

    fn describe(&self, path: &str) -> String {
        match self.file_path(path) {
            Ok(file) => file.display().to_string(),
            Err(_) => path.to_owned(),
        }
    }
}
