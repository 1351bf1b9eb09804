use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::{BookArgs, FeaturedArgs, SearchArgs, SourceArgs};
use crate::config::{LoaderConfig, parse_base_url};
use crate::loader::Loader;
use crate::source::{DataSource, DirDataSource, HttpDataSource};

/// Resolves the data source: `--data-dir`, else `--base-url`, else the
/// environment/default base URL.
pub fn build_source(args: &SourceArgs) -> anyhow::Result<(LoaderConfig, Arc<dyn DataSource>)> {
    let mut config = LoaderConfig::from_env().context("read environment config")?;
    if let Some(raw) = args.base_url.as_deref() {
        config.base_url = parse_base_url(raw).context("--base-url")?;
    }
    if args.gender.is_some() {
        config.filter = args.gender;
    }
    if args.offline_samples {
        config.offline_samples = true;
    }

    let source: Arc<dyn DataSource> = match args.data_dir.as_deref() {
        Some(dir) => {
            tracing::debug!(data_dir = %dir, "using directory data source");
            Arc::new(DirDataSource::new(dir))
        }
        None => {
            tracing::debug!(base_url = %config.base_url, "using http data source");
            Arc::new(
                HttpDataSource::new(&config.base_url, config.request_timeout)
                    .context("build http data source")?,
            )
        }
    };
    Ok((config, source))
}

pub fn build_loader(args: &SourceArgs) -> anyhow::Result<Loader> {
    let (config, source) = build_source(args)?;
    Ok(Loader::new(config, source))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value).context("serialize output")?;
    out.write_all(b"\n").context("write output newline")?;
    out.flush().context("flush stdout")?;
    Ok(())
}

pub async fn manifest(args: &SourceArgs) -> anyhow::Result<()> {
    let loader = build_loader(args)?;
    print_json(loader.initialize().await)
}

pub async fn book(args: &SourceArgs, book: BookArgs) -> anyhow::Result<()> {
    let loader = build_loader(args)?;
    let doc = loader.load_book(&book.id).await;
    print_json(&*doc)
}

pub async fn all(args: &SourceArgs) -> anyhow::Result<()> {
    let loader = build_loader(args)?;
    print_json(&loader.get_all_characters().await)
}

pub async fn search(args: &SourceArgs, search: SearchArgs) -> anyhow::Result<()> {
    let loader = build_loader(args)?;
    print_json(&loader.search_characters(&search.query).await)
}

pub async fn featured(args: &SourceArgs, featured: FeaturedArgs) -> anyhow::Result<()> {
    let loader = build_loader(args)?;
    print_json(&loader.get_featured_characters(featured.limit).await)
}

pub async fn stats(args: &SourceArgs) -> anyhow::Result<()> {
    let loader = build_loader(args)?;
    print_json(&loader.get_statistics().await)
}

pub async fn validate(args: &SourceArgs) -> anyhow::Result<()> {
    let (_, source) = build_source(args)?;
    let report = crate::validate::validate(source.as_ref()).await;
    print_json(&report)?;

    tracing::info!(
        books = report.books.len(),
        warnings = report.warning_count(),
        errors = report.errors.len(),
        "validation finished"
    );
    if !report.is_ok() {
        anyhow::bail!("validation found {} error(s)", report.errors.len());
    }
    Ok(())
}
