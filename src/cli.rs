use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use crate::formats::Gender;

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse biblical character data sets")]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Site base URL (overrides BIBLE_CHARACTERS_BASE_URL).
    #[arg(long, global = true, conflicts_with = "data_dir")]
    pub base_url: Option<String>,

    /// Read data from a local site root instead of HTTP.
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Only return characters of this gender.
    #[arg(long, global = true, value_parser = parse_gender)]
    pub gender: Option<Gender>,

    /// Use embedded sample records when a seed book cannot be loaded.
    #[arg(long, global = true)]
    pub offline_samples: bool,
}

fn parse_gender(raw: &str) -> Result<Gender, String> {
    raw.parse().map_err(|err: anyhow::Error| err.to_string())
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the manifest (or the built-in one if it cannot be loaded).
    Manifest,
    /// Print one book document.
    Book(BookArgs),
    /// Print every character across all books.
    All,
    /// Search characters by name, meaning, summary, tags or original-language name.
    Search(SearchArgs),
    /// Print the featured characters.
    Featured(FeaturedArgs),
    /// Print aggregate counts.
    Stats,
    /// Check a data set and report problems.
    Validate,
    /// Serve a site root over HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct BookArgs {
    /// Book id, e.g. `genesis` or `samuel1`.
    pub id: String,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(Debug, Args)]
pub struct FeaturedArgs {
    /// Maximum characters to return.
    #[arg(long, default_value_t = 6)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Directory containing `assets/data/`.
    #[arg(long)]
    pub root: String,

    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: SocketAddr,
}
