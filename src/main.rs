use std::process::ExitCode;

use anyhow::Context as _;
use bible_characters::cli::{Cli, Command};
use bible_characters::commands;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    bible_characters::logging::init("info").context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let source = &cli.source;
    match cli.command {
        Command::Manifest => commands::manifest(source).await.context("manifest")?,
        Command::Book(args) => commands::book(source, args).await.context("book")?,
        Command::All => commands::all(source).await.context("all")?,
        Command::Search(args) => commands::search(source, args).await.context("search")?,
        Command::Featured(args) => commands::featured(source, args)
            .await
            .context("featured")?,
        Command::Stats => commands::stats(source).await.context("stats")?,
        Command::Validate => commands::validate(source).await.context("validate")?,
        Command::Serve(args) => bible_characters::serve::run(args)
            .await
            .context("serve")?,
    }

    Ok(())
}
