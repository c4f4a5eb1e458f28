use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use unionwatch_common::{Config, NewsItem, StoreError};
use unionwatch_pipeline::feed::{FeedService, DEFAULT_SOURCES};
use unionwatch_pipeline::{recover, Analyst, EditorSession, JsonFileStore, Proposal};

#[derive(Parser)]
#[command(name = "unionwatch", about = "Labor-union research and news triage")]
#[command(version)]
struct Cli {
    /// Override the record store location
    #[arg(long, env = "UNIONWATCH_STORE_PATH", global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a full record for a union from web research
    Research {
        name: String,
        /// Commit the result to the store
        #[arg(long)]
        save: bool,
        /// With --save, replace a union that is already stored
        #[arg(long, requires = "save")]
        force: bool,
    },

    /// Extract one action or agreement from a news link
    AnalyzeLink {
        url: String,
        /// Commit the merged record to the store
        #[arg(long)]
        save: bool,
    },

    /// Triage recent labor-news items into suggestions
    Triage {
        /// JSON array of news items instead of fetching the default feeds
        #[arg(long)]
        feed_file: Option<PathBuf>,
        /// Merge and commit every suggestion
        #[arg(long)]
        accept_all: bool,
    },

    /// Recover a JSON payload from model output read on stdin
    Recover,

    /// List stored unions
    List {
        #[arg(long)]
        search: Option<String>,
    },

    /// Delete a stored union by id
    Delete { id: String },

    /// Dump the whole store as one JSON document keyed by id
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("unionwatch=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }
    config.log_redacted();

    match cli.command {
        Commands::Research { name, save, force } => research(&config, &name, save, force).await,
        Commands::AnalyzeLink { url, save } => analyze_link(&config, &url, save).await,
        Commands::Triage {
            feed_file,
            accept_all,
        } => triage(&config, feed_file, accept_all).await,
        Commands::Recover => recover_stdin().await,
        Commands::List { search } => list(&config, search.as_deref()).await,
        Commands::Delete { id } => delete(&config, &id).await,
        Commands::Export { output } => export(&config, output).await,
    }
}

async fn open_session(config: &Config) -> Result<EditorSession<JsonFileStore>> {
    let store = JsonFileStore::new(&config.store_path);
    EditorSession::open(store)
        .await
        .with_context(|| format!("Failed to open store {}", config.store_path.display()))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn research(config: &Config, name: &str, save: bool, force: bool) -> Result<()> {
    let analyst = Analyst::from_config(config);
    let record = analyst.research(name).await?;
    print_json(&record)?;

    if save {
        let mut session = open_session(config).await?;
        if force {
            session.approve(record).await?;
        } else {
            match session.create(record).await {
                Err(StoreError::Rejected(reason)) => anyhow::bail!(
                    "Not saved: {reason}. Use --force to replace it, which drops its actions."
                ),
                other => other?,
            }
        }
        eprintln!("Saved.");
    }
    Ok(())
}

async fn analyze_link(config: &Config, url: &str, save: bool) -> Result<()> {
    let analyst = Analyst::from_config(config);
    let mut session = open_session(config).await?;

    let Proposal {
        record,
        message,
        kind,
        key,
        ..
    } = analyst.analyze_link(url, session.unions()).await?;
    eprintln!("{message}");
    info!(union = record.id.as_str(), %kind, %key, "Link analyzed");
    print_json(&record)?;

    if save {
        session.approve(record).await?;
        eprintln!("Saved.");
    }
    Ok(())
}

async fn load_items(feed_file: Option<PathBuf>) -> Result<Vec<NewsItem>> {
    match feed_file {
        Some(path) => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let mut items: Vec<NewsItem> =
                serde_json::from_str(&text).context("Feed file is not a JSON array of news items")?;
            unionwatch_common::news::sort_newest_first(&mut items);
            Ok(items)
        }
        None => Ok(FeedService::new()?.fetch_all(DEFAULT_SOURCES).await),
    }
}

async fn triage(config: &Config, feed_file: Option<PathBuf>, accept_all: bool) -> Result<()> {
    let items = load_items(feed_file).await?;
    if items.is_empty() {
        eprintln!("No news items to analyze.");
        return Ok(());
    }

    let analyst = Analyst::from_config(config);
    let today = analyst.today();
    let mut report = analyst.triage(&items, today).await?;
    eprintln!("{}", report.status_message());
    print_json(&report)?;

    if accept_all && !report.suggestions.is_empty() {
        let mut session = open_session(config).await?;
        let ids: Vec<_> = report.suggestions.iter().map(|s| s.id).collect();
        for id in ids {
            // Re-read the snapshot each time so suggestions for the same
            // union stack instead of overwriting each other.
            let Some(proposal) = report.suggestions.accept(id, session.unions()) else {
                continue;
            };
            eprintln!("{}", proposal.message);
            session.approve(proposal.record).await?;
        }
        eprintln!("Saved.");
    }
    Ok(())
}

async fn recover_stdin() -> Result<()> {
    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read stdin")?;
    print_json(&recover(&raw)?)
}

async fn list(config: &Config, search: Option<&str>) -> Result<()> {
    let session = open_session(config).await?;
    let today = chrono::Utc::now().date_naive();

    let unions = match search {
        Some(term) => session.search(term),
        None => session.unions().iter().collect(),
    };
    for union in unions {
        println!(
            "{:<24} {:<48} actions={} upcoming={} agreements={}",
            union.id,
            union.name,
            union.actions.len(),
            union.upcoming_actions(today).len(),
            union.agreements.len()
        );
    }
    Ok(())
}

async fn delete(config: &Config, id: &str) -> Result<()> {
    let mut session = open_session(config).await?;
    if !session.contains(id) {
        anyhow::bail!("No union with id {id}");
    }
    session.remove(id).await?;
    eprintln!("Deleted {id}.");
    Ok(())
}

async fn export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let session = open_session(config).await?;
    let text = serde_json::to_string_pretty(&session.export())?;
    match output {
        Some(path) => {
            tokio::fs::write(&path, text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Exported {} union(s) to {}.", session.unions().len(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
