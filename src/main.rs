//! Command-line entry point.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use patent_portal::config::{load_settings, Settings, PASSCODE_ENV};
use patent_portal::export::ExportFormat;
use patent_portal::models::Column;
use patent_portal::repository::{Dataset, RecordStore};
use patent_portal::search::{self, Filter};
use patent_portal::server;

#[derive(Parser)]
#[command(name = "patents", version, about = "Search and export patent records")]
struct Cli {
    /// Dataset CSV (overrides config)
    #[arg(long, global = true, env = "PATENT_PORTAL_DATA_FILE")]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web dashboard
    Serve {
        #[arg(long, env = "PATENT_PORTAL_HOST")]
        host: Option<String>,
        #[arg(long, short, env = "PATENT_PORTAL_PORT")]
        port: Option<u16>,
    },
    /// Print matching records
    Search {
        #[command(flatten)]
        query: QueryArgs,
        /// Maximum rows to print
        #[arg(long, default_value_t = search::DEFAULT_DISPLAY_LIMIT)]
        limit: usize,
    },
    /// Write matching records to .xlsx or .csv
    Export {
        /// Output file; format follows the extension
        #[arg(long, short)]
        output: PathBuf,
        #[command(flatten)]
        query: QueryArgs,
    },
    /// Replace the dataset with another CSV after validating it
    Import {
        file: PathBuf,
    },
    /// Read the portal's version fields with a headless browser
    #[cfg(feature = "browser")]
    Scrape,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Column filter as COLUMN=TEXT; repeatable
    #[arg(long = "filter", short = 'f')]
    filters: Vec<String>,
    /// Match TEXT in any column
    #[arg(long)]
    any: Option<String>,
}

impl QueryArgs {
    fn to_filter(&self) -> anyhow::Result<Filter> {
        Ok(Filter::from_pairs(&self.filters, self.any.as_deref())?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings().await;
    if let Some(path) = cli.data_file {
        settings.data_file = path;
    }

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if settings.passcode().is_none() {
                anyhow::bail!("no passcode configured; set {}", PASSCODE_ENV);
            }
            server::serve(&settings).await
        }
        Command::Search { query, limit } => cmd_search(&settings, &query, limit),
        Command::Export { output, query } => cmd_export(&settings, &output, &query),
        Command::Import { file } => cmd_import(&settings, &file).await,
        #[cfg(feature = "browser")]
        Command::Scrape => cmd_scrape(&settings).await,
    }
}

fn load_dataset(settings: &Settings) -> anyhow::Result<Dataset> {
    Dataset::load(&settings.data_file)
        .with_context(|| format!("loading {}", settings.data_file.display()))
}

fn cmd_search(settings: &Settings, query: &QueryArgs, limit: usize) -> anyhow::Result<()> {
    let filter = query.to_filter()?;
    let dataset = load_dataset(settings)?;
    let matched = search::apply(&dataset.records, &filter);

    println!("Matches Found: {}", matched.len());
    for record in matched.iter().take(limit) {
        println!(
            "{}\t{}\t{}\t{}",
            record.get(Column::ApplicationNumber),
            record.get(Column::Title),
            record.get(Column::AgentName),
            record.get(Column::Classification)
        );
    }
    if matched.len() > limit {
        println!("... {} more", matched.len() - limit);
    }
    Ok(())
}

fn cmd_export(settings: &Settings, output: &Path, query: &QueryArgs) -> anyhow::Result<()> {
    let format = ExportFormat::from_path(output)?;
    let filter = query.to_filter()?;
    let dataset = load_dataset(settings)?;
    let matched = search::apply(&dataset.records, &filter);

    let bytes = format.render(&matched)?;
    std::fs::write(output, bytes).with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(rows = matched.len(), path = %output.display(), "Export written");
    Ok(())
}

async fn cmd_import(settings: &Settings, file: &Path) -> anyhow::Result<()> {
    let incoming = Dataset::load(file).with_context(|| format!("reading {}", file.display()))?;

    let store = RecordStore::open(&settings.data_file).await;
    let count = store.replace(incoming.records).await?;
    println!(
        "Replaced {} with {} records",
        settings.data_file.display(),
        count
    );
    Ok(())
}

#[cfg(feature = "browser")]
async fn cmd_scrape(settings: &Settings) -> anyhow::Result<()> {
    let config = &settings.scraper;
    let versions = patent_portal::scrapers::probe_versions(config).await?;
    println!("{}: {}", config.version_fields[0], versions.first);
    println!("{}: {}", config.version_fields[1], versions.second);
    Ok(())
}
