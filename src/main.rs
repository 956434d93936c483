//! # startit CLI
//!
//! ## Usage
//!
//! ```bash
//! startit --config ./config/startit.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `startit init` | Create the SQLite database and run schema migrations |
//! | `startit scrape [URL]` | Run one scrape cycle and notify on changes |
//! | `startit extract <FILE>` | Extract postings from a saved listing page |
//! | `startit jobs [URL]` | List stored jobs for a search |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `info,sqlx=warn`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use startit_watch::{config, cycle, extract_cmd, jobs, migrate};

/// startit: watches a startit.rs job search and emails when postings
/// appear or disappear.
#[derive(Parser)]
#[command(name = "startit", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/startit.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the `jobs` and `baselines`
    /// tables. Running it more than once is safe.
    Init,

    /// Run one scrape cycle.
    ///
    /// The first cycle for a search records a baseline and sends a welcome
    /// message. Later cycles report postings that appeared or disappeared.
    Scrape {
        /// Search URL, e.g. `https://startit.rs/poslovi/pretraga/python/`.
        /// Defaults to `[scrape].url`.
        url: Option<String>,

        /// Recipient address. Defaults to `[notify].to`.
        #[arg(long)]
        to: Option<String>,

        /// Fetch, extract and reconcile without writing or sending anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract postings from a saved listing page.
    ///
    /// Does not read the config or touch the database.
    Extract {
        /// Path to an HTML file.
        path: PathBuf,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List stored jobs for a search.
    Jobs {
        /// Search URL. Defaults to `[scrape].url`.
        url: Option<String>,

        /// Include jobs that are no longer listed.
        #[arg(long)]
        all: bool,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Extract { path, json } = &cli.command {
        extract_cmd::run_extract(path, *json)?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Scrape { url, to, dry_run } => {
            cycle::run_scrape(&cfg, url, to, dry_run).await?;
        }
        Commands::Jobs { url, all, json } => {
            jobs::run_jobs(&cfg, url, all, json).await?;
        }
        Commands::Extract { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
