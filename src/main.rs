use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repomark::config::AppConfig;
use repomark::telemetry::init_tracing;

mod cmd;

#[derive(Parser)]
#[command(name = "repomark")]
#[command(version, about = "Bookmark GitHub repositories and keep an eye on their health")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SQLite database path. Overrides REPOMARK_DB_PATH.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or upgrade the database
    Migrate,
    /// Insert the demo user and bookmarks
    Seed,
    /// List bookmarks with their health
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show health and language breakdowns
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Add a bookmark from form fields, e.g. `repository=owner/name note=...`
    Add {
        /// JSON file with repository metadata, keyed by owner/name
        #[arg(long)]
        metadata: PathBuf,

        /// Form fields as key=value
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Remove a bookmark
    Remove {
        /// owner/name or repository URL
        repository: String,
    },
    /// Validate add-bookmark form fields and print the result without saving
    Check {
        /// Form fields as key=value
        fields: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = AppConfig::from_env()?.with_db_path(cli.db_path.clone());

    match &cli.command {
        Commands::Migrate => cmd::cmd_migrate(&config)?,
        Commands::Seed => cmd::cmd_seed(&config)?,
        Commands::List { json } => cmd::cmd_list(&config, *json).await?,
        Commands::Stats { json } => cmd::cmd_stats(&config, *json).await?,
        Commands::Add { metadata, fields } => cmd::cmd_add(&config, metadata, fields).await?,
        Commands::Remove { repository } => cmd::cmd_remove(&config, repository).await?,
        Commands::Check { fields } => cmd::cmd_check(&config, fields)?,
    }

    Ok(())
}
