use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gain_ranking::{
    FileFeed, Leaderboard, RankingConfig, RankingEngine, SnapshotSlot, SqliteStore,
};

/// Monthly gain ranking: refresh from a CSV feed and track rank movement
#[derive(Parser)]
#[command(name = "gain-ranking", version)]
struct Cli {
    /// JSON config file
    #[arg(long, env = "RANKING_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database holding the previous snapshot
    #[arg(long, env = "RANKING_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one refresh cycle and print the leaderboard
    Refresh {
        /// CSV feed file (defaults to feed_path from config)
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Rows to show
        #[arg(long)]
        top: Option<usize>,
    },
    /// Print the stored snapshot
    Show {
        #[arg(long)]
        top: Option<usize>,
    },
    /// Clear the stored snapshot
    Reset,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RankingConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RankingConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    let slot = SnapshotSlot::new(store, &config.storage_key);
    let mut engine = RankingEngine::new(config.columns.clone(), slot);

    match cli.command {
        Command::Refresh { feed, top } => {
            let feed_path = feed
                .or_else(|| config.feed_path.clone())
                .context("No feed given: pass --feed or set feed_path in config")?;

            let outcome = engine
                .refresh_from(&FileFeed::new(&feed_path))
                .context("Refresh failed, stored snapshot left unchanged")?;

            let board = Leaderboard::build(
                &outcome.current,
                &outcome.movements,
                top.unwrap_or(config.top_n),
            );

            println!("📊 Ranking Mensual de Ganancia");
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            print!("{}", board.render_text());
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!(
                "✓ {} rows accepted, {} dropped",
                outcome.report.accepted,
                outcome.report.rejected_count()
            );
            if !outcome.persisted {
                eprintln!("⚠️  Snapshot not saved; movement next time compares against the older one");
            }
        }
        Command::Show { top } => {
            let stored = engine.stored_snapshot();
            let board = Leaderboard::without_movement(&stored, top.unwrap_or(config.top_n));
            print!("{}", board.render_text());
        }
        Command::Reset => {
            engine.reset().context("Failed to clear stored snapshot")?;
            println!("✓ Stored snapshot cleared");
        }
    }

    Ok(())
}
