mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, OfflineAction};
use wallfeed::config::FeedConfig;
use wallfeed::db::Database;
use wallfeed::item::SourceKind;
use wallfeed::offline::{LifecycleEvent, OfflineCacheManager};
use wallfeed::storage::OfflineStore;
use wallfeed::Wallfeed;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = FeedConfig::from_env();

    match cli.command {
        Commands::Serve { bind } => {
            let app = Wallfeed::new(config);
            app.serve(&bind).await?;
        }
        Commands::Search { query, page, video } => {
            let app = Wallfeed::new(config);
            let source = if video { SourceKind::Video } else { SourceKind::Static };
            let items = app
                .aggregator()
                .aggregate(query.as_deref(), page, source)
                .await?;
            if items.is_empty() {
                println!("Nothing found.");
            }
            for item in items {
                let media = item
                    .video
                    .as_deref()
                    .or(item.full.as_deref())
                    .or(item.thumbnail.as_deref())
                    .unwrap_or("<no media>");
                println!("{}  {}  {}", item.id, item.title, media);
            }
        }
        Commands::Offline { action } => {
            let db = Database::connect(config.database_url.as_deref()).await?;
            db.run_migrations().await?;
            let store: Arc<Database> = Arc::new(db.clone());
            let mut manager = OfflineCacheManager::new(
                store,
                reqwest::Client::new(),
                config.origin.clone(),
                config.cache_generation.clone(),
            );
            match action {
                OfflineAction::Install => {
                    manager.dispatch(LifecycleEvent::Install).await?;
                    println!("Installed generation {}", manager.generation());
                }
                OfflineAction::Activate => {
                    manager.dispatch(LifecycleEvent::Install).await?;
                    manager.dispatch(LifecycleEvent::Activate).await?;
                    println!("Active generation: {}", manager.generation());
                }
                OfflineAction::Purge { generation } => {
                    let removed = db.purge_generation(&generation).await?;
                    println!("Removed {removed} entries from {generation}");
                }
                OfflineAction::Status => {
                    let generations = db.list_generations().await?;
                    let entries = db.offline_entry_count().await?;
                    println!("Generations: {generations:?} ({entries} entries)");
                }
            }
        }
    }
    Ok(())
}
