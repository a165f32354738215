use clap::{Parser, Subcommand};

/// Extensible CLI for debugging and development
#[derive(Parser)]
#[command(name = "wallfeed")]
#[command(about = "Aggregate wallpapers and live clips from loosely-structured sources", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the aggregation API
    Serve {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
    /// Search for wallpapers (or clips with --video); no query means the
    /// random home feed
    Search {
        /// Query to search for
        query: Option<String>,
        /// Result page
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Search the video source instead of static wallpapers
        #[arg(long)]
        video: bool,
    },
    /// Manage the persistent offline cache
    Offline {
        #[command(subcommand)]
        action: OfflineAction,
    },
}

#[derive(Subcommand)]
pub enum OfflineAction {
    /// Pre-cache the core assets under the current generation
    Install,
    /// Purge superseded generations and claim the current one
    Activate,
    /// Delete a cache generation by tag
    Purge {
        /// Generation tag to delete
        generation: String,
    },
    /// List stored generations and entry count
    Status,
}
