//! Analog media CLI Application

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "analog-media")]
#[command(about = "Discover analog audio and video capture devices", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to ~/.config/analog-media/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the canonical device set
    List,
    /// Print display name to icon/address mapping as JSON
    Summary {
        /// Keep icon names instead of resolving them to files
        #[arg(long)]
        raw_icons: bool,
    },
    /// Rank audio cards against a query
    FindAudio { query: String },
    /// Rank video groups against a query (default: video0)
    FindVideo { query: Option<String> },
    /// Resolve a query to an ALSA address
    ResolveAudio { query: String },
    /// Resolve a query to a video node (default: video0)
    ResolveVideo { query: Option<String> },
    /// Start the named device until Ctrl-C
    Play { name: String },
    /// Print an example configuration file
    ConfigTemplate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("analog-media starting");

    let command = cli.command.unwrap_or(Commands::Summary { raw_icons: false });
    if let Commands::ConfigTemplate = command {
        print!("{}", analog_media_core::DeviceConfig::template());
        return Ok(());
    }

    let config = commands::load_config(cli.config).await;

    match command {
        Commands::List => commands::list(&config),
        Commands::Summary { raw_icons } => commands::summary(&config, raw_icons),
        Commands::FindAudio { query } => commands::find_audio(&config, &query),
        Commands::FindVideo { query } => commands::find_video(&config, query.as_deref()),
        Commands::ResolveAudio { query } => commands::resolve_audio(&config, &query),
        Commands::ResolveVideo { query } => commands::resolve_video(&config, query.as_deref()),
        Commands::Play { name } => commands::play(&config, &name).await,
        Commands::ConfigTemplate => Ok(()),
    }
}
