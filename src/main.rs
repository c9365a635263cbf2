// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use pawcam::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "pawcam")]
#[command(about = "Photo booth with filters, stack mode and paw prints")]
#[command(version = pawcam::constants::app_info::version())]
struct Cli {
    /// Config file (default: ~/.config/pawcam/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Photo collection file (overrides the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a single-frame photo
    Photo {
        /// Image file used as the camera frame
        #[arg(short, long)]
        source: PathBuf,

        /// Filter id (normal, vintage, noir, pawify)
        #[arg(short, long)]
        filter: Option<String>,

        /// Stamp paw prints on the photo
        #[arg(short, long)]
        paw: bool,
    },

    /// Take a stack-mode photo (several frames averaged)
    Stack {
        /// Image file used as the camera frame
        #[arg(short, long)]
        source: PathBuf,

        /// Filter id (normal, vintage, noir, pawify)
        #[arg(short, long)]
        filter: Option<String>,

        /// Stamp paw prints on the photo
        #[arg(short, long)]
        paw: bool,
    },

    /// Re-apply a filter and overlay to a stored photo
    Edit {
        /// Photo id (from 'pawcam gallery')
        id: i64,

        /// Filter id (normal, vintage, noir, pawify)
        #[arg(short, long)]
        filter: Option<String>,

        /// Stamp paw prints on the photo
        #[arg(short, long)]
        paw: bool,
    },

    /// List stored photos, newest first
    Gallery,

    /// Write a stored photo's image to a file
    Export {
        /// Photo id (from 'pawcam gallery')
        id: i64,

        /// Output file path
        output: PathBuf,
    },

    /// List available filters
    Filters,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=pawcam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(store) = cli.store {
        config.store_path = Some(store);
    }

    match cli.command {
        Commands::Photo {
            source,
            filter,
            paw,
        } => cli::take_photo(&config, &source, filter, paw, false),
        Commands::Stack {
            source,
            filter,
            paw,
        } => cli::take_photo(&config, &source, filter, paw, true),
        Commands::Edit { id, filter, paw } => cli::edit_photo(&config, id, filter, paw),
        Commands::Gallery => cli::list_gallery(&config),
        Commands::Export { id, output } => cli::export_photo(&config, id, &output),
        Commands::Filters => cli::list_filters(),
    }
}
