//! StageKV CLI
//!
//! Command-line interface for inspecting and editing a StageKV directory.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stagekv::symlink::{self, WalkOutcome};
use stagekv::{Config, StorageAdapter, StoreError};
use tracing_subscriber::{fmt, EnvFilter};

/// StageKV CLI
#[derive(Parser, Debug)]
#[command(name = "stagekv-cli")]
#[command(about = "CLI for the StageKV key-value store")]
#[command(version)]
struct Args {
    /// Storage directory
    #[arg(short, long, default_value = "./stagekv_data")]
    dir: PathBuf,

    /// Refuse storage paths that resolve through a circular symlink
    #[arg(long)]
    reject_circular_symlinks: bool,

    /// fsync each entry file on commit
    #[arg(long)]
    sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },

    /// Remove every entry
    Clear,

    /// Report whether a symlink chain is circular
    CheckLink {
        /// The symlink to inspect
        path: PathBuf,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), StoreError> {
    if args.dir.as_os_str().is_empty() {
        return Err(StoreError::Config(
            "storage directory must not be empty".to_string(),
        ));
    }

    let config = Config::builder()
        .storage_dir(&args.dir)
        .reject_circular_symlinks(args.reject_circular_symlinks)
        .sync_writes(args.sync)
        .build();

    let mut store = StorageAdapter::with_config(config);

    match args.command {
        Commands::Get { key } => match store.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            store.transaction(|tx| {
                tx.update(&key, &value);
                Ok::<_, StoreError>(())
            })?;
            println!("OK");
        }
        Commands::Del { key } => {
            store.transaction(|tx| {
                tx.delete(&key);
                Ok::<_, StoreError>(())
            })?;
            println!("OK");
        }
        Commands::Clear => {
            store.transaction(|tx| {
                tx.clear();
                Ok::<_, StoreError>(())
            })?;
            println!("OK");
        }
        Commands::CheckLink { path } => {
            let walk = symlink::walk(&path)?;
            let label = match walk.outcome {
                WalkOutcome::Cycle => "circular",
                WalkOutcome::Dangling => "dangling",
                WalkOutcome::Terminal => "terminal",
            };
            println!("{}", label);
            for hop in &walk.hops {
                println!("  -> {}", hop.display());
            }
        }
    }

    Ok(())
}
