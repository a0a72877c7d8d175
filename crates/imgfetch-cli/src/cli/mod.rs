//! CLI for the imgfetch batch image downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imgfetch_core::config::{self, FetchConfig, FetchMode};
use std::path::PathBuf;

use commands::{run_add_record, run_from_records, run_from_sheet};

/// Top-level CLI for the imgfetch batch image downloader.
#[derive(Debug, Parser)]
#[command(name = "imgfetch")]
#[command(about = "imgfetch: batch image downloader for manifest workbooks", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL listed in an xlsx manifest into its directory column.
    FromSheet {
        /// Path to the xlsx file (first row: directory names; columns: URLs).
        file: PathBuf,

        /// Root under which the directory columns are created (default: current directory).
        #[arg(long)]
        root: Option<PathBuf>,

        /// Fetch one URL at a time instead of fanning out per directory.
        #[arg(long)]
        sequential: bool,

        /// Replace files that already exist instead of skipping them.
        #[arg(long)]
        overwrite: bool,

        /// Print the full per-URL report as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Download the source URL of every stored image record into a directory.
    FromRecords {
        /// Directory receiving the downloaded images.
        output_dir: PathBuf,

        /// Record database path (default: under the XDG state directory).
        #[arg(long)]
        db: Option<PathBuf>,

        /// Fetch one URL at a time instead of fanning out.
        #[arg(long)]
        sequential: bool,

        /// Replace files that already exist instead of skipping them.
        #[arg(long)]
        overwrite: bool,

        /// Print the full per-URL report as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Add one image record to the record store.
    AddRecord {
        /// Image URL to store.
        url: String,

        /// Free-form tag for the record.
        #[arg(long)]
        tag: Option<String>,

        /// Index of the source the URL was scraped from.
        #[arg(long)]
        source_index: Option<i64>,

        /// Record database path (default: under the XDG state directory).
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::FromSheet {
                file,
                root,
                sequential,
                overwrite,
                json,
            } => {
                apply_overrides(&mut cfg, sequential, overwrite);
                let root = match root {
                    Some(r) => r,
                    None => std::env::current_dir()?,
                };
                run_from_sheet(&file, &root, &cfg, json).await?;
            }
            CliCommand::FromRecords {
                output_dir,
                db,
                sequential,
                overwrite,
                json,
            } => {
                apply_overrides(&mut cfg, sequential, overwrite);
                run_from_records(db.as_deref(), &output_dir, &cfg, json).await?;
            }
            CliCommand::AddRecord {
                url,
                tag,
                source_index,
                db,
            } => {
                run_add_record(db.as_deref(), source_index, tag.as_deref(), &url).await?;
            }
        }

        Ok(())
    }
}

fn apply_overrides(cfg: &mut FetchConfig, sequential: bool, overwrite: bool) {
    if sequential {
        cfg.mode = FetchMode::Sequential;
    }
    if overwrite {
        cfg.overwrite_existing = true;
    }
}
