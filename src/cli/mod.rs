//! Command-line interface for filegrid.
//!
//! Provides commands for publishing the availability report, inspecting
//! the matrix locally, debugging the normalizer, and managing credentials.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::adapters::{list_folder_tree, Authenticator, DriveLister, SheetPublisher, SheetsPublisher};
use crate::config;
use crate::core::{normalize, Normalized, PresenceMatrix};

/// filegrid - Drive folder inventory to formatted availability spreadsheet
#[derive(Parser, Debug)]
#[command(name = "filegrid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the availability matrix and publish it as a formatted sheet
    Report {
        /// Drive folder to inventory (overrides config)
        #[arg(short, long)]
        folder_id: Option<String>,

        /// Spreadsheet title (overrides config)
        #[arg(long)]
        title: Option<String>,

        /// Folder column to exclude (repeatable, adds to config)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Build the matrix and print it locally without publishing
    Matrix {
        /// Drive folder to inventory (overrides config)
        #[arg(short, long)]
        folder_id: Option<String>,

        /// Print as CSV instead of an aligned table
        #[arg(long)]
        csv: bool,

        /// Folder column to exclude (repeatable, adds to config)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
    },

    /// Show the canonical key for one filename
    Normalize {
        /// Raw filename to normalize
        filename: String,
    },

    /// Authorize access to the Google APIs and store credentials
    Login,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Report {
                folder_id,
                title,
                exclude,
            } => publish_report(folder_id, title, exclude).await,
            Commands::Matrix {
                folder_id,
                csv,
                exclude,
            } => print_matrix(folder_id, csv, exclude).await,
            Commands::Normalize { filename } => show_normalized(&filename),
            Commands::Login => login().await,
            Commands::Config => show_config(),
        }
    }
}

/// Resolve the folder id from flag or config, or fail with guidance
fn resolve_folder_id(flag: Option<String>) -> Result<String> {
    if let Some(id) = flag {
        return Ok(id);
    }
    config::config()?
        .folder_id
        .clone()
        .context("No folder id configured; pass --folder-id or set folder_id in .filegrid/config.yaml")
}

/// Merge configured exclusions with the ones given on the command line
fn merged_exclusions(mut flags: Vec<String>) -> Result<Vec<String>> {
    let mut exclude = config::config()?.exclude_columns.clone();
    exclude.append(&mut flags);
    Ok(exclude)
}

/// List the folder tree and build the (exclusion-filtered) matrix
async fn build_matrix(
    auth: Arc<Authenticator>,
    folder_id: &str,
    exclude: &[String],
) -> Result<PresenceMatrix> {
    let lister = DriveLister::new(auth);

    info!(folder_id, "listing folder tree");
    let listing = list_folder_tree(&lister, folder_id).await?;
    info!(
        folders = listing.folders().count(),
        files = listing.total_files(),
        "listing complete"
    );

    Ok(PresenceMatrix::build(&listing).without_columns(exclude))
}

/// Full pipeline: list, build, publish
async fn publish_report(
    folder_id: Option<String>,
    title: Option<String>,
    exclude: Vec<String>,
) -> Result<()> {
    let conf = config::config()?;
    let folder_id = resolve_folder_id(folder_id)?;
    let exclude = merged_exclusions(exclude)?;
    let title = title.unwrap_or_else(|| conf.report_title.clone());

    let auth = Arc::new(Authenticator::new(&conf.conf_dir)?);
    let matrix = build_matrix(auth.clone(), &folder_id, &exclude).await?;
    if matrix.is_empty() {
        println!("No recognizable files found; nothing to publish.");
        return Ok(());
    }

    let publisher = SheetsPublisher::new(auth);
    let spreadsheet_id = publisher.publish(&matrix, &folder_id, &title).await?;

    println!("Published: https://docs.google.com/spreadsheets/d/{spreadsheet_id}");
    Ok(())
}

/// Build the matrix and print it to stdout
async fn print_matrix(folder_id: Option<String>, csv: bool, exclude: Vec<String>) -> Result<()> {
    let conf = config::config()?;
    let folder_id = resolve_folder_id(folder_id)?;
    let exclude = merged_exclusions(exclude)?;

    let auth = Arc::new(Authenticator::new(&conf.conf_dir)?);
    let matrix = build_matrix(auth, &folder_id, &exclude).await?;
    let grid = matrix.to_rows();

    if csv {
        for row in &grid {
            let line: Vec<String> = row.iter().map(|cell| csv_escape(cell)).collect();
            println!("{}", line.join(","));
        }
    } else {
        print_aligned(&grid);
    }
    Ok(())
}

/// Quote a CSV cell when it needs it
fn csv_escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Print the grid as a space-aligned table
fn print_aligned(grid: &[Vec<String>]) {
    let columns = grid.iter().map(|row| row.len()).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            grid.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.len())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in grid {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

/// Show what the normalizer makes of one filename
fn show_normalized(filename: &str) -> Result<()> {
    match normalize(filename) {
        Normalized::Kept { number, key } => {
            println!("key:    {key}");
            println!("number: {number}");
        }
        Normalized::Discarded(reason) => {
            println!("discarded: {reason}");
        }
    }
    Ok(())
}

/// Run the interactive OAuth flow
async fn login() -> Result<()> {
    let conf = config::config()?;
    std::fs::create_dir_all(&conf.conf_dir)
        .with_context(|| format!("Failed to create {}", conf.conf_dir.display()))?;
    let auth = Authenticator::new(&conf.conf_dir)?;
    auth.login().await
}

/// Print the resolved configuration
fn show_config() -> Result<()> {
    let conf = config::config()?;

    println!("Resolved configuration:");
    println!(
        "  config file:     {}",
        conf.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none found)".to_string())
    );
    println!(
        "  folder_id:       {}",
        conf.folder_id.as_deref().unwrap_or("(not set)")
    );
    println!("  report title:    {}", conf.report_title);
    println!("  conf dir:        {}", conf.conf_dir.display());
    if conf.exclude_columns.is_empty() {
        println!("  exclude columns: (none)");
    } else {
        println!("  exclude columns:");
        for name in &conf.exclude_columns {
            println!("    - {name}");
        }
    }
    Ok(())
}
