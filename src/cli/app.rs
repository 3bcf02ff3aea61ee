//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::board_cmd;
use super::output::{Output, OutputFormat};
use super::tui;

#[derive(Parser)]
#[command(name = "gantt")]
#[command(author, version, about = "Day-grid Gantt boards in the terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print each task's grid placement (offset and span in days)
    Rows {
        /// Board file (JSON or YAML)
        board: PathBuf,
    },

    /// Report dependency edges whose placement is invalid
    Check {
        /// Board file (JSON or YAML)
        board: PathBuf,
    },

    /// Print tasks with every dependency before its dependents
    Order {
        /// Board file (JSON or YAML)
        board: PathBuf,
    },

    /// Move and/or resize one task in grid units and save the board
    Shift {
        /// Board file (JSON or YAML)
        board: PathBuf,

        /// Task id to update
        #[arg(long)]
        id: String,

        /// New offset in days from the reference date
        #[arg(long)]
        offset: Option<i64>,

        /// New span in days (minimum 1)
        #[arg(long)]
        span: Option<i64>,

        /// Reference date (YYYY-MM-DD); defaults to the board's min date
        #[arg(long)]
        reference: Option<String>,
    },

    /// Open the interactive board (drag to move, handles to resize)
    Tui {
        /// Board file (JSON or YAML)
        board: PathBuf,
    },
}

/// Parses arguments and runs the selected command
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    match cli.command {
        Commands::Rows { board } => board_cmd::rows(&output, &board),
        Commands::Check { board } => board_cmd::check(&output, &board),
        Commands::Order { board } => board_cmd::order(&output, &board),
        Commands::Shift {
            board,
            id,
            offset,
            span,
            reference,
        } => board_cmd::shift(&output, &board, &id, offset, span, reference.as_deref()),
        Commands::Tui { board } => tui::run(&output, &board),
    }
}
