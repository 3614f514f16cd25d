//! Command-line interface
//!
//! Uses clap derive macros for argument parsing. A missing `--mint` switches
//! the driver to interactive mode.

use crate::report::DisplayWindow;
use clap::Parser;
use std::path::PathBuf;

/// Holderscope - ranked SPL token holder report
#[derive(Parser, Debug)]
#[command(
    name = "holderscope",
    version = env!("CARGO_PKG_VERSION"),
    about = "Ranks the holders of an SPL token and summarizes ownership concentration",
    long_about = "Fetches every token account of a mint, merges accounts per owner, \
                  classifies owners as user or program accounts and prints a ranked \
                  table with summary statistics."
)]
pub struct CliApp {
    /// Token mint address (prompted for when omitted)
    #[arg(short, long, value_name = "MINT")]
    pub mint: Option<String>,

    /// Solana RPC endpoint (defaults to SOLANA_RPC_URL or public mainnet)
    #[arg(short, long, value_name = "URL")]
    pub rpc: Option<String>,

    /// Number of holders to display (ignored if --start/--end given)
    #[arg(short, long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: u64,

    /// Starting rank (1-based)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub start: Option<u64>,

    /// Ending rank (1-based, inclusive)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub end: Option<u64>,

    /// Export the full holder list to an auto-named CSV file
    #[arg(long)]
    pub csv: bool,

    /// Export the full holder list to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv_file: Option<PathBuf>,

    /// Only write the CSV export, skip the table
    #[arg(long)]
    pub csv_only: bool,

    /// Show full addresses instead of truncating them
    #[arg(long)]
    pub full_address: bool,

    /// Also count accounts owned by known DEX/token programs as program accounts
    #[arg(long)]
    pub program_owned: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl CliApp {
    pub fn display_window(&self) -> DisplayWindow {
        DisplayWindow::from_options(
            self.limit as usize,
            self.start.map(|s| s as usize),
            self.end.map(|e| e as usize),
        )
    }

    pub fn wants_csv(&self) -> bool {
        self.csv || self.csv_only || self.csv_file.is_some()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                anyhow::bail!("End rank {} is before start rank {}", end, start);
            }
        }
        Ok(())
    }
}
