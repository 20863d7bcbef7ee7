//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `crpt_client` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use crpt_client::initialization::init_logger_with;
use crpt_client::{run_submissions, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    match run_submissions(config).await {
        Ok(report) => {
            println!(
                "Submitted {} document{} ({} accepted, {} failed) in {:.1}s",
                report.total,
                if report.total == 1 { "" } else { "s" },
                report.succeeded,
                report.failed,
                report.elapsed_seconds
            );
            for id in &report.document_ids {
                println!("  created {id}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("crpt_client error: {:#}", e);
            process::exit(1);
        }
    }
}
