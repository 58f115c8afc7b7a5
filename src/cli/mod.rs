//! Command-line interface for Cinedex.

mod commands;

use clap::{Parser, Subcommand};

/// Cinedex - movie catalog search with periodic OMDb ingestion
#[derive(Parser)]
#[command(name = "cinedex")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the ingestion scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Run a single ingestion pass and print the report
    #[command(alias = "fetch")]
    Ingest,

    /// Search the catalog
    #[command(alias = "s")]
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
