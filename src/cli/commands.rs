//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Marketo extraction CLI
#[derive(Parser, Debug)]
#[command(name = "marketo-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract one endpoint and upload the result
    Run {
        /// Job file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Override the job's endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// Override the job's output format (json, parquet)
        #[arg(long)]
        output_format: Option<String>,

        /// Override the window start (ISO-8601)
        #[arg(long)]
        start_at: Option<String>,

        /// Override the window end (ISO-8601)
        #[arg(long)]
        end_at: Option<String>,
    },

    /// Validate a job file without contacting Marketo
    Validate {
        /// Job file (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// List supported endpoints
    Endpoints,

    /// Show the output schema of an endpoint
    Schema {
        /// Endpoint name
        endpoint: String,
    },
}
