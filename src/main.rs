//! pdfqa CLI
//!
//! Ask questions about PDF documents, form fields included.
//!
//! Commands:
//!   ask     - Ask a question, or chat interactively about a PDF
//!   info    - Show document info
//!   context - Print the context sent to the model
//!   fields  - List resolved form fields
//!   inspect - Diagnose one checkbox field
//!   json    - Print structured data as JSON
//!   batch   - Ask every question in a file
//!   scan    - Summarize the form fields of every PDF in a directory

mod commands;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use utils::expand_path;

#[derive(Parser)]
#[command(name = "pdfqa")]
#[command(about = "Ask questions about PDF documents and their form fields")]
#[command(version)]
struct Cli {
    /// Config file (default: ./pdfqa.toml, then ~/.pdfqa/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question about a PDF (interactive when no question is given)
    Ask {
        /// Path to the PDF
        pdf: Option<PathBuf>,

        /// Question to ask
        #[arg(short, long)]
        question: Option<String>,

        /// Interactive mode
        #[arg(short, long, conflicts_with = "question")]
        interactive: bool,

        /// Override the configured provider (openai, anthropic)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Show document info
    Info {
        pdf: PathBuf,
    },

    /// Print the context sent to the model
    Context {
        pdf: PathBuf,

        /// Keep raw tokens (On/Off) instead of Yes/No
        #[arg(long)]
        raw: bool,
    },

    /// List resolved form fields
    Fields {
        pdf: PathBuf,

        /// Only checkbox/radio fields, with a checked count
        #[arg(long)]
        buttons: bool,
    },

    /// Show value and appearance state of one field
    Inspect {
        pdf: PathBuf,

        /// Qualified field name
        field: String,
    },

    /// Print structured data as JSON
    Json {
        pdf: PathBuf,
    },

    /// Ask every question in a file (one per line)
    Batch {
        pdf: PathBuf,

        questions: PathBuf,

        /// Override the configured provider (openai, anthropic)
        #[arg(long)]
        provider: Option<String>,
    },

    /// Summarize the form fields of every PDF under a directory
    Scan {
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "pdfqa=debug" } else { "pdfqa=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref().map(expand_path);
    let config = config.as_deref();

    match cli.command {
        Commands::Ask {
            pdf,
            question,
            interactive,
            provider,
        } => {
            let question = question.filter(|_| !interactive);
            commands::run_ask(config, pdf.as_deref(), question.as_deref(), provider.as_deref()).await?;
        }

        Commands::Info { pdf } => {
            commands::run_info(config, &pdf)?;
        }

        Commands::Context { pdf, raw } => {
            commands::run_context(config, &pdf, raw)?;
        }

        Commands::Fields { pdf, buttons } => {
            commands::run_fields(config, &pdf, buttons)?;
        }

        Commands::Inspect { pdf, field } => {
            commands::run_inspect(config, &pdf, &field)?;
        }

        Commands::Json { pdf } => {
            commands::run_json(config, &pdf)?;
        }

        Commands::Batch {
            pdf,
            questions,
            provider,
        } => {
            commands::run_batch(config, &pdf, &questions, provider.as_deref()).await?;
        }

        Commands::Scan { dir } => {
            commands::run_scan(config, &dir)?;
        }
    }

    Ok(())
}
