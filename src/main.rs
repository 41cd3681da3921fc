//! # askdoc CLI
//!
//! The `askdoc` binary drives the ingestion pipeline and the chat backend.
//!
//! ## Usage
//!
//! ```bash
//! askdoc --config ./config/askdoc.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `askdoc init` | Create the SQLite chat database and run schema migrations |
//! | `askdoc ingest` | Run the ingestion pipeline and print a summary |
//! | `askdoc ask` | Ingest the configured PDF, then answer questions interactively |
//! | `askdoc tables [dir]` | Process a directory of table images |
//! | `askdoc serve chat` | Start the chat backend HTTP server |
//!
//! Credentials are read from the environment (a `.env` file is honored):
//! `OPENAI_API_KEY` for the language model (required by `ask` and
//! `serve chat`), `UNSTRUCTURED_API_KEY` for the document-understanding API
//! (optional — without it the table-enrichment stage is skipped).

mod chatbot;
mod config;
mod db;
mod digest;
mod elements;
mod llm;
mod migrate;
mod partition;
mod prompt;
mod qa;
mod server;
mod tables;
mod unstructured;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// askdoc — ask questions of a PDF, tables included.
#[derive(Parser)]
#[command(
    name = "askdoc",
    about = "A PDF ingestion and question-answering pipeline for a personal document chatbot",
    version,
    long_about = "askdoc partitions a PDF into typed elements via an external partition routine, \
    enriches it with table text extracted from images by a document-understanding API, assembles \
    the result into a budgeted document text, and answers questions over it with an external \
    language-model API — interactively or through a chat HTTP backend."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/askdoc.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the chat history database.
    ///
    /// Creates the SQLite database file and the messages table. This
    /// command is idempotent — running it multiple times is safe.
    Init,

    /// Run the ingestion pipeline and print a summary.
    ///
    /// Partitions the configured PDF, assembles the document text,
    /// optionally enriches it with table text from images, and truncates
    /// to the context budget.
    Ingest,

    /// Ingest the configured PDF, then answer questions interactively.
    ///
    /// Reads questions from stdin; `exit` ends the session and a leading
    /// `debug` token prints the exact prompt sent to the model.
    Ask,

    /// Process a directory of table images and print the extracted text.
    Tables {
        /// Directory containing table images (defaults to `pdf.image_dir`).
        dir: Option<PathBuf>,
    },

    /// Start the chat backend HTTP server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Serve the chat-message and chat-history endpoints.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("askdoc=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest => {
            digest::run_ingest(&cfg).await?;
        }
        Commands::Ask => {
            qa::run_ask(&cfg).await?;
        }
        Commands::Tables { dir } => {
            tables::run_tables(&cfg, dir.as_deref()).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Chat => {
                server::run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}
