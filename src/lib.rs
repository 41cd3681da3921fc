//! # askdoc
//!
//! A PDF ingestion and question-answering pipeline for a personal document
//! chatbot.
//!
//! askdoc turns one PDF into a combined document text suitable for
//! retrieval-augmented question answering: an external partition routine
//! splits the PDF into typed elements and exports complex tables as images,
//! a document-understanding API turns those images into table text, and the
//! result is assembled, truncated to a context budget, and answered over by
//! an external language-model API — interactively on the CLI or through a
//! small chat HTTP backend with persisted history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐
//! │   PDF    │──▶│ Partitioner │──▶│ text elements │──┐
//! └──────────┘   │  (external) │   └──────────────┘  │
//!                └──────┬──────┘                      ▼
//!                       │ table images         ┌───────────┐   ┌─────┐
//!                       ▼                      │ combined  │──▶│ LLM │
//!                ┌──────────────┐   table text │ document  │   └─────┘
//!                │ doc-understg │─────────────▶│ (budgeted)│
//!                │ API (extern) │              └───────────┘
//!                └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! askdoc init                   # create the chat history database
//! askdoc ingest                 # run the ingestion pipeline, print a summary
//! askdoc ask                    # ingest, then answer questions interactively
//! askdoc tables artifacts/images
//! askdoc serve chat             # start the chat HTTP backend
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`elements`] | Partitioned element types |
//! | [`partition`] | External PDF partitioning |
//! | [`unstructured`] | Document-understanding API client |
//! | [`tables`] | Table-image processing |
//! | [`digest`] | Ingestion orchestration |
//! | [`prompt`] | Prompt construction |
//! | [`llm`] | Language-model API client |
//! | [`qa`] | Interactive Q&A loop |
//! | [`chatbot`] | Chat business logic |
//! | [`server`] | Chat HTTP backend |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod chatbot;
pub mod config;
pub mod db;
pub mod digest;
pub mod elements;
pub mod llm;
pub mod migrate;
pub mod partition;
pub mod prompt;
pub mod qa;
pub mod server;
pub mod tables;
pub mod unstructured;
