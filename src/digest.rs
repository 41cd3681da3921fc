//! PDF digest orchestration.
//!
//! Runs the four ingestion stages in order: partition the PDF into typed
//! elements, assemble the document text from the useful categories, enrich
//! with table text extracted from images (only when the
//! document-understanding credential is configured), and truncate the result
//! to the context budget.
//!
//! There is no rollback and no resumability — the digest is recomputed fully
//! on every run.

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Config;
use crate::elements::{Element, ElementCategory};
use crate::partition;
use crate::tables;
use crate::unstructured;

/// Heading inserted above table text extracted from document images.
pub const TABLE_IMAGES_HEADING: &str = "TABLES FROM DOCUMENT IMAGES:";

/// Structured result of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestedDocument {
    /// File name of the source PDF.
    pub source_id: String,
    /// Number of elements returned by the partitioner.
    pub element_count: usize,
    /// Text blocks contributing to the combined text, in reading order.
    pub text_blocks: Vec<String>,
    /// Tables detected inline in the PDF.
    pub table_count: usize,
    /// Accumulated table text from processed images (may be empty).
    pub table_text: String,
    /// The document text handed to prompt construction.
    pub combined_text: String,
    /// Whether the combined text was cut to the context budget.
    pub truncated: bool,
}

/// Text of every useful element, trimmed, empty payloads skipped,
/// in the order the partitioner returned them.
pub fn assemble_text_blocks(elements: &[Element]) -> Vec<String> {
    elements
        .iter()
        .filter(|el| el.category.is_document_text())
        .map(|el| el.text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Count inline tables with a text payload.
pub fn count_tables(elements: &[Element]) -> usize {
    elements
        .iter()
        .filter(|el| el.category == ElementCategory::Table && !el.text.is_empty())
        .count()
}

/// Join document text with table-image text under the fixed heading.
/// With no table text the document text passes through untouched and the
/// heading never appears.
pub fn combine(pdf_text: &str, table_text: &str) -> String {
    if table_text.is_empty() {
        pdf_text.to_string()
    } else {
        format!("{}\n\n{}\n{}", pdf_text, TABLE_IMAGES_HEADING, table_text)
    }
}

/// The prefix of `text` holding exactly `max_chars` characters, or `None`
/// when the text already fits the budget.
pub fn truncate_chars(text: &str, max_chars: usize) -> Option<&str> {
    text.char_indices()
        .nth(max_chars)
        .map(|(byte_idx, _)| &text[..byte_idx])
}

/// Run the full ingestion pipeline for the configured PDF.
pub async fn ingest_pdf(config: &Config) -> Result<IngestedDocument> {
    // Stage 1: partition (fatal on failure).
    let elements = partition::partition_pdf(config)?;

    // Stage 2: text assembly in reading order.
    let text_blocks = assemble_text_blocks(&elements);
    let table_count = count_tables(&elements);
    let pdf_text = text_blocks.join("\n");

    // Stage 3: optional table enrichment.
    let table_text = if unstructured::credential_present() {
        tables::extract_table_text_from_images(config, &config.pdf.image_dir).await?
    } else {
        debug!("UNSTRUCTURED_API_KEY not set; table enrichment skipped");
        String::new()
    };

    // Stage 4: truncation to the context budget.
    let mut combined_text = combine(&pdf_text, &table_text);
    let mut truncated = false;
    if let Some(cut) = truncate_chars(&combined_text, config.pdf.max_context_chars) {
        warn!(
            budget = config.pdf.max_context_chars,
            "combined document text exceeds context budget; truncating"
        );
        combined_text = cut.to_string();
        truncated = true;
    }

    let source_id = config
        .pdf
        .path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| config.pdf.path.display().to_string());

    Ok(IngestedDocument {
        source_id,
        element_count: elements.len(),
        text_blocks,
        table_count,
        table_text,
        combined_text,
        truncated,
    })
}

/// CLI entry point for `askdoc ingest` — runs the pipeline and prints a
/// summary.
pub async fn run_ingest(config: &Config) -> Result<()> {
    let doc = ingest_pdf(config).await?;

    println!("ingest {}", doc.source_id);
    println!("  elements: {}", doc.element_count);
    println!("  text blocks: {}", doc.text_blocks.len());
    println!("  tables in pdf: {}", doc.table_count);
    if doc.table_text.is_empty() {
        println!("  table image text: none");
    } else {
        println!(
            "  table image text: {} chars",
            doc.table_text.chars().count()
        );
    }
    println!(
        "  combined chars: {}{}",
        doc.combined_text.chars().count(),
        if doc.truncated { " (truncated)" } else { "" }
    );
    println!("ok");

    Ok(())
}
