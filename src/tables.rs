//! Table-image processing.
//!
//! Walks a directory of table images exported during partitioning, sends
//! each one to the document-understanding API, keeps only the returned
//! `Table` elements, and persists them as one JSON artifact per image
//! (`<stem>_tables.json`, overwritten on re-run). The `text` of every kept
//! table accumulates into a single newline-joined string for the digest.
//!
//! Processing is per-item isolated: one failing image is logged and skipped,
//! and never aborts the rest of the directory.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::elements::{Element, ElementCategory};
use crate::unstructured::UnstructuredClient;

/// Extensions recognized as table images, compared case-insensitively.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Whether a path looks like a table image.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|i| ext.eq_ignore_ascii_case(i)))
        .unwrap_or(false)
}

/// JSON artifact path for a source image: `<tables_dir>/<stem>_tables.json`.
pub fn table_json_path(tables_dir: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    tables_dir.join(format!("{}_tables.json", stem))
}

/// Keep only table elements; everything else from the response is discarded.
pub fn filter_tables(elements: Vec<Element>) -> Vec<Element> {
    elements
        .into_iter()
        .filter(|el| el.category == ElementCategory::Table)
        .collect()
}

/// Non-empty `text` payloads of the kept table elements.
pub fn collect_table_text(tables: &[Element]) -> Vec<String> {
    tables
        .iter()
        .filter(|t| !t.text.is_empty())
        .map(|t| t.text.clone())
        .collect()
}

/// Process every table image in `image_dir` and return the accumulated
/// table text.
///
/// Returns an empty string when the directory has no images, when no
/// credential is configured, or when no tables are found — none of these
/// are errors.
pub async fn extract_table_text_from_images(config: &Config, image_dir: &Path) -> Result<String> {
    let client = match UnstructuredClient::from_env(&config.unstructured)? {
        Some(client) => client,
        None => {
            warn!("UNSTRUCTURED_API_KEY not set; skipping table image processing");
            return Ok(String::new());
        }
    };

    if !image_dir.is_dir() {
        warn!(dir = %image_dir.display(), "image directory does not exist; no tables to process");
        return Ok(String::new());
    }

    // Sorted file-name order keeps re-runs deterministic.
    let mut entries: Vec<PathBuf> = std::fs::read_dir(image_dir)
        .with_context(|| format!("Failed to list image directory: {}", image_dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    let images: Vec<&PathBuf> = entries.iter().filter(|p| is_image_file(p)).collect();
    if images.is_empty() {
        warn!(dir = %image_dir.display(), "no table images found");
        return Ok(String::new());
    }

    std::fs::create_dir_all(&config.pdf.tables_dir).with_context(|| {
        format!(
            "Failed to create tables directory: {}",
            config.pdf.tables_dir.display()
        )
    })?;

    let mut all_table_texts: Vec<String> = Vec::new();

    for image_path in images {
        let elements = match client.partition_image(image_path).await {
            Ok(elements) => elements,
            Err(e) => {
                warn!(image = %image_path.display(), error = %e, "image processing failed; skipping");
                continue;
            }
        };

        let tables = filter_tables(elements);
        let out_path = table_json_path(&config.pdf.tables_dir, image_path);
        let json = serde_json::to_string_pretty(&tables)?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        info!(
            image = %image_path.display(),
            tables = tables.len(),
            out = %out_path.display(),
            "processed table image"
        );

        all_table_texts.extend(collect_table_text(&tables));
    }

    Ok(all_table_texts.join("\n"))
}

/// CLI entry point for `askdoc tables`.
pub async fn run_tables(config: &Config, dir: Option<&Path>) -> Result<()> {
    let image_dir = dir.unwrap_or(&config.pdf.image_dir);
    let text = extract_table_text_from_images(config, image_dir).await?;
    if text.is_empty() {
        println!("no table text extracted");
    } else {
        println!("{}", text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementMetadata;

    fn element(category: ElementCategory, text: &str) -> Element {
        Element {
            category,
            element_id: "e".to_string(),
            text: text.to_string(),
            metadata: ElementMetadata::default(),
        }
    }

    #[test]
    fn image_extension_matching_is_case_insensitive() {
        assert!(is_image_file(Path::new("a/page1_table1.jpg")));
        assert!(is_image_file(Path::new("a/page1_table1.JPEG")));
        assert!(is_image_file(Path::new("a/page1_table1.Jpg")));
        assert!(!is_image_file(Path::new("a/page1_table1.png")));
        assert!(!is_image_file(Path::new("a/notes.txt")));
        assert!(!is_image_file(Path::new("a/no_extension")));
    }

    #[test]
    fn json_path_uses_image_stem() {
        let out = table_json_path(Path::new("/tmp/tables"), Path::new("/img/page2_table1.jpg"));
        assert_eq!(out, Path::new("/tmp/tables/page2_table1_tables.json"));
    }

    #[test]
    fn filter_keeps_only_tables() {
        let elements = vec![
            element(ElementCategory::Title, "heading"),
            element(ElementCategory::Table, "r1 r2"),
            element(ElementCategory::NarrativeText, "prose"),
            element(ElementCategory::Table, "r3 r4"),
        ];
        let tables = filter_tables(elements);
        assert_eq!(tables.len(), 2);
        assert!(tables.iter().all(|t| t.category == ElementCategory::Table));
    }

    #[test]
    fn table_text_skips_empty_payloads() {
        let tables = vec![
            element(ElementCategory::Table, "alpha"),
            element(ElementCategory::Table, ""),
            element(ElementCategory::Table, "beta"),
        ];
        let texts = collect_table_text(&tables);
        assert_eq!(texts, vec!["alpha", "beta"]);
        assert_eq!(texts.join("\n"), "alpha\nbeta");
    }

    #[test]
    fn serialized_artifact_is_stable() {
        let tables = vec![element(ElementCategory::Table, "a b")];
        let first = serde_json::to_string_pretty(&tables).unwrap();
        let second = serde_json::to_string_pretty(&tables).unwrap();
        assert_eq!(first, second);
    }
}
