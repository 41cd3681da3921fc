//! External PDF partitioning.
//!
//! Splits the configured PDF into typed elements by running the external
//! partitioner executable (`partition.command`). The partitioner is invoked
//! with a high-resolution strategy, table-structure inference, the configured
//! language hints, and table-image extraction into `pdf.image_dir`; it prints
//! an element JSON array on stdout.
//!
//! Partitioning is the one stage with no degraded mode: a missing PDF, a
//! spawn failure, a non-zero exit, or unparseable output all abort the run.

use anyhow::{bail, Context, Result};
use std::process::Command;
use tracing::debug;

use crate::config::Config;
use crate::elements::Element;

/// Run the external partition routine against the configured PDF.
pub fn partition_pdf(config: &Config) -> Result<Vec<Element>> {
    let pdf_path = &config.pdf.path;
    if !pdf_path.is_file() {
        bail!("PDF not found: {}", pdf_path.display());
    }

    std::fs::create_dir_all(&config.pdf.image_dir).with_context(|| {
        format!(
            "Failed to create image directory: {}",
            config.pdf.image_dir.display()
        )
    })?;

    let args = partition_args(config);
    debug!(command = %config.partition.command, ?args, "running partitioner");

    let output = Command::new(&config.partition.command)
        .args(&args)
        .output()
        .with_context(|| {
            format!(
                "Failed to execute partitioner '{}'. Is it installed?",
                config.partition.command
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("partitioner failed: {}", stderr.trim());
    }

    let elements: Vec<Element> = serde_json::from_slice(&output.stdout)
        .with_context(|| "partitioner output was not a JSON element array")?;

    debug!(count = elements.len(), "partitioned PDF");
    Ok(elements)
}

/// Argument list for the partitioner invocation.
fn partition_args(config: &Config) -> Vec<String> {
    vec![
        "--strategy".to_string(),
        "hi_res".to_string(),
        "--languages".to_string(),
        config.partition.languages.join(","),
        "--infer-table-structure".to_string(),
        "--extract-image-block-types".to_string(),
        "Table".to_string(),
        "--image-output-dir".to_string(),
        config.pdf.image_dir.display().to_string(),
        "--output".to_string(),
        "json".to_string(),
        config.pdf.path.display().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use std::path::Path;

    fn test_config(dir: &Path) -> Config {
        let content = format!(
            r#"
[pdf]
path = "{root}/doc.pdf"
image_dir = "{root}/images"
tables_dir = "{root}/tables_json"

[partition]
languages = ["eng", "deu"]

[db]
path = "{root}/askdoc.sqlite"

[server]
bind = "127.0.0.1:0"
"#,
            root = dir.display()
        );
        let path = dir.join("askdoc.toml");
        std::fs::write(&path, content).unwrap();
        load_config(&path).unwrap()
    }

    #[test]
    fn args_carry_strategy_and_languages() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = test_config(tmp.path());
        let args = partition_args(&cfg);
        let joined = args.join(" ");
        assert!(joined.contains("--strategy hi_res"));
        assert!(joined.contains("--languages eng,deu"));
        assert!(joined.contains("--infer-table-structure"));
        assert!(joined.contains("--extract-image-block-types Table"));
        assert!(args.last().unwrap().ends_with("doc.pdf"));
    }

    #[test]
    fn missing_pdf_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = test_config(tmp.path());
        let err = partition_pdf(&cfg).unwrap_err();
        assert!(err.to_string().contains("PDF not found"));
    }
}
