use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub pdf: PdfConfig,
    #[serde(default)]
    pub partition: PartitionConfig,
    #[serde(default)]
    pub unstructured: UnstructuredConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    pub db: DbConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PdfConfig {
    /// Input PDF to ingest.
    pub path: PathBuf,
    /// Directory where the partitioner writes extracted table images.
    pub image_dir: PathBuf,
    /// Directory where per-image table JSON artifacts are written.
    pub tables_dir: PathBuf,
    /// Character budget for the combined document text.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

fn default_max_context_chars() -> usize {
    12_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct PartitionConfig {
    /// External partitioner executable.
    #[serde(default = "default_partition_command")]
    pub command: String,
    /// Language hints passed to the partitioner.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            command: default_partition_command(),
            languages: default_languages(),
        }
    }
}

fn default_partition_command() -> String {
    "unstructured-partition".to_string()
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnstructuredConfig {
    /// Document-understanding API endpoint.
    #[serde(default = "default_unstructured_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_unstructured_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UnstructuredConfig {
    fn default() -> Self {
        Self {
            endpoint: default_unstructured_endpoint(),
            timeout_secs: default_unstructured_timeout_secs(),
        }
    }
}

fn default_unstructured_endpoint() -> String {
    "https://api.unstructuredapp.io/general/v0/general".to_string()
}

fn default_unstructured_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

fn default_llm_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.pdf.max_context_chars == 0 {
        anyhow::bail!("pdf.max_context_chars must be > 0");
    }

    if config.partition.command.trim().is_empty() {
        anyhow::bail!("partition.command must not be empty");
    }

    if config.partition.languages.is_empty() {
        anyhow::bail!("partition.languages must not be empty");
    }

    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    if config.llm.max_tokens == 0 {
        anyhow::bail!("llm.max_tokens must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("askdoc.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    const MINIMAL: &str = r#"
[pdf]
path = "data/report.pdf"
image_dir = "artifacts/images"
tables_dir = "artifacts/tables_json"

[db]
path = "data/askdoc.sqlite"

[server]
bind = "127.0.0.1:7332"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let (_tmp, path) = write_config(MINIMAL);
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.pdf.max_context_chars, 12_000);
        assert_eq!(cfg.partition.command, "unstructured-partition");
        assert_eq!(cfg.partition.languages, vec!["eng"]);
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert!(cfg.unstructured.endpoint.starts_with("https://"));
    }

    #[test]
    fn zero_context_budget_rejected() {
        let content = MINIMAL.replace(
            "tables_dir = \"artifacts/tables_json\"",
            "tables_dir = \"artifacts/tables_json\"\nmax_context_chars = 0",
        );
        let (_tmp, path) = write_config(&content);
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_context_chars"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/askdoc.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
