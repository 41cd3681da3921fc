//! Language-model API client.
//!
//! One synchronous chat-completions call per question against an
//! OpenAI-compatible endpoint. The credential comes from `OPENAI_API_KEY`
//! and is required — unlike the document-understanding credential there is
//! no degraded mode without a language model.
//!
//! Failed calls surface once to the caller; no retry or backoff.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::prompt::PromptBuilder;

/// Environment variable holding the language-model API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    prompt: PromptBuilder,
}

/// Answer text plus token accounting when the API reports it.
#[derive(Debug, Clone)]
pub struct LlmAnswer {
    pub text: String,
    pub tokens_used: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}

impl LlmClient {
    /// Build a client from configuration and the environment.
    ///
    /// Fails when `OPENAI_API_KEY` is not set — callers treat this as a
    /// fatal setup error.
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow!("{} environment variable not set", API_KEY_VAR))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            prompt: PromptBuilder::new(config.system_prompt.clone()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt
    }

    /// Answer a question grounded in the combined document text.
    pub async fn answer(&self, question: &str, context: &str) -> Result<LlmAnswer> {
        let messages = self.prompt.build_messages(question, context);
        self.complete(messages).await
    }

    /// Answer a free-form chat message with no document context.
    pub async fn chat(&self, message: &str) -> Result<LlmAnswer> {
        let messages = self.prompt.build_chat_messages(message);
        self.complete(messages).await
    }

    async fn complete(&self, messages: Vec<serde_json::Value>) -> Result<LlmAnswer> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let url = format!("{}/chat/completions", self.endpoint);
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .with_context(|| "Request to language-model API failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            bail!("language-model API error {}: {}", status, body_text);
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .with_context(|| "Invalid language-model API response")?;

        answer_from_response(parsed)
    }
}

fn answer_from_response(resp: ChatResponse) -> Result<LlmAnswer> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("language-model API returned no choices"))?;

    Ok(LlmAnswer {
        text: choice.message.content.trim().to_string(),
        tokens_used: resp.usage.map(|u| u.total_tokens),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_extracts_first_choice() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"role": "assistant", "content": "  The answer.  "}}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }"#,
        )
        .unwrap();
        let answer = answer_from_response(parsed).unwrap();
        assert_eq!(answer.text, "The answer.");
        assert_eq!(answer.tokens_used, Some(15));
    }

    #[test]
    fn missing_usage_is_tolerated() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"content": "ok"}}]}"#,
        )
        .unwrap();
        let answer = answer_from_response(parsed).unwrap();
        assert_eq!(answer.text, "ok");
        assert_eq!(answer.tokens_used, None);
    }

    #[test]
    fn empty_choices_is_an_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(answer_from_response(parsed).is_err());
    }
}
