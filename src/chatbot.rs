//! Chat business logic.
//!
//! Every inbound message is classified as either a structured command-like
//! intent or free-form conversation, then routed: structured messages get a
//! canned acknowledgement naming the action, free-form messages get one
//! language-model call. The classification is deliberately simple keyword
//! and phrase matching.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::llm::LlmClient;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageRequest {
    /// Free-form user text; any format accepted.
    pub message: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageResponse {
    pub reply: String,
    pub session_id: String,
    pub model_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Command-like intent, handled without the language model.
    Structured,
    /// Natural-language conversation.
    Freeform,
}

const COMMAND_KEYWORDS: &[&str] = &["create", "delete", "update", "list", "show", "get"];

/// Recognized action phrases and their canonical action names.
const ACTIONS: &[(&str, &str)] = &[
    ("create a task", "create_task"),
    ("create task", "create_task"),
    ("list tasks", "list_tasks"),
    ("delete task", "delete_task"),
];

/// Detect whether a message is a structured command or free-form text.
pub fn detect_query_kind(message: &str) -> QueryKind {
    let lower = message.to_lowercase();
    let has_keyword = COMMAND_KEYWORDS.iter().any(|k| lower.contains(k));
    let has_action = ACTIONS.iter().any(|(phrase, _)| lower.contains(phrase));
    if has_keyword && has_action {
        QueryKind::Structured
    } else {
        QueryKind::Freeform
    }
}

/// Canonical action name for a structured message, when one matches.
pub fn structured_action(message: &str) -> Option<&'static str> {
    let lower = message.to_lowercase();
    ACTIONS
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, action)| *action)
}

/// Route one message and produce the reply text plus token accounting.
pub async fn process_message(
    llm: &LlmClient,
    request: &ChatMessageRequest,
) -> Result<(String, Option<u64>)> {
    match detect_query_kind(&request.message) {
        QueryKind::Structured => {
            let action = structured_action(&request.message).unwrap_or("unknown");
            Ok((format!("Recognized command: {}", action), None))
        }
        QueryKind::Freeform => {
            let answer = llm.chat(&request.message).await?;
            Ok((answer.text, answer.tokens_used))
        }
    }
}
