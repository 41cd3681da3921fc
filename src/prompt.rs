//! Prompt construction for the language model.
//!
//! Produces both the chat-completion message list sent on the wire and the
//! flat prompt string echoed by the Q&A loop's debug mode. The two stay in
//! sync: the flat prompt is the system role plus the exact user message.

use serde_json::{json, Value};

pub struct PromptBuilder {
    system_prompt: String,
}

impl PromptBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// User message embedding the document text and the question, with
    /// fixed grounding rules.
    fn user_message(&self, question: &str, context: &str) -> String {
        format!(
            "Use the following context to answer the question.\n\
             [Context]: {context}\n\
             Question: {question}\n\
             Rules:\n\
             - Answer based only on the provided context.\n\
             - If the answer is not in the context, respond with \"I don't know.\"\n\
             - Be concise and to the point.\n\
             - Do not invent information.\n"
        )
    }

    /// Flat prompt text, as printed by debug mode.
    pub fn build_prompt(&self, question: &str, context: &str) -> String {
        format!("{}\n{}", self.system_prompt, self.user_message(question, context))
    }

    /// Chat-completion messages for a grounded question.
    pub fn build_messages(&self, question: &str, context: &str) -> Vec<Value> {
        vec![
            json!({"role": "system", "content": self.system_prompt}),
            json!({"role": "user", "content": self.user_message(question, context)}),
        ]
    }

    /// Chat-completion messages for a free-form message with no document
    /// context (used by the chat backend).
    pub fn build_chat_messages(&self, message: &str) -> Vec<Value> {
        vec![
            json!({"role": "system", "content": self.system_prompt}),
            json!({"role": "user", "content": message}),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_prompt_embeds_context_and_question() {
        let builder = PromptBuilder::new("You are a test assistant.");
        let prompt = builder.build_prompt("What is in table 1?", "DOC TEXT HERE");
        assert!(prompt.starts_with("You are a test assistant."));
        assert!(prompt.contains("[Context]: DOC TEXT HERE"));
        assert!(prompt.contains("Question: What is in table 1?"));
        assert!(prompt.contains("Answer based only on the provided context."));
    }

    #[test]
    fn messages_mirror_the_flat_prompt() {
        let builder = PromptBuilder::new("sys");
        let messages = builder.build_messages("q", "ctx");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");

        let flat = builder.build_prompt("q", "ctx");
        let user = messages[1]["content"].as_str().unwrap();
        assert!(flat.ends_with(user));
        assert!(flat.starts_with("sys"));
    }

    #[test]
    fn chat_messages_pass_the_message_through() {
        let builder = PromptBuilder::new("sys");
        let messages = builder.build_chat_messages("hello there");
        assert_eq!(messages[1]["content"], "hello there");
    }
}
