use crate::history::{ format_history_for_prompt, truncate_history };
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ChatMessage, Message };
use log::{ debug, info, warn };
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("API Key missing")]
    MissingClient,
    #[error("failed to serialize generator input: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("backend request failed: {0}")]
    Backend(String),
    #[error("model returned an empty response")]
    EmptyResponse,
    #[error("response is not a JSON object: {0}")]
    InvalidJson(String),
    #[error("response has no string 'reply' field")]
    MissingReply,
}

#[derive(Serialize)]
struct PromptInput<'a> {
    chat_history: Vec<ChatMessage>,
    incoming_messages: Vec<&'a str>,
}

/// `"{system_prompt}\n\nInput:\n{json}"` with the history and the client's
/// new messages as pretty-printed JSON.
pub fn build_prompt(
    system_prompt: &str,
    history: &[Message],
    client_sequence: &[Message]
) -> Result<String, serde_json::Error> {
    let input = PromptInput {
        chat_history: format_history_for_prompt(history),
        incoming_messages: client_sequence
            .iter()
            .map(|m| m.text.as_str())
            .collect(),
    };
    let json = serde_json::to_string_pretty(&input)?;
    Ok(format!("{}\n\nInput:\n{}", system_prompt, json))
}

/// Removes a surrounding markdown code fence (with or without a language tag).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

pub fn parse_reply(text: &str) -> Result<String, ReplyError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ReplyError::EmptyResponse);
    }
    let value: JsonValue = serde_json
        ::from_str(body)
        .map_err(|e| ReplyError::InvalidJson(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ReplyError::InvalidJson(format!("expected an object, got {}", value)))?;
    object
        .get("reply")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or(ReplyError::MissingReply)
}

/// Suggests a consultant reply for a client turn.
///
/// The system prompt is resolved by the caller and handed in at construction.
/// Without a chat client every request fails with [`ReplyError::MissingClient`].
pub struct ReplyGenerator {
    chat_client: Option<Arc<dyn ChatClient>>,
    system_prompt: String,
    history_limit: Option<usize>,
}

impl ReplyGenerator {
    pub fn new(
        chat_client: Option<Arc<dyn ChatClient>>,
        system_prompt: impl Into<String>,
        history_limit: Option<usize>
    ) -> Self {
        Self {
            chat_client,
            system_prompt: system_prompt.into(),
            history_limit,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub async fn try_generate_reply(
        &self,
        client_sequence: &[Message],
        history: &[Message]
    ) -> Result<String, ReplyError> {
        let client = self.chat_client.as_ref().ok_or(ReplyError::MissingClient)?;
        let history = truncate_history(history, self.history_limit);
        let prompt = build_prompt(&self.system_prompt, history, client_sequence)?;
        debug!("Generator prompt is {} bytes ({} history messages)", prompt.len(), history.len());

        let completion = client
            .complete(&prompt).await
            .map_err(|e| ReplyError::Backend(e.to_string()))?;
        info!("Received {} bytes from model {}", completion.response.len(), client.get_model());
        parse_reply(&completion.response)
    }

    /// Like [`Self::try_generate_reply`], but failures come back as a
    /// readable `Error...` string.
    pub async fn generate_reply(&self, client_sequence: &[Message], history: &[Message]) -> String {
        match self.try_generate_reply(client_sequence, history).await {
            Ok(reply) => reply,
            Err(ReplyError::MissingClient) => {
                warn!("No chat client configured; skipping generation.");
                "Error: API Key missing".to_string()
            }
            Err(e) => {
                warn!("Reply generation failed: {}", e);
                format!("Error generating reply: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let text = "```json\n{\"reply\": \"hi\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"reply\": \"hi\"}");
    }

    #[test]
    fn strips_bare_fence_and_single_line_fence() {
        assert_eq!(strip_code_fence("```\n{\"reply\": \"x\"}\n```\n"), "{\"reply\": \"x\"}");
        assert_eq!(strip_code_fence("```{\"reply\": \"x\"}```"), "{\"reply\": \"x\"}");
    }

    #[test]
    fn unfenced_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"reply\": \"x\"} \n"), "{\"reply\": \"x\"}");
    }

    #[test]
    fn parses_reply_field() {
        assert_eq!(parse_reply("```json\n{\"reply\": \"Hello! 🇹🇭\"}\n```").unwrap(), "Hello! 🇹🇭");
    }

    #[test]
    fn parse_fails_closed() {
        assert!(matches!(parse_reply(""), Err(ReplyError::EmptyResponse)));
        assert!(matches!(parse_reply("```json\n```"), Err(ReplyError::EmptyResponse)));
        assert!(matches!(parse_reply("Sure, here you go"), Err(ReplyError::InvalidJson(_))));
        assert!(matches!(parse_reply("[1, 2]"), Err(ReplyError::InvalidJson(_))));
        assert!(matches!(parse_reply("{\"answer\": \"x\"}"), Err(ReplyError::MissingReply)));
        assert!(matches!(parse_reply("{\"reply\": 3}"), Err(ReplyError::MissingReply)));
    }

    #[test]
    fn prompt_carries_history_and_incoming_messages() {
        let history = vec![Message::outbound("welcome", 1.0), Message::inbound("hi", 2.0)];
        let client = vec![Message::inbound("one", 3.0), Message::inbound("two", 4.0)];
        let prompt = build_prompt("SYSTEM", &history, &client).unwrap();

        let (head, json) = prompt.split_once("\n\nInput:\n").unwrap();
        assert_eq!(head, "SYSTEM");
        let input: JsonValue = serde_json::from_str(json).unwrap();
        assert_eq!(input["chat_history"][0]["role"], "assistant");
        assert_eq!(input["chat_history"][1]["role"], "user");
        assert_eq!(input["chat_history"][1]["content"], "hi");
        assert_eq!(input["incoming_messages"], serde_json::json!(["one", "two"]));
    }

    #[tokio::test]
    async fn missing_client_yields_error_string() {
        let generator = ReplyGenerator::new(None, "SYSTEM", None);
        assert_eq!(generator.system_prompt(), "SYSTEM");
        let reply = generator.generate_reply(&[Message::inbound("hi", 1.0)], &[]).await;
        assert_eq!(reply, "Error: API Key missing");
    }
}
