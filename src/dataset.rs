use crate::models::chat::{ Conversation, Message };
use log::{ info, warn };
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read conversations file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse conversations JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RawConversation {
    #[serde(default)]
    conversation: Vec<JsonValue>,
}

pub fn load_conversations<P: AsRef<Path>>(path: P) -> Result<Vec<Conversation>, DatasetError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let conversations = parse_conversations(&content)?;
    info!("Loaded {} conversations from {}", conversations.len(), path.display());
    Ok(conversations)
}

/// Parses the top-level array strictly; individual messages that lack a
/// usable `direction` or `text` are dropped with a warning.
pub fn parse_conversations(content: &str) -> Result<Vec<Conversation>, DatasetError> {
    let raw: Vec<JsonValue> = serde_json::from_str(content)?;
    let mut conversations = Vec::with_capacity(raw.len());

    for (conv_idx, value) in raw.into_iter().enumerate() {
        let raw_conv = match serde_json::from_value::<RawConversation>(value) {
            Ok(c) => c,
            Err(e) => {
                warn!("Skipping conversation #{}: {}", conv_idx, e);
                continue;
            }
        };

        let mut messages = Vec::with_capacity(raw_conv.conversation.len());
        for (msg_idx, msg_value) in raw_conv.conversation.into_iter().enumerate() {
            match serde_json::from_value::<Message>(msg_value) {
                Ok(msg) => messages.push(msg),
                Err(e) => {
                    warn!("Skipping malformed message #{} in conversation #{}: {}", msg_idx, conv_idx, e);
                }
            }
        }
        conversations.push(Conversation::new(messages));
    }

    Ok(conversations)
}
