use crate::config::remote_config::SupabasePromptClient;
use log::{ error, info, warn };
use thiserror::Error;

/// Built-in operating instructions, used whenever the remote table cannot
/// provide a prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("default_prompt.md");

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Supabase credentials missing: {0}")]
    MissingCredentials(String),
    #[error("Prompt request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Invalid prompt payload: {0}")]
    Decode(String),
}

/// Where the effective system prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct SystemPrompt {
    pub text: String,
    pub source: PromptSource,
}

impl SystemPrompt {
    pub fn fallback() -> Self {
        Self {
            text: DEFAULT_SYSTEM_PROMPT.to_string(),
            source: PromptSource::Fallback,
        }
    }
}

/// Remote table first, built-in text second. Never fails.
pub async fn resolve_system_prompt(client: Option<&SupabasePromptClient>) -> SystemPrompt {
    let Some(client) = client else {
        warn!("SUPABASE_URL or SUPABASE_PUBLISHABLE_DEFAULT_KEY not set. Using fallback prompt.");
        return SystemPrompt::fallback();
    };

    match client.fetch_prompt().await {
        Ok(Some(text)) => {
            info!("Fetched system prompt from Supabase table '{}'.", client.table());
            SystemPrompt {
                text,
                source: PromptSource::Remote,
            }
        }
        Ok(None) => {
            warn!(
                "Table '{}' returned no usable '{}' value. Using fallback prompt.",
                client.table(),
                client.column()
            );
            SystemPrompt::fallback()
        }
        Err(e) => {
            error!("Error fetching system prompt from Supabase: {}. Using fallback prompt.", e);
            SystemPrompt::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompt_describes_reply_contract() {
        assert!(DEFAULT_SYSTEM_PROMPT.starts_with("**Role:**"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("`incoming_messages`"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("the key `reply`"));
        assert!(!DEFAULT_SYSTEM_PROMPT.ends_with('\n'));
    }

    #[tokio::test]
    async fn no_client_falls_back() {
        let prompt = resolve_system_prompt(None).await;
        assert_eq!(prompt.source, PromptSource::Fallback);
        assert_eq!(prompt.text, DEFAULT_SYSTEM_PROMPT);
    }
}
