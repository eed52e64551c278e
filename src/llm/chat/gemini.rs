use async_trait::async_trait;
use std::error::Error as StdError;
use log::info;

use super::{ ChatClient, CompletionResponse };
use crate::llm::LlmConfig;
use rllm::chat::{ ChatMessage, ChatRole, MessageType };
use rllm::builder::{ LLMBackend, LLMBuilder };
use rllm::LLMProvider;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

pub struct GeminiChatClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
    base_url: Option<String>,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::Google)
            .api_key(api_key)
            .model(&chat_model)
            .stream(false);

        if let Some(url) = &base_url {
            builder = builder.base_url(url);
        }
        if let Some(tokens) = max_tokens {
            builder = builder.max_tokens(tokens);
        }
        if let Some(temp) = temperature {
            builder = builder.temperature(temp);
        }

        let llm_provider = builder.build()?;

        Ok(Self {
            llm: llm_provider,
            model: chat_model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| "Gemini API key (GEMINI_API_KEY) is required for GeminiChatClient".to_string())?;

        Self::new(api_key, config.completion_model.clone(), config.base_url.clone(), None, None)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let messages = vec![ChatMessage {
            role: ChatRole::User,
            content: prompt.to_string(),
            message_type: MessageType::Text,
        }];
        info!(
            "GeminiChatClient::complete() → model={} base_url={:?}",
            self.model,
            self.base_url
        );
        let resp = self.llm.chat(&messages).await?;
        let text = resp
            .text()
            .map(|s| s.to_string())
            .unwrap_or_else(|| resp.to_string());
        Ok(CompletionResponse { response: text })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        self.base_url.clone()
    }
}
