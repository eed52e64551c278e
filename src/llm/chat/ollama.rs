use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse };
use crate::llm::{ LlmConfig, LlmType };
use log::info;

pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Deserialize)]
pub struct GenerateResponse {
    pub response: String,
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_OLLAMA_URL.into());

        Self {
            http: HttpClient::new(),
            base_url: url.trim_end_matches('/').to_string(),
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }

    pub async fn generate(
        &self,
        prompt: &str
    ) -> Result<GenerateResponse, Box<dyn StdError + Send + Sync>> {
        let url = format!("{}/api/generate", self.base_url);
        // replies must be a single JSON object
        let req = GenerateRequest {
            model: &self.completion_model,
            prompt,
            stream: false,
            format: "json",
        };
        let resp = self.http.post(&url).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<GenerateResponse>().await?;
        Ok(data)
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        info!("OllamaClient::complete() → model={} base_url={}", self.completion_model, self.base_url);
        let resp = self.generate(prompt).await?;
        Ok(CompletionResponse { response: resp.response })
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
