use crate::cli::Args;
use crate::config::prompt::{ resolve_system_prompt, PromptError, SystemPrompt };
use log::{ debug, info };
use reqwest::header::{ ACCEPT, AUTHORIZATION };
use reqwest::{ Method, RequestBuilder, Response };
use serde_json::{ Map, Value as JsonValue };

type Row = Map<String, JsonValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted,
    AlreadyPresent,
}

/// Reads and seeds the system prompt row of a Supabase table through its
/// PostgREST endpoint.
pub struct SupabasePromptClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
    column: String,
}

impl SupabasePromptClient {
    pub fn new(base_url: &str, api_key: &str, table: &str, column: &str) -> Self {
        SupabasePromptClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// `None` when either the URL or the key is missing.
    pub fn from_args(args: &Args) -> Option<Self> {
        let url = args.supabase_url.as_deref().filter(|s| !s.trim().is_empty())?;
        let key = args.supabase_key.as_deref().filter(|s| !s.trim().is_empty())?;
        Some(Self::new(url, key, &args.prompt_table, &args.prompt_column))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.endpoint())
            .header("apikey", self.api_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, "application/json")
    }

    async fn read_rows(resp: Response) -> Result<Vec<Row>, PromptError> {
        let resp = check_status(resp).await?;
        let body_text = resp.text().await?;
        serde_json
            ::from_str::<Vec<Row>>(&body_text)
            .map_err(|e| PromptError::Decode(format!("expected an array of rows: {}", e)))
    }

    /// First row's prompt column. `Ok(None)` when the table is empty or the
    /// value is null/blank.
    pub async fn fetch_prompt(&self) -> Result<Option<String>, PromptError> {
        debug!("Fetching '{}' from {}", self.column, self.endpoint());
        let resp = self
            .request(Method::GET)
            .query(&[("select", self.column.as_str()), ("limit", "1")])
            .send().await?;
        let rows = Self::read_rows(resp).await?;

        let prompt = rows
            .first()
            .and_then(|row| row.get(&self.column))
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string());
        Ok(prompt)
    }

    /// Inserts `prompt` only when the table has no rows yet.
    pub async fn seed_prompt(&self, prompt: &str) -> Result<SeedOutcome, PromptError> {
        let resp = self
            .request(Method::GET)
            .query(&[("select", "*")])
            .send().await?;
        let rows = Self::read_rows(resp).await?;
        if !rows.is_empty() {
            info!("Table '{}' already has {} row(s). Skipping insertion.", self.table, rows.len());
            return Ok(SeedOutcome::AlreadyPresent);
        }

        info!("Table '{}' is empty. Inserting prompt...", self.table);
        let mut row = Row::new();
        row.insert(self.column.clone(), JsonValue::String(prompt.to_string()));
        let resp = self
            .request(Method::POST)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send().await?;
        check_status(resp).await?;
        Ok(SeedOutcome::Inserted)
    }
}

async fn check_status(resp: Response) -> Result<Response, PromptError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(PromptError::Status { status, body })
}

pub async fn initialize_system_prompt(args: &Args) -> SystemPrompt {
    let client = SupabasePromptClient::from_args(args);
    resolve_system_prompt(client.as_ref()).await
}
