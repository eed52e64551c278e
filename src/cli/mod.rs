use clap::{ Parser, Subcommand };
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Dataset Args ---
    /// JSON file holding the array of conversations to extract from.
    #[arg(long, env = "CONVERSATIONS_PATH", default_value = "conversations.json", global = true)]
    pub conversations_path: PathBuf,

    /// Number of extracted records to send to the generator in `sample` mode.
    #[arg(long, env = "SAMPLE_LIMIT", default_value = "1", global = true)]
    pub sample_limit: usize,

    /// Keep only the most recent N history messages in generator input. Unbounded when unset.
    #[arg(long, env = "HISTORY_LIMIT", global = true)]
    pub history_limit: Option<usize>,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for reply generation (gemini, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini", global = true)]
    pub chat_llm_type: String,

    /// API Key for the chat LLM provider
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub chat_api_key: String,

    /// Model name for reply generation (e.g., gemini-flash-latest, llama3)
    #[arg(long, env = "CHAT_MODEL", global = true)] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Base URL for the chat LLM provider API (e.g., http://localhost:11434 for Ollama)
    #[arg(long, env = "CHAT_BASE_URL", global = true)]
    pub chat_base_url: Option<String>,

    // --- Remote Prompt Args ---
    /// Supabase project URL holding the system prompt table.
    #[arg(long, env = "SUPABASE_URL", global = true)]
    pub supabase_url: Option<String>,

    /// Supabase publishable key used for the prompt table.
    #[arg(long, env = "SUPABASE_PUBLISHABLE_DEFAULT_KEY", hide_env_values = true, global = true)]
    pub supabase_key: Option<String>,

    /// Table holding the system prompt row.
    #[arg(long, env = "PROMPT_TABLE", default_value = "system_prompt", global = true)]
    pub prompt_table: String,

    /// Column of the prompt table holding the prompt text.
    #[arg(long, env = "PROMPT_COLUMN", default_value = "prompt", global = true)]
    pub prompt_column: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false", global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Extract records and generate replies for the first few of them (default).
    Sample,
    /// Extract records and write them as JSON.
    Extract {
        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Insert the built-in prompt into the prompt table if it is empty.
    SeedPrompt,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Sample)
    }
}
