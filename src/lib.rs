pub mod cli;
pub mod config;
pub mod dataset;
pub mod driver;
pub mod extract;
pub mod history;
pub mod llm;
pub mod models;
pub mod reply;

use cli::{ Args, Command };
use config::prompt::DEFAULT_SYSTEM_PROMPT;
use config::remote_config::{ initialize_system_prompt, SeedOutcome, SupabasePromptClient };
use llm::chat::{ new_client as new_chat_client, ChatClient };
use llm::LlmConfig;
use log::{ info, warn };
use reply::ReplyGenerator;
use std::error::Error;
use std::io;
use std::sync::Arc;

fn set_or_unset(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "set",
        _ => "unset",
    }
}

fn log_configuration(args: &Args) {
    info!("--- Core Configuration ---");
    info!("Command: {:?}", args.command());
    info!("Conversations Path: {}", args.conversations_path.display());
    info!("Sample Limit: {}", args.sample_limit);
    info!("History Limit: {:?}", args.history_limit);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
    info!("Chat API Key: {}", set_or_unset(Some(args.chat_api_key.as_str())));
    info!("Supabase URL: {}", args.supabase_url.as_deref().unwrap_or("unset"));
    info!("Supabase Key: {}", set_or_unset(args.supabase_key.as_deref()));
    info!("Prompt Table: {}.{}", args.prompt_table, args.prompt_column);
    info!("-------------------------");
}

/// A chat client only when one can be built; failures are reported once here
/// and surface later as per-sample error replies.
fn initialize_chat_client(args: &Args) -> Result<Option<Arc<dyn ChatClient>>, Box<dyn Error + Send + Sync>> {
    let chat_config = LlmConfig {
        llm_type: args.chat_llm_type.parse()?,
        base_url: args.chat_base_url.clone(),
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        completion_model: args.chat_model.clone(),
    };
    match new_chat_client(&chat_config) {
        Ok(client) => {
            info!(
                "Chat client configured: Type={}, Model={}, BaseURL={}",
                args.chat_llm_type,
                client.get_model(),
                client.get_base_url().as_deref().unwrap_or("adapter default")
            );
            Ok(Some(client))
        }
        Err(e) => {
            warn!("Chat client unavailable: {}", e);
            Ok(None)
        }
    }
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    log_configuration(&args);

    match args.command() {
        Command::Sample => {
            let records = driver::extract_from_file(&args.conversations_path);
            let system_prompt = initialize_system_prompt(&args).await;
            let prompt_source = system_prompt.source;
            let chat_client = initialize_chat_client(&args)?;
            let generator = ReplyGenerator::new(chat_client, system_prompt.text, args.history_limit);
            info!("Using {:?} system prompt ({} chars)", prompt_source, generator.system_prompt().len());

            let mut stdout = io::stdout();
            driver::run_samples(&records, &generator, args.sample_limit, &mut stdout).await?;
        }
        Command::Extract { output } => {
            let records = driver::extract_from_file(&args.conversations_path);
            driver::write_records(&records, output.as_deref())?;
        }
        Command::SeedPrompt => {
            let client = SupabasePromptClient::from_args(&args).ok_or(
                "SUPABASE_URL and SUPABASE_PUBLISHABLE_DEFAULT_KEY are required to seed the prompt table"
            )?;
            match client.seed_prompt(DEFAULT_SYSTEM_PROMPT).await? {
                SeedOutcome::Inserted => info!("Inserted default prompt into '{}'.", client.table()),
                SeedOutcome::AlreadyPresent => info!("Table '{}' not empty. Nothing to seed.", client.table()),
            }
        }
    }

    Ok(())
}
