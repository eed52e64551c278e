pub mod prompt;
pub mod remote_config;
