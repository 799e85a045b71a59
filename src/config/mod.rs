// src/config/mod.rs
// All tunables load from the environment with defaults.

use once_cell::sync::Lazy;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    // ── LLM Configuration
    pub llm_provider: String,
    pub anthropic_model: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub max_output_tokens: u32,
    pub summary_output_tokens: u32,

    // ── Exploration Configuration
    pub max_queries: usize,
    pub summary_batch_size: usize,
    pub findings_cap: usize,
    pub findings_keep: usize,
    pub result_sample_max: usize,
    pub result_sample_truncated: usize,

    // ── Database Configuration
    pub database_url: String,
    pub query_row_limit: usize,

    // ── Logging
    pub log_level: String,
}

// Handles values with trailing comments and whitespace.
fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => {
            let clean = val.split('#').next().unwrap_or("").trim();
            clean.parse::<T>().unwrap_or(default)
        }
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        // Load .env first if present; a missing file is fine.
        let _ = dotenvy::dotenv();

        Self {
            llm_provider: env_var_or("DATASCOUT_PROVIDER", "anthropic".to_string()),
            anthropic_model: env_var_or(
                "DATASCOUT_ANTHROPIC_MODEL",
                "claude-sonnet-4-20250514".to_string(),
            ),
            openai_model: env_var_or("DATASCOUT_OPENAI_MODEL", "gpt-4o".to_string()),
            openai_base_url: env_var_or(
                "OPENAI_BASE_URL",
                "https://api.openai.com/v1".to_string(),
            ),
            max_output_tokens: env_var_or("DATASCOUT_MAX_OUTPUT_TOKENS", 4000),
            summary_output_tokens: env_var_or("DATASCOUT_SUMMARY_OUTPUT_TOKENS", 4000),
            max_queries: env_var_or("DATASCOUT_MAX_QUERIES", 7),
            summary_batch_size: env_var_or("DATASCOUT_SUMMARY_BATCH", 3),
            findings_cap: env_var_or("DATASCOUT_FINDINGS_CAP", 10),
            findings_keep: env_var_or("DATASCOUT_FINDINGS_KEEP", 5),
            result_sample_max: env_var_or("DATASCOUT_RESULT_SAMPLE_MAX", 100),
            result_sample_truncated: env_var_or("DATASCOUT_RESULT_SAMPLE_TRUNCATED", 50),
            database_url: env_var_or("DATABASE_URL", "sqlite:./scout.db".to_string()),
            query_row_limit: env_var_or("DATASCOUT_QUERY_ROW_LIMIT", 1000),
            log_level: env_var_or("DATASCOUT_LOG_LEVEL", "info".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
