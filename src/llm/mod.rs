// src/llm/mod.rs
// Text generation port and provider selection.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub mod claude;
pub mod openai;

pub use claude::ClaudeProvider;
pub use openai::OpenAiProvider;

use crate::config::CONFIG;

/// Single-capability text generation interface.
///
/// Contract: `generate` always returns text, even on internal failure — a
/// provider error comes back as an error-message string, never as an Err.
/// The exploration loop treats the result as opaque text to parse, so this
/// call is never a throw site.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Provider name for logging/debugging
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str, max_tokens: u32) -> String;
}

/// Build a provider from its name, reading API keys from the environment.
pub fn for_provider(provider: &str) -> Result<Arc<dyn TextGenerator>> {
    match provider.to_lowercase().as_str() {
        "anthropic" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY")
                .map_err(|_| anyhow!("ANTHROPIC_API_KEY environment variable is required"))?;
            Ok(Arc::new(ClaudeProvider::new(
                api_key,
                CONFIG.anthropic_model.clone(),
            )))
        }
        "openai" => {
            let api_key = std::env::var("OPENAI_API_KEY")
                .map_err(|_| anyhow!("OPENAI_API_KEY environment variable is required"))?;
            Ok(Arc::new(OpenAiProvider::new(
                api_key,
                CONFIG.openai_model.clone(),
                CONFIG.openai_base_url.clone(),
            )))
        }
        other => Err(anyhow!("Unsupported provider: {}", other)),
    }
}
