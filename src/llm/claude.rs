// src/llm/claude.rs
// Claude Messages API provider.

use super::TextGenerator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("Claude API error {}: {}", status, error_text));
        }

        let raw = response.json::<Value>().await?;
        let text = raw["content"][0]["text"]
            .as_str()
            .ok_or_else(|| anyhow!("No text content in Claude response"))?
            .to_string();
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for ClaudeProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> String {
        let start = Instant::now();
        debug!("Claude request: model={}, max_tokens={}", self.model, max_tokens);

        match self.request(prompt, max_tokens).await {
            Ok(text) => {
                debug!("Claude response in {}ms", start.elapsed().as_millis());
                text
            }
            Err(e) => {
                // Surfaced as text, never thrown: the loop parses whatever
                // comes back.
                warn!("Claude generation failed: {}", e);
                format!("Error generating response: {}", e)
            }
        }
    }
}
