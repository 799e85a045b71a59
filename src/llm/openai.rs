// src/llm/openai.rs
// OpenAI chat completions provider.

use super::TextGenerator;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            api_base,
        }
    }

    async fn request(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("OpenAI API error {}: {}", status, error_text));
        }

        let raw = response.json::<Value>().await?;
        let text = raw["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("No message content in OpenAI response"))?
            .to_string();
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> String {
        let start = Instant::now();
        debug!("OpenAI request: model={}, max_tokens={}", self.model, max_tokens);

        match self.request(prompt, max_tokens).await {
            Ok(text) => {
                debug!("OpenAI response in {}ms", start.elapsed().as_millis());
                text
            }
            Err(e) => {
                warn!("OpenAI generation failed: {}", e);
                format!("Error generating response: {}", e)
            }
        }
    }
}
