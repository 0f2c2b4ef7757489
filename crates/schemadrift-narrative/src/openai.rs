//! OpenAI chat completions narrator

use crate::generator::{NarrativeError, NarrativeGenerator};
use crate::prompt::PromptRenderer;
use schemadrift_core::{DriftReport, NarrativeConfig};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Narrator backed by the OpenAI chat completions API
pub struct OpenAiNarrator {
    api_key: String,
    base_url: Option<String>,
    model: String,
    temperature: f32,
    timeout: Duration,
    client: reqwest::Client,
    prompts: PromptRenderer,
}

impl OpenAiNarrator {
    /// Create a narrator from the `[narrative]` table
    ///
    /// The API key must already be resolved into the config.
    pub fn new(config: &NarrativeConfig) -> Result<Self, NarrativeError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                NarrativeError::Config(
                    "no API key configured; set narrative.api_key or OPENAI_API_KEY".to_string(),
                )
            })?
            .to_string();

        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NarrativeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.as_ref().map(|url| url.trim().trim_end_matches('/').to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout,
            client,
            prompts: PromptRenderer::new()?,
        })
    }

    /// Get the effective base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: String) -> Result<String, NarrativeError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": prompt
            }],
            "temperature": self.temperature
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url()))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrativeError::Timeout(self.timeout)
                } else {
                    NarrativeError::Http(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Api { status, message });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| NarrativeError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                NarrativeError::InvalidResponse("missing choices[0].message.content".to_string())
            })
    }
}

#[async_trait::async_trait]
impl NarrativeGenerator for OpenAiNarrator {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    async fn explain(&self, report: &DriftReport) -> Result<String, NarrativeError> {
        let prompt = self.prompts.render(report)?;
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "requesting narrative");
        self.complete(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_api_key() {
        let err = OpenAiNarrator::new(&NarrativeConfig::default()).err().unwrap();
        assert!(matches!(err, NarrativeError::Config(_)));
    }

    #[test]
    fn blank_api_key_is_missing() {
        let config = NarrativeConfig {
            api_key: Some("   ".to_string()),
            ..NarrativeConfig::default()
        };
        assert!(OpenAiNarrator::new(&config).is_err());
    }

    #[test]
    fn base_url_defaults_and_trims() {
        let mut config = NarrativeConfig {
            api_key: Some("sk-test".to_string()),
            ..NarrativeConfig::default()
        };
        assert_eq!(OpenAiNarrator::new(&config).unwrap().base_url(), "https://api.openai.com/v1");

        config.base_url = Some("http://localhost:8080/v1/".to_string());
        assert_eq!(OpenAiNarrator::new(&config).unwrap().base_url(), "http://localhost:8080/v1");
    }
}
