use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::json;

use crate::models::ProviderConfig;
use crate::traits::VisionProvider;

/// Google Gemini provider implementation
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }

    fn endpoint(&self) -> String {
        let api_base = self.config.api_base.clone().unwrap_or_else(|| {
            "https://generativelanguage.googleapis.com/v1beta".to_string()
        });
        format!(
            "{}/models/{}:generateContent",
            api_base, self.config.default_model
        )
    }

    async fn generate(&self, parts: Vec<serde_json::Value>) -> anyhow::Result<String> {
        let request_payload = json!({
            "contents": [{ "parts": parts }],
        });

        tracing::debug!("Making API call to {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_payload)
            .send()
            .await?;

        // Get the raw response text first for better error handling
        let response_text = response.text().await?;
        tracing::trace!("Raw API response: {}", response_text);

        let data = match serde_json::from_str::<serde_json::Value>(&response_text) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to parse API response as JSON: {:?}", e);
                return Err(anyhow::anyhow!("API returned non-JSON response: {}", e));
            }
        };

        // Check for API errors
        if let Some(error) = data.get("error") {
            let error_message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            tracing::error!("API returned error: {}", error_message);
            return Err(anyhow::anyhow!("API error: {}", error_message));
        }

        let candidates = match data.get("candidates").and_then(|c| c.as_array()) {
            Some(candidates) if !candidates.is_empty() => candidates,
            _ => {
                tracing::error!("Response missing 'candidates' array: {:?}", data);
                return Err(anyhow::anyhow!("No candidates returned"));
            }
        };

        let text = candidates[0]
            .pointer("/content/parts/0/text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                tracing::error!("First candidate missing text part: {:?}", candidates[0]);
                anyhow::anyhow!("Response candidate missing text content")
            })?
            .to_string();

        Ok(text)
    }
}

#[async_trait]
impl VisionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        self.generate(vec![json!({ "text": prompt })]).await
    }

    async fn describe_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> anyhow::Result<String> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        self.generate(vec![
            json!({ "text": prompt }),
            json!({
                "inline_data": {
                    "mime_type": mime_type,
                    "data": encoded,
                }
            }),
        ])
        .await
    }
}
