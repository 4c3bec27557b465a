use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::warn;

use wardrobot_common::models::WardrobeItem;
use wardrobot_common::Error;

use crate::classifier::strip_code_fences;
use crate::traits::VisionProvider;

/// Text-model client for wardrobe-level requests that go beyond a single
/// garment, currently outfit suggestions.
pub struct AiClient {
    provider: Arc<dyn VisionProvider>,
    call_timeout: Duration,
}

impl AiClient {
    pub fn new(provider: Arc<dyn VisionProvider>) -> Self {
        Self {
            provider,
            call_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// Ask the model for outfit suggestions drawn from the given wardrobe.
    /// Transport failures are errors; an unparseable response degrades to an
    /// empty suggestion list.
    pub async fn suggest_outfits(
        &self,
        wardrobe: &[WardrobeItem],
        occasion: &str,
        weather: &str,
    ) -> Result<Vec<serde_json::Value>, Error> {
        let prompt = format!(
            "Create outfit recommendations for {} occasion.\n\
             Weather: {}\n\
             Wardrobe: {}\n\n\
             Return ONLY a valid JSON array of outfit suggestions, where each \
             suggestion lists the item names it combines and a short reason.",
            occasion,
            weather,
            serde_json::to_string(wardrobe)?,
        );

        let response = timeout(self.call_timeout, self.provider.complete(&prompt))
            .await?
            .map_err(|e| Error::ClassificationTransport(e.to_string()))?;

        match serde_json::from_str::<serde_json::Value>(strip_code_fences(&response)) {
            Ok(serde_json::Value::Array(suggestions)) => Ok(suggestions),
            Ok(other) => Ok(vec![other]),
            Err(e) => {
                warn!("outfit response was not valid JSON, returning no suggestions: {}", e);
                Ok(Vec::new())
            }
        }
    }
}
