use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use wardrobot_common::models::{Classification, GarmentAttributes};
use wardrobot_common::Error;

use crate::traits::VisionProvider;

/// Instruction prompt sent with every garment photo. Demands strict JSON so
/// the response can be parsed into `GarmentAttributes`.
const CLASSIFY_PROMPT: &str = r#"Analyze this clothing item and return ONLY valid JSON:
{
  "category": "specific category",
  "subcategory": "specific subcategory",
  "material": "fabric type",
  "seasonality": ["Spring", "Summer", "Fall", "Winter"],
  "formality": "casual/smart-casual/semi-formal/formal"
}"#;

/// Turns a processed garment image into structured attributes by prompting a
/// multimodal model. Malformed model output degrades to
/// `Classification::Empty`; only transport-level failures are errors.
pub struct GarmentClassifier {
    provider: Arc<dyn VisionProvider>,
    call_timeout: Duration,
}

impl GarmentClassifier {
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

    pub async fn classify(&self, image_png: &[u8]) -> Result<Classification, Error> {
        let response = timeout(
            self.call_timeout,
            self.provider
                .describe_image(CLASSIFY_PROMPT, image_png, "image/png"),
        )
        .await?
        .map_err(|e| Error::ClassificationTransport(e.to_string()))?;

        debug!("classifier response: {} bytes", response.len());
        Ok(parse_classification(&response))
    }
}

/// Parse the model's free-text response into a tagged classification. Never
/// fails: unparseable output becomes `Empty`.
pub fn parse_classification(response: &str) -> Classification {
    let cleaned = strip_code_fences(response);
    let value: serde_json::Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(e) => {
            warn!("classifier output was not valid JSON, degrading to empty: {}", e);
            return Classification::Empty;
        }
    };

    let attrs = GarmentAttributes {
        category: string_field(&value, "category"),
        subcategory: string_field(&value, "subcategory"),
        material: string_field(&value, "material"),
        seasonality: list_field(&value, "seasonality"),
        formality: string_field(&value, "formality"),
    };
    Classification::from_attributes(attrs)
}

fn string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn list_field(value: &serde_json::Value, key: &str) -> Vec<String> {
    match value.get(key) {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect(),
        // Models sometimes collapse a single-element list to a bare string.
        Some(serde_json::Value::String(s)) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Strip the ``` / ```json fences models commonly wrap JSON in.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line, if any.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fences() {
        let fenced = "```json\n{\"category\": \"top\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"category\": \"top\"}");

        let plain_fence = "```\n{\"a\":1}\n```";
        assert_eq!(strip_code_fences(plain_fence), "{\"a\":1}");

        let unfenced = "  {\"a\":1} ";
        assert_eq!(strip_code_fences(unfenced), "{\"a\":1}");
    }

    #[test]
    fn fenced_json_parses_to_full() {
        let response = r#"```json
{
  "category": "top",
  "subcategory": "t-shirt",
  "material": "cotton",
  "seasonality": ["Spring", "Summer"],
  "formality": "casual"
}
```"#;
        match parse_classification(response) {
            Classification::Full(attrs) => {
                assert_eq!(attrs.category.as_deref(), Some("top"));
                assert_eq!(attrs.seasonality, vec!["Spring", "Summer"]);
                assert_eq!(attrs.formality.as_deref(), Some("casual"));
            }
            other => panic!("expected Full, got {:?}", other),
        }
    }

    #[test]
    fn partial_json_parses_to_partial() {
        let response = r#"{"category": "outerwear", "material": 42}"#;
        match parse_classification(response) {
            Classification::Partial(attrs) => {
                assert_eq!(attrs.category.as_deref(), Some("outerwear"));
                assert!(attrs.material.is_none());
            }
            other => panic!("expected Partial, got {:?}", other),
        }
    }

    #[test]
    fn garbage_degrades_to_empty() {
        assert_eq!(
            parse_classification("I'm sorry, I cannot analyze this image."),
            Classification::Empty
        );
        assert_eq!(parse_classification(""), Classification::Empty);
    }

    #[test]
    fn bare_string_seasonality_becomes_single_entry() {
        let response = r#"{"category": "dress", "seasonality": "Summer"}"#;
        let attrs = parse_classification(response).attributes();
        assert_eq!(attrs.seasonality, vec!["Summer"]);
    }
}
