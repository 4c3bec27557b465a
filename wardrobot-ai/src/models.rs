use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a generative-AI provider. Constructed explicitly and
/// passed in, never read from process-global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for API requests
    pub api_base: Option<String>,

    /// API key for authentication
    pub api_key: String,

    /// Default model to use with this provider
    pub default_model: String,

    /// Additional provider-specific configuration options
    pub options: HashMap<String, String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            api_base: None,
            api_key: api_key.into(),
            default_model: default_model.into(),
            options: HashMap::new(),
        }
    }
}
