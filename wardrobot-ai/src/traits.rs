use async_trait::async_trait;

/// A multimodal generative-model capability. Implementations wrap a real
/// remote service; tests substitute deterministic doubles.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Name of this provider, e.g. "gemini".
    fn name(&self) -> &str;

    /// Text-only completion.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;

    /// Send a text prompt together with an image and return the model's
    /// free-text response.
    async fn describe_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> anyhow::Result<String>;
}
