pub mod classifier;
pub mod client;
pub mod models;
pub mod provider;
pub mod traits;

// Re-export public APIs
pub use classifier::GarmentClassifier;
pub use client::AiClient;
pub use models::ProviderConfig;
pub use provider::GeminiProvider;
pub use traits::VisionProvider;
