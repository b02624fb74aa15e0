//! Completion-provider integration.
//!
//! The orchestration layers talk to the `CompletionProvider` trait object;
//! the shipped implementation speaks the OpenAI-compatible chat-completions
//! API over HTTP. A scripted `MockProvider` backs tests and examples.

pub mod openai;
pub mod provider;

pub use openai::OpenAiProvider;
pub use provider::{
    ChatMessage, CompletionProvider, CompletionRequest, MockProvider, Role, extract_json,
};

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ProviderError;

/// Configuration for creating a completion provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Chat-completions endpoint (OpenAI-compatible).
    pub endpoint: String,
    /// Bearer token for the endpoint.
    pub api_key: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Config pointing at the default OpenAI endpoint.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key,
            timeout: Duration::from_secs(60),
        }
    }

    /// Override the endpoint (self-hosted or compatible gateways).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Create a completion provider from configuration.
pub fn create_provider(
    config: ProviderConfig,
) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    let provider = OpenAiProvider::new(config)?;
    tracing::info!(endpoint = %provider.endpoint(), "Completion provider ready");
    Ok(Arc::new(provider))
}
