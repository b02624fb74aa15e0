//! Completion provider trait and request types.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One completion request: messages, target model, sampling temperature.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature,
        }
    }
}

/// External text-generation service consumed for decomposition, synthesis
/// and conflict-intervention text.
///
/// The contract is free-form text out; callers that need structured output
/// parse it themselves and fall back on failure.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider label for logs and error messages.
    fn name(&self) -> &str;

    /// Complete a chat request, returning the raw reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError>;
}

/// Extract the first JSON object from free-form model output.
///
/// Models wrap JSON in prose or code fences often enough that callers scan
/// for the outermost braces before parsing.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Scripted provider for tests and examples.
///
/// Answers each call with the next queued entry; an exhausted script fails
/// the way an unreachable service would.
pub struct MockProvider {
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl MockProvider {
    /// Provider that answers each call with the next queued text.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(responses.into_iter().map(|s| Ok(s.into())).collect()),
        }
    }

    /// Provider with a mixed script of successes and failures.
    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    /// Provider whose every call fails.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
        let next = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(ProviderError::RequestFailed {
                provider: "mock".to_string(),
                reason,
            }),
            None => Err(ProviderError::RequestFailed {
                provider: "mock".to_string(),
                reason: "mock script exhausted".to_string(),
            }),
        }
    }
}
