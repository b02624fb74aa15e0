//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::llm::ProviderConfig;
use crate::llm::provider::{ChatMessage, CompletionProvider, CompletionRequest};

const PROVIDER_NAME: &str = "openai";

/// Completion provider speaking the OpenAI-compatible chat-completions API.
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Build the provider with its own connection pool.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { config, client })
    }

    /// Endpoint this provider talks to.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionBody {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER_NAME.to_string(),
                status,
                body,
            });
        }

        let reply: ChatCompletionReply =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: PROVIDER_NAME.to_string(),
                    reason: e.to_string(),
                })?;

        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ProviderError::MissingContent {
                provider: PROVIDER_NAME.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::Role;

    #[test]
    fn request_body_shape() {
        let messages = vec![
            ChatMessage::system("be brief"),
            ChatMessage::user("hello"),
        ];
        let body = ChatCompletionBody {
            model: "gpt-4o-mini",
            messages: &messages,
            temperature: 0.1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn reply_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hi there"}}]}"#;
        let reply: ChatCompletionReply = serde_json::from_str(raw).unwrap();
        assert_eq!(
            reply.choices[0].message.content.as_deref(),
            Some("hi there")
        );
    }

    #[test]
    fn reply_parsing_tolerates_null_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let reply: ChatCompletionReply = serde_json::from_str(raw).unwrap();
        assert!(reply.choices[0].message.content.is_none());
    }

    #[test]
    fn message_roles_serialize_for_wire() {
        let message = ChatMessage {
            role: Role::Assistant,
            content: "ok".to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
