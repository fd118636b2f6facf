//! LLM provider abstraction and implementations.
//!
//! Supports `OpenAI`, Anthropic Claude, and AWS Bedrock via a common trait.

pub mod anthropic;
#[cfg(feature = "bedrock")]
pub mod bedrock;
pub mod openai;

use serde::{Deserialize, Serialize};

use crate::AiError;

/// Maximum tokens requested per completion.
pub const MAX_TOKENS: u32 = 1024;

/// Who authored a message.
///
/// Advice is a single-turn prompt, so the model's replies are never fed
/// back and only the user role exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (prompt author).
    User,
}

impl Role {
    /// The wire name shared by every supported provider.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
        }
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Response from the LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmResponse {
    /// Generated text (all text blocks joined).
    pub text: String,
    /// Why the model stopped.
    pub stop_reason: StopReason,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Model finished its response naturally.
    EndTurn,
    /// Maximum tokens reached.
    MaxTokens,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a single completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn chat(&self, system_prompt: &str, messages: &[Message])
    -> Result<LlmResponse, AiError>;

    /// Provider and model label for logs.
    fn name(&self) -> String;
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `OPENAI_API_KEY` or `AI_BASE_URL` set -> `OpenAI` (or compatible)
/// 2. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 3. AWS credentials available (`AWS_BEARER_TOKEN_BEDROCK`,
///    `AWS_ACCESS_KEY_ID`, `AWS_PROFILE`, or IAM role) -> Bedrock
///
/// # Errors
///
/// Returns [`AiError::Config`] if no credentials are found or the
/// explicitly requested provider is not configured.
#[allow(clippy::unused_async)] // async is needed when bedrock feature is enabled
pub async fn create_provider_from_env(
    client: reqwest::Client,
) -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = std::env::var("AI_PROVIDER").unwrap_or_else(|_| detect_provider());

    match provider.to_lowercase().as_str() {
        "openai" | "gpt" => {
            let base_url = std::env::var("AI_BASE_URL").ok();
            let api_key = match std::env::var("OPENAI_API_KEY") {
                Ok(key) => Some(key),
                // Local OpenAI-compatible servers usually need no key.
                Err(_) if base_url.is_some() => None,
                Err(_) => {
                    return Err(AiError::Config {
                        message: "OPENAI_API_KEY environment variable not set".to_string(),
                    });
                }
            };
            let model =
                std::env::var("AI_MODEL").unwrap_or_else(|_| openai::DEFAULT_MODEL.to_string());
            let mut provider = openai::OpenAiProvider::new(client, api_key, model);
            if let Some(base_url) = base_url {
                provider = provider.with_base_url(base_url);
            }
            Ok(Box::new(provider))
        }
        "anthropic" | "claude" => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model =
                std::env::var("AI_MODEL").unwrap_or_else(|_| anthropic::DEFAULT_MODEL.to_string());
            Ok(Box::new(anthropic::AnthropicProvider::new(
                client, api_key, model,
            )))
        }
        #[cfg(feature = "bedrock")]
        "bedrock" | "aws" => {
            let model =
                std::env::var("AI_MODEL").unwrap_or_else(|_| bedrock::DEFAULT_MODEL.to_string());
            let region = std::env::var("AWS_REGION")
                .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
                .ok()
                .or_else(|| {
                    // Bearer token auth requires a region for endpoint resolution.
                    if std::env::var("AWS_BEARER_TOKEN_BEDROCK").is_ok() {
                        log::info!(
                            "No AWS_REGION set; defaulting to us-east-1 for Bedrock bearer token auth"
                        );
                        Some("us-east-1".to_string())
                    } else {
                        None
                    }
                });
            let provider = bedrock::BedrockProvider::new(model, region).await;
            Ok(Box::new(provider))
        }
        #[cfg(not(feature = "bedrock"))]
        "bedrock" | "aws" => Err(AiError::Config {
            message: "Bedrock support not compiled. Rebuild with --features bedrock".to_string(),
        }),
        other => Err(AiError::Config {
            message: format!(
                "Unknown AI provider: {other}. Use 'openai', 'anthropic', or 'bedrock'."
            ),
        }),
    }
}

/// Auto-detects which provider to use based on available credentials.
///
/// Returns a provider name string that matches the arms in
/// [`create_provider_from_env`].
fn detect_provider() -> String {
    if std::env::var("OPENAI_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI (OPENAI_API_KEY found)");
        return "openai".to_string();
    }

    if std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI-compatible server (AI_BASE_URL found)");
        return "openai".to_string();
    }

    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return "anthropic".to_string();
    }

    let has_bearer = std::env::var("AWS_BEARER_TOKEN_BEDROCK").is_ok();
    let has_aws_keys = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
    let has_aws_profile = std::env::var("AWS_PROFILE").is_ok();
    let has_aws_role = std::env::var("AWS_ROLE_ARN").is_ok()
        || std::env::var("AWS_CONTAINER_CREDENTIALS_RELATIVE_URI").is_ok();

    if has_bearer || has_aws_keys || has_aws_profile || has_aws_role {
        log::info!("Auto-detected AI provider: Bedrock (AWS credentials found)");
        return "bedrock".to_string();
    }

    log::warn!(
        "No AI credentials detected. Set one of: OPENAI_API_KEY, AI_BASE_URL, \
         ANTHROPIC_API_KEY, or AWS credentials (AWS_BEARER_TOKEN_BEDROCK, \
         AWS_ACCESS_KEY_ID, AWS_PROFILE). You can also set AI_PROVIDER explicitly."
    );

    // Fall back to openai; will produce a clear error about the missing key
    "openai".to_string()
}

/// Joins text blocks into one completion, rejecting empty output.
pub(crate) fn join_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> Result<String, AiError> {
    let text = parts
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        return Err(AiError::EmptyCompletion);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_text_skips_empty_blocks() {
        assert_eq!(join_text(["a", "", "b"]).unwrap(), "a\nb");
        assert!(matches!(join_text(["", " "]), Err(AiError::EmptyCompletion)));
    }

    #[test]
    fn roles_serialize_lowercase() {
        let msg = Message::user("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "user", "content": "hi" }));
        assert_eq!(Role::User.as_str(), "user");
    }
}
