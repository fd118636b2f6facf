//! AWS Bedrock provider implementation using the Converse API.

use aws_sdk_bedrockruntime::types::{
    self as bedrock, ContentBlock as BedrockContent, ConversationRole, Message as BedrockMessage,
    StopReason as BedrockStopReason, SystemContentBlock,
};

use super::{LlmProvider, LlmResponse, MAX_TOKENS, Message, Role, StopReason, join_text};
use crate::AiError;

/// Default model when `AI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

/// AWS Bedrock provider using the Converse API.
///
/// Authentication uses the standard AWS credential chain (env vars,
/// IAM role, `~/.aws/credentials`) or `AWS_BEARER_TOKEN_BEDROCK`.
pub struct BedrockProvider {
    client: aws_sdk_bedrockruntime::Client,
    model_id: String,
}

impl BedrockProvider {
    /// Creates a new Bedrock provider.
    ///
    /// Loads AWS configuration from the environment (region, credentials).
    pub async fn new(model_id: String, region: Option<String>) -> Self {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = region {
            config_loader = config_loader.region(aws_config::Region::new(region));
        }

        let config = config_loader.load().await;
        let client = aws_sdk_bedrockruntime::Client::new(&config);

        Self { client, model_id }
    }
}

#[async_trait::async_trait]
impl LlmProvider for BedrockProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> Result<LlmResponse, AiError> {
        let bedrock_messages = convert_messages(messages)?;

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(system_prompt.to_string()))
            .set_messages(Some(bedrock_messages))
            .inference_config(
                bedrock::InferenceConfiguration::builder()
                    .max_tokens(i32::try_from(MAX_TOKENS).unwrap_or(i32::MAX))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| AiError::Provider {
                message: format!("Bedrock Converse error: {e}"),
            })?;

        let text = output_text(response.output())?;

        let stop_reason = match response.stop_reason() {
            BedrockStopReason::MaxTokens => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        };

        Ok(LlmResponse { text, stop_reason })
    }

    fn name(&self) -> String {
        format!("bedrock:{}", self.model_id)
    }
}

/// Joins the text blocks of a Converse reply, skipping images, reasoning
/// and other non-text content.
fn output_text(output: Option<&bedrock::ConverseOutput>) -> Result<String, AiError> {
    let Some(bedrock::ConverseOutput::Message(message)) = output else {
        return Err(AiError::Provider {
            message: "Bedrock response carried no message".to_string(),
        });
    };

    join_text(message.content().iter().filter_map(|block| match block {
        BedrockContent::Text(text) => Some(text.as_str()),
        _ => None,
    }))
}

/// Converts our messages to Bedrock `Message` format.
fn convert_messages(messages: &[Message]) -> Result<Vec<BedrockMessage>, AiError> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => ConversationRole::User,
            };

            BedrockMessage::builder()
                .role(role)
                .content(BedrockContent::Text(msg.content.clone()))
                .build()
                .map_err(|e| AiError::Provider {
                    message: format!("Failed to build Bedrock Message: {e}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(blocks: Vec<BedrockContent>) -> bedrock::ConverseOutput {
        let message = BedrockMessage::builder()
            .role(ConversationRole::Assistant)
            .set_content(Some(blocks))
            .build()
            .unwrap();
        bedrock::ConverseOutput::Message(message)
    }

    #[test]
    fn joins_text_blocks() {
        let output = reply(vec![
            BedrockContent::Text("Lock the till.".to_string()),
            BedrockContent::Text("Fit a shutter.".to_string()),
        ]);
        assert_eq!(
            output_text(Some(&output)).unwrap(),
            "Lock the till.\nFit a shutter."
        );
    }

    #[test]
    fn missing_output_is_provider_error() {
        assert!(matches!(
            output_text(None),
            Err(AiError::Provider { .. })
        ));
    }

    #[test]
    fn converts_user_messages() {
        let converted =
            convert_messages(&[Message::user("hello"), Message::user("again")]).unwrap();
        assert_eq!(converted.len(), 2);
        assert!(
            converted
                .iter()
                .all(|m| m.role() == &ConversationRole::User)
        );
        assert!(matches!(
            converted[1].content(),
            [BedrockContent::Text(text)] if text == "again"
        ));
    }
}
