#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Hosted text-generation providers behind a common trait.
//!
//! Supports `OpenAI` (and any `OpenAI`-compatible local/self-hosted
//! server such as Ollama, vLLM, llama.cpp or LM Studio via `AI_BASE_URL`),
//! Anthropic Claude, and AWS Bedrock (feature-gated). A request is a
//! system instruction plus user/assistant messages; the reply is the
//! model's text.

pub mod providers;

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The model returned no text.
    #[error("Model returned an empty completion")]
    EmptyCompletion,

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
