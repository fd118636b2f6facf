#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the crime advice server.
//!
//! Shared by the server and by HTTP clients of it, so both sides agree on
//! the wire format.

use crime_advice_geography_models::Coordinates;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat-bot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBotRequest {
    /// City to geocode.
    pub city: String,
    /// Type of business to advise.
    pub business: String,
}

/// Successful response from `POST /api/chat-bot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBotResponse {
    /// Generated advice, possibly multi-line.
    pub content: String,
    /// `[latitude, longitude]` of the geocoded city.
    pub coordinates: Coordinates,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Formats the body returned with a 500 from `POST /api/chat-bot`.
#[must_use]
pub fn chat_bot_error_body(message: &str) -> String {
    format!("Error: {message}")
}
