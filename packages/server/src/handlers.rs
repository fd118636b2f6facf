//! HTTP handler functions for the crime advice API.

use actix_web::{HttpResponse, web};
use crime_advice_server_models::{
    ApiHealth, ChatBotRequest, ChatBotResponse, chat_bot_error_body,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/chat-bot`
///
/// Runs the advice chain for `{ city, business }`. Any failure along the
/// chain is a 500 whose body is the JSON string `"Error: <message>"`.
pub async fn chat_bot(
    state: web::Data<AppState>,
    body: web::Json<ChatBotRequest>,
) -> HttpResponse {
    let ChatBotRequest { city, business } = body.into_inner();
    let request_id = uuid::Uuid::new_v4();
    log::info!("[{request_id}] Advice requested for {business} in {city}");

    match state.advisor.advise(&city, &business).await {
        Ok(advice) => {
            log::info!(
                "[{request_id}] Answered ({} tier, force {})",
                advice.tier,
                advice.force
            );
            HttpResponse::Ok().json(ChatBotResponse {
                content: advice.text,
                coordinates: advice.coordinates,
            })
        }
        Err(e) => {
            log::error!("[{request_id}] Failed to produce advice for {business} in {city}: {e}");
            HttpResponse::InternalServerError().json(chat_bot_error_body(&e.to_string()))
        }
    }
}

/// `GET /api/crime-rates`
///
/// Returns the static crime rate table as a JSON object.
pub async fn crime_rates(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.rates.as_ref())
}

/// `GET /api/police-areas`
///
/// Returns police area boundaries with map style and popup properties
/// merged into each feature.
pub async fn police_areas(state: web::Data<AppState>) -> HttpResponse {
    let Some(areas) = &state.areas else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "Police area boundaries not loaded"
        }));
    };

    HttpResponse::Ok().json(areas.styled_feature_collection(Some(&state.rates)))
}
