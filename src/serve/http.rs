use crate::error::{Result, TokenHubError};
use crate::serve::registry::TokenizerRegistry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TokenizerRegistry>,
    pub default_model: String,
    pub default_max_length: usize,
}

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub text: String,
    pub max_length: Option<usize>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenizeResponse {
    pub input_ids: Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub token_count: usize,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub available_models: Vec<String>,
    pub version: String,
}

/// Build the router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tokenize", post(tokenize_handler))
        .route("/health", get(health_handler))
        .route("/", get(root_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TokenHubError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Serving tokenizers on {addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(TokenHubError::Io)?;

    Ok(())
}

async fn tokenize_handler(
    State(state): State<AppState>,
    Json(request): Json<TokenizeRequest>,
) -> Response {
    if state.registry.is_empty() {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "No tokenizers loaded");
    }

    let model = request
        .model
        .unwrap_or_else(|| state.default_model.clone());
    let max_length = request.max_length.unwrap_or(state.default_max_length);

    match state.registry.tokenize(&model, &request.text, max_length) {
        Ok(encoded) => {
            tracing::debug!(
                "Tokenized {} chars -> {} tokens for '{model}'",
                request.text.len(),
                encoded.token_count
            );
            let response = TokenizeResponse {
                input_ids: encoded.input_ids,
                attention_mask: encoded.attention_mask,
                token_count: encoded.token_count,
                model,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e @ TokenHubError::UnknownModel { .. }) => {
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            tracing::error!("Tokenization failed for '{model}': {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Tokenization failed: {e}"),
            )
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Response {
    let available_models = state.registry.available();

    if available_models.is_empty() {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "No tokenizers loaded");
    }

    let response = HealthResponse {
        status: "healthy".to_string(),
        available_models,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

async fn root_handler() -> Response {
    Json(json!({
        "service": "tokenhub",
        "status": "running",
        "endpoints": {
            "tokenize": "/tokenize (POST)",
            "health": "/health (GET)"
        }
    }))
    .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
