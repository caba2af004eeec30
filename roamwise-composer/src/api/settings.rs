//! Settings API endpoint
//!
//! PUT /settings/api-keys stores provider/generator API keys in the
//! database, the highest-priority source. Clients pick them up on next start.

use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, routing::put, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Request payload; absent keys are left unchanged
#[derive(Debug, Deserialize)]
pub struct SetApiKeysRequest {
    #[serde(default)]
    pub provider_api_key: Option<String>,
    #[serde(default)]
    pub generator_api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetApiKeysResponse {
    /// Names of the keys written
    pub updated: Vec<String>,
    pub restart_required: bool,
}

/// PUT /settings/api-keys
pub async fn set_api_keys(
    State(state): State<AppState>,
    Json(payload): Json<SetApiKeysRequest>,
) -> ApiResult<Json<SetApiKeysResponse>> {
    let supplied = [
        ("provider_api_key", &payload.provider_api_key),
        ("generator_api_key", &payload.generator_api_key),
    ];

    if supplied.iter().all(|(_, key)| key.is_none()) {
        return Err(ApiError::BadRequest("No API key supplied".to_string()));
    }
    for (name, key) in &supplied {
        if let Some(key) = key {
            if !crate::config::is_valid_key(key) {
                return Err(ApiError::BadRequest(format!(
                    "{} cannot be empty or whitespace-only",
                    name
                )));
            }
        }
    }

    let mut updated = Vec::new();
    if let Some(key) = payload.provider_api_key {
        crate::db::settings::set_provider_api_key(&state.db, key).await?;
        updated.push("provider_api_key".to_string());
    }
    if let Some(key) = payload.generator_api_key {
        crate::db::settings::set_generator_api_key(&state.db, key).await?;
        updated.push("generator_api_key".to_string());
    }

    info!(keys = ?updated, "API keys stored in database");

    Ok(Json(SetApiKeysResponse {
        updated,
        restart_required: true,
    }))
}

/// Build settings routes
pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/settings/api-keys", put(set_api_keys))
}
