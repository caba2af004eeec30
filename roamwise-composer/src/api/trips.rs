//! Trip API handlers
//!
//! POST /trips, GET /trips/{owner_id}, GET|DELETE /trips/{owner_id}/{trip_id},
//! POST /trips/cancel/{request_id}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{TripAggregate, TripRequest, TripSummary},
    services::CompositionError,
    AppState,
};

/// POST /trips request
#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    #[serde(flatten)]
    pub trip: TripRequest,
    /// Handle for POST /trips/cancel; generated when absent
    #[serde(default)]
    pub request_id: Option<Uuid>,
    /// Overrides the configured deadline
    #[serde(default)]
    pub deadline_secs: Option<u64>,
}

/// POST /trips response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTripResponse {
    pub trip_id: Uuid,
    pub request_id: Uuid,
}

/// POST /trips/cancel response
#[derive(Debug, Serialize, Deserialize)]
pub struct CancelTripResponse {
    pub request_id: Uuid,
    pub cancelled: bool,
}

type TokenMap = Arc<RwLock<HashMap<Uuid, CancellationToken>>>;

/// Removes a request's token if the handler future is dropped mid-flight
struct TokenRegistration {
    tokens: TokenMap,
    request_id: Uuid,
    armed: bool,
}

impl TokenRegistration {
    async fn release(mut self) {
        self.tokens.write().await.remove(&self.request_id);
        self.armed = false;
    }
}

impl Drop for TokenRegistration {
    fn drop(&mut self) {
        if self.armed {
            let tokens = self.tokens.clone();
            let request_id = self.request_id;
            tokio::spawn(async move {
                tokens.write().await.remove(&request_id);
            });
        }
    }
}

/// POST /trips
///
/// Runs the whole composition pipeline and answers once the trip is stored.
pub async fn create_trip(
    State(state): State<AppState>,
    Json(request): Json<CreateTripRequest>,
) -> ApiResult<(StatusCode, Json<CreateTripResponse>)> {
    let request_id = request.request_id.unwrap_or_else(Uuid::new_v4);
    let token = CancellationToken::new();

    {
        let mut tokens = state.cancellation_tokens.write().await;
        if tokens.contains_key(&request_id) {
            return Err(ApiError::BadRequest(format!(
                "Request id already in flight: {}",
                request_id
            )));
        }
        tokens.insert(request_id, token.clone());
    }
    let registration = TokenRegistration {
        tokens: state.cancellation_tokens.clone(),
        request_id,
        armed: true,
    };

    let deadline = request
        .deadline_secs
        .map(Duration::from_secs)
        .unwrap_or(state.request_deadline);

    tracing::debug!(
        request_id = %request_id,
        owner_id = %request.trip.owner_id,
        deadline_secs = deadline.as_secs(),
        "Trip creation requested"
    );

    let result = state
        .composer
        .create_trip(request.trip, token, deadline)
        .await;
    registration.release().await;

    match result {
        Ok(trip_id) => Ok((
            StatusCode::CREATED,
            Json(CreateTripResponse {
                trip_id,
                request_id,
            }),
        )),
        Err(e) => {
            if let CompositionError::PersistError(_) = &e {
                *state.last_error.write().await = Some(e.to_string());
            }
            Err(e.into())
        }
    }
}

/// POST /trips/cancel/{request_id}
pub async fn cancel_trip(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<CancelTripResponse>)> {
    let token = state
        .cancellation_tokens
        .read()
        .await
        .get(&request_id)
        .cloned()
        .ok_or_else(|| {
            ApiError::NotFound(format!("No trip creation in flight: {}", request_id))
        })?;

    token.cancel();
    tracing::info!(request_id = %request_id, "Trip creation cancelled by caller");

    Ok((
        StatusCode::ACCEPTED,
        Json(CancelTripResponse {
            request_id,
            cancelled: true,
        }),
    ))
}

/// GET /trips/{owner_id}
pub async fn list_trips(
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
) -> ApiResult<Json<Vec<TripSummary>>> {
    let trips = state.composer.store().list(&owner_id).await?;
    Ok(Json(trips))
}

/// GET /trips/{owner_id}/{trip_id}
pub async fn get_trip(
    State(state): State<AppState>,
    Path((owner_id, trip_id)): Path<(String, Uuid)>,
) -> ApiResult<Json<TripAggregate>> {
    let trip = state
        .composer
        .store()
        .get(&owner_id, trip_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Trip not found: {}", trip_id)))?;

    Ok(Json(trip))
}

/// DELETE /trips/{owner_id}/{trip_id}
pub async fn delete_trip(
    State(state): State<AppState>,
    Path((owner_id, trip_id)): Path<(String, Uuid)>,
) -> ApiResult<StatusCode> {
    if !state.composer.store().delete(&owner_id, trip_id).await? {
        return Err(ApiError::NotFound(format!("Trip not found: {}", trip_id)));
    }

    tracing::info!(owner_id = %owner_id, trip_id = %trip_id, "Trip deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Build trip routes
pub fn trip_routes() -> Router<AppState> {
    Router::new()
        .route("/trips", post(create_trip))
        .route("/trips/cancel/:request_id", post(cancel_trip))
        .route("/trips/:owner_id", get(list_trips))
        .route("/trips/:owner_id/:trip_id", get(get_trip).delete(delete_trip))
}
