use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tix_engine::AllocationEngine;
use tix_store::BookingStore;
use tix_types::{Booking, Outcome};
use tokio_util::sync::CancellationToken;

use crate::error::ServerResult;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AllocationEngine<dyn BookingStore>>,
    /// Fired on shutdown so allocations waiting on the ledger give up.
    pub cancel: CancellationToken,
}

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub user_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_tickets: u64,
    pub booked_tickets: u64,
    pub available_tickets: u64,
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /api/v1/bookings`
pub async fn book_handler(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> (StatusCode, Json<BookingResponse>) {
    let outcome = state.engine.allocate(&request.user_id, &state.cancel).await;

    let status = match &outcome {
        Outcome::Success(_) => StatusCode::CREATED,
        Outcome::SoldOut => StatusCode::CONFLICT,
        Outcome::InvalidInput => StatusCode::BAD_REQUEST,
        Outcome::StorageError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        Outcome::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    };
    let response = match outcome {
        Outcome::Success(id) => BookingResponse {
            user_id: request.user_id,
            success: true,
            booking_id: Some(id.into()),
            error: None,
        },
        failure => BookingResponse {
            user_id: request.user_id,
            success: false,
            booking_id: None,
            error: Some(failure.to_string()),
        },
    };
    (status, Json(response))
}

/// `GET /api/v1/stats`
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.stats();
    Json(StatsResponse {
        total_tickets: stats.total,
        booked_tickets: stats.booked,
        available_tickets: stats.available,
    })
}

/// `GET /api/v1/bookings/user/:user_id`
pub async fn user_bookings_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ServerResult<Json<Vec<Booking>>> {
    Ok(Json(state.engine.bookings_for(&user_id)?))
}
