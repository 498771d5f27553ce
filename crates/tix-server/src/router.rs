use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all Tix endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route("/api/v1/bookings", post(handler::book_handler))
        .route("/api/v1/stats", get(handler::stats_handler))
        .route(
            "/api/v1/bookings/user/:user_id",
            get(handler::user_bookings_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
