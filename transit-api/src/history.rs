use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use transit_booking::{BookingRecord, HistorySummary};

use crate::catalog::SearchQuery;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Totals over the full history, not just the matches.
    pub summary: HistorySummary,
    pub bookings: Vec<BookingRecord>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/history", get(list_history))
        .route("/v1/bookings/history/{booking_id}", get(get_booking))
}

/// GET /v1/bookings/history?q=term
async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<HistoryResponse> {
    let ledger = state.ledger.read().await;
    Json(HistoryResponse {
        summary: ledger.summary(),
        bookings: ledger.search(&query.q),
    })
}

/// GET /v1/bookings/history/{booking_id}
async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingRecord>, AppError> {
    state
        .ledger
        .read()
        .await
        .get(&booking_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Booking not found: {}", booking_id)))
}
