use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use transit_booking::{BookingFlow, BookingStep, BookingWizard, CompletedBooking, PassengerDetails};
use transit_core::draft::CURRENCY;
use transit_core::BookingDraft;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub step: BookingStep,
    pub submitting: bool,
    pub draft: BookingDraft,
    pub currency: String,
    pub confirmation_id: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl SessionResponse {
    fn new(session_id: Uuid, wizard: &BookingWizard) -> Self {
        Self {
            session_id,
            step: wizard.step(),
            submitting: wizard.is_submitting(),
            draft: wizard.draft().clone(),
            currency: CURRENCY.to_string(),
            confirmation_id: wizard.confirmation_id().map(str::to_string),
            confirmed_at: wizard.completed().map(|c| c.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectVehicleRequest {
    pub vehicle_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectStopsRequest {
    pub source_stop_id: Option<String>,
    pub destination_stop_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub session: SessionResponse,
    pub booking: CompletedBooking,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/sessions", post(start_session))
        .route("/v1/bookings/sessions/{id}", get(get_session).delete(end_session))
        .route("/v1/bookings/sessions/{id}/vehicle", put(select_vehicle))
        .route("/v1/bookings/sessions/{id}/stops", put(select_stops))
        .route("/v1/bookings/sessions/{id}/continue", post(continue_to_details))
        .route("/v1/bookings/sessions/{id}/passenger", put(update_passenger))
        .route("/v1/bookings/sessions/{id}/back", post(back_to_selection))
        .route("/v1/bookings/sessions/{id}/submit", post(submit_booking))
        .route("/v1/bookings/sessions/{id}/reset", post(book_another))
}

/// POST /v1/bookings/sessions
/// Start a wizard; the catalogs are read once here
async fn start_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let session_id = Uuid::new_v4();
    let mut flow = BookingFlow::start(state.vehicles.as_ref(), state.stops.as_ref(), state.backend.clone())
        .await?
        .with_listener(Arc::new(state.session_outcomes(session_id)));
    if let Some(limit) = state.submission_timeout {
        flow = flow.with_timeout(limit);
    }

    let wizard = flow.snapshot().await;
    state.sessions.write().await.insert(session_id, Arc::new(flow));
    info!(%session_id, "Booking session started");

    Ok((StatusCode::CREATED, Json(SessionResponse::new(session_id, &wizard))))
}

/// GET /v1/bookings/sessions/{id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow.snapshot().await;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

/// DELETE /v1/bookings/sessions/{id}
/// Refused while a submission is in flight
async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut sessions = state.sessions.write().await;
    let flow = sessions
        .get(&session_id)
        .ok_or_else(|| AppError::NotFoundError(format!("Session not found: {}", session_id)))?;

    if flow.snapshot().await.is_submitting() {
        return Err(AppError::ConflictError(
            "A booking submission is already in progress".to_string(),
        ));
    }

    sessions.remove(&session_id);
    info!(%session_id, "Booking session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/bookings/sessions/{id}/vehicle
async fn select_vehicle(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SelectVehicleRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow.select_vehicle(&req.vehicle_id).await?;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

/// PUT /v1/bookings/sessions/{id}/stops
async fn select_stops(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<SelectStopsRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow
        .select_stops(req.source_stop_id.as_deref(), req.destination_stop_id.as_deref())
        .await?;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

/// POST /v1/bookings/sessions/{id}/continue
/// Selection → Details
async fn continue_to_details(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow.continue_to_details().await?;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

/// PUT /v1/bookings/sessions/{id}/passenger
async fn update_passenger(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<PassengerDetails>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow.update_passenger(&req).await?;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

/// POST /v1/bookings/sessions/{id}/back
/// Details → Selection, keeping what was entered
async fn back_to_selection(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow.back_to_selection().await?;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

/// POST /v1/bookings/sessions/{id}/submit
/// Details → Confirmation. Waits for the booking service; the booking is
/// recorded and announced even if the client disconnects meanwhile.
async fn submit_booking(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let completed = flow.submit().await?;

    let wizard = flow.snapshot().await;
    Ok(Json(SubmitResponse {
        session: SessionResponse::new(session_id, &wizard),
        booking: completed,
    }))
}

/// POST /v1/bookings/sessions/{id}/reset
/// Confirmation → Selection with an empty draft
async fn book_another(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let flow = session(&state, session_id).await?;
    let wizard = flow.book_another().await?;
    Ok(Json(SessionResponse::new(session_id, &wizard)))
}

async fn session(state: &AppState, session_id: Uuid) -> Result<Arc<BookingFlow>, AppError> {
    state
        .sessions
        .read()
        .await
        .get(&session_id)
        .cloned()
        .ok_or_else(|| AppError::NotFoundError(format!("Session not found: {}", session_id)))
}
