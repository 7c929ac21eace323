use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Published when a wizard session completes a booking.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub session_id: Uuid,
    pub confirmation_id: String,
    pub vehicle_id: String,
    pub fare_amount: u32,
    pub timestamp: DateTime<Utc>,
}

/// Published when the submission service rejects a booking.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingFailedEvent {
    pub session_id: Uuid,
    pub reason: String,
    pub retryable: bool,
    pub timestamp: DateTime<Utc>,
}

/// Everything the API broadcasts to live subscribers.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    Confirmed(BookingConfirmedEvent),
    Failed(BookingFailedEvent),
}

impl BookingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BookingEvent::Confirmed(_) => "booking_confirmed",
            BookingEvent::Failed(_) => "booking_failed",
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            BookingEvent::Confirmed(e) => e.session_id,
            BookingEvent::Failed(e) => e.session_id,
        }
    }
}
