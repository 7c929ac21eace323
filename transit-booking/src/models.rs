use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use transit_core::BookingDraft;
use transit_shared::Masked;

/// Wizard step. The flow only moves Selection → Details → Confirmation,
/// with Details → Selection as the one way back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStep {
    Selection,
    Details,
    Confirmation,
}

impl fmt::Display for BookingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStep::Selection => "SELECTION",
            BookingStep::Details => "DETAILS",
            BookingStep::Confirmation => "CONFIRMATION",
        };
        f.write_str(name)
    }
}

/// Passenger fields as entered. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassengerDetails {
    pub passenger_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PassengerDetails {
    pub fn new(passenger_name: &str, phone: &str, email: &str) -> Self {
        Self {
            passenger_name: Some(passenger_name.to_string()),
            phone: Some(phone.to_string()),
            email: Some(email.to_string()),
        }
    }

    pub(crate) fn apply_to(&self, draft: &mut BookingDraft) {
        if let Some(name) = &self.passenger_name {
            draft.passenger_name = Masked::from(name.as_str());
        }
        if let Some(phone) = &self.phone {
            draft.phone = Masked::from(phone.as_str());
        }
        if let Some(email) = &self.email {
            draft.email = Masked::from(email.as_str());
        }
    }
}

/// A booking the submission service accepted. Never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedBooking {
    pub confirmation_id: String,
    pub booking: BookingDraft,
    pub created_at: DateTime<Utc>,
}

/// Booking history status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

/// One line of a customer's booking history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_id: String,
    pub vehicle_id: String,
    pub source: String,
    pub destination: String,
    pub fare: u32,
    pub booking_time: DateTime<Utc>,
    pub journey_date: NaiveDate,
    pub status: BookingStatus,
    pub passenger_name: Masked<String>,
}

impl BookingRecord {
    /// A fresh booking travels on the day it was made.
    pub fn from_completed(completed: &CompletedBooking) -> Self {
        let draft = &completed.booking;
        Self {
            booking_id: completed.confirmation_id.clone(),
            vehicle_id: draft.vehicle_id.clone().unwrap_or_default(),
            source: draft.source_stop.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            destination: draft.destination_stop.as_ref().map(|s| s.name.clone()).unwrap_or_default(),
            fare: draft.fare_amount,
            booking_time: completed.created_at,
            journey_date: completed.created_at.date_naive(),
            status: BookingStatus::Confirmed,
            passenger_name: draft.passenger_name.clone(),
        }
    }

    /// Case-insensitive match on booking id, vehicle, source or destination.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [&self.booking_id, &self.vehicle_id, &self.source, &self.destination]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Totals shown above the history list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistorySummary {
    pub total: usize,
    pub completed: usize,
    pub upcoming: usize,
    pub cancelled: usize,
    /// Sum of fares over bookings that were not cancelled.
    pub total_spent: u32,
}
