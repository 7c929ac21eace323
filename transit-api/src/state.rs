use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use transit_booking::{BookingFlow, BookingLedger, CompletedBooking, FlowError, SubmissionListener};
use transit_catalog::{ArrivalEstimates, InMemoryCatalog, RouteCatalog, StopCatalog, VehicleCatalog};
use transit_core::BookingBackend;
use transit_shared::models::events::{BookingConfirmedEvent, BookingEvent, BookingFailedEvent};
use uuid::Uuid;

/// Capacity of the live event channel; slow subscribers skip older events.
const EVENT_BUFFER: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub vehicles: Arc<dyn VehicleCatalog>,
    pub stops: Arc<dyn StopCatalog>,
    pub routes: Arc<dyn RouteCatalog>,
    pub arrivals: Arc<dyn ArrivalEstimates>,
    pub backend: Arc<dyn BookingBackend>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<BookingFlow>>>>,
    pub ledger: Arc<RwLock<BookingLedger>>,
    pub events_tx: broadcast::Sender<BookingEvent>,
    pub submission_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        catalog: InMemoryCatalog,
        backend: Arc<dyn BookingBackend>,
        submission_timeout: Option<Duration>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);

        Self {
            vehicles: catalog.clone(),
            stops: catalog.clone(),
            routes: catalog.clone(),
            arrivals: catalog,
            backend,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ledger: Arc::new(RwLock::new(BookingLedger::with_reference_history())),
            events_tx,
            submission_timeout,
        }
    }

    /// Listener that books a session's confirmed submissions into the
    /// ledger and announces the outcome.
    pub fn session_outcomes(&self, session_id: Uuid) -> SessionOutcomes {
        SessionOutcomes {
            session_id,
            ledger: self.ledger.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

/// Runs on the submission task, so a confirmed booking reaches the history
/// and the event stream even if the client has gone away.
pub struct SessionOutcomes {
    session_id: Uuid,
    ledger: Arc<RwLock<BookingLedger>>,
    events_tx: broadcast::Sender<BookingEvent>,
}

impl SessionOutcomes {
    /// Broadcast to live subscribers. Having none is fine.
    fn publish(&self, event: BookingEvent) {
        tracing::debug!(event = event.name(), session_id = %event.session_id(), "Publishing booking event");
        let _ = self.events_tx.send(event);
    }
}

#[async_trait]
impl SubmissionListener for SessionOutcomes {
    async fn confirmed(&self, booking: &CompletedBooking) {
        self.ledger.write().await.record(booking);
        self.publish(BookingEvent::Confirmed(BookingConfirmedEvent {
            session_id: self.session_id,
            confirmation_id: booking.confirmation_id.clone(),
            vehicle_id: booking.booking.vehicle_id.clone().unwrap_or_default(),
            fare_amount: booking.booking.fare_amount,
            timestamp: booking.created_at,
        }));
    }

    async fn failed(&self, error: &FlowError) {
        if !error.is_retryable() {
            return;
        }
        self.publish(BookingEvent::Failed(BookingFailedEvent {
            session_id: self.session_id,
            reason: error.to_string(),
            retryable: true,
            timestamp: Utc::now(),
        }));
    }
}
