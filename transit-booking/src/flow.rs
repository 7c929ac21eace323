use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use transit_catalog::{Stop, StopCatalog, VehicleCatalog, VehicleOffering};
use transit_core::{BookingBackend, BookingDraft};

use crate::models::{CompletedBooking, PassengerDetails};
use crate::wizard::{BookingWizard, FlowError, SubmissionError};

/// Hears how each submission that reached the booking service ended.
///
/// Called from the submission task, after the wizard has moved on, whether
/// or not the caller of `submit` is still waiting.
#[async_trait]
pub trait SubmissionListener: Send + Sync {
    async fn confirmed(&self, booking: &CompletedBooking);

    async fn failed(&self, error: &FlowError);
}

/// Drives one booking wizard against a booking service.
///
/// The catalogs are read once when the flow starts. At most one submission
/// is outstanding at a time; a second `submit` while the first is pending is
/// rejected without reaching the service.
pub struct BookingFlow {
    wizard: Arc<RwLock<BookingWizard>>,
    vehicles: Vec<VehicleOffering>,
    stops: Vec<Stop>,
    backend: Arc<dyn BookingBackend>,
    timeout: Option<Duration>,
    listener: Option<Arc<dyn SubmissionListener>>,
}

impl BookingFlow {
    pub async fn start(
        vehicles: &dyn VehicleCatalog,
        stops: &dyn StopCatalog,
        backend: Arc<dyn BookingBackend>,
    ) -> Result<Self, FlowError> {
        let vehicles = vehicles.list_vehicles().await?;
        let stops = stops.list_stops().await?;

        Ok(Self {
            wizard: Arc::new(RwLock::new(BookingWizard::new())),
            vehicles,
            stops,
            backend,
            timeout: None,
            listener: None,
        })
    }

    /// Give up on the booking service after `timeout`. Without one the flow
    /// waits as long as the service takes.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn SubmissionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub async fn snapshot(&self) -> BookingWizard {
        self.wizard.read().await.clone()
    }

    pub async fn select_vehicle(&self, vehicle_id: &str) -> Result<BookingWizard, FlowError> {
        let vehicle = self
            .vehicles
            .iter()
            .find(|v| v.vehicle_id == vehicle_id)
            .ok_or_else(|| FlowError::UnknownVehicle(vehicle_id.to_string()))?;

        self.apply(|w| w.select_vehicle(vehicle)).await
    }

    /// Choose either or both ends of the journey.
    pub async fn select_stops(
        &self,
        source_id: Option<&str>,
        destination_id: Option<&str>,
    ) -> Result<BookingWizard, FlowError> {
        let source = source_id.map(|id| self.find_stop(id)).transpose()?;
        let destination = destination_id.map(|id| self.find_stop(id)).transpose()?;

        self.apply(|w| {
            let mut next = w.clone();
            if let Some(stop) = source {
                next = next.select_source(stop)?;
            }
            if let Some(stop) = destination {
                next = next.select_destination(stop)?;
            }
            Ok(next)
        })
        .await
    }

    pub async fn continue_to_details(&self) -> Result<BookingWizard, FlowError> {
        let next = self.apply(|w| w.continue_to_details()).await?;
        info!(
            vehicle_id = next.draft().vehicle_id.as_deref().unwrap_or_default(),
            "Booking moved to passenger details"
        );
        Ok(next)
    }

    pub async fn update_passenger(&self, details: &PassengerDetails) -> Result<BookingWizard, FlowError> {
        self.apply(|w| w.update_passenger(details)).await
    }

    pub async fn back_to_selection(&self) -> Result<BookingWizard, FlowError> {
        self.apply(|w| w.back_to_selection()).await
    }

    pub async fn book_another(&self) -> Result<BookingWizard, FlowError> {
        let next = self.apply(|w| w.book_another()).await?;
        info!("Booking wizard reset for a new journey");
        Ok(next)
    }

    /// Details → Confirmation.
    ///
    /// The service call and its bookkeeping run on their own task, so the
    /// wizard always leaves the in-flight state even when the caller stops
    /// waiting. The lock is released while the service works, so the wizard
    /// stays readable; the in-flight flag keeps every other transition out.
    pub async fn submit(&self) -> Result<CompletedBooking, FlowError> {
        let submitted = {
            let mut wizard = self.wizard.write().await;
            match wizard.begin_submission() {
                Ok((next, draft)) => {
                    *wizard = next;
                    draft
                }
                Err(err) => {
                    if matches!(err, FlowError::Submission(SubmissionError::InFlight)) {
                        warn!("Duplicate booking submission ignored");
                    }
                    return Err(err);
                }
            }
        };

        info!(
            vehicle_id = submitted.vehicle_id.as_deref().unwrap_or_default(),
            fare = submitted.fare_amount,
            "Submitting booking"
        );

        let submission = Submission {
            wizard: self.wizard.clone(),
            backend: self.backend.clone(),
            timeout: self.timeout,
            listener: self.listener.clone(),
            draft: submitted,
        };

        match tokio::spawn(submission.run()).await {
            Ok(result) => result,
            Err(join_err) => {
                error!("Booking submission task ended abnormally: {}", join_err);
                let err = FlowError::from(SubmissionError::Interrupted);
                {
                    let mut wizard = self.wizard.write().await;
                    *wizard = wizard.fail_submission();
                }
                if let Some(listener) = &self.listener {
                    listener.failed(&err).await;
                }
                Err(err)
            }
        }
    }

    fn find_stop(&self, stop_id: &str) -> Result<Stop, FlowError> {
        self.stops
            .iter()
            .find(|s| s.id == stop_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownStop(stop_id.to_string()))
    }

    /// Run a transition against the current wizard and keep the result only
    /// if it succeeded.
    async fn apply<F>(&self, transition: F) -> Result<BookingWizard, FlowError>
    where
        F: FnOnce(&BookingWizard) -> Result<BookingWizard, FlowError>,
    {
        let mut wizard = self.wizard.write().await;
        let next = transition(&*wizard)?;
        *wizard = next.clone();
        Ok(next)
    }
}

/// One submission already marked in flight on `wizard`.
struct Submission {
    wizard: Arc<RwLock<BookingWizard>>,
    backend: Arc<dyn BookingBackend>,
    timeout: Option<Duration>,
    listener: Option<Arc<dyn SubmissionListener>>,
    draft: BookingDraft,
}

impl Submission {
    async fn run(self) -> Result<CompletedBooking, FlowError> {
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, self.backend.submit_booking(&self.draft)).await {
                Ok(result) => result.map_err(SubmissionError::from),
                Err(_) => Err(SubmissionError::TimedOut(limit)),
            },
            None => self
                .backend
                .submit_booking(&self.draft)
                .await
                .map_err(SubmissionError::from),
        };

        let result = {
            let mut wizard = self.wizard.write().await;
            match outcome {
                Ok(receipt) => match wizard.complete_submission(self.draft, receipt) {
                    Ok((next, completed)) => {
                        *wizard = next;
                        info!(confirmation_id = %completed.confirmation_id, "Booking confirmed");
                        Ok(completed)
                    }
                    Err(err) => {
                        *wizard = wizard.fail_submission();
                        Err(err)
                    }
                },
                Err(err) => {
                    *wizard = wizard.fail_submission();
                    error!(retryable = err.is_retryable(), "Booking submission failed: {}", err);
                    Err(FlowError::from(err))
                }
            }
        };

        if let Some(listener) = &self.listener {
            match &result {
                Ok(completed) => listener.confirmed(completed).await,
                Err(err) => listener.failed(err).await,
            }
        }

        result
    }
}
