use serde::Serialize;
use std::time::Duration;
use transit_catalog::{CatalogError, Stop, VehicleOffering};
use transit_core::{BookingDraft, BookingReceipt, CoreError, ValidationError};

use crate::models::{BookingStep, CompletedBooking, PassengerDetails};

/// The booking wizard as a value.
///
/// Every transition borrows the current wizard and returns the next one, so
/// a rejected transition leaves the caller's wizard exactly as it was.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWizard {
    step: BookingStep,
    draft: BookingDraft,
    submitting: bool,
    completed: Option<CompletedBooking>,
}

impl BookingWizard {
    pub fn new() -> Self {
        Self {
            step: BookingStep::Selection,
            draft: BookingDraft::new(),
            submitting: false,
            completed: None,
        }
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn completed(&self) -> Option<&CompletedBooking> {
        self.completed.as_ref()
    }

    pub fn confirmation_id(&self) -> Option<&str> {
        self.completed.as_ref().map(|c| c.confirmation_id.as_str())
    }

    /// Choose a bus. Copies its route label and fare into the draft.
    pub fn select_vehicle(&self, vehicle: &VehicleOffering) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Selection)?;
        let mut next = self.clone();
        next.draft.apply_vehicle(vehicle);
        Ok(next)
    }

    pub fn select_source(&self, stop: Stop) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Selection)?;
        let mut next = self.clone();
        next.draft.source_stop = Some(stop);
        Ok(next)
    }

    pub fn select_destination(&self, stop: Stop) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Selection)?;
        let mut next = self.clone();
        next.draft.destination_stop = Some(stop);
        Ok(next)
    }

    /// Transition: Selection → Details
    pub fn continue_to_details(&self) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Selection)?;
        self.draft.validate_selection()?;

        let mut next = self.clone();
        next.step = BookingStep::Details;
        Ok(next)
    }

    pub fn update_passenger(&self, details: &PassengerDetails) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Details)?;
        self.ensure_idle()?;
        let mut next = self.clone();
        details.apply_to(&mut next.draft);
        Ok(next)
    }

    /// Transition: Details → Selection. The draft is kept as entered.
    pub fn back_to_selection(&self) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Details)?;
        self.ensure_idle()?;
        let mut next = self.clone();
        next.step = BookingStep::Selection;
        Ok(next)
    }

    /// First half of Details → Confirmation: validate the passenger fields
    /// and mark the wizard in flight. Returns the draft to submit.
    pub fn begin_submission(&self) -> Result<(Self, BookingDraft), FlowError> {
        self.expect_step(BookingStep::Details)?;
        self.ensure_idle()?;
        self.draft.validate_contact()?;

        let mut next = self.clone();
        next.submitting = true;
        Ok((next, self.draft.clone()))
    }

    /// Second half of Details → Confirmation, once the service accepted
    /// `submitted`.
    pub fn complete_submission(
        &self,
        submitted: BookingDraft,
        receipt: BookingReceipt,
    ) -> Result<(Self, CompletedBooking), FlowError> {
        self.expect_step(BookingStep::Details)?;
        if !self.submitting {
            return Err(FlowError::NotSubmitting);
        }

        let completed = CompletedBooking {
            confirmation_id: receipt.confirmation_id,
            booking: submitted,
            created_at: receipt.created_at,
        };

        let mut next = self.clone();
        next.submitting = false;
        next.step = BookingStep::Confirmation;
        next.completed = Some(completed.clone());
        Ok((next, completed))
    }

    /// The service failed: stay in Details with the draft untouched so the
    /// user can resubmit.
    pub fn fail_submission(&self) -> Self {
        let mut next = self.clone();
        next.submitting = false;
        next
    }

    /// Transition: Confirmation → Selection with an empty draft.
    pub fn book_another(&self) -> Result<Self, FlowError> {
        self.expect_step(BookingStep::Confirmation)?;
        Ok(Self::new())
    }

    fn expect_step(&self, expected: BookingStep) -> Result<(), FlowError> {
        if self.step != expected {
            return Err(FlowError::WrongStep {
                expected,
                actual: self.step,
            });
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), FlowError> {
        if self.submitting {
            return Err(SubmissionError::InFlight.into());
        }
        Ok(())
    }
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("A booking submission is already in progress")]
    InFlight,

    #[error("Booking failed: {0}")]
    Backend(#[from] CoreError),

    #[error("Booking service did not answer within {0:?}")]
    TimedOut(Duration),

    #[error("Booking submission was interrupted")]
    Interrupted,
}

impl SubmissionError {
    /// Whether resubmitting the unchanged draft may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubmissionError::InFlight => false,
            SubmissionError::Backend(err) => err.is_retryable(),
            SubmissionError::TimedOut(_) | SubmissionError::Interrupted => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("Invalid step: expected {expected}, currently {actual}")]
    WrongStep {
        expected: BookingStep,
        actual: BookingStep,
    },

    #[error("No submission in progress")]
    NotSubmitting,

    #[error("Vehicle not found: {0}")]
    UnknownVehicle(String),

    #[error("Stop not found: {0}")]
    UnknownStop(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl FlowError {
    pub fn is_retryable(&self) -> bool {
        match self {
            FlowError::Submission(err) => err.is_retryable(),
            FlowError::Catalog(_) => true,
            _ => false,
        }
    }
}
