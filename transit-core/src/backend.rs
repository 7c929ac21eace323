use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::confirmation::ConfirmationIssuer;
use crate::draft::BookingDraft;
use crate::{CoreError, CoreResult};

/// Default latency of the simulated booking service.
pub const DEFAULT_SUBMISSION_DELAY: Duration = Duration::from_millis(2000);

/// What the booking service hands back for an accepted booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingReceipt {
    pub confirmation_id: String,
    pub created_at: DateTime<Utc>,
}

/// The service that accepts finished drafts.
///
/// Calls may take arbitrarily long; callers impose their own timeout.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    async fn submit_booking(&self, draft: &BookingDraft) -> CoreResult<BookingReceipt>;
}

/// Stand-in for a real booking service: waits a fixed delay, then issues a
/// confirmation identifier, or fails when told to.
pub struct SimulatedBackend {
    delay: Duration,
    fail: AtomicBool,
    calls: AtomicUsize,
    issuer: ConfirmationIssuer,
}

impl SimulatedBackend {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            issuer: ConfirmationIssuer::new(),
        }
    }

    /// No delay at all. Handy in tests.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn failing(self, fail: bool) -> Self {
        self.set_failing(fail);
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of submissions received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMISSION_DELAY)
    }
}

#[async_trait]
impl BookingBackend for SimulatedBackend {
    async fn submit_booking(&self, draft: &BookingDraft) -> CoreResult<BookingReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            vehicle_id = draft.vehicle_id.as_deref().unwrap_or_default(),
            fare = draft.fare_amount,
            "Simulated booking service received submission"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(CoreError::BackendUnavailable(
                "simulated booking service failure".to_string(),
            ));
        }

        // The service re-checks what it is given.
        if let Err(err) = draft.validate() {
            return Err(CoreError::Rejected(err.to_string()));
        }

        let created_at = Utc::now();
        Ok(BookingReceipt {
            confirmation_id: self.issuer.issue(created_at),
            created_at,
        })
    }
}
