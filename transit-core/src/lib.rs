pub mod draft;
pub mod confirmation;
pub mod backend;
pub mod search;

pub use draft::{BookingDraft, ContactField, SelectionField, ValidationError};
pub use confirmation::ConfirmationIssuer;
pub use backend::{BookingBackend, BookingReceipt, SimulatedBackend};
pub use search::{search_trips, TripOption};

use transit_catalog::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),
    #[error("Booking service unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Booking rejected: {0}")]
    Rejected(String),
    #[error("Stop not found: {0}")]
    UnknownStop(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl CoreError {
    /// Whether the same request may succeed if sent again unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::BackendUnavailable(_) | CoreError::Catalog(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
