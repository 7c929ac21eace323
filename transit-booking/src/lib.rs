pub mod models;
pub mod wizard;
pub mod flow;
pub mod history;

pub use models::{BookingRecord, BookingStatus, BookingStep, CompletedBooking, HistorySummary, PassengerDetails};
pub use wizard::{BookingWizard, FlowError, SubmissionError};
pub use flow::{BookingFlow, SubmissionListener};
pub use history::BookingLedger;
