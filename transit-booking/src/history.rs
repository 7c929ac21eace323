use chrono::{DateTime, NaiveDate, Utc};
use transit_shared::Masked;

use crate::models::{BookingRecord, BookingStatus, CompletedBooking, HistorySummary};

/// In-memory booking history, newest entries appended last.
#[derive(Debug, Clone)]
pub struct BookingLedger {
    records: Vec<BookingRecord>,
}

impl BookingLedger {
    /// The demo customer's past bookings.
    pub fn with_reference_history() -> Self {
        let records = REFERENCE_HISTORY
            .iter()
            .filter_map(|row| {
                let record = reference(row);
                if record.is_none() {
                    tracing::warn!(booking_id = row.0, "Skipping reference booking with a malformed date");
                }
                record
            })
            .collect();
        Self { records }
    }

    pub fn record(&mut self, completed: &CompletedBooking) -> &BookingRecord {
        self.records.push(BookingRecord::from_completed(completed));
        tracing::info!(booking_id = %completed.confirmation_id, "Booking added to history");
        &self.records[self.records.len() - 1]
    }

    pub fn get(&self, booking_id: &str) -> Option<&BookingRecord> {
        self.records.iter().find(|r| r.booking_id == booking_id)
    }

    pub fn search(&self, term: &str) -> Vec<BookingRecord> {
        self.records
            .iter()
            .filter(|r| r.matches(term))
            .cloned()
            .collect()
    }

    /// Totals over the whole history, independent of any search term.
    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary {
            total: self.records.len(),
            ..Default::default()
        };

        for record in &self.records {
            match record.status {
                BookingStatus::Completed => summary.completed += 1,
                BookingStatus::Confirmed => summary.upcoming += 1,
                BookingStatus::Cancelled => summary.cancelled += 1,
            }
            if record.status != BookingStatus::Cancelled {
                summary.total_spent += record.fare;
            }
        }

        summary
    }
}

/// booking id, vehicle, source, destination, fare, booked at, journey date, status
type ReferenceRow = (&'static str, &'static str, &'static str, &'static str, u32, &'static str, &'static str, BookingStatus);

const REFERENCE_HISTORY: [ReferenceRow; 4] = [
    ("BK123456", "MH-12-AB-1234", "Pune Station", "Katraj", 15,
        "2024-01-15T10:30:00Z", "2024-01-15", BookingStatus::Completed),
    ("BK123457", "MH-12-CD-5678", "Camp", "Hadapsar", 18,
        "2024-01-14T14:20:00Z", "2024-01-14", BookingStatus::Completed),
    ("BK123458", "MH-12-EF-9012", "Shivajinagar", "FC Road", 12,
        "2024-01-16T09:15:00Z", "2024-01-17", BookingStatus::Confirmed),
    ("BK123459", "MH-12-GH-3456", "Deccan Gymkhana", "Warje", 10,
        "2024-01-10T16:45:00Z", "2024-01-10", BookingStatus::Cancelled),
];

fn reference(row: &ReferenceRow) -> Option<BookingRecord> {
    let (booking_id, vehicle_id, source, destination, fare, booked_at, journey, status) = *row;
    let booking_time = DateTime::parse_from_rfc3339(booked_at).ok()?.with_timezone(&Utc);
    let journey_date = NaiveDate::parse_from_str(journey, "%Y-%m-%d").ok()?;

    Some(BookingRecord {
        booking_id: booking_id.to_string(),
        vehicle_id: vehicle_id.to_string(),
        source: source.to_string(),
        destination: destination.to_string(),
        fare,
        booking_time,
        journey_date,
        status,
        passenger_name: Masked::from("John Doe"),
    })
}
