use serde::{Deserialize, Serialize};
use std::fmt;
use transit_catalog::{Stop, VehicleOffering};
use transit_shared::Masked;

pub const CURRENCY: &str = "INR";

/// Selection fields that must be filled before passenger details.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionField {
    Vehicle,
    SourceStop,
    DestinationStop,
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionField::Vehicle => "vehicle",
            SelectionField::SourceStop => "source stop",
            SelectionField::DestinationStop => "destination stop",
        };
        f.write_str(name)
    }
}

/// Passenger contact fields that must be filled before submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    PassengerName,
    Phone,
    Email,
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContactField::PassengerName => "passenger name",
            ContactField::Phone => "phone",
            ContactField::Email => "email",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Incomplete selection, missing: {}", join(.0))]
    MissingSelection(Vec<SelectionField>),

    #[error("Source and destination cannot be the same stop")]
    SameStop,

    #[error("Incomplete passenger details, missing: {}", join(.0))]
    MissingContact(Vec<ContactField>),
}

fn join<T: fmt::Display>(fields: &[T]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The in-progress booking a wizard fills in step by step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub vehicle_id: Option<String>,
    pub route_label: Option<String>,
    pub source_stop: Option<Stop>,
    pub destination_stop: Option<Stop>,
    pub fare_amount: u32,
    pub passenger_name: Masked<String>,
    pub phone: Masked<String>,
    pub email: Masked<String>,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the vehicle, its route label and its fare into the draft.
    pub fn apply_vehicle(&mut self, vehicle: &VehicleOffering) {
        self.vehicle_id = Some(vehicle.vehicle_id.clone());
        self.route_label = Some(vehicle.route_label.clone());
        self.fare_amount = vehicle.fare_amount;
    }

    pub fn missing_selection(&self) -> Vec<SelectionField> {
        let mut missing = Vec::new();
        if self.vehicle_id.as_deref().map_or(true, |v| v.trim().is_empty()) {
            missing.push(SelectionField::Vehicle);
        }
        if self.source_stop.is_none() {
            missing.push(SelectionField::SourceStop);
        }
        if self.destination_stop.is_none() {
            missing.push(SelectionField::DestinationStop);
        }
        missing
    }

    pub fn missing_contact(&self) -> Vec<ContactField> {
        let mut missing = Vec::new();
        if self.passenger_name.is_blank() {
            missing.push(ContactField::PassengerName);
        }
        if self.phone.is_blank() {
            missing.push(ContactField::Phone);
        }
        if self.email.is_blank() {
            missing.push(ContactField::Email);
        }
        missing
    }

    /// Gate for leaving the selection step. Missing fields are reported
    /// before a same-stop journey.
    pub fn validate_selection(&self) -> Result<(), ValidationError> {
        let missing = self.missing_selection();
        if !missing.is_empty() {
            return Err(ValidationError::MissingSelection(missing));
        }

        if self.source_stop == self.destination_stop {
            return Err(ValidationError::SameStop);
        }

        Ok(())
    }

    pub fn validate_contact(&self) -> Result<(), ValidationError> {
        let missing = self.missing_contact();
        if !missing.is_empty() {
            return Err(ValidationError::MissingContact(missing));
        }
        Ok(())
    }

    /// Both gates, in wizard order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_selection()?;
        self.validate_contact()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected() -> BookingDraft {
        let mut draft = BookingDraft::new();
        draft.apply_vehicle(&VehicleOffering::new("MH-12-AB-1234", "Route 1A - Pune Station to Katraj", 15));
        draft.source_stop = Some(Stop::new("pune-station", "Pune Station"));
        draft.destination_stop = Some(Stop::new("katraj", "Katraj"));
        draft
    }

    #[test]
    fn test_empty_draft_misses_everything() {
        let draft = BookingDraft::new();
        assert_eq!(
            draft.validate_selection(),
            Err(ValidationError::MissingSelection(vec![
                SelectionField::Vehicle,
                SelectionField::SourceStop,
                SelectionField::DestinationStop,
            ]))
        );
        assert_eq!(draft.missing_contact().len(), 3);
    }

    #[test]
    fn test_apply_vehicle_copies_fare_and_label() {
        let draft = selected();
        assert_eq!(draft.vehicle_id.as_deref(), Some("MH-12-AB-1234"));
        assert_eq!(draft.route_label.as_deref(), Some("Route 1A - Pune Station to Katraj"));
        assert_eq!(draft.fare_amount, 15);
    }

    #[test]
    fn test_same_stop_rejected() {
        let mut draft = selected();
        draft.source_stop = Some(Stop::new("camp", "Camp"));
        draft.destination_stop = Some(Stop::new("camp", "Camp"));
        assert_eq!(draft.validate_selection(), Err(ValidationError::SameStop));
    }

    #[test]
    fn test_missing_selection_reported_before_same_stop() {
        let mut draft = BookingDraft::new();
        draft.source_stop = Some(Stop::new("camp", "Camp"));
        draft.destination_stop = Some(Stop::new("camp", "Camp"));
        assert_eq!(
            draft.validate_selection(),
            Err(ValidationError::MissingSelection(vec![SelectionField::Vehicle]))
        );
    }

    #[test]
    fn test_blank_contact_fields_count_as_missing() {
        let mut draft = selected();
        draft.passenger_name = Masked::from("Jane");
        draft.phone = Masked::from("   ");
        assert_eq!(
            draft.validate_contact(),
            Err(ValidationError::MissingContact(vec![ContactField::Phone, ContactField::Email]))
        );

        draft.phone = Masked::from("9999999999");
        draft.email = Masked::from("jane@x.com");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::MissingContact(vec![ContactField::Phone, ContactField::Email]);
        assert_eq!(err.to_string(), "Incomplete passenger details, missing: phone, email");
    }
}
