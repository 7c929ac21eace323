use serde::{Deserialize, Serialize};
use transit_catalog::{ArrivalEstimates, StopCatalog, VehicleCatalog};

use crate::draft::ValidationError;
use crate::{CoreError, CoreResult};

/// A bus that can take the passenger from one stop to another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripOption {
    pub vehicle_id: String,
    pub route_label: String,
    pub fare_amount: u32,
    /// Minutes until the bus reaches the boarding stop.
    pub eta_minutes: Option<u32>,
}

/// Buses between two stops, soonest first.
///
/// Both stops must exist and must differ. Buses without an arrival
/// estimate are listed after the rest.
pub async fn search_trips(
    vehicles: &dyn VehicleCatalog,
    stops: &dyn StopCatalog,
    arrivals: &dyn ArrivalEstimates,
    from: &str,
    to: &str,
) -> CoreResult<Vec<TripOption>> {
    let origin = stops
        .find_stop(from)
        .await?
        .ok_or_else(|| CoreError::UnknownStop(from.to_string()))?;
    let destination = stops
        .find_stop(to)
        .await?
        .ok_or_else(|| CoreError::UnknownStop(to.to_string()))?;

    if origin == destination {
        return Err(ValidationError::SameStop.into());
    }

    let mut trips = Vec::new();
    for vehicle in vehicles.list_vehicles().await? {
        let eta_minutes = arrivals.eta_minutes(&vehicle.vehicle_id, &origin.id).await?;
        trips.push(TripOption {
            vehicle_id: vehicle.vehicle_id,
            route_label: vehicle.route_label,
            fare_amount: vehicle.fare_amount,
            eta_minutes,
        });
    }
    trips.sort_by_key(|trip| trip.eta_minutes.unwrap_or(u32::MAX));

    tracing::debug!(from = %origin.id, to = %destination.id, results = trips.len(), "Trip search");
    Ok(trips)
}
