use serde::{Deserialize, Serialize};

/// Minutes of travel budgeted per stop when estimating a route's duration.
pub const MINUTES_PER_STOP: u32 = 3;

/// A bookable bus and the fare charged on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleOffering {
    pub vehicle_id: String,
    pub route_label: String,
    pub fare_amount: u32,
}

impl VehicleOffering {
    pub fn new(vehicle_id: &str, route_label: &str, fare_amount: u32) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            route_label: route_label.to_string(),
            fare_amount,
        }
    }
}

/// A bus stop. Stops are identified by `id`; the name is display text.
#[derive(Debug, Clone, Serialize, Deserialize, Eq)]
pub struct Stop {
    pub id: String,
    pub name: String,
}

impl Stop {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl PartialEq for Stop {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A route and its stops in travel order.
///
/// Circular routes repeat the terminus as the last stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub route_id: String,
    pub route_name: String,
    pub stops: Vec<Stop>,
}

impl Route {
    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn estimated_minutes(&self) -> u32 {
        self.stops.len() as u32 * MINUTES_PER_STOP
    }

    pub fn origin(&self) -> Option<&Stop> {
        self.stops.first()
    }

    pub fn terminus(&self) -> Option<&Stop> {
        self.stops.last()
    }

    pub fn is_circular(&self) -> bool {
        self.stops.len() > 1 && self.origin() == self.terminus()
    }

    /// Case-insensitive match against the route name or any stop name.
    /// A blank term matches every route.
    pub fn matches(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.route_name.to_lowercase().contains(&needle)
            || self
                .stops
                .iter()
                .any(|stop| stop.name.to_lowercase().contains(&needle))
    }
}
