use async_trait::async_trait;
use crate::models::{Route, Stop, VehicleOffering};
use crate::provider::{ArrivalEstimates, CatalogError, RouteCatalog, StopCatalog, VehicleCatalog};

/// Catalog backed by fixed in-memory data.
///
/// `InMemoryCatalog::pune()` carries the PMPML reference network. Arrival
/// estimates are fixed per vehicle; there is no live position feed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    vehicles: Vec<VehicleOffering>,
    stops: Vec<Stop>,
    routes: Vec<Route>,
    arrivals: Vec<(String, u32)>,
}

impl InMemoryCatalog {
    pub fn pune() -> Self {
        let vehicles = vec![
            VehicleOffering::new("MH-12-AB-1234", "Route 1A - Pune Station to Katraj", 15),
            VehicleOffering::new("MH-12-CD-5678", "Route 2B - Camp to Hadapsar", 18),
            VehicleOffering::new("MH-12-EF-9012", "Route 3C - FC Road Circular", 20),
        ];

        let stops = [
            ("pune-station", "Pune Station"),
            ("shivajinagar", "Shivajinagar"),
            ("camp", "Camp"),
            ("deccan-gymkhana", "Deccan Gymkhana"),
            ("jm-road", "JM Road"),
            ("fc-road", "FC Road"),
            ("karve-road", "Karve Road"),
            ("warje", "Warje"),
            ("katraj", "Katraj"),
            ("hadapsar", "Hadapsar"),
        ]
        .iter()
        .map(|(id, name)| Stop::new(id, name))
        .collect();

        let routes = vec![
            route("1", "Route 1A - Pune Station to Katraj", &[
                ("pune-station", "Pune Station"),
                ("shivajinagar", "Shivajinagar"),
                ("jm-road", "JM Road"),
                ("deccan-gymkhana", "Deccan Gymkhana"),
                ("karve-road", "Karve Road"),
                ("warje", "Warje"),
                ("katraj", "Katraj"),
            ]),
            route("2", "Route 2B - Camp to Hadapsar", &[
                ("camp", "Camp"),
                ("koregaon-park", "Koregaon Park"),
                ("viman-nagar", "Viman Nagar"),
                ("hadapsar", "Hadapsar"),
            ]),
            route("3", "Route 3C - FC Road Circular", &[
                ("fc-road", "FC Road"),
                ("prabhat-road", "Prabhat Road"),
                ("erandwane", "Erandwane"),
                ("pashan", "Pashan"),
                ("baner", "Baner"),
                ("fc-road", "FC Road"),
            ]),
        ];

        let arrivals = [("MH-12-AB-1234", 5), ("MH-12-CD-5678", 12), ("MH-12-EF-9012", 18)]
            .iter()
            .map(|(vehicle_id, minutes)| (vehicle_id.to_string(), *minutes))
            .collect();

        Self { vehicles, stops, routes, arrivals }
    }
}

fn route(route_id: &str, route_name: &str, stops: &[(&str, &str)]) -> Route {
    Route {
        route_id: route_id.to_string(),
        route_name: route_name.to_string(),
        stops: stops.iter().map(|(id, name)| Stop::new(id, name)).collect(),
    }
}

#[async_trait]
impl VehicleCatalog for InMemoryCatalog {
    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, CatalogError> {
        Ok(self.vehicles.clone())
    }
}

#[async_trait]
impl StopCatalog for InMemoryCatalog {
    async fn list_stops(&self) -> Result<Vec<Stop>, CatalogError> {
        Ok(self.stops.clone())
    }
}

#[async_trait]
impl RouteCatalog for InMemoryCatalog {
    async fn list_routes(&self) -> Result<Vec<Route>, CatalogError> {
        Ok(self.routes.clone())
    }
}

#[async_trait]
impl ArrivalEstimates for InMemoryCatalog {
    async fn eta_minutes(&self, vehicle_id: &str, stop_id: &str) -> Result<Option<u32>, CatalogError> {
        if !self.stops.iter().any(|s| s.id == stop_id) {
            return Ok(None);
        }
        Ok(self
            .arrivals
            .iter()
            .find(|(id, _)| id == vehicle_id)
            .map(|(_, minutes)| *minutes))
    }
}
