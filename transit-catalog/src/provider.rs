use async_trait::async_trait;
use crate::models::{Route, Stop, VehicleOffering};

/// Catalog provider errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read-only source of bookable vehicles.
#[async_trait]
pub trait VehicleCatalog: Send + Sync {
    async fn list_vehicles(&self) -> Result<Vec<VehicleOffering>, CatalogError>;
}

/// Read-only, ordered source of bookable stops.
#[async_trait]
pub trait StopCatalog: Send + Sync {
    async fn list_stops(&self) -> Result<Vec<Stop>, CatalogError>;

    async fn find_stop(&self, stop_id: &str) -> Result<Option<Stop>, CatalogError> {
        Ok(self
            .list_stops()
            .await?
            .into_iter()
            .find(|s| s.id == stop_id))
    }
}

/// Read-only source of routes for the route browser.
#[async_trait]
pub trait RouteCatalog: Send + Sync {
    async fn list_routes(&self) -> Result<Vec<Route>, CatalogError>;

    async fn search_routes(&self, term: &str) -> Result<Vec<Route>, CatalogError> {
        Ok(self
            .list_routes()
            .await?
            .into_iter()
            .filter(|route| route.matches(term))
            .collect())
    }
}

/// Expected arrival of a vehicle at a stop.
#[async_trait]
pub trait ArrivalEstimates: Send + Sync {
    /// Minutes until `vehicle_id` reaches `stop_id`, or `None` when no
    /// estimate is available.
    async fn eta_minutes(&self, vehicle_id: &str, stop_id: &str) -> Result<Option<u32>, CatalogError>;
}
