pub mod models;
pub mod provider;
pub mod in_memory;

pub use models::{Route, Stop, VehicleOffering};
pub use provider::{ArrivalEstimates, CatalogError, RouteCatalog, StopCatalog, VehicleCatalog};
pub use in_memory::InMemoryCatalog;
