use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use transit_catalog::{Route, Stop, VehicleOffering};
use transit_core::{search_trips, TripOption};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct TripQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route_id: String,
    pub route_name: String,
    pub stop_count: usize,
    pub estimated_minutes: u32,
    pub stops: Vec<Stop>,
}

impl From<Route> for RouteSummary {
    fn from(route: Route) -> Self {
        Self {
            stop_count: route.stop_count(),
            estimated_minutes: route.estimated_minutes(),
            route_id: route.route_id,
            route_name: route.route_name,
            stops: route.stops,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/vehicles", get(list_vehicles))
        .route("/v1/stops", get(list_stops))
        .route("/v1/routes", get(search_routes))
        .route("/v1/search", get(search_buses))
}

/// GET /v1/vehicles
async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<VehicleOffering>>, AppError> {
    Ok(Json(state.vehicles.list_vehicles().await?))
}

/// GET /v1/stops
async fn list_stops(State(state): State<AppState>) -> Result<Json<Vec<Stop>>, AppError> {
    Ok(Json(state.stops.list_stops().await?))
}

/// GET /v1/routes?q=term
/// Matches route names and stop names; no term lists every route
async fn search_routes(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<RouteSummary>>, AppError> {
    let routes = state.routes.search_routes(&query.q).await?;
    tracing::debug!(term = %query.q, matches = routes.len(), "Route search");
    Ok(Json(routes.into_iter().map(RouteSummary::from).collect()))
}

/// GET /v1/search?from=stop&to=stop
/// Buses between two stops, soonest first
async fn search_buses(
    State(state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<Vec<TripOption>>, AppError> {
    let trips = search_trips(
        state.vehicles.as_ref(),
        state.stops.as_ref(),
        state.arrivals.as_ref(),
        &query.from,
        &query.to,
    )
    .await?;
    Ok(Json(trips))
}
