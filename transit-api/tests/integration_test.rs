use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use transit_api::{app, AppState};
use transit_catalog::InMemoryCatalog;
use transit_core::SimulatedBackend;
use transit_shared::models::events::BookingEvent;

fn test_app(backend: Arc<SimulatedBackend>) -> Router {
    app(AppState::new(InMemoryCatalog::pune(), backend, Some(Duration::from_secs(5))))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn start_session(app: &Router) -> String {
    let (status, body) = call(app, Method::POST, "/v1/bookings/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["step"], "SELECTION");
    body["session_id"].as_str().expect("session id").to_string()
}

async fn fill_selection(app: &Router, session: &str, source: &str, destination: &str) {
    let (status, body) = call(
        app,
        Method::PUT,
        &format!("/v1/bookings/sessions/{}/vehicle", session),
        Some(json!({ "vehicle_id": "MH-12-AB-1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"]["fare_amount"], 15);

    let (status, _) = call(
        app,
        Method::PUT,
        &format!("/v1/bookings/sessions/{}/stops", session),
        Some(json!({ "source_stop_id": source, "destination_stop_id": destination })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn fill_passenger(app: &Router, session: &str) {
    let (status, body) = call(
        app,
        Method::PUT,
        &format!("/v1/bookings/sessions/{}/passenger", session),
        Some(json!({ "passenger_name": "Jane", "phone": "9999999999", "email": "jane@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"]["email"], "jane@x.com");
}

#[tokio::test]
async fn test_health() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));

    let (status, vehicles) = call(&app, Method::GET, "/v1/vehicles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vehicles.as_array().unwrap().len(), 3);

    let (_, stops) = call(&app, Method::GET, "/v1/stops", None).await;
    assert_eq!(stops.as_array().unwrap().len(), 10);

    let (_, routes) = call(&app, Method::GET, "/v1/routes?q=Baner", None).await;
    let routes = routes.as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["route_name"], "Route 3C - FC Road Circular");
    assert_eq!(routes[0]["stop_count"], 6);
    assert_eq!(routes[0]["estimated_minutes"], 18);

    let (_, all) = call(&app, Method::GET, "/v1/routes", None).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_bus_search() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));

    let (status, trips) = call(&app, Method::GET, "/v1/search?from=pune-station&to=katraj", None).await;
    assert_eq!(status, StatusCode::OK);
    let trips = trips.as_array().unwrap();
    assert_eq!(trips.len(), 3);
    assert_eq!(trips[0]["vehicle_id"], "MH-12-AB-1234");
    assert_eq!(trips[0]["fare_amount"], 15);
    assert_eq!(trips[0]["eta_minutes"], 5);
    assert_eq!(trips[2]["eta_minutes"], 18);

    let (status, body) = call(&app, Method::GET, "/v1/search?from=camp&to=camp", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("same stop"));

    let (status, _) = call(&app, Method::GET, "/v1/search?from=camp&to=lonavala", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_booking_flow() {
    let backend = Arc::new(SimulatedBackend::instant());
    let app = test_app(backend.clone());
    let session = start_session(&app).await;

    fill_selection(&app, &session, "pune-station", "katraj").await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "DETAILS");

    fill_passenger(&app, &session).await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/submit", session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["step"], "CONFIRMATION");
    assert_eq!(body["booking"]["booking"]["fare_amount"], 15);
    assert_eq!(body["booking"]["booking"]["source_stop"]["name"], "Pune Station");
    let confirmation = body["booking"]["confirmation_id"].as_str().unwrap().to_string();
    assert!(confirmation.starts_with("BK"));
    assert_eq!(body["session"]["confirmation_id"], confirmation.as_str());
    assert_eq!(backend.calls(), 1);

    // Recorded in history as an upcoming trip
    let (_, history) = call(&app, Method::GET, &format!("/v1/bookings/history?q={}", confirmation), None).await;
    assert_eq!(history["bookings"][0]["status"], "confirmed");
    assert_eq!(history["summary"]["total"], 5);
    assert_eq!(history["summary"]["upcoming"], 2);

    let (status, record) = call(&app, Method::GET, &format!("/v1/bookings/history/{}", confirmation), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["destination"], "Katraj");

    // Book another
    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/reset", session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "SELECTION");
    assert!(body["confirmation_id"].is_null());
    assert!(body["draft"]["vehicle_id"].is_null());
}

#[tokio::test]
async fn test_same_stop_rejected() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));
    let session = start_session(&app).await;
    fill_selection(&app, &session, "camp", "camp").await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Source and destination cannot be the same stop");
    assert_eq!(body["retryable"], false);

    let (_, view) = call(&app, Method::GET, &format!("/v1/bookings/sessions/{}", session), None).await;
    assert_eq!(view["step"], "SELECTION");
}

#[tokio::test]
async fn test_missing_selection_and_unknown_ids() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));
    let session = start_session(&app).await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Incomplete selection"));

    let (status, _) = call(
        &app,
        Method::PUT,
        &format!("/v1/bookings/sessions/{}/vehicle", session),
        Some(json!({ "vehicle_id": "MH-12-ZZ-9999" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::GET, "/v1/bookings/sessions/00000000-0000-0000-0000-000000000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_step_is_conflict() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));
    let session = start_session(&app).await;

    let (status, _) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/submit", session), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/back", session), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_missing_contact_never_submits() {
    let backend = Arc::new(SimulatedBackend::instant());
    let app = test_app(backend.clone());
    let session = start_session(&app).await;
    fill_selection(&app, &session, "pune-station", "katraj").await;
    call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/submit", session), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("passenger name"));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_back_keeps_draft() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));
    let session = start_session(&app).await;
    fill_selection(&app, &session, "pune-station", "katraj").await;
    call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    fill_passenger(&app, &session).await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/back", session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "SELECTION");
    assert_eq!(body["draft"]["passenger_name"], "Jane");
    assert_eq!(body["draft"]["destination_stop"]["id"], "katraj");
}

#[tokio::test]
async fn test_backend_failure_is_retryable() {
    let backend = Arc::new(SimulatedBackend::instant().failing(true));
    let app = test_app(backend.clone());
    let session = start_session(&app).await;
    fill_selection(&app, &session, "pune-station", "katraj").await;
    call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    fill_passenger(&app, &session).await;

    let (status, body) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/submit", session), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["retryable"], true);

    let (_, view) = call(&app, Method::GET, &format!("/v1/bookings/sessions/{}", session), None).await;
    assert_eq!(view["step"], "DETAILS");
    assert_eq!(view["submitting"], false);

    backend.set_failing(false);
    let (status, _) = call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/submit", session), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_history_search_and_summary() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));

    let (status, body) = call(&app, Method::GET, "/v1/bookings/history", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"].as_array().unwrap().len(), 4);
    assert_eq!(body["summary"]["completed"], 2);
    assert_eq!(body["summary"]["total_spent"], 45);

    let (_, filtered) = call(&app, Method::GET, "/v1/bookings/history?q=hadapsar", None).await;
    assert_eq!(filtered["bookings"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["bookings"][0]["booking_id"], "BK123457");
    // Summary still covers everything
    assert_eq!(filtered["summary"]["total"], 4);

    let (status, _) = call(&app, Method::GET, "/v1/bookings/history/BK000000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_session() {
    let app = test_app(Arc::new(SimulatedBackend::instant()));
    let session = start_session(&app).await;

    let (status, _) = call(&app, Method::DELETE, &format!("/v1/bookings/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, &format!("/v1/bookings/sessions/{}", session), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_confirmation_is_broadcast() {
    let state = AppState::new(
        InMemoryCatalog::pune(),
        Arc::new(SimulatedBackend::instant()),
        None,
    );
    let mut rx = state.events_tx.subscribe();
    let app = app(state);

    // The stream never ends; only the headers are checked
    let response = app
        .clone()
        .oneshot(Request::get("/v1/bookings/events").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let session = start_session(&app).await;
    fill_selection(&app, &session, "pune-station", "katraj").await;
    call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    fill_passenger(&app, &session).await;
    call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/submit", session), None).await;

    match rx.try_recv().expect("event") {
        BookingEvent::Confirmed(event) => {
            assert_eq!(event.session_id.to_string(), session);
            assert_eq!(event.vehicle_id, "MH-12-AB-1234");
            assert_eq!(event.fare_amount, 15);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_disconnected_submit_still_recorded() {
    let state = AppState::new(
        InMemoryCatalog::pune(),
        Arc::new(SimulatedBackend::new(Duration::from_millis(100))),
        Some(Duration::from_secs(5)),
    );
    let mut events = state.events_tx.subscribe();
    let app = app(state);
    let session = start_session(&app).await;
    fill_selection(&app, &session, "pune-station", "katraj").await;
    call(&app, Method::POST, &format!("/v1/bookings/sessions/{}/continue", session), None).await;
    fill_passenger(&app, &session).await;

    // The client gives up long before the booking service answers
    let submit_path = format!("/v1/bookings/sessions/{}/submit", session);
    let submit = call(&app, Method::POST, &submit_path, None);
    assert!(tokio::time::timeout(Duration::from_millis(10), submit).await.is_err());

    let mut view = Value::Null;
    for _ in 0..100 {
        let (_, body) = call(&app, Method::GET, &format!("/v1/bookings/sessions/{}", session), None).await;
        view = body;
        if view["submitting"] == false {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(view["submitting"], false);
    assert_eq!(view["step"], "CONFIRMATION");

    let confirmation_id = view["confirmation_id"].as_str().unwrap().to_string();
    let (status, record) = call(&app, Method::GET, &format!("/v1/bookings/history/{}", confirmation_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["status"], "confirmed");

    match events.try_recv() {
        Ok(BookingEvent::Confirmed(event)) => assert_eq!(event.confirmation_id, confirmation_id),
        other => panic!("expected a confirmation event, got {:?}", other),
    }
}
