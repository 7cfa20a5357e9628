//! Integration tests for Checkout Kit.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p checkout-kit-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_flow` - Full checkouts over the bundled reference data
//! - `http_reference_data` - The REST reference-data client against
//!   [`MockReferenceApi`]
//!
//! The mock serves the same HAL documents as the real backend:
//! `GET /api/countries` and
//! `GET /api/states/search/findByCountryCode?code={code}`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use checkout_kit::clock::{Clock, FixedClock};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// The date every test runs on: October 2026.
///
/// # Panics
///
/// Never: the date is valid.
#[must_use]
pub fn october_2026() -> Arc<dyn Clock> {
    Arc::new(FixedClock::on(2026, 10).expect("valid date"))
}

/// A complete draft for a US checkout.
pub const US_DRAFT: &str = r#"{
    "customer": {"firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com"},
    "shippingAddress": {"street": "12 Analytical Way", "city": "Austin",
                        "country": "US", "state": "TX", "zipCode": "73301"},
    "creditCard": {"cardType": "Visa", "nameOnCard": "Ada Lovelace",
                   "cardNumber": "4111111111111111", "securityCode": "123",
                   "expirationMonth": 4, "expirationYear": 2028}
}"#;

// =============================================================================
// Mock reference API
// =============================================================================

/// Behaviour switches for [`MockReferenceApi`].
#[derive(Debug, Clone, Default)]
pub struct MockOptions {
    /// Reject requests without `Authorization: Bearer {token}`.
    pub token: Option<String>,
    /// Answer every request with 503.
    pub unavailable: bool,
    /// Hold the states response for a country code this long.
    pub state_delays: HashMap<String, Duration>,
}

#[derive(Clone)]
struct MockState {
    options: Arc<MockOptions>,
    hits: Arc<AtomicUsize>,
}

/// In-process reference-data backend on an ephemeral port.
pub struct MockReferenceApi {
    base_url: String,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockReferenceApi {
    /// Start a mock with default options.
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    /// Start a mock with the given options.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start_with(options: MockOptions) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let state = MockState {
            options: Arc::new(options),
            hits: Arc::clone(&hits),
        };

        let app = Router::new()
            .route("/api/countries", get(countries))
            .route("/api/states/search/findByCountryCode", get(states))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to read local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            hits,
            handle,
        }
    }

    /// Base URL without a trailing slash, as it would be configured.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Requests served so far, including rejected ones.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockReferenceApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Deserialize)]
struct StatesQuery {
    code: String,
}

fn check(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if state.options.unavailable {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "reference data unavailable").into_response());
    }

    if let Some(token) = &state.options.token {
        let expected = format!("Bearer {token}");
        let given = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if given != Some(expected.as_str()) {
            return Err((StatusCode::UNAUTHORIZED, "missing or wrong token").into_response());
        }
    }
    Ok(())
}

async fn countries(State(state): State<MockState>, headers: HeaderMap) -> Response {
    if let Err(rejection) = check(&state, &headers) {
        return rejection;
    }

    let rows: Vec<Value> = COUNTRIES
        .iter()
        .enumerate()
        .map(|(i, (code, name, _))| json!({"id": i + 1, "code": code, "name": name}))
        .collect();

    Json(json!({
        "_embedded": {"countries": rows},
        "_links": {"self": {"href": "/api/countries"}},
        "page": {"size": 20, "totalElements": COUNTRIES.len(), "totalPages": 1, "number": 0}
    }))
    .into_response()
}

async fn states(
    State(state): State<MockState>,
    Query(query): Query<StatesQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = check(&state, &headers) {
        return rejection;
    }

    if let Some(delay) = state.options.state_delays.get(&query.code) {
        tokio::time::sleep(*delay).await;
    }

    let rows: Vec<Value> = COUNTRIES
        .iter()
        .filter(|(code, _, _)| *code == query.code)
        .flat_map(|(_, _, states)| states.iter())
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect();

    Json(json!({
        "_embedded": {"states": rows},
        "_links": {"self": {"href": "/api/states/search/findByCountryCode"}}
    }))
    .into_response()
}

/// Countries served by the mock, with state ids and names.
///
/// State rows carry only a numeric id, as the backend stores them.
pub const COUNTRIES: &[(&str, &str, &[(u32, &str)])] = &[
    ("BR", "Brazil", &[(1, "Acre"), (2, "Alagoas"), (3, "Amapá")]),
    ("DE", "Germany", &[(40, "Baden-Württemberg"), (41, "Bayern")]),
    ("TR", "Turkey", &[(80, "Adana"), (81, "Ankara"), (82, "Antalya")]),
    ("NZ", "New Zealand", &[]),
];
