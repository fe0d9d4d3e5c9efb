//! Events Lambda - reconciles external calendar events with assignments.
//!
//! Endpoints:
//! - POST /api/events - fuzzy-match the event address against stored
//!   assignments and set the winner's scheduled flag from the event status

use lambda_http::{run, service_fn, Body, Request, Response};
use shared::http::{error_response, json_response};
use shared::{db, reconcile, CalendarEvent, Config, Error, NucleoScorer, PgStore};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    store: PgStore,
}

impl AppState {
    async fn new() -> shared::Result<Self> {
        let config = Config::from_env()?;
        let pool = db::create_pool(&config).await?;
        Ok(Self {
            store: PgStore::new(pool),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, lambda_http::Error> {
    match route(&state, &event).await {
        Ok(response) => Ok(response),
        Err(err) => {
            if err.status_code() >= 500 {
                error!(error = %err, "request failed");
            }
            Ok(error_response(&err))
        }
    }
}

async fn route(state: &AppState, event: &Request) -> shared::Result<Response<Body>> {
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present (API Gateway REST API includes stage in path)
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);
    let method = event.method().as_str();

    match (method, path.trim_matches('/')) {
        ("POST", "events") => {
            // Payload validation happens before any store access.
            let calendar_event: CalendarEvent = serde_json::from_slice(event.body().as_ref())
                .map_err(|_| {
                    Error::Validation("did not receive a valid calendar event".to_string())
                })?;

            let updated = reconcile(&state.store, &NucleoScorer, &calendar_event).await?;
            json_response(200, &updated)
        }

        _ => Err(Error::NotFound(format!("no route for {} {}", method, raw_path))),
    }
}

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await.map_err(|e| e.to_string())?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
