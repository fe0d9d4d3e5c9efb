//! Assignments Lambda - CRUD endpoints over assignment records.
//!
//! Endpoints:
//! - GET /api/assignments - newest 20 non-hidden assignments
//! - GET /api/assignments/all - all non-hidden assignments, newest-first
//! - GET /api/assignments/hidden - all hidden assignments, newest-first
//! - GET /api/assignments/scheduled/{bool} - up to 20 by scheduled flag
//! - GET /api/assignments/{id} - single assignment
//! - POST /api/assignments - create one (object or one-element array)
//! - POST /api/assignments/batch - create many
//! - POST /api/assignments/{id}/hide/{bool} - set hidden flag
//! - POST /api/assignments/{id}/schedule/{bool} - set scheduled flag

use lambda_http::{run, service_fn, Body, Request, Response};
use shared::http::{error_response, json_response};
use shared::{
    db, AssignmentFilter, AssignmentStore, Config, CreateAssignment, Error, NewAssignment, PgStore,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Fixed page size for the windowed listing endpoints.
const PAGE_LIMIT: i64 = 20;

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
    let path = path.trim_matches('/');
    let segments: Vec<&str> = path.split('/').collect();
    let method = event.method().as_str();
    let store = &state.store;

    match (method, segments.as_slice()) {
        // Newest 20 non-hidden assignments
        ("GET", ["assignments"]) => {
            let assignments = store
                .list(AssignmentFilter {
                    hidden: Some(false),
                    limit: Some(PAGE_LIMIT),
                    ..Default::default()
                })
                .await?;
            json_response(200, &assignments)
        }

        // All non-hidden assignments, newest-first
        ("GET", ["assignments", "all"]) => {
            let assignments = store
                .list(AssignmentFilter {
                    hidden: Some(false),
                    ..Default::default()
                })
                .await?;
            json_response(200, &assignments)
        }

        // All hidden assignments, newest-first
        ("GET", ["assignments", "hidden"]) => {
            let assignments = store
                .list(AssignmentFilter {
                    hidden: Some(true),
                    ..Default::default()
                })
                .await?;
            json_response(200, &assignments)
        }

        // Up to 20 assignments matching the scheduled flag
        ("GET", ["assignments", "scheduled", flag]) => {
            let scheduled = parse_flag(flag, "scheduled")?;
            let assignments = store
                .list(AssignmentFilter {
                    scheduled: Some(scheduled),
                    limit: Some(PAGE_LIMIT),
                    ..Default::default()
                })
                .await?;
            json_response(200, &assignments)
        }

        // Single assignment by id
        ("GET", ["assignments", id]) => {
            let id = parse_id(id)?;
            let assignment = store
                .find(id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("no assignment with id {}", id)))?;
            json_response(200, &assignment)
        }

        // Create one assignment; accepts a bare object or a one-element array
        ("POST", ["assignments"]) => {
            let create: CreateAssignment = serde_json::from_slice(event.body().as_ref())
                .map_err(|_| {
                    Error::Validation("did not receive a valid assignment".to_string())
                })?;
            let new = create.into_new().ok_or_else(|| {
                Error::Validation("did not receive a valid assignment".to_string())
            })?;

            let created = store.insert(new).await?;
            info!(id = %created.id, "created assignment");
            json_response(200, &created)
        }

        // Create many assignments
        ("POST", ["assignments", "batch"]) => {
            let batch: Vec<NewAssignment> = serde_json::from_slice(event.body().as_ref())
                .map_err(|_| {
                    Error::Validation("did not receive a valid assignment batch".to_string())
                })?;

            let created = store.insert_batch(batch).await?;
            info!(count = created.len(), "created assignment batch");
            json_response(200, &created)
        }

        // Set the hidden flag (soft delete / restore)
        ("POST", ["assignments", id, "hide", flag]) => {
            let id = parse_id(id)?;
            let hidden = parse_flag(flag, "hidden")?;
            let updated = store
                .set_hidden(id, hidden)
                .await?
                .ok_or_else(|| Error::NotFound(format!("no assignment with id {}", id)))?;
            json_response(200, &updated)
        }

        // Set the scheduled flag
        ("POST", ["assignments", id, "schedule", flag]) => {
            let id = parse_id(id)?;
            let scheduled = parse_flag(flag, "scheduled")?;
            let updated = store
                .set_scheduled(id, scheduled)
                .await?
                .ok_or_else(|| Error::NotFound(format!("no assignment with id {}", id)))?;
            json_response(200, &updated)
        }

        _ => Err(Error::NotFound(format!("no route for {} {}", method, raw_path))),
    }
}

/// Parse a path id segment as a UUID.
fn parse_id(raw: &str) -> shared::Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| Error::Validation("no valid 'id' parameter sent with request".to_string()))
}

/// Parse a path flag segment as a boolean.
fn parse_flag(raw: &str, name: &str) -> shared::Result<bool> {
    raw.parse().map_err(|_| {
        Error::Validation(format!("no valid '{}' parameter sent with request", name))
    })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_segments_must_be_uuids() {
        assert!(parse_id("DD3DDC12-7827-44F8-9D0E-F6B7A17D0305").is_ok());
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn flag_segments_must_be_booleans() {
        assert!(parse_flag("true", "hidden").unwrap());
        assert!(!parse_flag("false", "hidden").unwrap());
        assert_eq!(parse_flag("yes", "hidden").unwrap_err().status_code(), 400);
        assert_eq!(parse_flag("1", "hidden").unwrap_err().status_code(), 400);
    }
}
