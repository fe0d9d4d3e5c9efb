//! HTTP helpers for the Lambda handler binaries.

use lambda_http::{Body, Response};
use serde::Serialize;

use crate::{Error, Result};

/// Error payload returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> Result<Response<Body>> {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))
        .map_err(|e| Error::Internal(format!("failed to build response: {}", e)))
}

/// Convert a service error into its HTTP response.
///
/// Infallible so handlers can use it as the final error sink; a response
/// that cannot be built degrades to an empty body with the same status.
pub fn error_response(err: &Error) -> Response<Body> {
    let body = serde_json::to_string(&ErrorBody {
        error: err.to_string(),
    })
    .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string());

    Response::builder()
        .status(err.status_code())
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::Empty))
}
