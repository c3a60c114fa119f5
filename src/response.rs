//! JSON response envelopes and the single helper that frames them.

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::executor::CommandResult;

const APPLICATION_JSON: &str = "application/json";

/// Body of `/health`
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

impl Health {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Body of `/status`: cluster and listener views side by side
#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// True if either query succeeded
    pub ok: bool,
    pub cluster: CommandResult,
    pub listeners: CommandResult,
}

impl StatusReport {
    pub fn new(cluster: CommandResult, listeners: CommandResult) -> Self {
        Self {
            ok: cluster.ok || listeners.ok,
            cluster,
            listeners,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl<'a> ErrorBody<'a> {
    /// An error carrying only its code, e.g. `{"error":"not_found"}`
    pub fn code(error: &'a str) -> Self {
        Self {
            error,
            command: None,
            detail: None,
        }
    }
}

/// Serialize `payload` and frame it with explicit `Content-Type` and
/// `Content-Length` headers.
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_vec(payload) {
        Ok(body) => framed(status, body),
        Err(e) => {
            error!(error = %e, "failed to encode response body");
            framed(
                StatusCode::INTERNAL_SERVER_ERROR,
                br#"{"error":"encode_failed"}"#.to_vec(),
            )
        }
    }
}

fn framed(status: StatusCode, body: Vec<u8>) -> Response {
    let headers = [
        (CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON)),
        (CONTENT_LENGTH, HeaderValue::from(body.len())),
    ];
    (status, headers, Body::from(body)).into_response()
}
