use std::io;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tokio::task::JoinError;

use crate::response::{json_response, ErrorBody};

/// A vmq-admin invocation that produced no exit status to report.
///
/// A child that ran and exited non-zero is not a `RunError`; see
/// [`CommandResult::ok`](crate::executor::CommandResult::ok).
#[derive(Debug, Error)]
pub enum RunError {
    /// The executable could not be started (missing, not executable, ...)
    #[error("failed to start `{command}`: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("`{command}` did not exit within {}ms", .timeout.as_millis())]
    TimedOut { command: String, timeout: Duration },

    /// The child started but its output could not be collected
    #[error("failed to collect output of `{command}`: {source}")]
    Wait { command: String, source: io::Error },

    /// The task driving the child panicked or was cancelled by runtime shutdown
    #[error("invocation of `{command}` was aborted: {source}")]
    Aborted { command: String, source: JoinError },
}

impl RunError {
    /// Machine-readable code placed in the `error` field of the response body
    pub fn code(&self) -> &'static str {
        match self {
            RunError::Spawn { .. } => "spawn_failed",
            RunError::TimedOut { .. } => "timeout",
            RunError::Wait { .. } => "wait_failed",
            RunError::Aborted { .. } => "aborted",
        }
    }

    pub fn command(&self) -> &str {
        match self {
            RunError::Spawn { command, .. }
            | RunError::TimedOut { command, .. }
            | RunError::Wait { command, .. }
            | RunError::Aborted { command, .. } => command,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RunError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RunError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            command: Some(self.command()),
            detail: Some(self.to_string()),
        };
        json_response(self.status(), &body)
    }
}
