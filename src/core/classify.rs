//! Maps non-success responses onto the typed error taxonomy.

use crate::core::ExactError;
use reqwest::StatusCode;
use serde::Deserialize;

/// Error body envelope: `{"error":{"message":{"value":"..."}}}`.
///
/// Every level is optional so partial or unrelated JSON degrades to "no
/// message" instead of failing the classification path.
#[derive(Deserialize)]
pub(crate) struct ServerMessage {
    pub(crate) error: Option<ServerError>,
}

#[derive(Deserialize)]
pub(crate) struct ServerError {
    pub(crate) message: Option<ServerErrorMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ServerErrorMessage {
    pub(crate) value: Option<String>,
}

/// Extract the server-provided message, if the body carries one.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let parsed: ServerMessage = serde_json::from_str(body).ok()?;
    parsed.error?.message?.value
}

/// Classify an error status once the retry loop is done with it.
///
/// 401/403 arrive here only after the refresh policy is exhausted or absent.
/// Statuses outside the mapped set fall through to [`ExactError::Status`],
/// which keeps the raw status and URL.
pub(crate) fn classify_status(status: u16, body: &str, url: &str) -> ExactError {
    let message = server_message(body).unwrap_or_else(|| fallback_message(status, url));
    match status {
        400 | 405 => ExactError::BadRequest { message },
        401 => ExactError::Unauthorized { message },
        403 => ExactError::Forbidden { message },
        404 => ExactError::NotFound { message },
        500 => ExactError::InternalServerError { message },
        429 => ExactError::TooManyRequests { message },
        _ => ExactError::Status {
            status,
            url: url.to_string(),
        },
    }
}

fn fallback_message(status: u16, url: &str) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{status} {reason} at {url}"),
        None => format!("{status} at {url}"),
    }
}
