use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
///
/// Non-success HTTP statuses are classified into the dedicated variants once
/// the auth-retry loop is done with them; statuses outside the classified set
/// surface as [`ExactError::Status`]. Failures that never produce a response
/// (connectivity, TLS) surface as [`ExactError::Http`].
#[derive(Debug, Error)]
pub enum ExactError {
    /// An error occurred at the transport level; no response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request was malformed (HTTP 400) or used an unsupported method (HTTP 405).
    #[error("bad request: {message}")]
    BadRequest {
        /// The server-provided message, or a fallback built from the status.
        message: String,
    },

    /// The access token was rejected and could not be refreshed (HTTP 401).
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// The server-provided message, or a fallback built from the status.
        message: String,
    },

    /// The caller lacks the rights for this resource (HTTP 403).
    #[error("forbidden: {message}")]
    Forbidden {
        /// The server-provided message, or a fallback built from the status.
        message: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {message}")]
    NotFound {
        /// The server-provided message, or a fallback built from the status.
        message: String,
    },

    /// The server failed to process the request (HTTP 500).
    #[error("internal server error: {message}")]
    InternalServerError {
        /// The server-provided message, or a fallback built from the status.
        message: String,
    },

    /// A rate-limit window is exhausted (HTTP 429).
    #[error("too many requests: {message}")]
    TooManyRequests {
        /// The server-provided message, or a fallback built from the status.
        message: String,
    },

    /// The server returned a status this crate does not classify further.
    #[error("unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The access token provider failed to produce a token.
    #[error("auth error: {0}")]
    Auth(String),

    /// A request or query was rejected locally, before reaching the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// A payload was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),
}
