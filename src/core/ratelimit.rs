//! Rate-limit quota state parsed from `X-RateLimit-*` response headers.

use reqwest::header::HeaderMap;

/// Quota state for a single rate-limit window.
///
/// Every field is `None` when the corresponding header was absent from the
/// last response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Total number of calls allowed within the window.
    pub limit: Option<i64>,
    /// Calls left before the window is exhausted.
    pub remaining: Option<i64>,
    /// Epoch milliseconds at which the window resets.
    pub reset: Option<i64>,
}

/// The last known quota state, one [`RateLimit`] per server-reported window.
///
/// The client replaces its snapshot wholesale after every completed exchange,
/// success or failure. The type is `Copy`, so readers always observe a
/// complete snapshot, never a partial update. Only the latest snapshot is
/// retained; client-side throttling is a courtesy, the server stays
/// authoritative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitSnapshot {
    /// The daily window.
    pub daily: RateLimit,
    /// The minutely window.
    pub minutely: RateLimit,
}

impl RateLimitSnapshot {
    /// Parse both windows out of a response's headers.
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            daily: RateLimit {
                limit: header_i64(headers, "X-RateLimit-Limit"),
                remaining: header_i64(headers, "X-RateLimit-Remaining"),
                reset: header_i64(headers, "X-RateLimit-Reset"),
            },
            minutely: RateLimit {
                limit: header_i64(headers, "X-RateLimit-Minutely-Limit"),
                remaining: header_i64(headers, "X-RateLimit-Minutely-Remaining"),
                reset: header_i64(headers, "X-RateLimit-Minutely-Reset"),
            },
        }
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
