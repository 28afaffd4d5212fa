//! Centralized constants for the default endpoint and UA.

pub(crate) const USER_AGENT: &str = concat!("exactonline-rs/", env!("CARGO_PKG_VERSION"));

/// Default API base for the Dutch host; country-specific hosts are set via
/// the builder.
pub(crate) const DEFAULT_BASE_URL: &str = "https://start.exactonline.nl/api/v1/";
