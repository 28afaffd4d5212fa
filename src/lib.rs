//! exactonline-rs: async client core for the Exact Online REST API.
//!
//! This crate covers the transport layer of the SDK: request execution with
//! bearer-token attachment and auth retry, rate-limit tracking with proactive
//! throttling, a typed error taxonomy, and OData query composition. Entity
//! models and CRUD controllers build on top of it in downstream crates.
//!
//! ```no_run
//! use exactonline_rs::{ExactClient, ExactError, Operator, QueryBuilder, ODataValue, Expr};
//!
//! # async fn run() -> Result<(), ExactError> {
//! let client = ExactClient::builder()
//!     .access_token_provider(|| async { Ok::<_, ExactError>("access-token".to_string()) })
//!     .build()?;
//!
//! let query = QueryBuilder::new()
//!     .filter_expr(&Expr::property("Name"), Operator::Eq, ODataValue::from("Acme"))?
//!     .select(["ID", "Name"])
//!     .top(10)
//!     .build(true)?;
//!
//! let division = client.current_division().await?;
//! let endpoint = format!("{}{division}/crm/Accounts", client.base_url());
//! let body = client.get(&endpoint, Some(&query)).await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod query;
pub mod response;

pub use crate::core::client::{ExactClient, ExactClientBuilder};
pub use crate::core::error::ExactError;
pub use crate::core::ratelimit::{RateLimit, RateLimitSnapshot};
pub use crate::core::services::{
    AccessTokenProvider, BoxFuture, LinkedFieldRegistry, RefreshTokenPolicy, ThrottleObserver,
};
pub use query::{Expr, ODataValue, Operator, QueryBuilder};
