//! Collaborator traits consumed by the request pipeline.
//!
//! Token acquisition, token refresh, and throttle notification are supplied
//! by the embedding application; this module only defines the seams. Each
//! async trait has a blanket impl for plain closures, so tests and simple
//! integrations can pass an `Fn` instead of a named type.

use crate::core::ExactError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed future, as returned by the collaborator traits in this module.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Supplies the bearer access token for an outgoing request.
///
/// The client calls this on every attempt and never caches the result;
/// handing out a still-valid token is the provider's responsibility.
pub trait AccessTokenProvider: Send + Sync {
    /// Produce the token to send in the `Authorization` header.
    fn access_token(&self) -> BoxFuture<'_, Result<String, ExactError>>;
}

impl<F, Fut> AccessTokenProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, ExactError>> + Send + 'static,
{
    fn access_token(&self) -> BoxFuture<'_, Result<String, ExactError>> {
        Box::pin(self())
    }
}

/// Decides whether a rejected token (HTTP 401/403) was refreshed and the
/// request should be retried.
///
/// `attempt` counts the auth failures seen so far for the current logical
/// call, starting at zero. The retry loop has no upper bound of its own: a
/// policy that keeps returning `true` keeps the call retrying forever, so an
/// implementation MUST eventually return `false`.
pub trait RefreshTokenPolicy: Send + Sync {
    /// Return `true` when the token was refreshed and the attempt should be repeated.
    fn refresh(&self, attempt: u32) -> BoxFuture<'_, bool>;
}

impl<F, Fut> RefreshTokenPolicy for F
where
    F: Fn(u32) -> Fut + Send + Sync,
    Fut: Future<Output = bool> + Send + 'static,
{
    fn refresh(&self, attempt: u32) -> BoxFuture<'_, bool> {
        Box::pin(self(attempt))
    }
}

/// Observes the throttle delay the client is about to wait out.
///
/// Invoked right before the client sleeps through an exhausted minutely
/// window, with the delay it computed from the last rate-limit snapshot.
pub trait ThrottleObserver: Send + Sync {
    /// Called with the upcoming delay.
    fn on_delay(&self, delay: Duration) -> BoxFuture<'_, ()>;
}

impl<F, Fut> ThrottleObserver for F
where
    F: Fn(Duration) -> Fut + Send + Sync,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn on_delay(&self, delay: Duration) -> BoxFuture<'_, ()> {
        Box::pin(self(delay))
    }
}

/// Records fields requested via `$expand`, so downstream materialization can
/// treat them as nested collections rather than scalar columns.
///
/// Implemented by the per-entity controller registry; [`QueryBuilder`] calls
/// it from [`expand`].
///
/// [`QueryBuilder`]: crate::query::QueryBuilder
/// [`expand`]: crate::query::QueryBuilder::expand
pub trait LinkedFieldRegistry: Send + Sync {
    /// Register `field` as a linked (nested) field on the queried entity.
    fn register_linked_field(&self, field: &str);
}
