//! Public client surface + builder.
//! Internals are split into `connector` (request execution), `throttle`
//! (proactive rate-limit delays) and `constants` (UA + defaults).

mod connector;
mod constants;
mod throttle;

use crate::core::ExactError;
use crate::core::ratelimit::RateLimitSnapshot;
use crate::core::services::{AccessTokenProvider, RefreshTokenPolicy, ThrottleObserver};
use constants::{DEFAULT_BASE_URL, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Handle to the Exact Online API.
///
/// Cheap to clone; clones share the HTTP connection pool and the rate-limit
/// snapshot. Request execution lives in the `connector` module, see
/// [`get`](ExactClient::get) and friends.
#[derive(Clone)]
pub struct ExactClient {
    http: Client,
    base_url: Url,
    token_provider: Arc<dyn AccessTokenProvider>,
    refresh_policy: Option<Arc<dyn RefreshTokenPolicy>>,
    throttle_observer: Option<Arc<dyn ThrottleObserver>>,
    limits: Arc<RwLock<RateLimitSnapshot>>,
}

impl ExactClient {
    /// Create a new builder.
    pub fn builder() -> ExactClientBuilder {
        ExactClientBuilder::default()
    }

    /// The versioned API base this client talks to, e.g.
    /// `https://start.exactonline.nl/api/v1/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The last rate-limit snapshot reported by the server.
    ///
    /// Empty (all fields unset) until the first exchange completes.
    pub async fn rate_limits(&self) -> RateLimitSnapshot {
        *self.limits.read().await
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn token_provider(&self) -> &Arc<dyn AccessTokenProvider> {
        &self.token_provider
    }

    pub(crate) fn refresh_policy(&self) -> Option<&Arc<dyn RefreshTokenPolicy>> {
        self.refresh_policy.as_ref()
    }

    pub(crate) fn throttle_observer(&self) -> Option<&Arc<dyn ThrottleObserver>> {
        self.throttle_observer.as_ref()
    }

    /// Replace the shared snapshot wholesale. Last write wins across
    /// concurrent calls; readers never see a partially updated snapshot.
    pub(crate) async fn store_rate_limits(&self, snapshot: RateLimitSnapshot) {
        *self.limits.write().await = snapshot;
    }
}

/* ----------------------- Builder ----------------------- */

/// Builder for [`ExactClient`].
#[derive(Default)]
pub struct ExactClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    token_provider: Option<Arc<dyn AccessTokenProvider>>,
    refresh_policy: Option<Arc<dyn RefreshTokenPolicy>>,
    throttle_observer: Option<Arc<dyn ThrottleObserver>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl ExactClientBuilder {
    /// Override the API base URL (e.g. the country-specific host,
    /// `https://start.exactonline.be/api/v1/`). A trailing slash is added
    /// when missing so endpoint joins behave.
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set the access token provider, consulted on every request attempt.
    /// Required.
    pub fn access_token_provider(mut self, provider: impl AccessTokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Set the refresh policy invoked on 401/403 responses.
    ///
    /// Without a policy, auth failures classify immediately. With one, the
    /// request is retried for as long as the policy returns `true`; there is
    /// no built-in attempt cap, see [`RefreshTokenPolicy`].
    pub fn refresh_token_policy(mut self, policy: impl RefreshTokenPolicy + 'static) -> Self {
        self.refresh_policy = Some(Arc::new(policy));
        self
    }

    /// Set the observer notified before the client waits out an exhausted
    /// minutely rate-limit window.
    pub fn throttle_observer(mut self, observer: impl ThrottleObserver + 'static) -> Self {
        self.throttle_observer = Some(Arc::new(observer));
        self
    }

    /// Set a global request timeout (overall). Default: none.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Build the client. Fails without an access token provider.
    pub fn build(self) -> Result<ExactClient, ExactError> {
        let token_provider = self.token_provider.ok_or_else(|| {
            ExactError::Validation("an access token provider is required".into())
        })?;

        let mut base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut httpb = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        Ok(ExactClient {
            http,
            base_url,
            token_provider,
            refresh_policy: self.refresh_policy,
            throttle_observer: self.throttle_observer,
            limits: Arc::new(RwLock::new(RateLimitSnapshot::default())),
        })
    }
}
