#![allow(dead_code)]

use exactonline_rs::{
    AccessTokenProvider, BoxFuture, ExactClient, ExactClientBuilder, ExactError,
    LinkedFieldRegistry, RefreshTokenPolicy, ThrottleObserver,
};
use httpmock::MockServer;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn base_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/v1/", server.base_url())).unwrap()
}

/// A builder pointed at the mock server with a static `token-value` token.
pub fn client_builder(server: &MockServer) -> ExactClientBuilder {
    ExactClient::builder()
        .base_url(base_url(server))
        .access_token_provider(|| async { Ok::<_, ExactError>("token-value".to_string()) })
}

pub fn client(server: &MockServer) -> ExactClient {
    client_builder(server).build().unwrap()
}

/// Hands out `token-0`, `token-1`, ... so mocks can tell retry attempts apart.
pub struct RotatingTokenProvider(AtomicU32);

impl RotatingTokenProvider {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }
}

impl AccessTokenProvider for RotatingTokenProvider {
    fn access_token(&self) -> BoxFuture<'_, Result<String, ExactError>> {
        let n = self.0.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(format!("token-{n}")) })
    }
}

/// Replays a fixed sequence of refresh answers and records the attempt
/// counters it was called with. Answers `false` once the sequence runs dry.
pub struct SeqRefreshPolicy {
    answers: Mutex<VecDeque<bool>>,
    calls: Arc<Mutex<Vec<u32>>>,
}

impl SeqRefreshPolicy {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> (Self, Arc<Mutex<Vec<u32>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let policy = Self {
            answers: Mutex::new(answers.into_iter().collect()),
            calls: calls.clone(),
        };
        (policy, calls)
    }
}

impl RefreshTokenPolicy for SeqRefreshPolicy {
    fn refresh(&self, attempt: u32) -> BoxFuture<'_, bool> {
        self.calls.lock().unwrap().push(attempt);
        let answer = self.answers.lock().unwrap().pop_front().unwrap_or(false);
        Box::pin(async move { answer })
    }
}

/// Records every delay the client reports before throttling.
pub struct RecordingThrottleObserver {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingThrottleObserver {
    pub fn new() -> (Self, Arc<Mutex<Vec<Duration>>>) {
        let delays = Arc::new(Mutex::new(Vec::new()));
        let observer = Self {
            delays: delays.clone(),
        };
        (observer, delays)
    }
}

impl ThrottleObserver for RecordingThrottleObserver {
    fn on_delay(&self, delay: Duration) -> BoxFuture<'_, ()> {
        self.delays.lock().unwrap().push(delay);
        Box::pin(async {})
    }
}

/// Records the fields a query builder registers for `$expand`.
#[derive(Default)]
pub struct RecordingRegistry {
    pub fields: Mutex<Vec<String>>,
}

impl LinkedFieldRegistry for RecordingRegistry {
    fn register_linked_field(&self, field: &str) {
        self.fields.lock().unwrap().push(field.to_string());
    }
}
