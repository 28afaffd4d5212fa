//! Request execution: credential attachment, auth retry, and rate-limit
//! snapshot updates.

use crate::core::ExactError;
use crate::core::classify::classify_status;
use crate::core::ratelimit::RateLimitSnapshot;
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use url::Url;

const CONTENT_TYPE_JSON: &str = "application/json";

impl super::ExactClient {
    /// Perform a GET request on `endpoint`, with an optional OData query string.
    ///
    /// Returns the raw response body; envelope stripping is the caller's job
    /// (see [`crate::response`]).
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn get(&self, endpoint: &str, query: Option<&str>) -> Result<String, ExactError> {
        let url = request_url(endpoint, query)?;
        let resp = self.execute(Method::GET, &url, None, true).await?;
        Ok(resp.text().await?)
    }

    /// GET a binary payload (e.g. a document attachment). No `Accept` header
    /// is sent.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn get_file(&self, endpoint: &str) -> Result<Bytes, ExactError> {
        let url = request_url(endpoint, None)?;
        let resp = self.execute(Method::GET, &url, None, false).await?;
        Ok(resp.bytes().await?)
    }

    /// POST `body` (a JSON document) to `endpoint`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, body), err))]
    pub async fn post(&self, endpoint: &str, body: &str) -> Result<String, ExactError> {
        let url = request_url(endpoint, None)?;
        let body = request_body(body)?;
        let resp = self.execute(Method::POST, &url, Some(body), true).await?;
        Ok(resp.text().await?)
    }

    /// PUT `body` (a JSON document) to `endpoint`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, body), err))]
    pub async fn put(&self, endpoint: &str, body: &str) -> Result<String, ExactError> {
        let url = request_url(endpoint, None)?;
        let body = request_body(body)?;
        let resp = self.execute(Method::PUT, &url, Some(body), true).await?;
        Ok(resp.text().await?)
    }

    /// DELETE the entity at `endpoint`.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn delete(&self, endpoint: &str) -> Result<String, ExactError> {
        let url = request_url(endpoint, None)?;
        let resp = self.execute(Method::DELETE, &url, None, true).await?;
        Ok(resp.text().await?)
    }

    /// GET without an `Accept` header, for count-style endpoints that may not
    /// answer with JSON.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn clean_get(
        &self,
        endpoint: &str,
        query: Option<&str>,
    ) -> Result<String, ExactError> {
        let url = request_url(endpoint, query)?;
        let resp = self.execute(Method::GET, &url, None, false).await?;
        Ok(resp.text().await?)
    }

    /// Retrieve the division number of the authenticated user via the
    /// `current/Me` endpoint.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    pub async fn current_division(&self) -> Result<i64, ExactError> {
        let url = self.base_url().join("current/Me")?;
        let body = self.get(url.as_str(), Some("$select=CurrentDivision")).await?;

        let parsed: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ExactError::Data(format!("current/Me response parse: {e}")))?;
        parsed["d"]["results"][0]["CurrentDivision"]
            .as_i64()
            .ok_or_else(|| ExactError::Data("current/Me response is missing CurrentDivision".into()))
    }

    /// Shared send path: throttle, attach a fresh token, send, record the
    /// rate-limit snapshot, and drive the auth-retry loop.
    ///
    /// The snapshot is replaced from the response headers of every exchange,
    /// including the ones that end in an error. The 401/403 retry loop is
    /// unbounded; it runs for as long as the refresh policy answers `true`.
    async fn execute(
        &self,
        method: Method,
        url: &Url,
        body: Option<String>,
        accept_json: bool,
    ) -> Result<Response, ExactError> {
        self.throttle_if_exhausted().await;

        let mut attempt: u32 = 0;
        loop {
            let token = self.token_provider().access_token().await?;

            let mut req = self
                .http()
                .request(method.clone(), url.clone())
                .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
                .header(AUTHORIZATION, format!("Bearer {token}"));
            if accept_json {
                req = req.header(ACCEPT, CONTENT_TYPE_JSON);
            }
            if let Some(body) = &body {
                req = req.body(body.clone());
            }

            // A transport-level failure carries no headers, so the snapshot
            // stays as-is on this path.
            let resp = req.send().await?;
            self.store_rate_limits(RateLimitSnapshot::from_headers(resp.headers()))
                .await;

            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            if (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
                && let Some(policy) = self.refresh_policy()
                && policy.refresh(attempt).await
            {
                attempt += 1;
                continue;
            }

            let body = resp.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), &body, url.as_str()));
        }
    }
}

fn request_url(endpoint: &str, query: Option<&str>) -> Result<Url, ExactError> {
    if endpoint.is_empty() {
        return Err(ExactError::Validation(
            "cannot perform request with an empty endpoint".into(),
        ));
    }
    let url = match query {
        Some(q) if !q.is_empty() => Url::parse(&format!("{endpoint}?{q}"))?,
        _ => Url::parse(endpoint)?,
    };
    Ok(url)
}

fn request_body(body: &str) -> Result<String, ExactError> {
    if body.is_empty() {
        return Err(ExactError::Validation(
            "cannot perform request with an empty body".into(),
        ));
    }
    Ok(body.to_string())
}
