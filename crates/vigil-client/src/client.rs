//! HTTP delivery client with bounded retries and exponential backoff.

use std::time::Duration;

use serde::Serialize;
use vigil_core::{RetryPolicy, Route, StartResponse};

use crate::error::{DeliveryError, Result};

/// Per-request timeout. Generous because the service may be slow to accept
/// large log payloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(100);

/// Performs one logical "send event" against the remote service.
///
/// No state is retained between attempts besides the attempt counter.
pub struct DeliveryClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    policy: RetryPolicy,
}

impl DeliveryClient {
    /// Creates a client with the default retry policy (5 attempts, 1s
    /// doubling up to 30s).
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_policy(api_base, api_key, RetryPolicy::default())
    }

    pub fn with_policy(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        policy: RetryPolicy,
    ) -> Result<Self> {
        // Redirects are disabled: a 3xx is a failure on this wire.
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| DeliveryError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            api_key: api_key.into(),
            policy,
        })
    }

    /// Sends `event` to `route`, retrying transient failures with
    /// exponential backoff.
    ///
    /// A malformed response envelope is returned immediately without
    /// further attempts; exhausting the attempt cap returns
    /// [`DeliveryError::Exhausted`].
    pub async fn send<T>(&self, route: Route, event: &T) -> Result<StartResponse>
    where
        T: Serialize + ?Sized,
    {
        let mut last = String::new();
        for attempt in 0..self.policy.max_attempts {
            match self.attempt(route, event).await {
                Ok(resp) => return Ok(resp),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        route = route.path(),
                        attempt = attempt + 1,
                        error = %err,
                        "delivery attempt failed"
                    );
                    last = err.to_string();
                }
            }
            if attempt + 1 < self.policy.max_attempts {
                tokio::time::sleep(self.policy.delay_for(attempt)).await;
            }
        }
        Err(DeliveryError::Exhausted {
            attempts: self.policy.max_attempts,
            last,
        })
    }

    async fn attempt<T>(&self, route: Route, event: &T) -> Result<StartResponse>
    where
        T: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.api_base, route.path());
        let response = self
            .http
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(event)
            .send()
            .await
            .map_err(|e| DeliveryError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 300 {
            return Err(DeliveryError::Status(status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DeliveryError::Connection(format!("failed to read response body: {e}")))?;

        // Double-layer envelope: the payload is a JSON-encoded string which
        // itself contains the response object. Both steps must succeed.
        // This is the wire contract, not an accident.
        let outer: String = serde_json::from_slice(&body)
            .map_err(|e| DeliveryError::Decode(format!("outer layer: {e}")))?;
        let decoded: StartResponse = serde_json::from_str(&outer)
            .map_err(|e| DeliveryError::Decode(format!("inner layer: {e}")))?;
        Ok(decoded)
    }
}
