//! Rate-limited fetch client.
//!
//! Every attempt is bounded by the request timeout. Failed attempts
//! (timeout, transport error, non-2xx) are retried with exponential backoff
//! `backoff_base × 2^attempt`; HTTP 429 is retried on the same schedule and
//! surfaces as `CiliaiError::RateLimited` once the attempts run out.

use std::time::Duration;

use ciliai_common::{CiliaiError, Result, SandboxClient};
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::config::MinerConfig;

pub struct RateLimitedClient {
    client: SandboxClient,
    timeout: Duration,
    max_retries: u32,
    backoff_base: Duration,
}

impl RateLimitedClient {
    /// Client for `config`. The configured E-utilities host is always allowed.
    pub fn new(config: &MinerConfig) -> Result<Self> {
        let mut client = SandboxClient::new(config.request_timeout(), &config.user_agent)?;
        if let Some(host) = reqwest::Url::parse(&config.eutils_base).ok().as_ref().and_then(|u| u.host_str()) {
            client.allow_domain(host);
        }
        Ok(Self::from_parts(client, config.request_timeout(), config.max_retries, config.backoff_base()))
    }

    pub fn from_parts(client: SandboxClient, timeout: Duration, max_retries: u32, backoff_base: Duration) -> Self {
        Self { client, timeout, max_retries, backoff_base }
    }

    /// GET `endpoint` with the configured retry budget.
    pub async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        description: &str,
    ) -> Result<reqwest::Response> {
        self.request_with(endpoint, params, description, self.max_retries, self.backoff_base).await
    }

    /// GET `endpoint`, making at most `max_retries` attempts.
    #[instrument(skip(self, params, backoff_base))]
    pub async fn request_with(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        description: &str,
        max_retries: u32,
        backoff_base: Duration,
    ) -> Result<reqwest::Response> {
        let attempts = max_retries.max(1);

        for attempt in 0..attempts {
            let wait = backoff_base.saturating_mul(2u32.saturating_pow(attempt));
            let is_last = attempt + 1 == attempts;

            let sent = self.client
                .get(endpoint)?
                .query(params)
                .timeout(self.timeout)
                .send()
                .await;

            let failure = match sent {
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if is_last {
                        return Err(CiliaiError::RateLimited(format!(
                            "{description}: HTTP 429 persisted after {attempts} attempts"
                        )));
                    }
                    warn!("Rate limited on {}. Sleeping {:?}...", description, wait);
                    tokio::time::sleep(wait).await;
                    continue;
                }
                Ok(resp) if resp.status().is_success() => {
                    debug!(attempt, status = %resp.status(), "{} succeeded", description);
                    return Ok(resp);
                }
                Ok(resp) => format!("HTTP {}", resp.status()),
                Err(e) if e.is_timeout() => format!("timed out after {:?}", self.timeout),
                Err(e) => e.to_string(),
            };

            if is_last {
                return Err(CiliaiError::Network(format!(
                    "Failed {description} after {attempts} attempts: {failure}"
                )));
            }
            warn!("Request error ({}): {}. Retrying in {:?}...", description, failure, wait);
            tokio::time::sleep(wait).await;
        }

        Err(CiliaiError::Network(format!("Failed {description}: no attempts made")))
    }

    pub async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        description: &str,
    ) -> Result<serde_json::Value> {
        Ok(self.request(endpoint, params, description).await?.json().await?)
    }

    pub async fn get_text(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        description: &str,
    ) -> Result<String> {
        Ok(self.request(endpoint, params, description).await?.text().await?)
    }
}

/// Fixed delay awaited after every outbound search/fetch call.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const UA: &str = "ciliai-test/0.1";

    fn client(timeout: Duration, retries: u32) -> RateLimitedClient {
        let sandbox = SandboxClient::new(timeout, UA).unwrap();
        RateLimitedClient::from_parts(sandbox, timeout, retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_retries_server_error_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/esearch.fcgi"))
            .and(query_param("db", "pubmed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let c = client(Duration::from_secs(5), 3);
        let url = format!("{}/esearch.fcgi", server.uri());
        let body = c.get_text(&url, &[("db", "pubmed".to_string())], "search").await.unwrap();
        assert_eq!(body, "ok");
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_429_backs_off_exponentially_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let sandbox = SandboxClient::new(Duration::from_secs(5), UA).unwrap();
        let c = RateLimitedClient::from_parts(sandbox, Duration::from_secs(5), 4, Duration::from_millis(100));

        let started = std::time::Instant::now();
        let body = c.get_text(&server.uri(), &[], "throttled search").await.unwrap();
        let elapsed = started.elapsed();

        // 100 + 200 + 400 ms
        assert_eq!(body, "ok");
        assert!(elapsed >= Duration::from_millis(700), "elapsed {elapsed:?}");
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_persistent_429_is_reported_as_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let c = client(Duration::from_secs(5), 3);
        let err = c.request(&server.uri(), &[], "throttled").await.unwrap_err();
        assert!(matches!(err, CiliaiError::RateLimited(_)), "{err:?}");
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_persistent_error_propagates_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let c = client(Duration::from_secs(5), 2);
        let err = c.request(&server.uri(), &[], "broken").await.unwrap_err();
        match err {
            CiliaiError::Network(msg) => {
                assert!(msg.contains("after 2 attempts"), "{msg}");
                assert!(msg.contains("500"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timeout_is_retried_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let c = client(Duration::from_millis(50), 2);
        let err = c.request(&server.uri(), &[], "slow").await.unwrap_err();
        assert!(matches!(err, CiliaiError::Network(ref m) if m.contains("timed out")), "{err:?}");
    }

    #[tokio::test]
    async fn test_sends_identifying_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let c = client(Duration::from_secs(5), 1);
        let json = c.get_json(&server.uri(), &[], "ua").await.unwrap();
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn test_disallowed_host_is_not_retried() {
        let c = client(Duration::from_secs(5), 3);
        let err = c.request("https://example.com/esearch", &[], "blocked").await.unwrap_err();
        assert!(matches!(err, CiliaiError::SecurityError(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacer_waits_configured_delay() {
        let pacer = Pacer::new(Duration::from_millis(340));
        let t0 = tokio::time::Instant::now();
        pacer.pause().await;
        assert_eq!(t0.elapsed(), Duration::from_millis(340));

        let t1 = tokio::time::Instant::now();
        Pacer::new(Duration::ZERO).pause().await;
        assert_eq!(t1.elapsed(), Duration::ZERO);
    }
}
