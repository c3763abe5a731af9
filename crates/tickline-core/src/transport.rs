//! Authenticated HTTP transport with classified retry and linear backoff.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};

/// Backoff strategy for retrying failed requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Delay grows linearly: `attempt * base` after the given attempt fails.
    Linear {
        /// Base delay multiplied by the failed attempt number.
        base: Duration,
    },
    /// Uses an exponential delay between retries.
    ///
    /// The delay is calculated as `base * (factor ^ (attempt - 1))`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
        /// Whether to apply random jitter (+/- 50%) to the delay.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Linear {
            base: Duration::from_secs(1),
        }
    }
}

impl Backoff {
    /// Calculate the delay to sleep after the given attempt failed.
    ///
    /// `attempt` is 1-based: the first delay follows the first failed
    /// attempt.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Linear { base } => base * attempt.max(1),
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt.saturating_sub(1) as i32);
                let seconds = base.as_secs_f64() * scale;
                let capped_seconds = seconds.min(max.as_secs_f64());

                let mut delay = Duration::from_secs_f64(capped_seconds);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let random_offset = fastrand::u64(0..=(jitter_ms * 2));
                    let total_ms =
                        delay.as_millis() as i64 + (random_offset as i64 - jitter_ms as i64);
                    delay = Duration::from_millis(total_ms.max(0) as u64);
                }

                delay
            }
        }
    }
}

/// Retry budget and backoff configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Failure class recorded on a terminal transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Upstream answered with a non-2xx status.
    Status,
    /// The request never completed (connection failure and the like).
    Network,
    /// An individual attempt exceeded its timeout.
    Timeout,
}

/// Terminal transport failure, raised only after the retry budget is
/// exhausted or a non-retryable status is seen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} failed after {attempts} attempt(s): {detail}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub attempts: u32,
    pub last_status: Option<u16>,
    pub operation: String,
    detail: String,
}

impl TransportError {
    fn status(operation: &str, attempts: u32, status: u16) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            attempts,
            last_status: Some(status),
            operation: operation.to_owned(),
            detail: format!("upstream returned status {status}"),
        }
    }

    fn network(operation: &str, attempts: u32, message: &str, timed_out: bool) -> Self {
        Self {
            kind: if timed_out {
                TransportErrorKind::Timeout
            } else {
                TransportErrorKind::Network
            },
            attempts,
            last_status: None,
            operation: operation.to_owned(),
            detail: message.to_owned(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Form field value; list values are joined by commas on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    List(Vec<String>),
}

impl FormValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    fn encode(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::List(values) => values.join(","),
        }
    }
}

/// Whether a failed attempt is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Transient,
    Terminal,
}

/// 5xx and 429 are transient; any other non-2xx status can never succeed on
/// retry and fails fast without consuming the backoff budget.
fn classify_status(status: u16) -> Disposition {
    match status {
        429 => Disposition::Transient,
        500..=599 => Disposition::Transient,
        _ => Disposition::Terminal,
    }
}

/// Authenticated request issuer against the fixed upstream host.
///
/// Holds no mutable state beyond the immutable credential and policy.
pub struct Transport {
    http: Arc<dyn HttpClient>,
    base_url: String,
    auth: HttpAuth,
    user_agent: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Transport {
    pub fn new(config: &EngineConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth: HttpAuth::Basic {
                key: config.api_key().to_owned(),
            },
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout,
            retry: config.retry,
        }
    }

    /// GET with query-string parameters.
    pub async fn get(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<String, TransportError> {
        let mut url = format!("{}/{path}", self.base_url);
        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }

        let request = self.base_request(HttpRequest::get(url));
        self.execute_with_retry(request, path).await
    }

    /// POST with a JSON body.
    pub async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<String, TransportError> {
        let request = self
            .base_request(HttpRequest::post(format!("{}/{path}", self.base_url)))
            .with_header("content-type", "application/json")
            .with_body(body.to_string());
        self.execute_with_retry(request, path).await
    }

    /// POST with a form-encoded body.
    pub async fn post_form(
        &self,
        path: &str,
        fields: &[(&str, FormValue)],
    ) -> Result<String, TransportError> {
        let body = fields
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&value.encode())
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let request = self
            .base_request(HttpRequest::post(format!("{}/{path}", self.base_url)))
            .with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(body);
        self.execute_with_retry(request, path).await
    }

    fn base_request(&self, request: HttpRequest) -> HttpRequest {
        request
            .with_auth(&self.auth)
            .with_header("user-agent", self.user_agent.clone())
            .with_timeout_ms(self.timeout.as_millis() as u64)
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        operation: &str,
    ) -> Result<String, TransportError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = TransportError::network(operation, 0, "request was never issued", false);

        for attempt in 1..=max_attempts {
            debug!(operation, attempt, "issuing upstream request");

            match self.http.execute(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    let error = TransportError::status(operation, attempt, response.status);
                    if classify_status(response.status) == Disposition::Terminal {
                        return Err(error);
                    }
                    last_error = error;
                }
                Err(error) => {
                    last_error =
                        TransportError::network(operation, attempt, error.message(), error.timed_out());
                }
            }

            if attempt < max_attempts {
                let delay = self.retry.backoff.delay(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    detail = last_error.detail(),
                    "upstream request failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error)
    }
}
