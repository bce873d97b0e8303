use std::thread::sleep;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryConfig {
    pub timeout_secs: Option<u64>,
    pub retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug)]
pub(crate) enum RequestFailure {
    Request(reqwest::Error),
    Api { status: StatusCode, body: String },
}

/// Posts a chat payload, retrying throttled and transient failures with backoff.
pub(crate) fn send_chat_request_with_retry<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    api_key: &str,
    payload: &T,
    config: RetryConfig,
) -> Result<Response, RequestFailure> {
    let max_attempts = config.retries.saturating_add(1);
    let mut attempt = 0;

    loop {
        let mut request = client.post(url).bearer_auth(api_key).json(payload);
        if let Some(timeout_secs) = config.timeout_secs {
            request = request.timeout(Duration::from_secs(timeout_secs));
        }

        let failure = match request.send() {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                RequestFailure::Api { status, body }
            }
            Err(source) => RequestFailure::Request(source),
        };

        let retryable = match &failure {
            RequestFailure::Api { status, .. } => is_retryable_status(*status),
            RequestFailure::Request(source) => is_retryable_request_error(source),
        };
        if !retryable || attempt + 1 >= max_attempts {
            return Err(failure);
        }

        let delay = retry_delay(attempt, config.retry_delay_ms);
        warn!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "retrying chat request");
        sleep(delay);
        attempt += 1;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_request_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn retry_delay(attempt: u32, base_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(30_000);
    Duration::from_millis(delay_ms)
}
