//! Retrying request execution

use super::RequestOptions;
use crate::error::{AdapterResult, ErrorRecord, context};
use crate::logging::AdapterLogger;
use adapterkit_core::retry::BackoffStrategy;
use adapterkit_transport::{HttpResponse, RetryPolicy, Transport};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Characters of an error response body quoted in the error message.
const BODY_PREVIEW_CHARS: usize = 200;

/// Sends requests with bounded retries and linear backoff.
///
/// Only transport failures are retried. A response with any status ends
/// the loop: 4xx and 5xx become `http_<status>` errors, everything else is
/// returned untouched.
#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    logger: AdapterLogger,
}

impl HttpExecutor {
    /// Executor over `transport` with the default HTTP retry policy.
    pub fn new(transport: Arc<dyn Transport>, logger: AdapterLogger) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            logger,
        }
    }

    /// Replace the retry policy. The attempt count still comes from each
    /// call's `retries` option.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send `options` to `url`.
    ///
    /// # Errors
    ///
    /// - `http_error` when every attempt failed without a status, or a
    ///   failure could not succeed on retry
    /// - `http_<status>` when the response status is 400 or above
    pub async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> AdapterResult<HttpResponse> {
        let policy = self.policy.with_attempts(options.retries);
        let max_attempts = policy.max_attempts();
        let request_id = Uuid::new_v4().to_string();
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                %url,
                %request_id,
                attempt,
                max_attempts,
                method = %options.method,
                "sending request"
            );

            let err = match self.transport.send_http(options.to_request(url)).await {
                Ok(response) => return check_status(url, response),
                Err(err) => err,
            };

            let retry_in = if RetryPolicy::is_retryable(&err) {
                policy.next_delay(attempt)
            } else {
                None
            };

            self.logger.warning(
                "HTTP request attempt failed",
                context([
                    ("url", Value::from(url)),
                    ("attempt", Value::from(attempt)),
                    ("max_attempts", Value::from(max_attempts)),
                    ("error", Value::from(err.to_string())),
                    ("request_id", Value::from(request_id.as_str())),
                    ("retry_in_secs", Value::from(retry_in.map(|d| d.as_secs()))),
                ]),
            );

            match retry_in {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Err(ErrorRecord::http_error(url, &err)),
            }
        }
    }
}

fn check_status(url: &str, response: HttpResponse) -> AdapterResult<HttpResponse> {
    if response.is_error() {
        return Err(ErrorRecord::http_status(
            url,
            response.status,
            &response.body_preview(BODY_PREVIEW_CHARS),
        ));
    }
    Ok(response)
}

impl fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
