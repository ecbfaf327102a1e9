//! HTTP transport client implementation
//!
//! Implements the Transport trait on top of reqwest. Each call is a single
//! attempt; retries are driven by the caller through [`RetryPolicy`].
//!
//! [`RetryPolicy`]: super::RetryPolicy

use crate::error::{Result, TransportError};
use crate::traits::{HttpRequest, HttpResponse, HttpVersion, Transport};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use reqwest::redirect::Policy as RedirectPolicy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// HTTP transport implementation
///
/// Handles HTTP requests with:
/// - Connection pooling
/// - Per-request timeouts
/// - Configurable redirect limits
/// - Protocol version selection
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<ReqwestClient>,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Default::default())
    }

    /// Create a new HTTP transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = build_client(&config, config.redirect_limit)?;
        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Get a reference to the underlying reqwest client
    pub fn reqwest_client(&self) -> Arc<ReqwestClient> {
        self.client.clone()
    }

    /// The configuration this transport was built with
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Redirect policy is fixed per reqwest client, so a request asking for a
    /// different limit gets a dedicated client.
    fn client_for(&self, redirect_limit: Option<usize>) -> Result<Arc<ReqwestClient>> {
        match redirect_limit {
            Some(limit) if limit != self.config.redirect_limit => {
                Ok(Arc::new(build_client(&self.config, limit)?))
            }
            _ => Ok(self.client.clone()),
        }
    }
}

fn build_client(config: &HttpTransportConfig, redirect_limit: usize) -> Result<ReqwestClient> {
    let redirect = if redirect_limit == 0 {
        RedirectPolicy::none()
    } else {
        RedirectPolicy::limited(redirect_limit)
    };

    let mut builder = ReqwestClient::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .redirect(redirect);
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.as_str());
    }

    builder
        .build()
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))
}

fn reqwest_version(version: HttpVersion) -> reqwest::Version {
    match version {
        HttpVersion::Http10 => reqwest::Version::HTTP_10,
        HttpVersion::Http11 => reqwest::Version::HTTP_11,
        HttpVersion::Http2 => reqwest::Version::HTTP_2,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method_upper = request.method.to_uppercase();
        let method = match method_upper.as_str() {
            "GET" => reqwest::Method::GET,
            "POST" => reqwest::Method::POST,
            "PUT" => reqwest::Method::PUT,
            "DELETE" => reqwest::Method::DELETE,
            "PATCH" => reqwest::Method::PATCH,
            "HEAD" => reqwest::Method::HEAD,
            "OPTIONS" => reqwest::Method::OPTIONS,
            _ => {
                return Err(TransportError::InvalidRequest(format!(
                    "Unsupported HTTP method: {}",
                    request.method
                )));
            }
        };

        let client = self.client_for(request.redirect_limit)?;
        let mut req = client
            .request(method, &request.url)
            .version(reqwest_version(request.version));

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        // Add headers
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if let Some(cookie) = request.cookie_header() {
            req = req.header(reqwest::header::COOKIE, cookie);
        }

        // Add body if present
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        debug!(method = %method_upper, url = %request.url, "Sending HTTP request");
        let response = req.send().await?;

        let status = response.status().as_u16();
        let mut headers = HashMap::new();

        // Collect headers
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        // Collect body
        let body = response.bytes().await?.to_vec();
        debug!(status, body_size = body.len(), "Received HTTP response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// HTTP transport configuration
#[derive(Clone, Debug)]
pub struct HttpTransportConfig {
    /// Default request timeout, used when a request sets none
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Default redirect limit, used when a request sets none
    pub redirect_limit: usize,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            redirect_limit: 5,
            pool_max_idle_per_host: 10,
            user_agent: Some(concat!("adapterkit/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new().expect("Failed to create transport");
        assert_eq!(transport.config().redirect_limit, 5);
        assert_eq!(transport.config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_http_transport_with_config() {
        let config = HttpTransportConfig {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            redirect_limit: 0,
            pool_max_idle_per_host: 2,
            user_agent: None,
        };

        let transport = HttpTransport::with_config(config).expect("Failed to create transport");
        assert_eq!(transport.config().timeout, Duration::from_secs(5));
        assert_eq!(transport.config().redirect_limit, 0);
    }

    #[test]
    fn test_client_reused_for_default_redirect_limit() {
        let transport = HttpTransport::new().unwrap();
        let shared = transport.client_for(None).unwrap();
        assert!(Arc::ptr_eq(&shared, &transport.reqwest_client()));

        let same_limit = transport.client_for(Some(5)).unwrap();
        assert!(Arc::ptr_eq(&same_limit, &transport.reqwest_client()));

        let custom = transport.client_for(Some(1)).unwrap();
        assert!(!Arc::ptr_eq(&custom, &transport.reqwest_client()));
    }

    #[tokio::test]
    async fn test_unsupported_method_is_invalid_request() {
        let transport = HttpTransport::new().unwrap();
        let err = transport
            .send_http(HttpRequest::new("BREW", "http://127.0.0.1:9/pot"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
