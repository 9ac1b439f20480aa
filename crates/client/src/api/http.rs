//! `reqwest`-backed transport.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP transport for the marketplace API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for the configured API.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaar-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpTransportInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn execute(
        &self,
        request: ApiRequest,
        url: Url,
        request_id: Uuid,
    ) -> Result<ApiResponse, ApiError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        if status >= 500 {
            tracing::warn!(status, "server error");
        } else {
            tracing::debug!(status, "response received");
        }

        Ok(ApiResponse { status, body })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path)?;
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            %request_id,
        );

        self.execute(request, url, request_id)
            .instrument(span)
            .await
    }
}
