//! Raw HTTP transport seam.
//!
//! [`HttpTransport`] sends exactly one request and reports exactly one
//! outcome; headers, retries and logging live in [`super::HttpClient`].
//! Tests and embedders can swap the reqwest implementation for their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::{Client as ReqwestClient, Method, StatusCode, Version};
use syrup_domain::{Result, SyrupError};

use crate::errors::InfraError;

/// Fully buffered outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: HeaderMap::new(), body: None }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a header, replacing any previous value.
    ///
    /// # Errors
    /// Returns `SyrupError::Config` if the value is not a valid header value.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| SyrupError::Config(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// Fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self { status, version: Version::HTTP_11, headers: HeaderMap::new(), body: body.into() }
    }

    /// Response size as announced by `Content-Length`, or the body length.
    pub fn size(&self) -> u64 {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
            .unwrap_or(self.body.len() as u64)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends a single HTTP request.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute the request once.
    ///
    /// # Errors
    /// Returns `SyrupError::Network` for DNS/connect/timeout failures and
    /// `SyrupError::Config` when the request cannot be built. Non-2xx
    /// responses are returned as `Ok`.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Default transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Build a transport with the given per-request timeout that honors
    /// the proxy environment variables.
    ///
    /// # Errors
    /// Returns `SyrupError::Config` if the reqwest client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::build(ReqwestClient::builder().timeout(timeout))
    }

    /// Like [`ReqwestTransport::new`], but connects directly and ignores
    /// any configured proxy.
    ///
    /// # Errors
    /// Returns `SyrupError::Config` if the reqwest client cannot be built.
    pub fn direct(timeout: Duration) -> Result<Self> {
        Self::build(ReqwestClient::builder().timeout(timeout).no_proxy())
    }

    fn build(builder: reqwest::ClientBuilder) -> Result<Self> {
        let client = builder.build().map_err(|err| SyrupError::from(InfraError::from(err)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder =
            self.client.request(request.method, &request.url).headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|err| SyrupError::from(InfraError::from(err)))?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| SyrupError::from(InfraError::from(err)))?
            .to_vec();

        Ok(HttpResponse { status, version, headers, body })
    }
}
