//! Client construction and shared request helpers

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use syrup_domain::{ClientConfig, Result, SyrupError};
use tracing::debug;

use crate::http::{
    decode_json, HttpClient, HttpRequest, HttpResponse, HttpTransport, RequestLogger, Sleeper,
    TokioSleeper,
};
use crate::uri;

/// Client for the Syrup job API.
///
/// Cheap to clone; clones share the transport. The client holds no mutable
/// state, so one instance can serve concurrent calls.
#[derive(Clone)]
pub struct SyrupClient {
    pub(super) http: HttpClient,
    pub(super) config: Arc<ClientConfig>,
    pub(super) sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for SyrupClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyrupClient")
            .field("http", &self.http)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SyrupClient {
    /// Create a client with the default reqwest transport.
    ///
    /// # Errors
    /// Returns `SyrupError::Config` if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> SyrupClientBuilder {
        SyrupClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `{url}/{segments...}`
    pub(super) fn api_url(&self, segments: &[&str]) -> String {
        uri::join(&self.config.url, segments)
    }

    /// `{queue_url}/{segments...}`
    pub(super) fn queue_url(&self, segments: &[&str]) -> String {
        uri::join(self.config.queue_base_url(), segments)
    }

    /// `{base}/{super?}/{component}/{rest...}`
    pub(super) fn component_url(&self, base: &str, component: &str, rest: &[&str]) -> String {
        let mut segments = vec![self.config.super_segment().unwrap_or_default(), component];
        segments.extend_from_slice(rest);
        uri::join(base, &segments)
    }

    /// Send a request with an optional JSON body and return the raw response.
    pub(super) async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, url);
        if let Some(body) = body {
            let encoded =
                serde_json::to_vec(body).map_err(|e| SyrupError::Serialization(e.to_string()))?;
            request = request.with_body(encoded);
        }
        self.http.send(request).await
    }

    /// Send a request and decode the JSON response.
    pub(super) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> Result<Value> {
        let response = self.send(method, url, body).await?;
        debug!(status = %response.status, size = response.body.len(), "decoding response");
        decode_json(&response.body)
    }

    pub(super) async fn get_json(&self, url: String) -> Result<Value> {
        self.send_json::<Value>(Method::GET, url, None).await
    }
}

/// Builder for [`SyrupClient`].
#[derive(Default)]
pub struct SyrupClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl SyrupClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default reqwest transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Delay function used between transport retries and between polls.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns `SyrupError::Config` if the configuration does not validate or
    /// the HTTP client cannot be created.
    pub fn build(self) -> Result<SyrupClient> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let sleeper: Arc<dyn Sleeper> = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));

        let mut http = HttpClient::builder()
            .timeout(config.request_timeout())
            .system_proxy(config.use_system_proxy)
            .max_retries(config.backoff_max_tries)
            .base_backoff(config.retry_base_delay())
            .user_agent(config.user_agent_header())
            .token(config.token.clone())
            .run_id(config.run_id.clone())
            .sleeper(sleeper.clone());
        if let Some(transport) = self.transport {
            http = http.transport(transport);
        }
        if let Some(logger) = self.logger {
            http = http.logger(logger);
        }

        Ok(SyrupClient { http: http.build()?, config: Arc::new(config), sleeper })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(config: ClientConfig) -> SyrupClient {
        SyrupClient::new(config).unwrap()
    }

    #[test]
    fn builds_component_urls_with_optional_super() {
        let plain = client(ClientConfig::new("t").with_url("https://x/"));
        assert_eq!(plain.component_url("https://x/", "comp", &["run"]), "https://x/comp/run");

        let nested = client(ClientConfig::new("t").with_url("https://x").with_super("docker"));
        assert_eq!(
            nested.component_url(&nested.config().url, "comp", &["run", "tag", "1.2.3"]),
            "https://x/docker/comp/run/tag/1.2.3"
        );
    }

    #[test]
    fn queue_urls_ignore_super() {
        let client = client(
            ClientConfig::new("t")
                .with_url("https://syrup.test")
                .with_queue_url("https://queue.test/")
                .with_super("docker"),
        );
        assert_eq!(client.queue_url(&["queue", "job", "1"]), "https://queue.test/queue/job/1");
        assert_eq!(
            client.api_url(&["docker", "stats", "project"]),
            "https://syrup.test/docker/stats/project"
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        let err = SyrupClient::new(ClientConfig::new("t").with_url("not a url")).unwrap_err();
        assert!(matches!(err, SyrupError::Config(_)));
    }
}
