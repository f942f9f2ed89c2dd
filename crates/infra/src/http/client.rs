use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use syrup_domain::constants::{
    DEFAULT_BACKOFF_MAX_TRIES, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_BASE_DELAY_MS,
    DEFAULT_USER_AGENT, JSON_CONTENT_TYPE, MAX_ERROR_BODY_CHARS, RUN_ID_HEADER, TOKEN_HEADER,
};
use syrup_domain::{Result, SyrupError};
use tracing::{debug, warn};

use super::delay::{exponential_backoff, Sleeper, TokioSleeper};
use super::logging::{RequestLogEntry, RequestLogger};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

fn token_header() -> HeaderName {
    HeaderName::from_static(TOKEN_HEADER)
}

fn run_id_header() -> HeaderName {
    HeaderName::from_static(RUN_ID_HEADER)
}

/// HTTP client with default headers, retry on 5xx/network errors and
/// optional per-attempt logging.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    logger: Option<Arc<dyn RequestLogger>>,
    default_headers: HeaderMap,
    max_retries: u32,
    base_backoff: Duration,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("max_retries", &self.max_retries)
            .field("base_backoff", &self.base_backoff)
            .field("logging", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Send the request, retrying transient failures.
    ///
    /// A request is retried while fewer than `max_retries` retries have been
    /// made and the attempt either failed at the transport level or returned
    /// a 5xx status. Any other non-2xx status fails immediately.
    ///
    /// # Errors
    /// Returns `SyrupError::Network` when the transport keeps failing and
    /// `SyrupError::Http` for non-2xx responses.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.apply_default_headers(request);
        let mut retries = 0u32;

        loop {
            let attempt = retries + 1;
            debug!(attempt, method = %request.method, url = %request.url, "sending HTTP request");

            let outcome = self.transport.execute(request.clone()).await;
            self.log_attempt(&request, attempt, &outcome);

            let error = match outcome {
                Ok(response) if response.status.is_success() => {
                    debug!(attempt, status = %response.status, "received HTTP response");
                    return Ok(response);
                }
                Ok(response) => status_error(&request, &response),
                Err(err) => err,
            };

            if retries < self.max_retries && error.is_transient() {
                retries += 1;
                let delay = exponential_backoff(self.base_backoff, retries);
                warn!(
                    attempt,
                    retry = retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "HTTP request failed, retrying"
                );
                self.sleeper.sleep(delay).await;
                continue;
            }

            debug!(attempt, error = %error, "HTTP request failed");
            return Err(error);
        }
    }

    fn apply_default_headers(&self, mut request: HttpRequest) -> HttpRequest {
        for (name, value) in &self.default_headers {
            request.headers.insert(name.clone(), value.clone());
        }
        if !request.headers.contains_key(CONTENT_TYPE) {
            request.headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        }
        request
    }

    fn log_attempt(&self, request: &HttpRequest, attempt: u32, outcome: &Result<HttpResponse>) {
        let Some(logger) = &self.logger else {
            return;
        };

        let user_agent = request
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let mut entry =
            RequestLogEntry::for_request(&request.method, &request.url, user_agent, attempt);

        match outcome {
            Ok(response) => {
                entry.version = Some(response.version);
                entry.status = Some(response.status);
                entry.response_size = Some(response.size());
            }
            Err(err) => entry.error = Some(err.to_string()),
        }

        logger.log(&entry);
    }
}

fn status_error(request: &HttpRequest, response: &HttpResponse) -> SyrupError {
    let body: String = response.text().chars().take(MAX_ERROR_BODY_CHARS).collect();
    SyrupError::Http {
        status: response.status.as_u16(),
        reason: response.status.canonical_reason().unwrap_or("Unknown Status").to_string(),
        method: request.method.to_string(),
        url: request.url.clone(),
        body,
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
    system_proxy: bool,
    max_retries: u32,
    base_backoff: Duration,
    user_agent: String,
    token: Option<String>,
    run_id: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    sleeper: Option<Arc<dyn Sleeper>>,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            system_proxy: true,
            max_retries: DEFAULT_BACKOFF_MAX_TRIES,
            base_backoff: Duration::from_millis(DEFAULT_RETRY_BASE_DELAY_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            run_id: None,
            transport: None,
            sleeper: None,
            logger: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY` in the default transport.
    pub fn system_proxy(mut self, enabled: bool) -> Self {
        self.system_proxy = enabled;
        self
    }

    /// Configure how many retries follow the initial attempt.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Token sent as `X-Auth-Token`; empty tokens are ignored.
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Run id sent as `X-Run-Id`; empty values are ignored.
    pub fn run_id(mut self, run_id: Option<String>) -> Self {
        self.run_id = run_id.filter(|r| !r.is_empty());
        self
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

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
    /// Returns `SyrupError::Config` if a header value is invalid or the
    /// default transport cannot be created.
    pub fn build(self) -> Result<HttpClient> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, header_value(USER_AGENT.as_str(), &self.user_agent)?);
        if let Some(token) = &self.token {
            default_headers.insert(token_header(), header_value(TOKEN_HEADER, token)?);
        }
        if let Some(run_id) = &self.run_id {
            default_headers.insert(run_id_header(), header_value(RUN_ID_HEADER, run_id)?);
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None if self.system_proxy => Arc::new(ReqwestTransport::new(self.timeout)?),
            None => Arc::new(ReqwestTransport::direct(self.timeout)?),
        };

        Ok(HttpClient {
            transport,
            sleeper: self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper)),
            logger: self.logger,
            default_headers,
            max_retries: self.max_retries,
            base_backoff: self.base_backoff,
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SyrupError::Config(format!("invalid value for header {name}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::{Method, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    #[derive(Default)]
    struct CollectingLogger {
        lines: Mutex<Vec<String>>,
    }

    impl RequestLogger for CollectingLogger {
        fn log(&self, entry: &RequestLogEntry) {
            self.lines.lock().unwrap().push(entry.to_string());
        }
    }

    fn client_with(sleeper: Arc<RecordingSleeper>, max_retries: u32) -> HttpClient {
        HttpClient::builder()
            .system_proxy(false)
            .base_backoff(Duration::from_millis(10))
            .max_retries(max_retries)
            .sleeper(sleeper)
            .build()
            .expect("http client")
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client_with(sleeper.clone(), 3);
        let response = client.send(HttpRequest::new(Method::GET, server.uri())).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 3 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(4)
            .mount(&server)
            .await;

        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client_with(sleeper.clone(), 3);
        let response = client.send(HttpRequest::new(Method::GET, server.uri())).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![Duration::from_millis(10), Duration::from_millis(20), Duration::from_millis(40)]
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_with(Arc::new(RecordingSleeper::default()), 2);
        let err = client.send(HttpRequest::new(Method::GET, server.uri())).await.unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("500 Internal Server Error"));
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with(Arc::new(RecordingSleeper::default()), 3);
        let err = client.send(HttpRequest::new(Method::GET, server.uri())).await.unwrap_err();

        match err {
            SyrupError::Http { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "missing");
            }
            other => panic!("expected http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn retries_on_network_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{}", addr);

        let sleeper = Arc::new(RecordingSleeper::default());
        let client = client_with(sleeper.clone(), 1);

        let result = client.send(HttpRequest::new(Method::GET, url)).await;
        match result {
            Err(SyrupError::Network(msg)) => {
                assert!(msg.to_lowercase().contains("http"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
        assert_eq!(sleeper.delays.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn attaches_default_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = HttpClient::builder()
            .system_proxy(false)
            .user_agent("Syrup Rust Client - tests")
            .token(Some("test".into()))
            .run_id(Some("runIdTest".into()))
            .build()
            .unwrap();
        client.send(HttpRequest::new(Method::POST, server.uri()).with_body("{}")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        assert_eq!(headers.get(TOKEN_HEADER).unwrap(), "test");
        assert_eq!(headers.get(RUN_ID_HEADER).unwrap(), "runIdTest");
        assert_eq!(headers.get("user-agent").unwrap(), "Syrup Rust Client - tests");
        assert_eq!(headers.get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn auth_header_names_match_wire_names() {
        assert_eq!(token_header().as_str(), "x-auth-token");
        assert_eq!(run_id_header().as_str(), "x-run-id");

        let client = HttpClient::builder()
            .token(Some("t".into()))
            .run_id(Some("r".into()))
            .build()
            .unwrap();
        assert_eq!(client.default_headers.get(TOKEN_HEADER).unwrap(), "t");
        assert_eq!(client.default_headers.get(RUN_ID_HEADER).unwrap(), "r");
    }

    #[tokio::test]
    async fn keeps_explicit_content_type_and_skips_missing_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client =
            HttpClient::builder().system_proxy(false).token(Some(String::new())).build().unwrap();
        let request = HttpRequest::new(Method::POST, server.uri())
            .with_header(CONTENT_TYPE, "text/plain")
            .unwrap()
            .with_body("secret");
        client.send(request).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        assert_eq!(headers.get("content-type").unwrap(), "text/plain");
        assert!(headers.get("x-auth-token").is_none());
        assert!(headers.get("x-run-id").is_none());
    }

    #[tokio::test]
    async fn logs_every_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let logger = Arc::new(CollectingLogger::default());
        let client = HttpClient::builder()
            .system_proxy(false)
            .sleeper(Arc::new(RecordingSleeper::default()))
            .logger(logger.clone())
            .build()
            .unwrap();
        client.send(HttpRequest::new(Method::GET, server.uri())).await.unwrap();

        let lines = logger.lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Syrup Rust Client"));
        assert!(lines[0].contains("\"GET / HTTP/1.1\" 502"));
        assert!(lines[1].contains("\"GET / HTTP/1.1\" 200 2"));
    }
}
