#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use syrup_domain::{ClientConfig, Result};
use syrup_infra::{
    HttpRequest, HttpResponse, HttpTransport, RequestLogEntry, RequestLogger, Sleeper, SyrupClient,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sleeper that records requested delays and returns immediately.
#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().expect("sleeper mutex poisoned").clone()
    }

    pub fn delay_secs(&self) -> Vec<u64> {
        self.delays().iter().map(Duration::as_secs).collect()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().expect("sleeper mutex poisoned").push(duration);
    }
}

/// Sleeper that cancels a token the first time it is asked to wait.
pub struct CancellingSleeper {
    pub token: CancellationToken,
}

#[async_trait]
impl Sleeper for CancellingSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.token.cancel();
    }
}

/// Logger that keeps every rendered line.
#[derive(Default)]
pub struct CapturingLogger {
    entries: Mutex<Vec<RequestLogEntry>>,
}

impl CapturingLogger {
    pub fn entries(&self) -> Vec<RequestLogEntry> {
        self.entries.lock().expect("logger mutex poisoned").clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(ToString::to_string).collect()
    }
}

impl RequestLogger for CapturingLogger {
    fn log(&self, entry: &RequestLogEntry) {
        self.entries.lock().expect("logger mutex poisoned").push(entry.clone());
    }
}

/// In-memory transport replaying canned responses; the last one repeats.
pub struct ScriptedTransport {
    script: Mutex<Vec<(u16, String)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new<S: Into<String>>(script: Vec<(u16, S)>) -> Self {
        let mut script: Vec<(u16, String)> =
            script.into_iter().map(|(status, body)| (status, body.into())).collect();
        script.reverse();
        Self { script: Mutex::new(script), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("transport mutex poisoned").clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().expect("transport mutex poisoned").push(request);
        let mut script = self.script.lock().expect("transport mutex poisoned");
        let (status, body) = if script.len() > 1 {
            script.pop().expect("script entry")
        } else {
            script.last().cloned().expect("script must not be empty")
        };
        Ok(HttpResponse::new(StatusCode::from_u16(status).expect("valid status"), body))
    }
}

/// Configuration pointing at a mock server, with token and run id set.
pub fn test_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new("test")
        .with_url(format!("{}/", server.uri()))
        .with_run_id("runIdTest")
        .with_system_proxy(false)
}

pub fn client_with_sleeper(config: ClientConfig, sleeper: Arc<dyn Sleeper>) -> SyrupClient {
    SyrupClient::builder().config(config).sleeper(sleeper).build().expect("client should build")
}

pub fn json_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/json")
}

/// Mount responses that are served once each, in order.
pub async fn mount_sequence(server: &MockServer, responses: Vec<ResponseTemplate>) {
    for response in responses {
        Mock::given(any()).respond_with(response).up_to_n_times(1).mount(server).await;
    }
}

pub async fn received_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|requests| requests.len()).unwrap_or_default()
}
