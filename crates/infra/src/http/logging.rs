//! Per-attempt request logging.
//!
//! Purely observational: a logger sees every attempt, including the ones
//! that are retried, and can never influence the outcome.

use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode, Version};

/// One line per HTTP attempt.
#[derive(Debug, Clone)]
pub struct RequestLogEntry {
    pub host: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    /// Path plus query
    pub resource: String,
    pub version: Option<Version>,
    pub status: Option<StatusCode>,
    pub response_size: Option<u64>,
    /// 1-based attempt number
    pub attempt: u32,
    /// Transport error, when no response was received
    pub error: Option<String>,
}

impl RequestLogEntry {
    pub(crate) fn for_request(method: &Method, url: &str, user_agent: &str, attempt: u32) -> Self {
        let (host, resource) = match url::Url::parse(url) {
            Ok(parsed) => {
                let mut resource = parsed.path().to_string();
                if let Some(query) = parsed.query() {
                    resource.push('?');
                    resource.push_str(query);
                }
                (parsed.host_str().unwrap_or("-").to_string(), resource)
            }
            Err(_) => ("-".to_string(), url.to_string()),
        };

        Self {
            host,
            user_agent: user_agent.to_string(),
            timestamp: Utc::now(),
            method: method.clone(),
            resource,
            version: None,
            status: None,
            response_size: None,
            attempt,
            error: None,
        }
    }
}

impl fmt::Display for RequestLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - [{}] \"{} {} HTTP/{}\" ",
            self.host,
            self.user_agent,
            self.timestamp.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.resource,
            protocol_version(self.version),
        )?;
        match self.status {
            Some(status) => write!(f, "{}", status.as_u16())?,
            None => f.write_str("-")?,
        }
        match self.response_size {
            Some(size) => write!(f, " {size}"),
            None => f.write_str(" -"),
        }
    }
}

fn protocol_version(version: Option<Version>) -> &'static str {
    match version {
        Some(Version::HTTP_09) => "0.9",
        Some(Version::HTTP_10) => "1.0",
        Some(Version::HTTP_2) => "2.0",
        Some(Version::HTTP_3) => "3.0",
        _ => "1.1",
    }
}

/// Receives one entry per HTTP attempt.
pub trait RequestLogger: Send + Sync {
    fn log(&self, entry: &RequestLogEntry);
}

/// Forwards entries to `tracing` under the `syrup::http` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRequestLogger;

impl RequestLogger for TracingRequestLogger {
    fn log(&self, entry: &RequestLogEntry) {
        match &entry.error {
            Some(error) => tracing::info!(
                target: "syrup::http",
                attempt = entry.attempt,
                error = %error,
                "{entry}"
            ),
            None => tracing::info!(target: "syrup::http", attempt = entry.attempt, "{entry}"),
        }
    }
}
