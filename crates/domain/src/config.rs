//! Configuration management

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_BACKOFF_MAX_TRIES, DEFAULT_POLL_MAX_DELAY_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_USER_AGENT,
    JOB_FINISHED_STATUSES, MAX_POLL_BACKOFF_EXPONENT, USER_AGENT_SEPARATOR,
};
use crate::errors::{Result, SyrupError};

/// Client configuration
///
/// Built once before the client is constructed and never mutated afterwards.
/// Every field has a default, so partial JSON/TOML files are accepted.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the job API
    pub url: String,
    /// Base URL of the job queue; falls back to `url`
    pub queue_url: Option<String>,
    /// API token sent with every request
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Run id propagated to the backend
    pub run_id: Option<String>,
    /// Parent component namespace inserted into component paths
    #[serde(rename = "super")]
    pub super_component: Option<String>,
    /// Suffix appended to the default user agent
    pub user_agent: Option<String>,
    /// Transport retries on 5xx/network errors (after the first attempt)
    pub backoff_max_tries: u32,
    /// Base delay between transport retries
    pub retry_base_delay_ms: u64,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Route requests through the proxies named by `HTTP_PROXY`/`HTTPS_PROXY`
    pub use_system_proxy: bool,
    /// Job polling policy
    pub poll: PollPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            queue_url: None,
            token: None,
            run_id: None,
            super_component: None,
            user_agent: None,
            backoff_max_tries: DEFAULT_BACKOFF_MAX_TRIES,
            retry_base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            use_system_proxy: true,
            poll: PollPolicy::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("queue_url", &self.queue_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("run_id", &self.run_id)
            .field("super_component", &self.super_component)
            .field("user_agent", &self.user_agent)
            .field("backoff_max_tries", &self.backoff_max_tries)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("use_system_proxy", &self.use_system_proxy)
            .field("poll", &self.poll)
            .finish()
    }
}

impl ClientConfig {
    /// Create a configuration for the default API with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), ..Self::default() }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_queue_url(mut self, url: impl Into<String>) -> Self {
        self.queue_url = Some(url.into());
        self
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_super(mut self, component: impl Into<String>) -> Self {
        self.super_component = Some(component.into());
        self
    }

    pub fn with_user_agent(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent = Some(suffix.into());
        self
    }

    /// Configure how many times a failed request is retried.
    pub fn with_backoff_max_tries(mut self, tries: u32) -> Self {
        self.backoff_max_tries = tries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Send requests directly, ignoring proxy environment variables, when
    /// `enabled` is false.
    pub fn with_system_proxy(mut self, enabled: bool) -> Self {
        self.use_system_proxy = enabled;
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Base URL for queue endpoints.
    pub fn queue_base_url(&self) -> &str {
        self.queue_url.as_deref().filter(|url| !url.is_empty()).unwrap_or(&self.url)
    }

    /// Non-empty parent component namespace, if configured.
    pub fn super_segment(&self) -> Option<&str> {
        self.super_component.as_deref().filter(|s| !s.is_empty())
    }

    /// Full `User-Agent` value: the default plus the optional suffix.
    pub fn user_agent_header(&self) -> String {
        match self.user_agent.as_deref().filter(|s| !s.is_empty()) {
            Some(suffix) => format!("{DEFAULT_USER_AGENT}{USER_AGENT_SEPARATOR}{suffix}"),
            None => DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate URLs and numeric settings.
    ///
    /// # Errors
    /// Returns `SyrupError::Config` if a base URL is not an absolute
    /// http(s) URL or the request timeout is zero.
    pub fn validate(&self) -> Result<()> {
        validate_base_url("url", &self.url)?;
        if let Some(queue_url) = self.queue_url.as_deref().filter(|url| !url.is_empty()) {
            validate_base_url("queue_url", queue_url)?;
        }
        if self.request_timeout_secs == 0 {
            return Err(SyrupError::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| SyrupError::Config(format!("Invalid {field} '{value}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(SyrupError::Config(format!("Unsupported {field} scheme '{other}'"))),
    }
}

/// Policy driving the create -> poll -> finished loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollPolicy {
    /// Upper bound for the delay between two polls
    pub max_delay_secs: u64,
    /// Statuses that end the poll loop
    pub finished_statuses: Vec<String>,
    /// Deadline for the whole poll loop; unbounded when `None`
    pub timeout_secs: Option<u64>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_delay_secs: DEFAULT_POLL_MAX_DELAY_SECS,
            finished_statuses: JOB_FINISHED_STATUSES.iter().map(ToString::to_string).collect(),
            timeout_secs: None,
        }
    }
}

impl PollPolicy {
    /// Cap the delay between polls. Sub-second parts round up to the next
    /// whole second, so `1500ms` becomes `2s`.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay_secs = whole_secs_rounded_up(max_delay);
        self
    }

    /// Deadline for the whole poll loop. Sub-second parts round up to the
    /// next whole second, so a nonzero timeout never becomes zero.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(whole_secs_rounded_up(timeout));
        self
    }

    pub fn with_finished_statuses<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.finished_statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `status` ends the poll loop.
    pub fn is_finished(&self, status: &str) -> bool {
        self.finished_statuses.iter().any(|finished| finished == status)
    }

    /// Delay before the next poll: `min(2^attempt, max_delay)` seconds.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(MAX_POLL_BACKOFF_EXPONENT);
        let seconds = 1u64 << exponent;
        Duration::from_secs(seconds.min(self.max_delay_secs))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn whole_secs_rounded_up(duration: Duration) -> u64 {
    duration.as_secs().saturating_add(u64::from(duration.subsec_nanos() > 0))
}
