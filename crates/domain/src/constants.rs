//! Client constants
//!
//! Defaults and wire-level names shared by the domain and infrastructure
//! crates.

// Endpoint defaults
pub const DEFAULT_API_URL: &str = "https://syrup.keboola.com";
pub const DEFAULT_USER_AGENT: &str = "Syrup Rust Client";
pub const USER_AGENT_SEPARATOR: &str = " - ";

// Transport retry configuration
pub const DEFAULT_BACKOFF_MAX_TRIES: u32 = 11;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest shift applied to the transport retry delay (base * 2^8)
pub const MAX_RETRY_BACKOFF_SHIFT: u32 = 8;

// Job polling configuration
pub const DEFAULT_POLL_MAX_DELAY_SECS: u64 = 10;
pub const JOB_FINISHED_STATUSES: [&str; 5] =
    ["cancelled", "canceled", "success", "error", "terminated"];

/// Maximum exponent for the poll backoff calculation to prevent overflow
pub const MAX_POLL_BACKOFF_EXPONENT: u32 = 30;

// Request headers (lowercase, usable as static header names)
pub const TOKEN_HEADER: &str = "x-auth-token";
pub const RUN_ID_HEADER: &str = "x-run-id";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain";

// Job listing
pub const DEFAULT_LIST_JOBS_LIMIT: u32 = 100;

/// Longest response body kept on an HTTP error
pub const MAX_ERROR_BODY_CHARS: usize = 1024;
