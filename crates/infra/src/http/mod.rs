//! HTTP plumbing: transport seam, retrying client, request logging.

pub mod client;
pub mod decode;
pub mod delay;
pub mod logging;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use decode::decode_json;
pub use delay::{exponential_backoff, Sleeper, TokioSleeper};
pub use logging::{RequestLogEntry, RequestLogger, TracingRequestLogger};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
