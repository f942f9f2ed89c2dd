//! Conversions from external infrastructure errors into domain errors.

use std::error::Error as _;

use reqwest::Error as HttpError;
use syrup_domain::SyrupError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SyrupError);

impl From<InfraError> for SyrupError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SyrupError> for InfraError {
    fn from(value: SyrupError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SyrupError */
/* -------------------------------------------------------------------------- */

/// Request-building failures become `Config`; everything else that stops a
/// request from completing becomes a transient `Network` error.
impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let detail = error_chain(&value);

        if value.is_builder() {
            return InfraError(SyrupError::Config(format!("invalid HTTP request: {detail}")));
        }

        if value.is_timeout() {
            return InfraError(SyrupError::Network(format!("HTTP request timed out: {detail}")));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if value.is_connect() {
            return InfraError(SyrupError::Network(format!("HTTP connection failure: {detail}")));
        }

        if value.is_body() || value.is_decode() {
            return InfraError(SyrupError::Network(format!(
                "failed to read HTTP response body: {detail}"
            )));
        }

        InfraError(SyrupError::Network(detail))
    }
}

/// Render an error with its source chain; reqwest hides the DNS/connect
/// cause behind `source()`.
fn error_chain(err: &HttpError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::time::Duration;

    use reqwest::Client;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn connection_refused_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

        let mapped: SyrupError = InfraError::from(error).into();
        match mapped {
            SyrupError::Network(msg) => assert!(msg.contains("connection")),
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn timeout_maps_to_transient_network_error() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client =
            Client::builder().no_proxy().timeout(Duration::from_millis(50)).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();

        let mapped: SyrupError = InfraError::from(error).into();
        assert!(matches!(mapped, SyrupError::Network(ref msg) if msg.contains("timed out")));
        assert!(mapped.is_transient());
    }

    #[tokio::test]
    async fn invalid_url_maps_to_config_error() {
        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get("asdfghjkl/queue/job/123").send().await.unwrap_err();

        let mapped: SyrupError = InfraError::from(error).into();
        assert!(matches!(mapped, SyrupError::Config(_)), "got {mapped:?}");
        assert!(!mapped.is_transient());
    }
}
