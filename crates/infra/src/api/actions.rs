//! Single-shot calls: sync actions, encryption, stats, configuration resolve

use chrono::{Local, NaiveDate};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::{json, Value};
use syrup_domain::constants::TEXT_CONTENT_TYPE;
use syrup_domain::{ResolveConfigurationRequest, Result};
use tracing::instrument;

use super::client::SyrupClient;
use crate::http::HttpRequest;
use crate::uri;

impl SyrupClient {
    /// Run a synchronous component action and return its decoded response.
    ///
    /// `POST {sync_base_url}/{super?}/{component}/action/{action}` with body
    /// `{"configData": ...}`. No job is created and nothing is polled.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    #[instrument(skip_all, fields(component = %component, action = %action))]
    pub async fn run_sync_action(
        &self,
        sync_base_url: &str,
        component: &str,
        action: &str,
        config_data: Value,
    ) -> Result<Value> {
        let url = self.component_url(sync_base_url, component, &["action", action]);
        let body = json!({ "configData": config_data });
        self.send_json(Method::POST, url, Some(&body)).await
    }

    /// Encrypt a plain string for a component.
    ///
    /// Sent as `text/plain` to `{url}/{super?}/{component}[/{path}]/encrypt`;
    /// the ciphertext comes back as raw text.
    ///
    /// # Errors
    /// Transport and HTTP errors are returned unchanged.
    pub async fn encrypt_string(
        &self,
        component: &str,
        text: &str,
        path: Option<&str>,
    ) -> Result<String> {
        let request = HttpRequest::new(Method::POST, self.encrypt_url(component, path))
            .with_header(CONTENT_TYPE, TEXT_CONTENT_TYPE)?
            .with_body(text.as_bytes());
        let response = self.http.send(request).await?;
        Ok(response.text())
    }

    /// Encrypt the secret values of a JSON mapping for a component.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    pub async fn encrypt_array(
        &self,
        component: &str,
        data: &Value,
        path: Option<&str>,
    ) -> Result<Value> {
        let url = self.encrypt_url(component, path);
        self.send_json(Method::POST, url, Some(data)).await
    }

    /// Project usage statistics: `GET {url}/docker/stats/project`.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    pub async fn get_stats(&self) -> Result<Value> {
        self.get_json(self.api_url(&["docker", "stats", "project"])).await
    }

    /// Daily project statistics between two dates, in the local time zone.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    pub async fn get_stats_daily(&self, from: NaiveDate, to: NaiveDate) -> Result<Value> {
        let url = uri::with_query(
            &self.api_url(&["docker", "stats", "project", "daily"]),
            &[
                ("fromDate", from.format("%Y-%m-%d").to_string()),
                ("toDate", to.format("%Y-%m-%d").to_string()),
                ("timezoneOffset", local_utc_offset()),
            ],
        );
        self.get_json(url).await
    }

    /// Resolve a stored configuration with its variables.
    ///
    /// `POST {url}/docker/configuration/resolve`
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    #[instrument(skip_all, fields(component = %request.component_id, config = %request.config_id))]
    pub async fn resolve_configuration(
        &self,
        request: &ResolveConfigurationRequest,
    ) -> Result<Value> {
        let url = self.api_url(&["docker", "configuration", "resolve"]);
        self.send_json(Method::POST, url, Some(request)).await
    }

    fn encrypt_url(&self, component: &str, path: Option<&str>) -> String {
        self.component_url(&self.config.url, component, &[path.unwrap_or_default(), "encrypt"])
    }
}

/// Local UTC offset as `+HH:MM`.
pub(crate) fn local_utc_offset() -> String {
    Local::now().format("%:z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_offset_has_sign_hours_and_minutes() {
        let offset = local_utc_offset();
        assert_eq!(offset.len(), 6, "unexpected offset {offset}");
        assert!(offset.starts_with('+') || offset.starts_with('-'));
        assert_eq!(&offset[3..4], ":");
    }
}
