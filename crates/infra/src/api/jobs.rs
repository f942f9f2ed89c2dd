//! Job creation, lookup, listing and kill

use reqwest::Method;
use serde_json::Value;
use syrup_domain::{Job, JobId, JobOptions, ListJobsQuery, Result};
use tracing::{debug, instrument};

use super::client::SyrupClient;
use crate::uri;

impl SyrupClient {
    /// Create a job for `component` without waiting for it.
    ///
    /// `POST {url}/{super?}/{component}/run[/tag/{tag}]`. The response is
    /// returned as-is; it is not checked for an `id`.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    pub async fn create_job(&self, component: &str, options: &JobOptions) -> Result<Job> {
        let path = format!("{}/run", component.trim_matches('/'));
        self.create_async_job(&path, Method::POST, options).await
    }

    /// Create a job at an arbitrary component path.
    ///
    /// `{method} {url}/{super?}/{path}[/tag/{tag}]` with the merged body of
    /// `options`.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged;
    /// `SyrupError::InvalidResponse` if the response is not a JSON object.
    #[instrument(skip_all, fields(path = %path, method = %method))]
    pub async fn create_async_job(
        &self,
        path: &str,
        method: Method,
        options: &JobOptions,
    ) -> Result<Job> {
        let mut url = self.component_url(&self.config.url, path, &[]);
        if let Some(tag) = options.tag.as_deref().filter(|tag| !tag.is_empty()) {
            url = uri::join(&url, &["tag", tag]);
        }

        let body = Value::Object(options.request_body());
        debug!(url = %url, "creating job");
        let created = self.send_json(method, url, Some(&body)).await?;
        Job::try_from(created)
    }

    /// Fetch the current snapshot of a job.
    ///
    /// `GET {queue_url}/queue/job/{id}`
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged;
    /// `SyrupError::InvalidResponse` if the response is not a JSON object.
    pub async fn get_job(&self, id: &JobId) -> Result<Job> {
        let id = uri::segment(&id.to_string());
        let url = self.queue_url(&["queue", "job", &id]);
        Job::try_from(self.get_json(url).await?)
    }

    /// Ask the queue to terminate a job.
    ///
    /// `POST {queue_url}/queue/jobs/{id}/kill`; returns the decoded
    /// acknowledgement.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    #[instrument(skip_all, fields(job_id = %id))]
    pub async fn kill_job(&self, id: &JobId) -> Result<Value> {
        let id = uri::segment(&id.to_string());
        let url = self.queue_url(&["queue", "jobs", &id, "kill"]);
        self.send_json::<Value>(Method::POST, url, None).await
    }

    /// Search the job queue.
    ///
    /// `GET {queue_url}/queue/jobs?q=&limit=&offset=`; returns the decoded
    /// JSON array.
    ///
    /// # Errors
    /// Transport, HTTP and decode errors are returned unchanged.
    pub async fn list_jobs(&self, query: &ListJobsQuery) -> Result<Value> {
        let url = uri::with_query(
            &self.queue_url(&["queue", "jobs"]),
            &[
                ("q", query.q.clone()),
                ("limit", query.limit.to_string()),
                ("offset", query.offset.to_string()),
            ],
        );
        self.get_json(url).await
    }
}
