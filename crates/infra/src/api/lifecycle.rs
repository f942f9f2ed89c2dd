//! Job lifecycle: create, then poll until the job reaches a finished status
//!
//! The poll loop itself has no attempt ceiling. It is bounded by
//! `PollPolicy::timeout_secs` (yielding `SyrupError::PollTimeout`) and by an
//! optional `CancellationToken` (yielding `SyrupError::Cancelled`). Transport
//! retries happen inside every single poll, before the loop's own delay.

use std::future::Future;
use std::time::Duration;

use reqwest::Method;
use syrup_domain::{Job, JobId, JobOptions, PollPolicy, Result, SyrupError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::client::SyrupClient;

/// Progress of one poll loop; local to a single `run_*` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollState {
    /// Polls that reported a non-finished status
    pub attempts: u32,
    /// Sum of all delays slept so far
    pub total_delay: Duration,
}

impl PollState {
    /// Record another unfinished poll and return the delay before the next.
    pub fn advance(&mut self, policy: &PollPolicy) -> Duration {
        self.attempts = self.attempts.saturating_add(1);
        let delay = policy.delay_for_attempt(self.attempts);
        self.total_delay = self.total_delay.saturating_add(delay);
        delay
    }
}

impl SyrupClient {
    /// Run a component job and wait until it finishes.
    ///
    /// Returns the first job snapshot whose status is in the finished set.
    /// A finished job may still carry `status: "error"`; that is a result,
    /// not an `Err`.
    ///
    /// # Errors
    /// - `SyrupError::InvalidResponse` if the create response has no `id`
    ///   (no poll is made) or a polled job has no `status`
    /// - `SyrupError::PollTimeout` when the poll deadline elapses
    /// - transport, HTTP and decode errors from any request
    pub async fn run_job(&self, component: &str, options: &JobOptions) -> Result<Job> {
        self.run_job_with_cancellation(component, options, &CancellationToken::new()).await
    }

    /// [`run_job`](Self::run_job) that stops with `SyrupError::Cancelled`
    /// once `cancel` fires, including during in-flight requests and sleeps.
    #[instrument(skip_all, fields(component = %component))]
    pub async fn run_job_with_cancellation(
        &self,
        component: &str,
        options: &JobOptions,
        cancel: &CancellationToken,
    ) -> Result<Job> {
        let created = cancellable(cancel, self.create_job(component, options)).await??;
        self.wait_for_job(&created, cancel).await
    }

    /// Create a job at an arbitrary path/method and wait until it finishes.
    ///
    /// # Errors
    /// Same as [`run_job`](Self::run_job).
    pub async fn run_async_action(
        &self,
        path: &str,
        method: Method,
        options: &JobOptions,
    ) -> Result<Job> {
        self.run_async_action_with_cancellation(path, method, options, &CancellationToken::new())
            .await
    }

    /// Cancellable [`run_async_action`](Self::run_async_action).
    #[instrument(skip_all, fields(path = %path, method = %method))]
    pub async fn run_async_action_with_cancellation(
        &self,
        path: &str,
        method: Method,
        options: &JobOptions,
        cancel: &CancellationToken,
    ) -> Result<Job> {
        let created = cancellable(cancel, self.create_async_job(path, method, options)).await??;
        self.wait_for_job(&created, cancel).await
    }

    async fn wait_for_job(&self, created: &Job, cancel: &CancellationToken) -> Result<Job> {
        let id = created.id().ok_or_else(SyrupError::invalid_response)?;

        match self.config.poll.timeout() {
            Some(limit) => tokio::time::timeout(limit, self.poll_until_finished(&id, cancel))
                .await
                .map_err(|_| SyrupError::PollTimeout { job_id: id.to_string(), timeout: limit })?,
            None => self.poll_until_finished(&id, cancel).await,
        }
    }

    async fn poll_until_finished(&self, id: &JobId, cancel: &CancellationToken) -> Result<Job> {
        let policy = &self.config.poll;
        let mut state = PollState::default();

        loop {
            let job = cancellable(cancel, self.get_job(id)).await??;
            let status = job
                .status()
                .ok_or_else(|| SyrupError::InvalidResponse(format!("Job {id} has no status.")))?;

            if policy.is_finished(status) {
                info!(
                    job_id = %id,
                    status,
                    polls = state.attempts + 1,
                    waited_secs = state.total_delay.as_secs(),
                    "job finished"
                );
                return Ok(job);
            }

            let delay = state.advance(policy);
            debug!(
                job_id = %id,
                status,
                attempt = state.attempts,
                delay_secs = delay.as_secs(),
                "job not finished yet"
            );
            cancellable(cancel, self.sleeper.sleep(delay)).await?;
        }
    }
}

/// Race `future` against `cancel`.
async fn cancellable<F: Future>(cancel: &CancellationToken, future: F) -> Result<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SyrupError::Cancelled),
        output = future => Ok(output),
    }
}
