//! Example: Running a component job and waiting for the result
//!
//! Loads the client configuration from `SYRUP_*` environment variables (or
//! `syrup.json`/`syrup.toml`), runs a job and prints the final job record.
//! Press Ctrl-C to stop waiting.
//!
//! # Usage
//!
//! ```bash
//! export SYRUP_TOKEN=your-storage-token
//! export SYRUP_SUPER=docker
//! cargo run -p syrup-infra --example run_job -- keboola.ex-db-snowflake 123
//! ```

use std::sync::Arc;

use syrup_domain::JobOptions;
use syrup_infra::{config, SyrupClient, TracingRequestLogger};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let component = args.next().ok_or("usage: run_job <component> [config-id]")?;
    let mut options = JobOptions::new();
    if let Some(config_id) = args.next() {
        options = options.with_config(config_id);
    }

    let client = SyrupClient::builder()
        .config(config::load()?)
        .logger(Arc::new(TracingRequestLogger))
        .build()?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let job = client.run_job_with_cancellation(&component, &options, &cancel).await?;
    println!("{}", serde_json::to_string_pretty(&job)?);

    Ok(())
}
