//! Syrup job API client
//!
//! [`SyrupClient`] builds requests for the job API, decodes the JSON
//! responses and drives the create -> poll -> finished job lifecycle.
//!
//! # Layout
//!
//! - `client`: construction and the shared request/decode helpers
//! - `jobs`: job creation, lookup, listing and kill
//! - `lifecycle`: the polling state machine (`run_job`, `run_async_action`)
//! - `actions`: sync actions, encryption, stats and configuration resolve

pub mod actions;
pub mod client;
pub mod jobs;
pub mod lifecycle;

pub use client::{SyrupClient, SyrupClientBuilder};
pub use lifecycle::PollState;
