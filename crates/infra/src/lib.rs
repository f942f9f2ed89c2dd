//! # Syrup Infrastructure
//!
//! The I/O side of the Syrup job API client.
//!
//! This crate contains:
//! - The HTTP transport seam and its reqwest implementation
//! - The retrying HTTP client with per-attempt request logging
//! - The [`SyrupClient`] job lifecycle client and auxiliary calls
//! - Configuration loading from environment variables and files
//!
//! ## Architecture
//! - Data types, errors and policies come from `syrup-domain`
//! - Contains all "impure" code (network, clock, filesystem)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod uri;

// Re-export commonly used items
pub use api::{PollState, SyrupClient, SyrupClientBuilder};
pub use errors::InfraError;
pub use http::*;
