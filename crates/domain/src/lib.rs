//! # Syrup Domain
//!
//! Data types and policies for the Syrup job API client.
//!
//! This crate contains:
//! - The error taxonomy and Result definition
//! - Client configuration and the job polling policy
//! - Job snapshots and request option types
//! - Wire-level constants
//!
//! ## Architecture
//! - No dependencies on other Syrup crates
//! - No I/O; everything here is plain data and pure functions

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
