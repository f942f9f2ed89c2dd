//! Domain type definitions

pub mod job;
pub mod request;

pub use job::{Job, JobId};
pub use request::{JobOptions, ListJobsQuery, ResolveConfigurationRequest};
