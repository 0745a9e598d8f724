//! Contractor certificate tracking and compliance scoring for industrial sites.
//!
//! [`compliance`] holds the engine, its collaborators and the HTTP router;
//! [`config`], [`telemetry`] and [`error`] carry the process-level plumbing
//! shared with the API service.

pub mod compliance;
pub mod config;
pub mod error;
pub mod telemetry;

pub use error::AppError;
