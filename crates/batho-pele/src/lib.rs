//! Patient intake, eligibility and resource tooling for public hospitals.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
