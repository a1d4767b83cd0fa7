//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by domain.

pub mod check_in;
pub mod health;
pub mod tickets;
pub mod verify;

// Re-export common handler utilities
pub use health::{health_check, readiness_check};
