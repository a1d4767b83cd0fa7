//! HTTP API for Ticket Gate.
//!
//! Exposes verification and check-in over HTTP so several check-in devices
//! can share one ticket registry.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract data** from the request (JSON body, path)
//! 3. **Call** the verification engine, check-in coordinator or registry
//! 4. **Map** the verdict or domain error to an HTTP response
//!
//! # Example
//!
//! ```ignore
//! use ticket_gate_web::{AppState, build_router};
//!
//! let state = AppState::new(registry, venue, Arc::new(SystemClock), RetryPolicy::default());
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
