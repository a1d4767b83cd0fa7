//! Startup errors.

use thiserror::Error;
use ticket_gate_core::{IdentityError, RegistryError};

/// Errors that stop the gate from starting.
#[derive(Error, Debug)]
pub enum GateError {
    /// A configured scan code field is invalid.
    #[error("Invalid configuration: {0}")]
    Identity(#[from] IdentityError),

    /// The ticket registry could not be prepared.
    #[error("Ticket registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The Prometheus exporter could not be installed.
    #[error("Metrics exporter error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// A socket, device or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configured address is not `host:port`.
    #[error("Invalid address {0}")]
    Address(String),
}
