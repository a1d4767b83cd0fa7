//! # Ticket Gate
//!
//! Check-in application for NFT event tickets: wires the verification
//! protocol of `ticket-gate-core` to a ticket registry and exposes it to
//! gate operators.
//!
//! ## Binaries
//!
//! - `server`: HTTP API shared by every check-in device at the venue
//! - `console`: a single operator station on the terminal, reading codes
//!   from a hand-held reader or typed input
//!
//! ## Startup
//!
//! ```text
//! .env ──► Config::from_env ──► ResourceManager::from_config
//!                                   │
//!                 ┌─────────────────┴─────────────────┐
//!                 ▼                                   ▼
//!     build_router(app_state())            Console::new(station(), scanner())
//! ```
//!
//! Without `DATABASE_URL` the registry lives in memory; set
//! `GATE_SEED_DEMO=true` to issue the demo tickets `12345` (unused) and
//! `12346` (already checked in).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod console;
pub mod device;
pub mod error;
pub mod metrics;
pub mod resources;
pub mod server;

pub use config::Config;
pub use console::{Command, Console};
pub use device::DeviceCamera;
pub use error::GateError;
pub use resources::ResourceManager;
