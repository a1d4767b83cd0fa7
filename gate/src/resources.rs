//! Resource management for gate startup.
//!
//! Centralizes infrastructure initialization into a single
//! [`ResourceManager`]:
//!
//! 1. Resolve the venue from configuration
//! 2. Connect the registry (`PostgreSQL` with migrations, or in-memory)
//! 3. Seed the demo tickets when asked to
//!
//! # Example
//!
//! ```rust,ignore
//! let config = Config::from_env();
//! let resources = ResourceManager::from_config(&config).await?;
//!
//! let app = build_router(resources.app_state());
//! ```

use crate::config::Config;
use crate::device::DeviceCamera;
use crate::error::GateError;
use std::sync::Arc;
use std::time::Duration;
use ticket_gate_core::{
    CheckInCoordinator, Clock, EventId, GateStation, NewTicket, OwnerAddress, RegistryError,
    RetryPolicy, Scanner, SystemClock, TicketId, TicketRegistry, VenueContext, VerificationEngine,
};
use ticket_gate_postgres::PostgresTicketRegistry;
use ticket_gate_testing::InMemoryTicketRegistry;
use ticket_gate_web::AppState;
use tracing::info;

/// Holder of the demo tickets.
pub const DEMO_OWNER: &str = "0x1234...5678";

/// Central resource manager for the gate.
///
/// All resources are wrapped in `Arc` so the HTTP server and the console
/// share one registry.
#[derive(Clone)]
pub struct ResourceManager {
    /// Application configuration
    pub config: Arc<Config>,
    /// The venue this gate admits tickets for
    pub venue: VenueContext,
    /// Authoritative ticket store
    pub registry: Arc<dyn TicketRegistry>,
    /// Clock stamping check-ins
    pub clock: Arc<dyn Clock>,
}

impl ResourceManager {
    /// Initialize all resources from configuration.
    ///
    /// # Errors
    ///
    /// - [`GateError::Identity`]: the configured venue is invalid
    /// - [`GateError::Registry`]: the database is unreachable, migrations
    ///   failed or demo seeding failed
    pub async fn from_config(config: &Config) -> Result<Self, GateError> {
        let venue = config.venue()?;
        info!(
            contract_address = %venue.contract_address,
            network_id = %venue.network_id,
            "Venue configured"
        );

        let registry: Arc<dyn TicketRegistry> = match &config.registry.database_url {
            Some(url) => {
                info!("Connecting ticket registry to PostgreSQL...");
                let registry = PostgresTicketRegistry::connect(
                    url,
                    config.registry.max_connections,
                    Duration::from_secs(config.registry.connect_timeout),
                )
                .await?;
                registry.migrate().await?;
                info!("PostgreSQL ticket registry ready");
                Arc::new(registry)
            }
            None => {
                info!("No DATABASE_URL set, using the in-memory ticket registry");
                Arc::new(InMemoryTicketRegistry::new())
            }
        };

        let resources = Self::new(Arc::new(config.clone()), venue, registry, Arc::new(SystemClock));

        if config.registry.seed_demo {
            resources.seed_demo().await?;
        }

        Ok(resources)
    }

    /// Assemble resources from parts.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        venue: VenueContext,
        registry: Arc<dyn TicketRegistry>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            venue,
            registry,
            clock,
        }
    }

    /// Issue the demo tickets at this venue: `12345` unused and `12346`
    /// already checked in. Tickets that already exist are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Registry`] if the registry rejects a write for a
    /// reason other than the ticket already existing.
    pub async fn seed_demo(&self) -> Result<(), GateError> {
        let workshop = self.demo_ticket("12345", "0", "Base Workshop Meet 3")?;
        let conference = self.demo_ticket("12346", "1", "Base Developer Conference")?;
        let conference_identity = conference.identity.clone();

        for ticket in [workshop, conference] {
            match self.registry.issue(ticket).await {
                Ok(ticket) => info!(ticket = %ticket.identity, "Seeded demo ticket"),
                Err(RegistryError::AlreadyIssued(identity)) => {
                    info!(ticket = %identity, "Demo ticket already present");
                }
                Err(e) => return Err(e.into()),
            }
        }

        match self.registry.mark_used(&conference_identity, self.clock.now()).await {
            Ok(_) | Err(RegistryError::AlreadyUsed { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn demo_ticket(
        &self,
        ticket_id: &str,
        event_id: &str,
        event_name: &str,
    ) -> Result<NewTicket, GateError> {
        Ok(NewTicket {
            identity: self.venue.identity_for(TicketId::parse(ticket_id)?),
            owner: OwnerAddress::new(DEMO_OWNER),
            event_id: EventId::new(event_id),
            event_name: event_name.to_string(),
        })
    }

    /// Lookup retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry_policy()
    }

    /// HTTP handler state over these resources.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.registry),
            self.venue.clone(),
            Arc::clone(&self.clock),
            self.retry_policy(),
        )
    }

    /// A fresh operator station over these resources.
    #[must_use]
    pub fn station(&self) -> GateStation {
        let engine = VerificationEngine::new(Arc::clone(&self.registry), self.venue.clone())
            .with_retry_policy(self.retry_policy());
        let coordinator = CheckInCoordinator::new(Arc::clone(&self.registry), Arc::clone(&self.clock));
        GateStation::new(Arc::new(engine), Arc::new(coordinator))
    }

    /// Scanner over the configured code reader, if any.
    #[must_use]
    pub fn scanner(&self) -> Option<Scanner> {
        self.config
            .scanner
            .device
            .as_ref()
            .map(|path| Scanner::new(Arc::new(DeviceCamera::new(path))))
    }
}
