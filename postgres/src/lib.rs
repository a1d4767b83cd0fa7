//! `PostgreSQL` ticket registry for Ticket Gate.
//!
//! This crate provides a PostgreSQL-backed implementation of the
//! `TicketRegistry` trait from `ticket-gate-core`. It uses sqlx runtime
//! queries and supports:
//!
//! - Lookup by identity triple (primary key)
//! - Atomic check-in as a single conditional `UPDATE ... WHERE used_at IS NULL`
//! - Duplicate-safe minting (`ON CONFLICT DO NOTHING`)
//! - Owner listing backed by an index
//! - Connection pooling
//!
//! # Example
//!
//! ```ignore
//! use ticket_gate_postgres::PostgresTicketRegistry;
//! use std::time::Duration;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry =
//!         PostgresTicketRegistry::connect("postgres://localhost/tickets", 10, Duration::from_secs(5))
//!             .await?;
//!     registry.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::{Duration, Instant};
use ticket_gate_core::{
    EventId, NewTicket, OwnerAddress, RegistryError, RegistryFuture, Ticket, TicketIdentity,
    TicketRegistry,
};

const TICKET_COLUMNS: &str =
    "ticket_id, contract_address, network_id, owner_address, event_id, event_name, used_at";

/// `PostgreSQL`-based ticket registry.
///
/// Clones share the connection pool.
#[derive(Clone, Debug)]
pub struct PostgresTicketRegistry {
    pool: PgPool,
}

impl PostgresTicketRegistry {
    /// Connect to the database with a fresh pool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] if the connection fails.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        connect_timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| RegistryError::Unavailable(format!("Failed to connect: {e}")))?;

        tracing::info!(max_connections, "Connected ticket registry to PostgreSQL");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations for the tickets table.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] if migration fails.
    pub async fn migrate(&self) -> Result<(), RegistryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RegistryError::Unavailable(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find(&self, identity: &TicketIdentity) -> Result<Option<Ticket>, RegistryError> {
        let started = Instant::now();
        let row = sqlx::query(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE ticket_id = $1 AND contract_address = $2 AND network_id = $3"
        ))
        .bind(identity.ticket_id().as_str())
        .bind(identity.contract_address().as_str())
        .bind(identity.network_id().as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        record_duration("lookup", started);

        row.as_ref().map(row_to_ticket).transpose()
    }

    async fn consume(
        &self,
        identity: &TicketIdentity,
        at: DateTime<Utc>,
    ) -> Result<Ticket, RegistryError> {
        let started = Instant::now();
        let row = sqlx::query(&format!(
            "UPDATE tickets SET used_at = $4
             WHERE ticket_id = $1 AND contract_address = $2 AND network_id = $3
               AND used_at IS NULL
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(identity.ticket_id().as_str())
        .bind(identity.contract_address().as_str())
        .bind(identity.network_id().as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;
        record_duration("mark_used", started);

        if let Some(row) = row {
            return row_to_ticket(&row);
        }

        // The conditional update matched nothing: tell "never minted" from "consumed".
        match self.find(identity).await? {
            None => Err(RegistryError::NotFound(identity.clone())),
            Some(Ticket {
                used_at: Some(used_at),
                ..
            }) => Err(RegistryError::AlreadyUsed {
                identity: identity.clone(),
                used_at,
            }),
            Some(_) => Err(RegistryError::Unavailable(format!(
                "conditional update of {identity} matched no row"
            ))),
        }
    }

    async fn insert(&self, ticket: NewTicket) -> Result<Ticket, RegistryError> {
        let row = sqlx::query(&format!(
            "INSERT INTO tickets
                (ticket_id, contract_address, network_id, owner_address, event_id, event_name)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT DO NOTHING
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(ticket.identity.ticket_id().as_str())
        .bind(ticket.identity.contract_address().as_str())
        .bind(ticket.identity.network_id().as_str())
        .bind(ticket.owner.as_str())
        .bind(ticket.event_id.as_str())
        .bind(&ticket.event_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        let Some(row) = row else {
            return Err(RegistryError::AlreadyIssued(ticket.identity));
        };

        tracing::info!(ticket = %ticket.identity, owner = %ticket.owner, "Issued ticket");
        metrics::counter!("ticket_gate_tickets_issued_total").increment(1);
        row_to_ticket(&row)
    }

    async fn owned_by(&self, owner: &OwnerAddress) -> Result<Vec<Ticket>, RegistryError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {TICKET_COLUMNS} FROM tickets
             WHERE owner_address = $1
             ORDER BY ticket_id COLLATE "C", contract_address COLLATE "C", network_id COLLATE "C""#
        ))
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        rows.iter().map(row_to_ticket).collect()
    }
}

impl TicketRegistry for PostgresTicketRegistry {
    fn lookup<'a>(&'a self, identity: &'a TicketIdentity) -> RegistryFuture<'a, Option<Ticket>> {
        Box::pin(self.find(identity))
    }

    fn mark_used<'a>(
        &'a self,
        identity: &'a TicketIdentity,
        at: DateTime<Utc>,
    ) -> RegistryFuture<'a, Ticket> {
        Box::pin(self.consume(identity, at))
    }

    fn issue(&self, ticket: NewTicket) -> RegistryFuture<'_, Ticket> {
        Box::pin(self.insert(ticket))
    }

    fn tickets_owned_by<'a>(&'a self, owner: &'a OwnerAddress) -> RegistryFuture<'a, Vec<Ticket>> {
        Box::pin(self.owned_by(owner))
    }

    fn ping(&self) -> RegistryFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;
            Ok(())
        })
    }
}

#[allow(clippy::needless_pass_by_value)] // Used as a map_err adapter
fn unavailable(err: sqlx::Error) -> RegistryError {
    tracing::warn!(error = %err, "Ticket registry query failed");
    RegistryError::Unavailable(err.to_string())
}

fn record_duration(operation: &'static str, started: Instant) {
    metrics::histogram!("ticket_gate_registry_query_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}

fn row_to_ticket(row: &PgRow) -> Result<Ticket, RegistryError> {
    let text = |column: &str| -> Result<String, RegistryError> {
        row.try_get::<String, _>(column)
            .map_err(|e| RegistryError::InvalidRecord(format!("column {column}: {e}")))
    };

    let identity = TicketIdentity::parse(
        &text("ticket_id")?,
        &text("contract_address")?,
        &text("network_id")?,
    )
    .map_err(|e| RegistryError::InvalidRecord(e.to_string()))?;

    let used_at = row
        .try_get::<Option<DateTime<Utc>>, _>("used_at")
        .map_err(|e| RegistryError::InvalidRecord(format!("column used_at: {e}")))?;

    Ok(Ticket {
        identity,
        owner: OwnerAddress::new(text("owner_address")?),
        event_id: EventId::new(text("event_id")?),
        event_name: text("event_name")?,
        used_at,
    })
}
