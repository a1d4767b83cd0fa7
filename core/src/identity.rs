//! Ticket identity types.
//!
//! A ticket is named by the triple (ticket id, contract address, network id).
//! Each component is a validated newtype: non-empty and free of the scan code
//! [`SEPARATOR`], so every identity encodes to exactly one scan code and back.
//!
//! Ticket ids containing the separator are rejected here, at construction
//! time, rather than escaped in the wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the fields of a scan code.
pub const SEPARATOR: char = '-';

/// Error type for identity field validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The field is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Which identity field was rejected.
        field: &'static str,
    },

    /// The field contains the scan code separator.
    #[error("{field} must not contain '-': {value:?}")]
    ContainsSeparator {
        /// Which identity field was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

fn validate(field: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.is_empty() {
        return Err(IdentityError::Empty { field });
    }
    if value.contains(SEPARATOR) {
        return Err(IdentityError::ContainsSeparator {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

macro_rules! identity_field {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a field value.
            ///
            /// # Errors
            ///
            /// Returns [`IdentityError`] if the value is empty or contains
            /// the scan code separator.
            pub fn parse(value: impl Into<String>) -> Result<Self, IdentityError> {
                let value = value.into();
                validate($field, &value)?;
                Ok(Self(value))
            }

            /// Get the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdentityError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentityError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

identity_field!(
    /// Token id of a ticket, unique within its contract.
    TicketId,
    "ticket id"
);

identity_field!(
    /// Address of the contract that issued a ticket.
    ContractAddress,
    "contract address"
);

identity_field!(
    /// Identifier of the ledger the contract lives on.
    ///
    /// Kept textual: chain ids are compared, never computed with.
    NetworkId,
    "network id"
);

/// The triple that uniquely names a mintable ticket.
///
/// Immutable once built. Parses from its scan code form:
///
/// ```
/// use ticket_gate_core::TicketIdentity;
///
/// let identity: TicketIdentity = "12345-0xabc-84532".parse().unwrap();
/// assert_eq!(identity.ticket_id().as_str(), "12345");
/// assert_eq!(identity.to_string(), "12345-0xabc-84532");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketIdentity {
    ticket_id: TicketId,
    contract_address: ContractAddress,
    network_id: NetworkId,
}

impl TicketIdentity {
    /// Build an identity from already validated parts.
    #[must_use]
    pub const fn new(
        ticket_id: TicketId,
        contract_address: ContractAddress,
        network_id: NetworkId,
    ) -> Self {
        Self {
            ticket_id,
            contract_address,
            network_id,
        }
    }

    /// Validate raw field values into an identity.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError`] for the first field that is empty or
    /// contains the separator.
    pub fn parse(
        ticket_id: &str,
        contract_address: &str,
        network_id: &str,
    ) -> Result<Self, IdentityError> {
        Ok(Self::new(
            TicketId::parse(ticket_id)?,
            ContractAddress::parse(contract_address)?,
            NetworkId::parse(network_id)?,
        ))
    }

    /// Token id of the ticket.
    #[must_use]
    pub const fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Issuing contract.
    #[must_use]
    pub const fn contract_address(&self) -> &ContractAddress {
        &self.contract_address
    }

    /// Network of the issuing contract.
    #[must_use]
    pub const fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    /// Encode this identity as a scan code.
    #[must_use]
    pub fn scan_code(&self) -> crate::codec::ScanCode {
        crate::codec::encode(self)
    }
}

impl fmt::Display for TicketIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.ticket_id, self.contract_address, self.network_id
        )
    }
}

impl FromStr for TicketIdentity {
    type Err = crate::codec::CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::codec::decode(s)
    }
}

/// Wallet address of a ticket holder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerAddress(String);

impl OwnerAddress {
    /// Wrap an owner address.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the event a ticket admits to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Wrap an event identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_id_rejects_separator() {
        let err = TicketId::parse("12-345").unwrap_err();
        assert_eq!(
            err,
            IdentityError::ContainsSeparator {
                field: "ticket id",
                value: "12-345".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        assert_eq!(
            NetworkId::parse("").unwrap_err(),
            IdentityError::Empty { field: "network id" }
        );
        assert!(TicketIdentity::parse("1", "", "84532").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<TicketId, _> = serde_json::from_str("\"12345\"");
        assert!(ok.is_ok());

        let bad: Result<TicketId, _> = serde_json::from_str("\"12-345\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_display_is_scan_code_form() {
        let identity = TicketIdentity::parse("7", "0xabc", "1").unwrap();
        assert_eq!(identity.to_string(), "7-0xabc-1");
        assert_eq!(identity.scan_code().as_str(), "7-0xabc-1");
    }
}
