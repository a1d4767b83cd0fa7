//! Scan code encoding.
//!
//! Wire format: `<ticketId>-<contractAddress>-<networkId>`, plain text, fixed
//! field order, no escaping. The identity newtypes guarantee no field contains
//! the separator, which makes the format unambiguous:
//!
//! ```
//! use ticket_gate_core::{TicketIdentity, codec};
//!
//! let identity = TicketIdentity::parse("12345", "0x25b2...180F14", "84532").unwrap();
//! let code = codec::encode(&identity);
//! assert_eq!(code.as_str(), "12345-0x25b2...180F14-84532");
//! assert_eq!(codec::decode(code.as_str()).unwrap(), identity);
//! ```

use crate::identity::{
    ContractAddress, IdentityError, NetworkId, SEPARATOR, TicketId, TicketIdentity,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of fields in a scan code.
pub const FIELD_COUNT: usize = 3;

/// A scan code could not be decoded (malformed code).
///
/// Always recoverable: the operator re-scans or types the ticket id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The code does not split into exactly three fields.
    #[error("malformed scan code: expected 3 fields, found {found}")]
    FieldCount {
        /// Number of fields found.
        found: usize,
    },

    /// A field is not a valid identity component.
    #[error("malformed scan code: {0}")]
    InvalidField(#[from] IdentityError),
}

/// Serialized form of a ticket identity, carried by a QR code.
///
/// Deserializing goes through [`decode`], so a `ScanCode` always names a
/// well-formed identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanCode(String);

impl ScanCode {
    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the inner `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScanCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ScanCode {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode(&value)?;
        Ok(Self(value))
    }
}

impl From<ScanCode> for String {
    fn from(code: ScanCode) -> Self {
        code.0
    }
}

/// Encode an identity into its scan code.
#[must_use]
pub fn encode(identity: &TicketIdentity) -> ScanCode {
    ScanCode(identity.to_string())
}

/// Decode a scan code into the identity it names.
///
/// The input is taken verbatim; callers trim transport noise first.
///
/// # Errors
///
/// - [`CodecError::FieldCount`] unless the input has exactly three fields
/// - [`CodecError::InvalidField`] if a field is empty
pub fn decode(code: &str) -> Result<TicketIdentity, CodecError> {
    let mut fields = code.split(SEPARATOR);
    let (Some(ticket_id), Some(contract_address), Some(network_id), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(CodecError::FieldCount {
            found: code.split(SEPARATOR).count(),
        });
    };

    Ok(TicketIdentity::new(
        TicketId::parse(ticket_id)?,
        ContractAddress::parse(contract_address)?,
        NetworkId::parse(network_id)?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_requires_exactly_three_fields() {
        assert_eq!(decode("a-b"), Err(CodecError::FieldCount { found: 2 }));
        assert_eq!(decode("a-b-c-d"), Err(CodecError::FieldCount { found: 4 }));
        assert_eq!(decode("abc"), Err(CodecError::FieldCount { found: 1 }));

        let identity = decode("a-b-c").unwrap();
        assert_eq!(identity.ticket_id().as_str(), "a");
        assert_eq!(identity.contract_address().as_str(), "b");
        assert_eq!(identity.network_id().as_str(), "c");
    }

    #[test]
    fn test_decode_rejects_empty_fields() {
        assert!(matches!(
            decode("12345--84532"),
            Err(CodecError::InvalidField(IdentityError::Empty {
                field: "contract address"
            }))
        ));
        assert!(matches!(decode("--"), Err(CodecError::InvalidField(_))));
    }

    #[test]
    fn test_decode_keeps_network_id_textual() {
        let identity = decode("1-0xabc-000084532").unwrap();
        assert_eq!(identity.network_id().as_str(), "000084532");

        let huge = decode("1-0xabc-999999999999999999999999").unwrap();
        assert_eq!(huge.network_id().as_str(), "999999999999999999999999");
    }

    #[test]
    fn test_decode_does_not_trim() {
        let identity = decode(" 1-0xabc-2 ").unwrap();
        assert_eq!(identity.ticket_id().as_str(), " 1");
    }

    #[test]
    fn test_deserialize_validates_scan_code() {
        let code: ScanCode = serde_json::from_str("\"12345-0xabc-84532\"").unwrap();
        assert_eq!(code.as_str(), "12345-0xabc-84532");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"12345-0xabc-84532\"");

        assert!(serde_json::from_str::<ScanCode>("\"12345-0xabc\"").is_err());
        assert!(serde_json::from_str::<ScanCode>("\"12345--84532\"").is_err());
    }

    #[test]
    fn test_encode_uses_fixed_field_order() {
        let identity = TicketIdentity::parse("12345", "0x25b2...180F14", "84532").unwrap();
        assert_eq!(encode(&identity).as_str(), "12345-0x25b2...180F14-84532");
    }
}
