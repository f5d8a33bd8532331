//! Type-safe on-chain identifiers.
//!
//! [`EventId`] and [`TicketId`] wrap the `uint256` identifiers assigned by
//! EventFactory and TicketNFT. Both contracts hand out sequential ids, so
//! the gateway stores them as `u64` and rejects anything wider.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

/// A `uint256` identifier that does not fit in 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("identifier {0} exceeds 64 bits")]
pub struct IdOutOfRange(pub U256);

macro_rules! onchain_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw identifier.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Raw identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }

            /// ABI value.
            #[must_use]
            pub fn to_u256(self) -> U256 {
                U256::from(self.0)
            }

            /// Indexed-topic encoding (32-byte big-endian).
            #[must_use]
            pub fn as_topic(self) -> B256 {
                B256::from(self.to_u256().to_be_bytes::<32>())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl TryFrom<U256> for $name {
            type Error = IdOutOfRange;

            fn try_from(value: U256) -> Result<Self, Self::Error> {
                u64::try_from(value).map(Self).map_err(|_| IdOutOfRange(value))
            }
        }
    };
}

onchain_id! {
    /// Identifier of an event in EventFactory.
    EventId
}

onchain_id! {
    /// Token identifier of a ticket in TicketNFT.
    TicketId
}
