//! Account identities
//!
//! Validators, further members and committees are all addressed by a
//! 32-byte identity. Two values are reserved: the null address, which is
//! never a valid participant, and the sentinel, which marks the boundary of
//! every linked registry.

use super::Link;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Size of an address in bytes
pub const ADDRESS_SIZE: usize = 32;

/// Account address
///
/// Serialized as a base58 string; hex with a `0x` prefix is also accepted.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    /// Reserved boundary marker for linked registries (`0x00..01`)
    pub const SENTINEL: Address = {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[ADDRESS_SIZE - 1] = 1;
        Address(bytes)
    };

    /// Create from raw bytes
    pub fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    /// Null address
    pub fn zero() -> Self {
        Address([0u8; ADDRESS_SIZE])
    }

    /// Check if this is the null address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }

    /// Check if this is the sentinel
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// True for identities that may be registered as a validator or committee
    pub fn is_assignable(&self) -> bool {
        !self.is_zero() && !self.is_sentinel()
    }

    /// Derive an address deterministically from a seed
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"MOSAIC_ADDRESS_V1");
        hasher.update(seed);
        let digest = hasher.finalize();
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest);
        Address(bytes)
    }

    /// Generate a random address
    pub fn random() -> Self {
        Address(rand::random())
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// Convert to base58 string
    pub fn to_base58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Convert to `0x`-prefixed hex string
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse from base58 or `0x`-prefixed hex
    pub fn parse(s: &str) -> Result<Self, AddressParseError> {
        let bytes = match s.strip_prefix("0x") {
            Some(stripped) => hex::decode(stripped)?,
            None => bs58::decode(s).into_vec()?,
        };
        if bytes.len() != ADDRESS_SIZE {
            return Err(AddressParseError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; ADDRESS_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Address(arr))
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            return write!(f, "Address(SENTINEL)");
        }
        let encoded = self.to_base58();
        write!(f, "Address({})", &encoded[..encoded.len().min(8)])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// The sentinel address reads as the end of the list
impl From<Address> for Link<Address> {
    fn from(address: Address) -> Self {
        if address.is_sentinel() {
            Link::Sentinel
        } else {
            Link::Key(address)
        }
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Address parsing errors
#[derive(Debug, thiserror::Error)]
pub enum AddressParseError {
    #[error("Invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid address length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}
