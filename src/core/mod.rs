//! Core types shared by every registry
//!
//! - `Address` - 32-byte account identity with reserved null and sentinel values
//! - `LinkedSet` - sentinel-linked ordered set backing validator and committee registries

pub mod address;
pub mod linked_set;

pub use address::{Address, AddressParseError, ADDRESS_SIZE};
pub use linked_set::{Link, LinkedSet, LinkedSetError};

/// Block height
pub type Height = u64;
