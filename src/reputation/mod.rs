//! Reputation tracking for validators
//!
//! Consensus only needs to know whether a validator is active; how
//! reputation is earned and what threshold makes a validator active is
//! owned here.

pub mod registry;

pub use registry::{ReputationConfig, ReputationRegistry};

use crate::core::Address;

/// Reputation source consumed by consensus
pub trait Reputation: Send + Sync {
    /// Check if the validator currently satisfies the activity policy
    fn is_active(&self, identity: &Address) -> bool;

    /// Last recorded reputation, 0 if unknown
    fn get_reputation(&self, identity: &Address) -> u64;

    /// Insert or overwrite a validator's reputation
    fn upsert_validator(&self, identity: Address, reputation: u64);
}
