//! # Mosaic Core
//!
//! Validator management and committee formation for Mosaic consensus.
//!
//! ## Components
//! - `ValidatorSet` - validators and their activation windows
//! - `ReputationRegistry` - reputation per validator, gating activity
//! - `Committee` - entry point of a committee, implemented outside consensus
//! - `Consensus` - committee registry and the committee-entry protocol
//!
//! ## Committee Entry
//! A validator proposes a further member to join a committee. Consensus
//! checks, in order, that the committee exists, that a reputation source is
//! configured and that the validator is active, and only then asks the
//! committee to admit the entry.

pub mod core;
pub mod committee;
pub mod consensus;
pub mod genesis;
pub mod reputation;
pub mod validators;

// Re-exports
pub use crate::core::{Address, AddressParseError, Height, Link, LinkedSet, LinkedSetError};
pub use committee::{Committee, LocalCommittee};
pub use consensus::{Consensus, ConsensusConfig, ConsensusError};
pub use genesis::{
    ActivationRule, Genesis, GenesisCommittee, GenesisError, GenesisValidator, Node,
};
pub use reputation::{Reputation, ReputationConfig, ReputationRegistry};
pub use validators::{
    ActivationPolicy, NotBeforeKernel, Unrestricted,
    Validator, ValidatorSet, ValidatorSetError,
};

/// Mosaic core version
pub const MOSAIC_VERSION: &str = "0.1.0";

/// End height of a validator with no scheduled end
pub const MAX_HEIGHT: Height = u64::MAX;

/// Seats in a committee formed by consensus
pub const DEFAULT_COMMITTEE_SIZE: usize = 10;

/// Minimum reputation for a validator to count as active
pub const DEFAULT_MIN_ACTIVE_REPUTATION: u64 = 1;
