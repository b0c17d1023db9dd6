//! Committees
//!
//! A committee decides for itself who may join. Consensus only forwards
//! entry requests through the [`Committee`] capability and reports the
//! outcome.

pub mod local;

pub use local::LocalCommittee;

use crate::core::Address;

/// Entry point exposed by a committee
pub trait Committee: Send + Sync {
    /// Identity under which the committee is registered
    fn id(&self) -> Address;

    /// Ask the committee to admit `validator` ahead of `further_member`
    ///
    /// Returns true if the committee accepted the entry.
    fn enter_committee(&self, validator: Address, further_member: Address) -> bool;
}
