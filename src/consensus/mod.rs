//! Consensus committee coordination
//!
//! The orchestrator owns the committee registry and the reputation source
//! and gates every committee entry on both.

pub mod orchestrator;

pub use orchestrator::{Consensus, ConsensusConfig, ConsensusError};
