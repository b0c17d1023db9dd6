//! Consensus Orchestrator
//!
//! Holds the committee registry and the reputation source, and runs the
//! committee-entry protocol:
//!
//! 1. the committee must be registered,
//! 2. a reputation source must be configured,
//! 3. the validator must be active according to that source,
//! 4. the committee itself must accept the entry.
//!
//! Steps 1-3 only read state, so a failure there leaves nothing behind.
//! Step 4 is the single mutating call and runs last.

use crate::committee::{Committee, LocalCommittee};
use crate::core::{Address, Link, LinkedSet, LinkedSetError};
use crate::reputation::Reputation;
use crate::DEFAULT_COMMITTEE_SIZE;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Number of seats in committees formed by consensus
    pub committee_size: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            committee_size: DEFAULT_COMMITTEE_SIZE,
        }
    }
}

#[derive(Default)]
struct CommitteeRegistry {
    links: LinkedSet<Address>,
    handles: HashMap<Address, Arc<dyn Committee>>,
}

/// Consensus orchestrator
pub struct Consensus {
    config: ConsensusConfig,
    committees: RwLock<CommitteeRegistry>,
    reputation: RwLock<Option<Arc<dyn Reputation>>>,
}

impl Consensus {
    /// Create an orchestrator with no committees and no reputation source
    pub fn new(config: ConsensusConfig) -> Self {
        Self {
            config,
            committees: RwLock::new(CommitteeRegistry::default()),
            reputation: RwLock::new(None),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Register `committee` and link it in front of `next`
    ///
    /// `Link::Sentinel`, or a key holding `Address::SENTINEL`, registers it as
    /// the last committee.
    pub fn set_committee(
        &self,
        committee: Arc<dyn Committee>,
        next: Link<Address>,
    ) -> Result<(), ConsensusError> {
        let id = committee.id();
        if !id.is_assignable() {
            return Err(ConsensusError::InvalidCommittee);
        }
        let next = match next {
            Link::Key(key) => Link::from(key),
            Link::Sentinel => Link::Sentinel,
        };

        let mut registry = self.committees.write();
        registry.links.insert_before(id, next).map_err(|e| match e {
            LinkedSetError::Duplicate => ConsensusError::DuplicateCommittee,
            LinkedSetError::UnknownSuccessor => ConsensusError::UnknownSuccessor,
        })?;
        registry.handles.insert(id, committee);

        debug!("Registered committee {} before {:?}", id, next);
        Ok(())
    }

    /// Set the reputation source
    pub fn set_reputation(&self, reputation: Arc<dyn Reputation>) {
        *self.reputation.write() = Some(reputation);
        debug!("Reputation source configured");
    }

    /// Check if a reputation source is configured
    pub fn has_reputation(&self) -> bool {
        self.reputation.read().is_some()
    }

    /// Create a local committee sized by the configuration and register it last
    pub fn form_committee(&self, id: Address) -> Result<Arc<LocalCommittee>, ConsensusError> {
        let committee = Arc::new(LocalCommittee::new(id, self.config.committee_size));
        self.set_committee(committee.clone(), Link::Sentinel)?;

        info!("Formed committee {} with {} seats", id, self.config.committee_size);
        Ok(committee)
    }

    /// Successor of a registered committee, `None` if it does not exist
    pub fn committee_link(&self, id: &Address) -> Option<Link<Address>> {
        self.committees.read().links.next_of(id)
    }

    /// Registered committee ids in registry order
    pub fn committees(&self) -> Vec<Address> {
        self.committees.read().links.iter().collect()
    }

    /// Propose `further_member` as the entry position of `validator` in a committee
    pub fn enter_committee(
        &self,
        committee_id: &Address,
        validator: Address,
        further_member: Address,
    ) -> Result<(), ConsensusError> {
        let committee = self
            .committees
            .read()
            .handles
            .get(committee_id)
            .cloned()
            .ok_or_else(|| {
                warn!("Entry into unknown committee {} refused", committee_id);
                ConsensusError::CommitteeNotFound
            })?;

        let reputation = self.reputation.read().clone().ok_or_else(|| {
            warn!("Entry into committee {} refused: no reputation source", committee_id);
            ConsensusError::ReputationUnconfigured
        })?;

        if !reputation.is_active(&validator) {
            warn!("Entry into committee {} refused: {} is not active", committee_id, validator);
            return Err(ConsensusError::ValidatorNotActive);
        }

        if !committee.enter_committee(validator, further_member) {
            warn!("Committee {} rejected entry of {}", committee_id, validator);
            return Err(ConsensusError::CommitteeEntryRejected);
        }

        info!(
            "Validator {} entered committee {} ahead of {}",
            validator, committee_id, further_member
        );
        Ok(())
    }
}

impl Default for Consensus {
    fn default() -> Self {
        Self::new(ConsensusConfig::default())
    }
}

/// Consensus errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("Committee does not exist.")]
    CommitteeNotFound,

    #[error("Reputation contract is not set.")]
    ReputationUnconfigured,

    #[error("Validator is not active.")]
    ValidatorNotActive,

    #[error("Failed to enter committee.")]
    CommitteeEntryRejected,

    #[error("Committee must not be null or sentinel address.")]
    InvalidCommittee,

    #[error("Committee already exists.")]
    DuplicateCommittee,

    #[error("Next committee does not exist.")]
    UnknownSuccessor,
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Committee that records every entry request
    struct SpyCommittee {
        id: Address,
        result: Mutex<bool>,
        calls: Mutex<Vec<(Address, Address)>>,
    }

    impl SpyCommittee {
        fn new() -> Self {
            Self {
                id: Address::random(),
                result: Mutex::new(false),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn set_enter_committee_result(&self, result: bool) {
            *self.result.lock() = result;
        }

        fn calls(&self) -> Vec<(Address, Address)> {
            self.calls.lock().clone()
        }
    }

    impl Committee for SpyCommittee {
        fn id(&self) -> Address {
            self.id
        }

        fn enter_committee(&self, validator: Address, further_member: Address) -> bool {
            self.calls.lock().push((validator, further_member));
            *self.result.lock()
        }
    }

    /// Reputation source with directly assigned activity
    #[derive(Default)]
    struct SpyReputation {
        active: Mutex<HashMap<Address, bool>>,
    }

    impl SpyReputation {
        fn set_is_active(&self, validator: Address, active: bool) {
            self.active.lock().insert(validator, active);
        }
    }

    impl Reputation for SpyReputation {
        fn is_active(&self, identity: &Address) -> bool {
            self.active.lock().get(identity).copied().unwrap_or(false)
        }

        fn get_reputation(&self, _identity: &Address) -> u64 {
            0
        }

        fn upsert_validator(&self, _identity: Address, _reputation: u64) {}
    }

    struct Fixture {
        consensus: Consensus,
        committee: Arc<SpyCommittee>,
        reputation: Arc<SpyReputation>,
        validator: Address,
        further_member: Address,
    }

    fn setup() -> Fixture {
        Fixture {
            consensus: Consensus::new(ConsensusConfig { committee_size: 10 }),
            committee: Arc::new(SpyCommittee::new()),
            reputation: Arc::new(SpyReputation::default()),
            validator: Address::random(),
            further_member: Address::random(),
        }
    }

    fn setup_ready() -> Fixture {
        let f = setup();
        f.consensus.set_committee(f.committee.clone(), Link::Sentinel).unwrap();
        f.consensus.set_reputation(f.reputation.clone());
        f.reputation.set_is_active(f.validator, true);
        f.committee.set_enter_committee_result(true);
        f
    }

    #[test]
    fn test_fails_when_committee_does_not_exist() {
        let f = setup();

        let result = f.consensus.enter_committee(&f.committee.id(), f.validator, f.further_member);

        assert_eq!(result, Err(ConsensusError::CommitteeNotFound));
        assert_eq!(result.unwrap_err().to_string(), "Committee does not exist.");
    }

    #[test]
    fn test_fails_when_reputation_not_set() {
        let f = setup();
        f.consensus.set_committee(f.committee.clone(), Link::Sentinel).unwrap();

        let result = f.consensus.enter_committee(&f.committee.id(), f.validator, f.further_member);

        assert_eq!(result, Err(ConsensusError::ReputationUnconfigured));
        assert!(f.committee.calls().is_empty());
    }

    #[test]
    fn test_fails_when_validator_not_active() {
        let f = setup();
        f.consensus.set_committee(f.committee.clone(), Link::Sentinel).unwrap();
        f.consensus.set_reputation(f.reputation.clone());
        f.reputation.set_is_active(f.validator, false);
        f.committee.set_enter_committee_result(true);

        let result = f.consensus.enter_committee(&f.committee.id(), f.validator, f.further_member);

        assert_eq!(result, Err(ConsensusError::ValidatorNotActive));
        assert_eq!(result.unwrap_err().to_string(), "Validator is not active.");
        assert!(f.committee.calls().is_empty());
    }

    #[test]
    fn test_fails_when_committee_rejects_entry() {
        let f = setup_ready();
        f.committee.set_enter_committee_result(false);

        let result = f.consensus.enter_committee(&f.committee.id(), f.validator, f.further_member);

        assert_eq!(result, Err(ConsensusError::CommitteeEntryRejected));
        assert_eq!(result.unwrap_err().to_string(), "Failed to enter committee.");
    }

    #[test]
    fn test_passes_with_correct_params() {
        let f = setup_ready();

        f.consensus
            .enter_committee(&f.committee.id(), f.validator, f.further_member)
            .unwrap();
    }

    #[test]
    fn test_calls_committee_enter_committee() {
        let f = setup_ready();

        f.consensus
            .enter_committee(&f.committee.id(), f.validator, f.further_member)
            .unwrap();

        assert_eq!(f.committee.calls(), vec![(f.validator, f.further_member)]);
    }

    #[test]
    fn test_check_order_when_everything_is_missing() {
        let f = setup();
        f.reputation.set_is_active(f.validator, false);

        // Committee check wins over the missing reputation source
        assert_eq!(
            f.consensus.enter_committee(&f.committee.id(), f.validator, f.further_member),
            Err(ConsensusError::CommitteeNotFound)
        );

        // Missing reputation source wins over the inactive validator
        f.consensus.set_committee(f.committee.clone(), Link::Sentinel).unwrap();
        assert_eq!(
            f.consensus.enter_committee(&f.committee.id(), f.validator, f.further_member),
            Err(ConsensusError::ReputationUnconfigured)
        );
    }

    #[test]
    fn test_committee_registry_links() {
        let consensus = Consensus::default();
        let first = Arc::new(SpyCommittee::new());
        let last = Arc::new(SpyCommittee::new());
        let middle = Arc::new(SpyCommittee::new());

        consensus.set_committee(first.clone(), Link::Sentinel).unwrap();
        consensus.set_committee(last.clone(), Link::Sentinel).unwrap();
        consensus.set_committee(middle.clone(), Link::Key(last.id())).unwrap();

        assert_eq!(consensus.committees(), vec![first.id(), middle.id(), last.id()]);
        assert_eq!(consensus.committee_link(&last.id()), Some(Link::Sentinel));
        assert_eq!(consensus.committee_link(&first.id()), Some(Link::Key(middle.id())));
        assert_eq!(consensus.committee_link(&Address::random()), None);
    }

    #[test]
    fn test_sentinel_address_successor_registers_last() {
        let consensus = Consensus::default();
        let first = Arc::new(SpyCommittee::new());
        let second = Arc::new(SpyCommittee::new());

        consensus.set_committee(first.clone(), Link::Key(Address::SENTINEL)).unwrap();
        consensus.set_committee(second.clone(), Link::Key(Address::SENTINEL)).unwrap();

        assert_eq!(consensus.committee_link(&first.id()), Some(Link::Key(second.id())));
        assert_eq!(consensus.committee_link(&second.id()), Some(Link::Sentinel));
        assert_eq!(consensus.committees(), vec![first.id(), second.id()]);
    }

    #[test]
    fn test_set_committee_rejects_invalid_registrations() {
        let consensus = Consensus::default();
        let committee = Arc::new(SpyCommittee::new());

        assert_eq!(
            consensus.set_committee(committee.clone(), Link::Key(Address::random())),
            Err(ConsensusError::UnknownSuccessor)
        );
        assert!(consensus.committees().is_empty());

        consensus.set_committee(committee.clone(), Link::Sentinel).unwrap();
        assert_eq!(
            consensus.set_committee(committee.clone(), Link::Sentinel),
            Err(ConsensusError::DuplicateCommittee)
        );

        let sentinel = Arc::new(SpyCommittee {
            id: Address::SENTINEL,
            result: Mutex::new(true),
            calls: Mutex::new(Vec::new()),
        });
        assert_eq!(
            consensus.set_committee(sentinel, Link::Sentinel),
            Err(ConsensusError::InvalidCommittee)
        );
    }

    #[test]
    fn test_form_committee_admits_active_validator() {
        let consensus = Consensus::new(ConsensusConfig { committee_size: 1 });
        let reputation = Arc::new(SpyReputation::default());
        let validator = Address::random();
        let other = Address::random();
        reputation.set_is_active(validator, true);
        reputation.set_is_active(other, true);
        consensus.set_reputation(reputation);

        let id = Address::random();
        let committee = consensus.form_committee(id).unwrap();
        assert_eq!(committee.capacity(), 1);

        consensus.enter_committee(&id, validator, Address::SENTINEL).unwrap();
        assert!(committee.is_member(&validator));

        // Single seat already taken
        assert_eq!(
            consensus.enter_committee(&id, other, Address::SENTINEL),
            Err(ConsensusError::CommitteeEntryRejected)
        );
        assert!(!committee.is_member(&other));
    }
}
