//! In-process committee
//!
//! Keeps members in a sentinel-linked list. An entering validator names the
//! member it should be placed in front of; the sentinel places it last.

use super::Committee;
use crate::core::{Address, Link, LinkedSet};
use parking_lot::RwLock;
use tracing::{debug, info};

/// Committee held in local memory with a fixed number of seats
pub struct LocalCommittee {
    id: Address,
    capacity: usize,
    members: RwLock<LinkedSet<Address>>,
}

impl LocalCommittee {
    /// Create an empty committee
    pub fn new(id: Address, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            members: RwLock::new(LinkedSet::new()),
        }
    }

    /// Members in list order
    pub fn members(&self) -> Vec<Address> {
        self.members.read().iter().collect()
    }

    /// Check membership
    pub fn is_member(&self, identity: &Address) -> bool {
        self.members.read().contains(identity)
    }

    /// Number of seated members
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Check if no member is seated
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Maximum number of members
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Committee for LocalCommittee {
    fn id(&self) -> Address {
        self.id
    }

    fn enter_committee(&self, validator: Address, further_member: Address) -> bool {
        if !validator.is_assignable() {
            return false;
        }

        let mut members = self.members.write();
        if members.len() >= self.capacity {
            debug!("Committee {} is full", self.id);
            return false;
        }

        match members.insert_before(validator, Link::from(further_member)) {
            Ok(()) => {
                info!("Validator {} entered committee {}", validator, self.id);
                true
            }
            Err(e) => {
                debug!("Committee {} refused {}: {}", self.id, validator, e);
                false
            }
        }
    }
}
