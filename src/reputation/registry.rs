//! Reputation Registry
//!
//! In-memory reputation store. Scores are written by upstream policy and
//! read by consensus to decide whether a validator may act.

use super::Reputation;
use crate::core::Address;
use crate::DEFAULT_MIN_ACTIVE_REPUTATION;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Configuration for the reputation registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Minimum reputation for a validator to count as active
    pub min_active_reputation: u64,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            min_active_reputation: DEFAULT_MIN_ACTIVE_REPUTATION,
        }
    }
}

/// Reputation registry
pub struct ReputationRegistry {
    /// Reputation by validator identity
    entries: RwLock<HashMap<Address, u64>>,
    config: ReputationConfig,
}

impl ReputationRegistry {
    /// Create a registry with the default activity threshold
    pub fn new() -> Self {
        Self::with_config(ReputationConfig::default())
    }

    /// Create a registry with a custom configuration
    pub fn with_config(config: ReputationConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &ReputationConfig {
        &self.config
    }

    /// Check if a record exists for `identity`
    pub fn contains(&self, identity: &Address) -> bool {
        self.entries.read().contains_key(identity)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the registry has no records
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for ReputationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Reputation for ReputationRegistry {
    fn is_active(&self, identity: &Address) -> bool {
        self.entries
            .read()
            .get(identity)
            .map(|&reputation| reputation >= self.config.min_active_reputation)
            .unwrap_or(false)
    }

    fn get_reputation(&self, identity: &Address) -> u64 {
        self.entries.read().get(identity).copied().unwrap_or(0)
    }

    fn upsert_validator(&self, identity: Address, reputation: u64) {
        let previous = self.entries.write().insert(identity, reputation);
        match previous {
            Some(old) => debug!("Updated reputation of {} from {} to {}", identity, old, reputation),
            None => debug!("Recorded reputation {} for {}", reputation, identity),
        }
    }
}
