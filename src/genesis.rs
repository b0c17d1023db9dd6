//! Genesis configuration
//!
//! A JSON document describing the initial validator set, their reputation
//! and the committees that exist at startup. [`Genesis::build`] turns it into
//! a ready [`Node`].

use crate::committee::{Committee, LocalCommittee};
use crate::consensus::{Consensus, ConsensusConfig, ConsensusError};
use crate::core::{Address, Height};
use crate::reputation::{Reputation, ReputationConfig, ReputationRegistry};
use crate::validators::{NotBeforeKernel, Unrestricted, ValidatorSet, ValidatorSetError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Begin-height rule applied to genesis validators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationRule {
    /// Any begin height is accepted
    #[default]
    Unrestricted,
    /// Begin height must not precede the open kernel height
    NotBeforeKernel,
}

/// Validator entry in genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    /// Validator identity
    pub identity: Address,
    /// First active height
    pub begin_height: Height,
    /// Initial reputation
    #[serde(default)]
    pub reputation: u64,
}

/// Committee entry in genesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisCommittee {
    /// Committee identity
    pub id: Address,
    /// Members seated at startup, in list order
    #[serde(default)]
    pub members: Vec<Address>,
}

/// Genesis document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Height of the kernel open at genesis
    #[serde(default)]
    pub open_kernel_height: Height,

    #[serde(default)]
    pub activation: ActivationRule,

    #[serde(default)]
    pub consensus: ConsensusConfig,

    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Initial validators, linked in this order
    #[serde(default)]
    pub validators: Vec<GenesisValidator>,

    /// Committees formed at startup, registered in this order
    #[serde(default)]
    pub committees: Vec<GenesisCommittee>,
}

/// Registries built from a genesis document
pub struct Node {
    pub validators: ValidatorSet,
    pub reputation: Arc<ReputationRegistry>,
    pub consensus: Consensus,
    pub committees: Vec<Arc<LocalCommittee>>,
}

impl Node {
    /// Get a committee formed at genesis
    pub fn committee(&self, id: &Address) -> Option<Arc<LocalCommittee>> {
        self.committees
            .iter()
            .find(|c| c.id() == *id)
            .cloned()
    }
}

impl Genesis {
    /// Sample genesis with `validator_count` seeded validators and one
    /// committee seating the first of them
    pub fn sample(validator_count: u32) -> Self {
        let open_kernel_height = 100;
        let validators: Vec<GenesisValidator> = (0..validator_count)
            .map(|i| GenesisValidator {
                identity: Address::from_seed(format!("validator-{}", i).as_bytes()),
                begin_height: open_kernel_height,
                reputation: 10,
            })
            .collect();
        let members = validators.iter().take(1).map(|v| v.identity).collect();

        Self {
            open_kernel_height,
            activation: ActivationRule::default(),
            consensus: ConsensusConfig::default(),
            reputation: ReputationConfig::default(),
            validators,
            committees: vec![GenesisCommittee {
                id: Address::from_seed(b"committee-0"),
                members,
            }],
        }
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenesisError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GenesisError> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Build the registries described by this document
    pub fn build(&self) -> Result<Node, GenesisError> {
        let validators = match self.activation {
            ActivationRule::Unrestricted => ValidatorSet::with_policy(Unrestricted),
            ActivationRule::NotBeforeKernel => ValidatorSet::with_policy(NotBeforeKernel),
        };
        let reputation = Arc::new(ReputationRegistry::with_config(self.reputation));

        for entry in &self.validators {
            validators.insert_validator(entry.identity, entry.begin_height, self.open_kernel_height)?;
            reputation.upsert_validator(entry.identity, entry.reputation);
        }

        let consensus = Consensus::new(self.consensus);
        consensus.set_reputation(reputation.clone());

        let mut committees = Vec::with_capacity(self.committees.len());
        for entry in &self.committees {
            let committee = consensus.form_committee(entry.id)?;
            for member in &entry.members {
                if !committee.enter_committee(*member, Address::SENTINEL) {
                    return Err(GenesisError::MemberRejected {
                        committee: entry.id,
                        member: *member,
                    });
                }
            }
            committees.push(committee);
        }

        info!(
            "Genesis built: {} validators, {} committees",
            validators.len(),
            committees.len()
        );

        Ok(Node {
            validators,
            reputation,
            consensus,
            committees,
        })
    }
}

/// Genesis errors
#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid genesis JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid genesis validator: {0}")]
    ValidatorSet(#[from] ValidatorSetError),

    #[error("Invalid genesis committee: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("Committee {committee} refused genesis member {member}")]
    MemberRejected { committee: Address, member: Address },
}
