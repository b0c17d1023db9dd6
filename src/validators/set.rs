//! Validator Set
//!
//! Authoritative list of validators and the block-height window in which
//! each one may act. Validators are linked in insertion order behind the
//! sentinel and are never removed; a validator leaves by having its window
//! closed.

use crate::core::{Address, Height, Link, LinkedSet, LinkedSetError};
use crate::MAX_HEIGHT;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Validator with its activity window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Account identity
    pub identity: Address,
    /// First height at which the validator is active (inclusive)
    pub begin_height: Height,
    /// Last height at which the validator is active (inclusive)
    pub end_height: Height,
}

impl Validator {
    /// Create an open-ended validator
    pub fn new(identity: Address, begin_height: Height) -> Self {
        Self {
            identity,
            begin_height,
            end_height: MAX_HEIGHT,
        }
    }

    /// Check if no end height has been scheduled
    pub fn is_open(&self) -> bool {
        self.end_height == MAX_HEIGHT
    }

    /// Check if `height` falls inside the window
    pub fn is_active_at(&self, height: Height) -> bool {
        self.begin_height <= height && height <= self.end_height
    }
}

/// Rule relating a validator's begin height to the open kernel height
pub trait ActivationPolicy: Send + Sync {
    /// Return true if a validator may begin at `begin_height`
    fn admits(&self, begin_height: Height, open_kernel_height: Height) -> bool;
}

/// Accepts every begin height
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl ActivationPolicy for Unrestricted {
    fn admits(&self, _begin_height: Height, _open_kernel_height: Height) -> bool {
        true
    }
}

/// Rejects validators that would begin before the open kernel
#[derive(Debug, Clone, Copy, Default)]
pub struct NotBeforeKernel;

impl ActivationPolicy for NotBeforeKernel {
    fn admits(&self, begin_height: Height, open_kernel_height: Height) -> bool {
        begin_height >= open_kernel_height
    }
}

#[derive(Default)]
struct Inner {
    links: LinkedSet<Address>,
    validators: HashMap<Address, Validator>,
}

/// Validator set
pub struct ValidatorSet {
    inner: RwLock<Inner>,
    policy: Box<dyn ActivationPolicy>,
}

impl ValidatorSet {
    /// Create an empty set that accepts any begin height
    pub fn new() -> Self {
        Self::with_policy(Unrestricted)
    }

    /// Create an empty set with a custom activation policy
    pub fn with_policy(policy: impl ActivationPolicy + 'static) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            policy: Box::new(policy),
        }
    }

    /// Insert a new open-ended validator
    pub fn insert_validator(
        &self,
        identity: Address,
        begin_height: Height,
        open_kernel_height: Height,
    ) -> Result<(), ValidatorSetError> {
        if identity.is_zero() {
            return Err(ValidatorSetError::NullValidator);
        }
        if identity.is_sentinel() {
            return Err(ValidatorSetError::SentinelValidator);
        }

        let mut inner = self.inner.write();
        if inner.validators.contains_key(&identity) {
            return Err(ValidatorSetError::DuplicateValidator);
        }
        if !self.policy.admits(begin_height, open_kernel_height) {
            return Err(ValidatorSetError::InvalidBeginHeight {
                begin_height,
                open_kernel_height,
            });
        }

        inner.links.push_back(identity).map_err(|e| match e {
            LinkedSetError::Duplicate => ValidatorSetError::DuplicateValidator,
            LinkedSetError::UnknownSuccessor => ValidatorSetError::UnknownValidator,
        })?;
        inner
            .validators
            .insert(identity, Validator::new(identity, begin_height));

        debug!("Inserted validator {} beginning at height {}", identity, begin_height);
        Ok(())
    }

    /// Close an open validator's window at `end_height`
    pub fn close_validator(
        &self,
        identity: &Address,
        end_height: Height,
    ) -> Result<(), ValidatorSetError> {
        let mut inner = self.inner.write();
        let validator = inner
            .validators
            .get_mut(identity)
            .ok_or(ValidatorSetError::UnknownValidator)?;

        if !validator.is_open() {
            return Err(ValidatorSetError::AlreadyClosed);
        }
        if end_height < validator.begin_height || end_height == MAX_HEIGHT {
            return Err(ValidatorSetError::InvalidEndHeight {
                begin_height: validator.begin_height,
                end_height,
            });
        }

        validator.end_height = end_height;
        debug!("Closed validator {} at height {}", identity, end_height);
        Ok(())
    }

    /// Begin height, 0 if never inserted
    pub fn validator_begin_height(&self, identity: &Address) -> Height {
        self.inner
            .read()
            .validators
            .get(identity)
            .map(|v| v.begin_height)
            .unwrap_or(0)
    }

    /// End height, 0 if never inserted
    pub fn validator_end_height(&self, identity: &Address) -> Height {
        self.inner
            .read()
            .validators
            .get(identity)
            .map(|v| v.end_height)
            .unwrap_or(0)
    }

    /// Successor of `identity` in the linked list
    pub fn next_validator(&self, identity: &Address) -> Option<Link<Address>> {
        self.inner.read().links.next_of(identity)
    }

    /// Get validator by identity
    pub fn get(&self, identity: &Address) -> Option<Validator> {
        self.inner.read().validators.get(identity).copied()
    }

    /// Check if validator was ever inserted
    pub fn contains(&self, identity: &Address) -> bool {
        self.inner.read().validators.contains_key(identity)
    }

    /// Check if `identity` may act at `height`
    pub fn is_validator_at(&self, identity: &Address, height: Height) -> bool {
        self.get(identity)
            .map(|v| v.is_active_at(height))
            .unwrap_or(false)
    }

    /// Validators active at `height`, in list order
    pub fn active_at(&self, height: Height) -> Vec<Address> {
        let inner = self.inner.read();
        inner
            .links
            .iter()
            .filter(|id| {
                inner
                    .validators
                    .get(id)
                    .map(|v| v.is_active_at(height))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// All validators, in list order
    pub fn get_all(&self) -> Vec<Validator> {
        let inner = self.inner.read();
        inner
            .links
            .iter()
            .filter_map(|id| inner.validators.get(&id).copied())
            .collect()
    }

    /// Number of validators ever inserted
    pub fn len(&self) -> usize {
        self.inner.read().validators.len()
    }

    /// Check if no validator was inserted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ValidatorSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator set errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidatorSetError {
    #[error("Validator must not be null address.")]
    NullValidator,

    #[error("Validator must not be sentinel address.")]
    SentinelValidator,

    #[error("Validator must not already be part of this set.")]
    DuplicateValidator,

    #[error("Begin height {begin_height} is not admitted at open kernel height {open_kernel_height}")]
    InvalidBeginHeight {
        begin_height: Height,
        open_kernel_height: Height,
    },

    #[error("Validator not found")]
    UnknownValidator,

    #[error("Validator window is already closed")]
    AlreadyClosed,

    #[error("End height {end_height} is invalid for begin height {begin_height}")]
    InvalidEndHeight {
        begin_height: Height,
        end_height: Height,
    },
}
