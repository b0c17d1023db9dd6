//! Validator Management Module
//!
//! Tracks which accounts are validators and over which block-height range.
//! Every validator carries an inclusive `[begin_height, end_height]` window;
//! a window without a scheduled end uses `MAX_HEIGHT`.
//!
//! The rule deciding whether a validator may begin at a given height
//! relative to the open kernel is an [`ActivationPolicy`], so deployments can
//! tighten it without touching the set itself.

pub mod set;

pub use set::{
    ActivationPolicy, NotBeforeKernel, Unrestricted,
    Validator, ValidatorSet, ValidatorSetError,
};
