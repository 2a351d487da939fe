//! Shared provisioning domain primitives.
//!
//! This crate owns the invocation contract, desired-state normalization,
//! and deterministic routing decisions. It intentionally excludes AWS SDK
//! and Lambda runtime concerns.
//! See `crates/alb_attach_core/README.md` for ownership boundaries.

pub mod contract;
pub mod routing;
