//! AWS-oriented adapters and handlers for ALB-to-Lambda attachment.
//!
//! This crate owns runtime integration details (the Lambda handler and the
//! control-plane adapters) and exposes a single runtime module boundary for
//! contract and routing primitives.
//! See `crates/alb_attach_lambda/README.md` for ownership boundaries.

pub mod adapters;
pub mod handlers;
pub mod runtime;
