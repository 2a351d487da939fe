//! Single import boundary for core provisioning primitives.

pub use alb_attach_core::contract;
pub use alb_attach_core::routing;
