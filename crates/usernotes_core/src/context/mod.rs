//! Request identity, capabilities and ambient item state.
//!
//! # Invariants
//! - Components read identity only from an explicit `RequestContext`.
//! - An anonymous viewer has no user id; ownership never matches it.

pub mod capability;
pub mod request;
