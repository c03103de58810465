//! Domain model for the record store overlay.
//!
//! # Responsibility
//! - Define the generic record shape shared with the host comment store.
//! - Keep the private-note discriminator in one place.
//!
//! # Invariants
//! - Records are identified by a host-assigned integer id.
//! - Only the `private_note` kind carries note semantics.

pub mod record;
