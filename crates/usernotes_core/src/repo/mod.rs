//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the generic record store and item metadata contracts.
//! - Isolate SQLite query details from the note overlay.
//!
//! # Invariants
//! - Repositories know nothing about private notes; kind filtering is a
//!   plain column match.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod meta_repo;
pub mod record_repo;
