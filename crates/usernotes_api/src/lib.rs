//! JSON API surface for records with the private-note overlay.
//!
//! # Responsibility
//! - Translate JSON requests into note service calls.
//! - Serialize records and structured errors into stable JSON shapes.
//!
//! # Invariants
//! - Exported functions never panic; every failure becomes an [`ApiResponse`].

pub mod api;
pub mod fields;
pub mod headers;

pub use api::{create_record, get_record, list_records, update_record, ApiResponse};
pub use fields::{FieldError, RestFieldRegistry, IS_PRIVATE_FIELD};
pub use headers::Headers;
