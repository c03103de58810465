//! Record use-case services.
//!
//! # Responsibility
//! - Orchestrate pipeline and repository calls into request-level APIs.
//! - Keep form/API surfaces decoupled from storage details.

pub mod form;
pub mod notes_service;
pub mod surface;
