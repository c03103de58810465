//! Private-note overlay components.
//!
//! # Responsibility
//! - Classify note submissions, keep one note per (item, author), hide notes
//!   from non-authors, guard note edits and project the note status label.
//! - Register those components on a [`Pipeline`] in a fixed order.
//!
//! # Invariants
//! - Every component is a no-op for records whose kind is not `private_note`.
//! - Components never call each other; they share only the record store and
//!   [`lookup::find_private_note`].

pub mod classification;
pub mod error;
pub mod lookup;
pub mod ownership;
pub mod status;
pub mod uniqueness;
pub mod visibility;

use crate::pipeline::{Pipeline, PipelineError};
use classification::Classifier;
use ownership::OwnershipGuard;
use status::{NoteStatus, StatusMetaField};
use uniqueness::UniquenessEnforcer;
use visibility::VisibilityFilter;

pub const CLASSIFY_PRIORITY: i32 = 10;
pub const UNIQUENESS_PRIORITY: i32 = 20;
pub const OWNERSHIP_PRIORITY: i32 = 10;
pub const VISIBILITY_PRIORITY: i32 = 10;
pub const STATUS_META_PRIORITY: i32 = 10;

impl Pipeline {
    /// Pipeline with the private-note components registered.
    ///
    /// | hook       | interceptor          | priority |
    /// |------------|----------------------|----------|
    /// | create     | `note.classify`      | 10       |
    /// | create     | `note.unique`        | 20       |
    /// | update     | `note.ownership`     | 10       |
    /// | read_one   | `note.visibility`    | 10       |
    /// | read_list  | `note.visibility`    | 10       |
    /// | read_meta  | `note.status`        | 10       |
    pub fn with_private_notes(meta_key: &str, status: NoteStatus) -> Result<Self, PipelineError> {
        let mut pipeline = Self::new();
        pipeline.register_private_notes(meta_key, status)?;
        Ok(pipeline)
    }

    /// Adds the private-note components to an existing pipeline.
    pub fn register_private_notes(
        &mut self,
        meta_key: &str,
        status: NoteStatus,
    ) -> Result<(), PipelineError> {
        self.register_create("note.classify", CLASSIFY_PRIORITY, Classifier)?;
        self.register_create("note.unique", UNIQUENESS_PRIORITY, UniquenessEnforcer)?;
        self.register_update("note.ownership", OWNERSHIP_PRIORITY, OwnershipGuard)?;
        self.register_read_one("note.visibility", VISIBILITY_PRIORITY, VisibilityFilter)?;
        self.register_read_list("note.visibility", VISIBILITY_PRIORITY, VisibilityFilter)?;
        self.register_read_meta(
            "note.status",
            STATUS_META_PRIORITY,
            StatusMetaField::new(meta_key, status),
        )?;
        Ok(())
    }
}
