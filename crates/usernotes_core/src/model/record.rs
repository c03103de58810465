//! Record domain model.
//!
//! # Responsibility
//! - Define the generic comment-like row shared by every record kind.
//! - Own the `private_note` discriminator and its predicates.
//!
//! # Invariants
//! - `id` is host-assigned and never changes after insert.
//! - `kind` values other than `private_note` are opaque and never rewritten.
//! - A private note always carries a non-anonymous `author_id`.

use serde::{Deserialize, Serialize};

/// Host-assigned record identifier.
pub type RecordId = i64;
/// Identifier of the annotated content item.
pub type ItemId = i64;
/// Identifier of a registered user.
pub type UserId = i64;

/// Discriminator value owned by this crate.
pub const PRIVATE_NOTE_KIND: &str = "private_note";
/// Discriminator used when a submission does not request a kind.
pub const DEFAULT_RECORD_KIND: &str = "comment";
/// Host default moderation status for new records.
pub const DEFAULT_RECORD_STATUS: &str = "approved";

/// Returns whether `kind` marks a private note.
pub fn is_private_note_kind(kind: &str) -> bool {
    kind == PRIVATE_NOTE_KIND
}

/// Persisted comment-like record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub item_id: ItemId,
    /// `None` for anonymous authors (stored as `0`).
    pub author_id: Option<UserId>,
    pub kind: String,
    pub body: String,
    /// Host moderation status; not touched by the note layer.
    pub status: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Record {
    /// Returns whether this record is a private note.
    pub fn is_private_note(&self) -> bool {
        is_private_note_kind(&self.kind)
    }

    /// Returns whether `user_id` authored this record.
    ///
    /// Anonymous identities never own anything, even anonymous rows.
    pub fn is_owned_by(&self, user_id: Option<UserId>) -> bool {
        match (user_id, self.author_id) {
            (Some(viewer), Some(author)) => viewer == author,
            _ => false,
        }
    }
}

/// In-flight insert payload, mutated by create interceptors before storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub item_id: ItemId,
    pub author_id: Option<UserId>,
    pub kind: String,
    pub body: String,
    pub status: String,
}

impl NewRecord {
    /// Creates a default-kind insert payload.
    pub fn new(item_id: ItemId, author_id: Option<UserId>, body: impl Into<String>) -> Self {
        Self {
            item_id,
            author_id,
            kind: DEFAULT_RECORD_KIND.to_string(),
            body: body.into(),
            status: DEFAULT_RECORD_STATUS.to_string(),
        }
    }

    /// Replaces the discriminator.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn is_private_note(&self) -> bool {
        is_private_note_kind(&self.kind)
    }
}

/// Proposed update data. `None` fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub body: Option<String>,
    pub author_id: Option<UserId>,
    pub status: Option<String>,
}

impl RecordPatch {
    /// Body-only replacement patch.
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.author_id.is_none() && self.status.is_none()
    }
}
