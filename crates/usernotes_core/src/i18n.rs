//! Message catalog for user-facing note strings.
//!
//! # Invariants
//! - Message ids are the English source strings.
//! - A missing or blank translation falls back to the message id.

use std::collections::BTreeMap;

pub const MSG_ADD_NOTE: &str = "Add a note";
pub const MSG_EDIT_NOTE: &str = "Edit note";
pub const MSG_STATUS_BINDING_LABEL: &str = "User Note Status";
pub const MSG_LOGIN_TO_ADD: &str = "You must be logged in to add a note.";
pub const MSG_LOGIN_TO_CREATE: &str = "You must be logged in to create a private note.";
pub const MSG_DUPLICATE_FORM: &str =
    "You already have a note on this item. Please edit your existing note instead.";
pub const MSG_DUPLICATE_API: &str =
    "You already have a note on this item. Please update your existing note instead.";
pub const MSG_CANNOT_EDIT: &str = "You cannot edit this note.";
pub const MSG_FOREIGN_AUTHOR: &str = "You cannot create a note for another user.";
pub const MSG_NOTE_MISSING: &str = "The note you are trying to edit does not exist.";
pub const MSG_INVALID_TARGET: &str = "The selected record is not your note on this item.";
pub const MSG_SAVE_FAILED: &str = "Your note could not be saved. Please try again.";

/// Translation table keyed by source message id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    translations: BTreeMap<String, String>,
}

impl Catalog {
    /// Catalog without translations; every lookup returns the source text.
    pub fn source() -> Self {
        Self::default()
    }

    pub fn new(translations: BTreeMap<String, String>) -> Self {
        Self { translations }
    }

    /// Returns the translated message, or `msgid` when untranslated.
    pub fn translate<'a>(&'a self, msgid: &'a str) -> &'a str {
        match self.translations.get(msgid) {
            Some(value) if !value.trim().is_empty() => value.as_str(),
            _ => msgid,
        }
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}
