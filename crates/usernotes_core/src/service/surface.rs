//! Channel-specific error surfaces.
//!
//! # Invariants
//! - The classic form path gets one blocking, localized message per failure.
//! - The API path gets a stable machine code plus an HTTP-style status.
//! - Storage details never leak into user-facing messages.

use crate::i18n::{
    Catalog, MSG_CANNOT_EDIT, MSG_DUPLICATE_API, MSG_DUPLICATE_FORM, MSG_FOREIGN_AUTHOR,
    MSG_INVALID_TARGET,
    MSG_LOGIN_TO_ADD, MSG_LOGIN_TO_CREATE, MSG_NOTE_MISSING, MSG_SAVE_FAILED,
};
use crate::notes::error::NotesError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CODE_LOGIN_REQUIRED: &str = "note_login_required";
pub const CODE_NOTE_EXISTS: &str = "note_exists";
pub const CODE_FORBIDDEN: &str = "note_forbidden";
pub const CODE_NOT_FOUND: &str = "not_found";
pub const CODE_INVALID_TARGET: &str = "invalid_target";
pub const CODE_STORAGE: &str = "storage_error";

/// Blocking termination of a classic form request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRejection {
    pub message: String,
}

impl Display for FormRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for FormRejection {}

/// Structured API error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: &'static str,
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>, status: u16) -> Self {
        Self {
            code,
            message: message.into(),
            status,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status, self.message)
    }
}

impl Error for ApiError {}

/// Maps a failure to the classic form surface.
pub fn form_rejection(catalog: &Catalog, err: &NotesError) -> FormRejection {
    let msgid = match err {
        NotesError::Unauthenticated => MSG_LOGIN_TO_ADD,
        NotesError::DuplicateNote { .. } => MSG_DUPLICATE_FORM,
        NotesError::Unauthorized { .. } => MSG_CANNOT_EDIT,
        NotesError::ForeignAuthor { .. } => MSG_FOREIGN_AUTHOR,
        NotesError::NotFound(_) => MSG_NOTE_MISSING,
        NotesError::InvalidTarget(_) => MSG_INVALID_TARGET,
        NotesError::Repo(_) | NotesError::InconsistentState(_) => MSG_SAVE_FAILED,
    };
    FormRejection {
        message: catalog.translate(msgid).to_string(),
    }
}

/// Maps a failure to the API surface.
pub fn api_error(catalog: &Catalog, err: &NotesError) -> ApiError {
    let (code, msgid, status) = match err {
        NotesError::Unauthenticated => (CODE_LOGIN_REQUIRED, MSG_LOGIN_TO_CREATE, 401),
        NotesError::DuplicateNote { .. } => (CODE_NOTE_EXISTS, MSG_DUPLICATE_API, 400),
        NotesError::Unauthorized { .. } => (CODE_FORBIDDEN, MSG_CANNOT_EDIT, 403),
        NotesError::ForeignAuthor { .. } => (CODE_FORBIDDEN, MSG_FOREIGN_AUTHOR, 403),
        NotesError::NotFound(_) => (CODE_NOT_FOUND, MSG_NOTE_MISSING, 404),
        NotesError::InvalidTarget(_) => (CODE_INVALID_TARGET, MSG_INVALID_TARGET, 400),
        NotesError::Repo(_) | NotesError::InconsistentState(_) => {
            (CODE_STORAGE, MSG_SAVE_FAILED, 500)
        }
    };
    ApiError::new(code, catalog.translate(msgid), status)
}

#[cfg(test)]
mod tests {
    use super::{api_error, form_rejection, CODE_LOGIN_REQUIRED, CODE_NOTE_EXISTS};
    use crate::i18n::Catalog;
    use crate::notes::error::NotesError;
    use std::collections::BTreeMap;

    #[test]
    fn api_statuses_match_contract() {
        let catalog = Catalog::source();
        let unauthenticated = api_error(&catalog, &NotesError::Unauthenticated);
        assert_eq!(unauthenticated.code, CODE_LOGIN_REQUIRED);
        assert_eq!(unauthenticated.status, 401);

        let duplicate = api_error(&catalog, &NotesError::DuplicateNote { item_id: 3 });
        assert_eq!(duplicate.code, CODE_NOTE_EXISTS);
        assert_eq!(duplicate.status, 400);

        let forbidden = api_error(&catalog, &NotesError::Unauthorized { record_id: 1 });
        assert_eq!(forbidden.status, 403);
    }

    #[test]
    fn form_messages_are_translated() {
        let mut table = BTreeMap::new();
        table.insert(
            "You must be logged in to add a note.".to_string(),
            "Bitte melde dich an.".to_string(),
        );
        let rejection = form_rejection(&Catalog::new(table), &NotesError::Unauthenticated);
        assert_eq!(rejection.message, "Bitte melde dich an.");
    }
}
