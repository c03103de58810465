//! Error taxonomy shared by note interceptors and the service layer.

use crate::model::record::{ItemId, RecordId, UserId};
use crate::repo::record_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotesResult<T> = Result<T, NotesError>;

#[derive(Debug)]
pub enum NotesError {
    /// A note write was attempted without an authenticated identity.
    Unauthenticated,
    /// The caller already owns a note on this item.
    DuplicateNote { item_id: ItemId },
    /// Non-author, non-moderator tried to modify a note.
    Unauthorized { record_id: RecordId },
    /// Non-moderator tried to create a note attributed to another user.
    ForeignAuthor { author_id: UserId },
    NotFound(RecordId),
    /// Edit target is malformed or not a note on the submitted item.
    InvalidTarget(String),
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl NotesError {
    /// Short stable reason used in log events.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::DuplicateNote { .. } => "duplicate_note",
            Self::Unauthorized { .. } => "unauthorized",
            Self::ForeignAuthor { .. } => "foreign_author",
            Self::NotFound(_) => "not_found",
            Self::InvalidTarget(_) => "invalid_target",
            Self::Repo(_) => "storage",
            Self::InconsistentState(_) => "inconsistent_state",
        }
    }

    /// Whether this is a policy rejection rather than a storage fault.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::DuplicateNote { .. }
                | Self::Unauthorized { .. }
                | Self::ForeignAuthor { .. }
        )
    }
}

impl Display for NotesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "private notes require an authenticated user"),
            Self::DuplicateNote { item_id } => {
                write!(f, "caller already has a private note on item {item_id}")
            }
            Self::Unauthorized { record_id } => {
                write!(f, "caller may not modify private note {record_id}")
            }
            Self::ForeignAuthor { author_id } => {
                write!(f, "caller may not create a private note for user {author_id}")
            }
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidTarget(raw) => write!(f, "`{raw}` is not an editable note target"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent record state: {details}"),
        }
    }
}

impl Error for NotesError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NotesError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}
