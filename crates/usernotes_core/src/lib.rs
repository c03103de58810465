//! Core domain logic for private user notes.
//! Notes live in the host record store as ordinary records of kind
//! `private_note`; this crate is the single source of truth for their rules.

pub mod config;
pub mod context;
pub mod db;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod notes;
pub mod pipeline;
pub mod repo;
pub mod service;

pub use config::{ConfigError, NotesConfig};
pub use context::capability::Capability;
pub use context::request::{RequestContext, Viewer};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use i18n::Catalog;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    ItemId, NewRecord, Record, RecordId, RecordPatch, UserId, PRIVATE_NOTE_KIND,
};
pub use notes::error::{NotesError, NotesResult};
pub use notes::status::{BindingSource, BlockContext, NoteStatus};
pub use pipeline::{HookPoint, Pipeline, PipelineError};
pub use repo::meta_repo::{ItemMetaRepository, SqliteItemMetaRepository};
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::notes_service::{
    ApiCreate, FormSubmission, MetaValue, NotesService, ViewerBootstrap,
};
pub use service::surface::{ApiError, FormRejection};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
