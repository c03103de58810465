//! Uniqueness enforcer: one private note per (item, author).
//!
//! # Invariants
//! - Only drafts already classified as notes are inspected.
//! - A note is attributed to its caller; only moderators may name another
//!   author, and the one-note rule is checked against the stored author.
//! - Drafts naming a target id pass; edit rules apply downstream.
//! - The check is read-then-write and not transactional. Two concurrent
//!   creations by one author can both pass.

use crate::context::capability::Capability;
use crate::context::request::RequestContext;
use crate::notes::error::{NotesError, NotesResult};
use crate::notes::lookup::find_private_note;
use crate::pipeline::payload::CreateDraft;
use crate::pipeline::CreateInterceptor;
use crate::repo::record_repo::RecordRepository;
use log::info;

/// Rejects a second note by the same caller on the same item.
pub fn enforce_unique(
    ctx: &RequestContext,
    draft: &CreateDraft,
    records: &dyn RecordRepository,
) -> NotesResult<()> {
    if !draft.record.is_private_note() {
        return Ok(());
    }

    let Some(caller) = ctx.user_id() else {
        return Err(NotesError::Unauthenticated);
    };

    if let Some(target_id) = draft.target_id {
        info!(
            "event=note_unique module=notes status=skipped reason=edit_target target_id={} request_id={}",
            target_id, ctx.request_id
        );
        return Ok(());
    }

    let author_id = draft.record.author_id.unwrap_or(caller);
    if author_id != caller && !ctx.viewer.can(Capability::ModerateComments) {
        return Err(NotesError::ForeignAuthor { author_id });
    }

    let item_id = draft.record.item_id;
    match find_private_note(records, item_id, author_id)? {
        Some(_) => Err(NotesError::DuplicateNote { item_id }),
        None => Ok(()),
    }
}

/// Create-chain interceptor wrapping [`enforce_unique`].
#[derive(Debug, Clone, Copy, Default)]
pub struct UniquenessEnforcer;

impl CreateInterceptor for UniquenessEnforcer {
    fn before_create(
        &self,
        ctx: &RequestContext,
        draft: &mut CreateDraft,
        records: &dyn RecordRepository,
    ) -> NotesResult<()> {
        enforce_unique(ctx, draft, records)
    }
}
