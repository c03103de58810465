//! Ownership guard for note updates.
//!
//! # Invariants
//! - Authorship is read from the stored record, never from the patch.
//! - Allowed patches are forwarded unmodified.

use crate::context::capability::Capability;
use crate::context::request::RequestContext;
use crate::model::record::{Record, RecordPatch};
use crate::notes::error::{NotesError, NotesResult};
use crate::pipeline::UpdateInterceptor;

/// Returns whether the viewer may modify `stored`.
pub fn may_modify(ctx: &RequestContext, stored: &Record) -> bool {
    !stored.is_private_note()
        || stored.is_owned_by(ctx.user_id())
        || ctx.viewer.can(Capability::ModerateComments)
}

/// Rejects note modification by anyone but the author or a moderator.
pub fn guard_update(ctx: &RequestContext, stored: &Record) -> NotesResult<()> {
    if may_modify(ctx, stored) {
        Ok(())
    } else {
        Err(NotesError::Unauthorized {
            record_id: stored.id,
        })
    }
}

/// Update-chain interceptor wrapping [`guard_update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipGuard;

impl UpdateInterceptor for OwnershipGuard {
    fn before_update(
        &self,
        ctx: &RequestContext,
        stored: &Record,
        _patch: &mut RecordPatch,
    ) -> NotesResult<()> {
        guard_update(ctx, stored)
    }
}
