//! The single (item, author, kind) lookup shared by every note component.

use crate::context::request::RequestContext;
use crate::model::record::{ItemId, Record, UserId, PRIVATE_NOTE_KIND};
use crate::repo::record_repo::{RecordRepository, RepoResult};

/// Returns `author_id`'s private note on `item_id`, if one exists.
pub fn find_private_note(
    records: &dyn RecordRepository,
    item_id: ItemId,
    author_id: UserId,
) -> RepoResult<Option<Record>> {
    records.find_first(item_id, author_id, PRIVATE_NOTE_KIND)
}

/// Returns the viewer's own note on `item_id`; anonymous viewers have none.
pub fn viewer_note(
    records: &dyn RecordRepository,
    ctx: &RequestContext,
    item_id: ItemId,
) -> RepoResult<Option<Record>> {
    match ctx.user_id() {
        Some(user_id) => find_private_note(records, item_id, user_id),
        None => Ok(None),
    }
}
