//! Visibility filter for note content and listings.
//!
//! # Invariants
//! - Foreign kinds are returned unchanged.
//! - A note is visible only to its author; moderators get no exception.
//! - Listing filtering preserves order and is idempotent.

use crate::context::request::RequestContext;
use crate::model::record::{ItemId, Record};
use crate::pipeline::{ContentInterceptor, ListInterceptor};

/// Returns whether the viewer may see `record`.
pub fn is_visible_to(ctx: &RequestContext, record: &Record) -> bool {
    !record.is_private_note() || record.is_owned_by(ctx.user_id())
}

/// Returns `body` when visible, else an empty string.
pub fn visible_body(ctx: &RequestContext, record: &Record, body: String) -> String {
    if is_visible_to(ctx, record) {
        body
    } else {
        String::new()
    }
}

/// Removes every note the viewer does not own.
pub fn filter_listing(ctx: &RequestContext, mut records: Vec<Record>) -> Vec<Record> {
    records.retain(|record| is_visible_to(ctx, record));
    records
}

/// Read-one and read-list interceptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter;

impl ContentInterceptor for VisibilityFilter {
    fn filter_body(&self, ctx: &RequestContext, record: &Record, body: String) -> String {
        visible_body(ctx, record, body)
    }
}

impl ListInterceptor for VisibilityFilter {
    fn filter_list(
        &self,
        ctx: &RequestContext,
        _item_id: ItemId,
        records: Vec<Record>,
    ) -> Vec<Record> {
        filter_listing(ctx, records)
    }
}

#[cfg(test)]
mod tests {
    use super::{filter_listing, visible_body};
    use crate::context::capability::Capability;
    use crate::context::request::{RequestContext, Viewer};
    use crate::model::record::Record;

    fn record(id: i64, author: Option<i64>, kind: &str) -> Record {
        Record {
            id,
            item_id: 1,
            author_id: author,
            kind: kind.to_string(),
            body: format!("body {id}"),
            status: "approved".to_string(),
            created_at: id,
        }
    }

    #[test]
    fn body_is_blanked_for_non_authors() {
        let note = record(1, Some(7), "private_note");
        let owner = RequestContext::new(Viewer::user(7));
        let other = RequestContext::new(Viewer::user(8));
        let moderator =
            RequestContext::new(Viewer::user(9).with_capability(Capability::ModerateComments));

        assert_eq!(visible_body(&owner, &note, note.body.clone()), "body 1");
        assert_eq!(visible_body(&other, &note, note.body.clone()), "");
        assert_eq!(visible_body(&moderator, &note, note.body.clone()), "");
        assert_eq!(
            visible_body(&RequestContext::anonymous(), &note, note.body.clone()),
            ""
        );
    }

    #[test]
    fn listing_keeps_order_and_is_idempotent() {
        let records = vec![
            record(1, Some(7), "comment"),
            record(2, Some(8), "private_note"),
            record(3, None, "pingback"),
            record(4, Some(7), "private_note"),
        ];
        let ctx = RequestContext::new(Viewer::user(7));

        let once = filter_listing(&ctx, records);
        let ids: Vec<i64> = once.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        let twice = filter_listing(&ctx, once.clone());
        assert_eq!(twice, once);
    }
}
