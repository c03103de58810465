//! Note status projection ("Add a note" / "Edit note").
//!
//! # Responsibility
//! - Derive the per-(item, viewer) status label.
//! - Expose it through the reserved metadata key and the block-binding source.
//!
//! # Invariants
//! - The label is computed on every read and never persisted.
//! - Anonymous viewers always get an empty string.
//! - Label hooks run in registration order, each receiving the previous output.

use crate::context::request::RequestContext;
use crate::i18n::{Catalog, MSG_ADD_NOTE, MSG_EDIT_NOTE, MSG_STATUS_BINDING_LABEL};
use crate::model::record::{ItemId, Record};
use crate::notes::error::NotesResult;
use crate::notes::lookup::viewer_note;
use crate::pipeline::MetaInterceptor;
use crate::repo::record_repo::{RecordRepository, RepoResult};
use std::sync::Arc;

/// Rewrites the "add" label for one item.
pub type AddTextHook = Box<dyn Fn(String, ItemId) -> String + Send + Sync>;
/// Rewrites the "edit" label for one item and the viewer's existing note.
pub type EditTextHook = Box<dyn Fn(String, ItemId, &Record) -> String + Send + Sync>;

/// Block-binding context dependency name.
pub const BINDING_CONTEXT_ITEM: &str = "postId";

struct StatusLabels {
    catalog: Catalog,
    add_hooks: Vec<AddTextHook>,
    edit_hooks: Vec<EditTextHook>,
}

/// Shared, cheaply clonable status projector.
#[derive(Clone)]
pub struct NoteStatus {
    labels: Arc<StatusLabels>,
}

impl std::fmt::Debug for NoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteStatus")
            .field("add_hooks", &self.labels.add_hooks.len())
            .field("edit_hooks", &self.labels.edit_hooks.len())
            .finish()
    }
}

/// Builder collecting label hooks before the projector is shared.
pub struct NoteStatusBuilder {
    labels: StatusLabels,
}

impl NoteStatusBuilder {
    pub fn on_add_text(
        mut self,
        hook: impl Fn(String, ItemId) -> String + Send + Sync + 'static,
    ) -> Self {
        self.labels.add_hooks.push(Box::new(hook));
        self
    }

    pub fn on_edit_text(
        mut self,
        hook: impl Fn(String, ItemId, &Record) -> String + Send + Sync + 'static,
    ) -> Self {
        self.labels.edit_hooks.push(Box::new(hook));
        self
    }

    pub fn build(self) -> NoteStatus {
        NoteStatus {
            labels: Arc::new(self.labels),
        }
    }
}

impl NoteStatus {
    /// Projector without label hooks.
    pub fn new(catalog: Catalog) -> Self {
        Self::builder(catalog).build()
    }

    pub fn builder(catalog: Catalog) -> NoteStatusBuilder {
        NoteStatusBuilder {
            labels: StatusLabels {
                catalog,
                add_hooks: Vec::new(),
                edit_hooks: Vec::new(),
            },
        }
    }

    /// Status label for the viewer on `item_id`.
    pub fn text(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        records: &dyn RecordRepository,
    ) -> RepoResult<String> {
        if !ctx.viewer.is_authenticated() {
            return Ok(String::new());
        }

        let labels = &self.labels;
        let text = match viewer_note(records, ctx, item_id)? {
            Some(note) => labels
                .edit_hooks
                .iter()
                .fold(labels.catalog.translate(MSG_EDIT_NOTE).to_string(), |text, hook| {
                    hook(text, item_id, &note)
                }),
            None => labels
                .add_hooks
                .iter()
                .fold(labels.catalog.translate(MSG_ADD_NOTE).to_string(), |text, hook| {
                    hook(text, item_id)
                }),
        };
        Ok(text)
    }

    /// Block-binding value: block context item, else the ambient current item.
    pub fn binding_value(
        &self,
        ctx: &RequestContext,
        block: &BlockContext,
        records: &dyn RecordRepository,
    ) -> RepoResult<String> {
        match block.item_id.or(ctx.current_item) {
            Some(item_id) => self.text(ctx, item_id, records),
            None => Ok(String::new()),
        }
    }

    /// Localized label shown for the binding source in editors.
    pub fn binding_label(&self) -> String {
        self.labels
            .catalog
            .translate(MSG_STATUS_BINDING_LABEL)
            .to_string()
    }
}

/// Rendering context supplied by a block using the binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockContext {
    pub item_id: Option<ItemId>,
}

/// Declaration of the status block-binding source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSource {
    pub key: String,
    pub label: String,
    pub uses_context: Vec<&'static str>,
}

/// Metadata interceptor answering reads of the reserved status key.
pub struct StatusMetaField {
    meta_key: String,
    status: NoteStatus,
}

impl StatusMetaField {
    pub fn new(meta_key: impl Into<String>, status: NoteStatus) -> Self {
        Self {
            meta_key: meta_key.into(),
            status,
        }
    }
}

impl MetaInterceptor for StatusMetaField {
    fn read_meta(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        key: &str,
        records: &dyn RecordRepository,
    ) -> NotesResult<Option<String>> {
        if key != self.meta_key {
            return Ok(None);
        }
        Ok(Some(self.status.text(ctx, item_id, records)?))
    }
}
