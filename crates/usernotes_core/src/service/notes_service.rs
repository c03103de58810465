//! Record use-case service with the private-note overlay applied.
//!
//! # Responsibility
//! - Drive every record operation (create, update, read-one, read-list,
//!   read-metadata) through the interceptor pipeline before storage.
//! - Translate classic form and API requests into pipeline payloads.
//! - Map failures to the blocking form surface or the structured API surface.
//!
//! # Invariants
//! - Nothing reaches storage when a create/update interceptor rejects.
//! - A submission naming an existing note as target edits that note in place
//!   (same id, body replaced) instead of inserting.
//! - Records returned from writes pass through the read-one chain.
//! - Status values are synthesized on read; the metadata table is never
//!   written by a read.

use crate::config::NotesConfig;
use crate::context::request::RequestContext;
use crate::i18n::Catalog;
use crate::model::record::{
    ItemId, NewRecord, Record, RecordId, RecordPatch, UserId, PRIVATE_NOTE_KIND,
};
use crate::notes::error::{NotesError, NotesResult};
use crate::notes::lookup::viewer_note;
use crate::notes::status::{BindingSource, BlockContext, NoteStatus, BINDING_CONTEXT_ITEM};
use crate::pipeline::payload::{Channel, CreateDraft, SubmissionSignals};
use crate::pipeline::{Pipeline, PipelineError};
use crate::repo::meta_repo::ItemMetaRepository;
use crate::repo::record_repo::RecordRepository;
use crate::service::form::{HiddenField, NoteForm};
use crate::service::surface::{api_error, form_rejection, ApiError, FormRejection};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classic form POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub item_id: ItemId,
    pub body: String,
    /// Remaining posted fields, keyed by field name.
    pub fields: BTreeMap<String, String>,
}

impl FormSubmission {
    pub fn new(item_id: ItemId, body: impl Into<String>) -> Self {
        Self {
            item_id,
            body: body.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// API record-creation body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiCreate {
    pub item_id: ItemId,
    #[serde(default)]
    pub content: String,
    /// Defaults to the caller when absent.
    #[serde(default)]
    pub author_id: Option<UserId>,
    /// Requested discriminator; `private_note` is the explicit note signal.
    #[serde(default)]
    pub kind: Option<String>,
    /// Existing note being edited.
    #[serde(default)]
    pub target_id: Option<RecordId>,
}

/// Metadata read result shaped by the `single` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Single(String),
    Multiple(Vec<String>),
}

/// Existing note handed to front-end scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExistingNote {
    pub id: RecordId,
    pub content: String,
}

/// Data object injected for editor and viewer scripts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerBootstrap {
    pub post_id: ItemId,
    pub existing_note: Option<ExistingNote>,
    pub user_id: UserId,
    pub nonce: Option<String>,
}

/// Record service facade over repository implementations.
pub struct NotesService<R: RecordRepository, M: ItemMetaRepository> {
    records: R,
    meta: M,
    config: NotesConfig,
    catalog: Catalog,
    pipeline: Pipeline,
    status: NoteStatus,
}

impl<R: RecordRepository, M: ItemMetaRepository> NotesService<R, M> {
    /// Creates a service with the default private-note pipeline.
    pub fn new(records: R, meta: M, config: NotesConfig) -> Result<Self, PipelineError> {
        let status = NoteStatus::new(Catalog::new(config.translations.clone()));
        Self::with_status(records, meta, config, status)
    }

    /// Creates a service whose status projector carries custom label hooks.
    pub fn with_status(
        records: R,
        meta: M,
        config: NotesConfig,
        status: NoteStatus,
    ) -> Result<Self, PipelineError> {
        let pipeline = Pipeline::with_private_notes(&config.status.meta_key, status.clone())?;
        Ok(Self::with_pipeline(records, meta, config, pipeline, status))
    }

    /// Creates a service around a caller-assembled pipeline.
    pub fn with_pipeline(
        records: R,
        meta: M,
        config: NotesConfig,
        pipeline: Pipeline,
        status: NoteStatus,
    ) -> Self {
        let catalog = Catalog::new(config.translations.clone());
        Self {
            records,
            meta,
            config,
            catalog,
            pipeline,
            status,
        }
    }

    pub fn config(&self) -> &NotesConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Classic form path. Failures are blocking messages.
    pub fn submit_form(
        &self,
        ctx: &RequestContext,
        submission: FormSubmission,
    ) -> Result<Record, FormRejection> {
        self.submit_form_inner(ctx, submission).map_err(|err| {
            log_failure("form_submit", ctx, &err);
            form_rejection(&self.catalog, &err)
        })
    }

    fn submit_form_inner(
        &self,
        ctx: &RequestContext,
        submission: FormSubmission,
    ) -> NotesResult<Record> {
        let form = &self.config.form;
        let signals = SubmissionSignals {
            form_flag: submission.fields.get(&form.flag_field).cloned(),
            ..SubmissionSignals::default()
        };
        let target_id = parse_target(submission.fields.get(&form.target_field))?;
        let record = NewRecord::new(submission.item_id, ctx.user_id(), submission.body);
        let draft = CreateDraft::new(record, Channel::Form)
            .with_signals(signals)
            .with_target(target_id);
        self.commit_create(ctx, draft)
    }

    /// API create path. `note_header` is the raw value of the note header.
    pub fn create_via_api(
        &self,
        ctx: &RequestContext,
        note_header: Option<&str>,
        request: ApiCreate,
    ) -> Result<Record, ApiError> {
        self.create_via_api_inner(ctx, note_header, request)
            .map_err(|err| self.to_api_error(ctx, &err))
    }

    fn create_via_api_inner(
        &self,
        ctx: &RequestContext,
        note_header: Option<&str>,
        request: ApiCreate,
    ) -> NotesResult<Record> {
        let explicit_kind = request.kind.as_deref() == Some(PRIVATE_NOTE_KIND);
        let author_id = request.author_id.filter(|id| *id > 0).or(ctx.user_id());
        let mut record = NewRecord::new(request.item_id, author_id, request.content);
        if let Some(kind) = request.kind {
            if !explicit_kind && !kind.trim().is_empty() {
                record = record.with_kind(kind);
            }
        }

        let signals = SubmissionSignals {
            header: note_header.map(str::to_string),
            explicit_kind,
            ..SubmissionSignals::default()
        };
        let draft = CreateDraft::new(record, Channel::Api)
            .with_signals(signals)
            .with_target(request.target_id);
        self.commit_create(ctx, draft)
    }

    fn commit_create(&self, ctx: &RequestContext, mut draft: CreateDraft) -> NotesResult<Record> {
        self.pipeline.run_create(ctx, &mut draft, &self.records)?;

        if draft.record.is_private_note() {
            if let Some(target_id) = draft.target_id {
                return self.edit_target(ctx, draft.record.item_id, target_id, draft.record.body);
            }
        }

        let id = self.records.insert_record(&draft.record)?;
        info!(
            "event=record_create module=service status=ok record_id={} item_id={} kind={} channel={} request_id={}",
            id,
            draft.record.item_id,
            draft.record.kind,
            draft.channel.as_str(),
            ctx.request_id
        );
        self.read_back(ctx, id, "created record not found in read-back")
    }

    fn edit_target(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        target_id: RecordId,
        body: String,
    ) -> NotesResult<Record> {
        let stored = self
            .records
            .get_record(target_id)?
            .ok_or(NotesError::NotFound(target_id))?;
        if stored.item_id != item_id || !stored.is_private_note() {
            return Err(NotesError::InvalidTarget(target_id.to_string()));
        }
        self.update(ctx, target_id, RecordPatch::body(body))
    }

    /// Shared update path; the ownership guard sees the stored record.
    pub fn update(
        &self,
        ctx: &RequestContext,
        id: RecordId,
        patch: RecordPatch,
    ) -> NotesResult<Record> {
        let stored = self
            .records
            .get_record(id)?
            .ok_or(NotesError::NotFound(id))?;

        let mut patch = patch;
        self.pipeline.run_update(ctx, &stored, &mut patch)?;
        if !patch.is_empty() {
            self.records.update_record(id, &patch)?;
        }
        info!(
            "event=record_update module=service status=ok record_id={} kind={} request_id={}",
            id, stored.kind, ctx.request_id
        );

        self.read_back(ctx, id, "updated record not found in read-back")
    }

    /// Re-reads a written record through the read-one chain.
    fn read_back(
        &self,
        ctx: &RequestContext,
        id: RecordId,
        details: &'static str,
    ) -> NotesResult<Record> {
        let mut record = self
            .records
            .get_record(id)?
            .ok_or(NotesError::InconsistentState(details))?;
        record.body = self.pipeline.run_read_one(ctx, &record);
        Ok(record)
    }

    /// API update path.
    pub fn update_via_api(
        &self,
        ctx: &RequestContext,
        id: RecordId,
        patch: RecordPatch,
    ) -> Result<Record, ApiError> {
        self.update(ctx, id, patch)
            .map_err(|err| self.to_api_error(ctx, &err))
    }

    /// Maps a failure to the API surface and logs it.
    pub fn to_api_error(&self, ctx: &RequestContext, err: &NotesError) -> ApiError {
        log_failure("api_request", ctx, err);
        api_error(&self.catalog, err)
    }

    /// Read-one: the record exists for everyone; its body may be blanked.
    pub fn get_record(&self, ctx: &RequestContext, id: RecordId) -> NotesResult<Option<Record>> {
        Ok(self.records.get_record(id)?.map(|mut record| {
            record.body = self.pipeline.run_read_one(ctx, &record);
            record
        }))
    }

    /// Body as the viewer may see it.
    pub fn rendered_body(&self, ctx: &RequestContext, record: &Record) -> String {
        self.pipeline.run_read_one(ctx, record)
    }

    /// Read-list: hidden notes are removed, not blanked.
    pub fn list_for_item(&self, ctx: &RequestContext, item_id: ItemId) -> NotesResult<Vec<Record>> {
        let stored = self.records.list_for_item(item_id)?;
        let visible = self.pipeline.run_read_list(ctx, item_id, stored);
        Ok(visible
            .into_iter()
            .map(|mut record| {
                record.body = self.pipeline.run_read_one(ctx, &record);
                record
            })
            .collect())
    }

    /// Storage-level record count; includes notes hidden from the viewer.
    pub fn record_count(&self, item_id: ItemId) -> NotesResult<u64> {
        Ok(self.records.count_for_item(item_id)?)
    }

    /// Read-metadata: interceptors first, then storage.
    pub fn item_meta(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        key: &str,
        single: bool,
    ) -> NotesResult<MetaValue> {
        if let Some(value) = self
            .pipeline
            .run_read_meta(ctx, item_id, key, &self.records)?
        {
            return Ok(if single {
                MetaValue::Single(value)
            } else {
                MetaValue::Multiple(vec![value])
            });
        }

        let values = self.meta.get_meta(item_id, key)?;
        Ok(if single {
            MetaValue::Single(values.into_iter().next().unwrap_or_default())
        } else {
            MetaValue::Multiple(values)
        })
    }

    /// Host default metadata write; the status key gets no special handling.
    pub fn add_item_meta(&self, item_id: ItemId, key: &str, value: &str) -> NotesResult<()> {
        Ok(self.meta.add_meta(item_id, key, value)?)
    }

    /// Status label for the viewer on one item.
    pub fn note_status(&self, ctx: &RequestContext, item_id: ItemId) -> NotesResult<String> {
        Ok(self.status.text(ctx, item_id, &self.records)?)
    }

    /// Declaration of the status block-binding source.
    pub fn binding_source(&self) -> BindingSource {
        BindingSource {
            key: self.config.status.binding_source.clone(),
            label: self.status.binding_label(),
            uses_context: vec![BINDING_CONTEXT_ITEM],
        }
    }

    /// Value of the status block binding.
    pub fn note_status_binding(
        &self,
        ctx: &RequestContext,
        block: &BlockContext,
    ) -> NotesResult<String> {
        Ok(self.status.binding_value(ctx, block, &self.records)?)
    }

    /// The viewer's own note on an item.
    pub fn viewer_note(&self, ctx: &RequestContext, item_id: ItemId) -> NotesResult<Option<Record>> {
        Ok(viewer_note(&self.records, ctx, item_id)?)
    }

    /// Front-end data object; `None` without an authenticated viewer and a
    /// current item.
    pub fn viewer_bootstrap(&self, ctx: &RequestContext) -> NotesResult<Option<ViewerBootstrap>> {
        let (Some(user_id), Some(item_id)) = (ctx.user_id(), ctx.current_item) else {
            return Ok(None);
        };
        let existing_note = self.viewer_note(ctx, item_id)?.map(|note| ExistingNote {
            id: note.id,
            content: note.body,
        });
        Ok(Some(ViewerBootstrap {
            post_id: item_id,
            existing_note,
            user_id,
            nonce: ctx.auth_token.clone(),
        }))
    }

    /// Classic form customization for the note variant.
    pub fn note_form(&self, ctx: &RequestContext, item_id: ItemId) -> NotesResult<NoteForm> {
        let form = &self.config.form;
        let existing = self.viewer_note(ctx, item_id)?;

        let mut hidden_fields = Vec::new();
        if let Some(note) = existing.as_ref() {
            hidden_fields.push(HiddenField {
                name: form.target_field.clone(),
                value: note.id.to_string(),
            });
        }
        hidden_fields.push(HiddenField {
            name: form.flag_field.clone(),
            value: crate::notes::classification::FORM_FLAG_TRUTHY.to_string(),
        });

        Ok(NoteForm {
            title_reply: String::new(),
            show_logged_in_as: false,
            hidden_fields,
            existing_body: existing.map(|note| note.body),
        })
    }
}

/// Policy rejections are warnings; storage faults are errors.
fn log_failure(event: &str, ctx: &RequestContext, err: &NotesError) {
    if err.is_rejection() {
        warn!(
            "event={} module=service status=rejected reason={} request_id={}",
            event,
            err.reason(),
            ctx.request_id
        );
    } else {
        error!(
            "event={} module=service status=error reason={} request_id={} error={}",
            event,
            err.reason(),
            ctx.request_id,
            err
        );
    }
}

/// Parses the posted target field. Empty and `"0"` mean "no target".
fn parse_target(raw: Option<&String>) -> NotesResult<Option<RecordId>> {
    let Some(raw) = raw.map(|value| value.trim()) else {
        return Ok(None);
    };
    if raw.is_empty() || raw == "0" {
        return Ok(None);
    }
    match raw.parse::<RecordId>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(NotesError::InvalidTarget(raw.to_string())),
    }
}
