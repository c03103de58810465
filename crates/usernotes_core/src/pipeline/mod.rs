//! Per-operation interceptor pipeline over the record store.
//!
//! # Responsibility
//! - Hold named interceptors for each hook point with explicit priorities.
//! - Run create/update chains (which may reject) and read chains (which
//!   transform) in a fixed, documented order.
//!
//! # Invariants
//! - Lower priority runs first; equal priorities run in registration order.
//! - Interceptor names are unique per hook point.
//! - A rejecting create/update interceptor halts its chain; later
//!   interceptors do not run and nothing reaches storage.

pub mod payload;

use crate::context::request::RequestContext;
use crate::model::record::{ItemId, Record, RecordPatch};
use crate::notes::error::NotesResult;
use crate::repo::record_repo::RecordRepository;
use log::{debug, warn};
use payload::CreateDraft;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Extension points of the record pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookPoint {
    /// Before a record is inserted.
    Create,
    /// Before a stored record is modified.
    Update,
    /// When one record's body is rendered.
    ReadOne,
    /// When an item's records are listed.
    ReadList,
    /// When item metadata is read.
    ReadMeta,
}

impl HookPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::ReadOne => "read_one",
            Self::ReadList => "read_list",
            Self::ReadMeta => "read_meta",
        }
    }
}

impl Display for HookPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs before insert; may mutate the draft or reject it.
pub trait CreateInterceptor {
    fn before_create(
        &self,
        ctx: &RequestContext,
        draft: &mut CreateDraft,
        records: &dyn RecordRepository,
    ) -> NotesResult<()>;
}

/// Runs before update with the stored (pre-update) record.
pub trait UpdateInterceptor {
    fn before_update(
        &self,
        ctx: &RequestContext,
        stored: &Record,
        patch: &mut RecordPatch,
    ) -> NotesResult<()>;
}

/// Transforms one record's rendered body.
pub trait ContentInterceptor {
    fn filter_body(&self, ctx: &RequestContext, record: &Record, body: String) -> String;
}

/// Transforms an item's ordered record listing.
pub trait ListInterceptor {
    fn filter_list(&self, ctx: &RequestContext, item_id: ItemId, records: Vec<Record>)
        -> Vec<Record>;
}

/// Optionally answers a metadata read instead of storage.
///
/// `Ok(None)` defers to the next interceptor and finally to storage.
pub trait MetaInterceptor {
    fn read_meta(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        key: &str,
        records: &dyn RecordRepository,
    ) -> NotesResult<Option<String>>;
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    EmptyName(HookPoint),
    DuplicateInterceptor { hook: HookPoint, name: String },
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName(hook) => write!(f, "interceptor name for `{hook}` must not be empty"),
            Self::DuplicateInterceptor { hook, name } => {
                write!(f, "interceptor `{name}` already registered on `{hook}`")
            }
        }
    }
}

impl Error for PipelineError {}

struct Entry<T: ?Sized> {
    name: String,
    priority: i32,
    interceptor: Box<T>,
}

struct Chain<T: ?Sized> {
    hook: HookPoint,
    entries: Vec<Entry<T>>,
}

impl<T: ?Sized> Chain<T> {
    fn new(hook: HookPoint) -> Self {
        Self {
            hook,
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, name: &str, priority: i32, interceptor: Box<T>) -> Result<(), PipelineError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PipelineError::EmptyName(self.hook));
        }
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(PipelineError::DuplicateInterceptor {
                hook: self.hook,
                name: name.to_string(),
            });
        }

        // Stable: entries with equal priority keep registration order.
        let position = self
            .entries
            .iter()
            .position(|entry| entry.priority > priority)
            .unwrap_or(self.entries.len());
        self.entries.insert(
            position,
            Entry {
                name: name.to_string(),
                priority,
                interceptor,
            },
        );
        Ok(())
    }

    fn describe(&self) -> Vec<(&str, i32)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.priority))
            .collect()
    }
}

/// Interceptor registry and runner for every hook point.
pub struct Pipeline {
    create: Chain<dyn CreateInterceptor>,
    update: Chain<dyn UpdateInterceptor>,
    read_one: Chain<dyn ContentInterceptor>,
    read_list: Chain<dyn ListInterceptor>,
    read_meta: Chain<dyn MetaInterceptor>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Empty pipeline; every operation passes through.
    pub fn new() -> Self {
        Self {
            create: Chain::new(HookPoint::Create),
            update: Chain::new(HookPoint::Update),
            read_one: Chain::new(HookPoint::ReadOne),
            read_list: Chain::new(HookPoint::ReadList),
            read_meta: Chain::new(HookPoint::ReadMeta),
        }
    }

    pub fn register_create(
        &mut self,
        name: &str,
        priority: i32,
        interceptor: impl CreateInterceptor + 'static,
    ) -> Result<(), PipelineError> {
        self.create.insert(name, priority, Box::new(interceptor))
    }

    pub fn register_update(
        &mut self,
        name: &str,
        priority: i32,
        interceptor: impl UpdateInterceptor + 'static,
    ) -> Result<(), PipelineError> {
        self.update.insert(name, priority, Box::new(interceptor))
    }

    pub fn register_read_one(
        &mut self,
        name: &str,
        priority: i32,
        interceptor: impl ContentInterceptor + 'static,
    ) -> Result<(), PipelineError> {
        self.read_one.insert(name, priority, Box::new(interceptor))
    }

    pub fn register_read_list(
        &mut self,
        name: &str,
        priority: i32,
        interceptor: impl ListInterceptor + 'static,
    ) -> Result<(), PipelineError> {
        self.read_list.insert(name, priority, Box::new(interceptor))
    }

    pub fn register_read_meta(
        &mut self,
        name: &str,
        priority: i32,
        interceptor: impl MetaInterceptor + 'static,
    ) -> Result<(), PipelineError> {
        self.read_meta.insert(name, priority, Box::new(interceptor))
    }

    /// Registered `(name, priority)` pairs in execution order.
    pub fn registered(&self, hook: HookPoint) -> Vec<(&str, i32)> {
        match hook {
            HookPoint::Create => self.create.describe(),
            HookPoint::Update => self.update.describe(),
            HookPoint::ReadOne => self.read_one.describe(),
            HookPoint::ReadList => self.read_list.describe(),
            HookPoint::ReadMeta => self.read_meta.describe(),
        }
    }

    pub fn run_create(
        &self,
        ctx: &RequestContext,
        draft: &mut CreateDraft,
        records: &dyn RecordRepository,
    ) -> NotesResult<()> {
        for entry in &self.create.entries {
            if let Err(err) = entry.interceptor.before_create(ctx, draft, records) {
                warn!(
                    "event=pipeline_reject module=pipeline status=rejected hook=create interceptor={} reason={} channel={} item_id={} request_id={}",
                    entry.name,
                    err.reason(),
                    draft.channel.as_str(),
                    draft.record.item_id,
                    ctx.request_id
                );
                return Err(err);
            }
        }
        debug!(
            "event=pipeline_pass module=pipeline status=ok hook=create kind={} request_id={}",
            draft.record.kind, ctx.request_id
        );
        Ok(())
    }

    pub fn run_update(
        &self,
        ctx: &RequestContext,
        stored: &Record,
        patch: &mut RecordPatch,
    ) -> NotesResult<()> {
        for entry in &self.update.entries {
            if let Err(err) = entry.interceptor.before_update(ctx, stored, patch) {
                warn!(
                    "event=pipeline_reject module=pipeline status=rejected hook=update interceptor={} reason={} record_id={} request_id={}",
                    entry.name,
                    err.reason(),
                    stored.id,
                    ctx.request_id
                );
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn run_read_one(&self, ctx: &RequestContext, record: &Record) -> String {
        self.read_one
            .entries
            .iter()
            .fold(record.body.clone(), |body, entry| {
                entry.interceptor.filter_body(ctx, record, body)
            })
    }

    pub fn run_read_list(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        records: Vec<Record>,
    ) -> Vec<Record> {
        self.read_list
            .entries
            .iter()
            .fold(records, |records, entry| {
                entry.interceptor.filter_list(ctx, item_id, records)
            })
    }

    /// First interceptor answering `Some` wins; `None` means read storage.
    pub fn run_read_meta(
        &self,
        ctx: &RequestContext,
        item_id: ItemId,
        key: &str,
        records: &dyn RecordRepository,
    ) -> NotesResult<Option<String>> {
        for entry in &self.read_meta.entries {
            if let Some(value) = entry.interceptor.read_meta(ctx, item_id, key, records)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
