//! Use-case level JSON endpoints.
//!
//! # Contract
//! - Inputs are raw JSON strings exactly as received.
//! - Success bodies are record objects (or arrays of them).
//! - Error bodies are `{ "code", "message", "data": { "status" } }`.
//! - Never panics.

use crate::fields::RestFieldRegistry;
use crate::headers::Headers;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use usernotes_core::{
    ApiCreate, ApiError, ItemId, ItemMetaRepository, NotesError, NotesService, RecordId,
    RecordPatch, RecordRepository, RequestContext,
};

pub const CODE_INVALID_JSON: &str = "invalid_json";
const MSG_INVALID_JSON: &str = "The request body is not valid JSON.";

/// HTTP-style response produced by every endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn error(err: &ApiError) -> Self {
        Self {
            status: err.status,
            body: json!({
                "code": err.code,
                "message": err.message,
                "data": { "status": err.status },
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Update body; absent fields keep stored values.
#[derive(Debug, Default, Deserialize)]
struct ApiUpdate {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// `POST /records`. The configured note header marks a private note.
pub fn create_record<R, M>(
    service: &NotesService<R, M>,
    fields: &RestFieldRegistry,
    ctx: &RequestContext,
    headers: &Headers,
    body_json: &str,
) -> ApiResponse
where
    R: RecordRepository,
    M: ItemMetaRepository,
{
    let request: ApiCreate = match parse_body(service, ctx, body_json) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let note_header = headers.get(&service.config().api.note_header);

    match service.create_via_api(ctx, note_header, request) {
        Ok(record) => ApiResponse::ok(201, fields.record_json(ctx, &record)),
        Err(err) => ApiResponse::error(&err),
    }
}

/// `POST /records/{id}`.
pub fn update_record<R, M>(
    service: &NotesService<R, M>,
    fields: &RestFieldRegistry,
    ctx: &RequestContext,
    id: RecordId,
    body_json: &str,
) -> ApiResponse
where
    R: RecordRepository,
    M: ItemMetaRepository,
{
    let request: ApiUpdate = match parse_body(service, ctx, body_json) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let patch = RecordPatch {
        body: request.content,
        status: request.status,
        ..RecordPatch::default()
    };

    match service.update_via_api(ctx, id, patch) {
        Ok(record) => ApiResponse::ok(200, fields.record_json(ctx, &record)),
        Err(err) => ApiResponse::error(&err),
    }
}

/// `GET /records/{id}`. Hidden notes come back with empty content.
pub fn get_record<R, M>(
    service: &NotesService<R, M>,
    fields: &RestFieldRegistry,
    ctx: &RequestContext,
    id: RecordId,
) -> ApiResponse
where
    R: RecordRepository,
    M: ItemMetaRepository,
{
    match service.get_record(ctx, id) {
        Ok(Some(record)) => ApiResponse::ok(200, fields.record_json(ctx, &record)),
        Ok(None) => failure(service, ctx, NotesError::NotFound(id)),
        Err(err) => failure(service, ctx, err),
    }
}

/// `GET /records?item_id=`. Hidden notes are omitted.
pub fn list_records<R, M>(
    service: &NotesService<R, M>,
    fields: &RestFieldRegistry,
    ctx: &RequestContext,
    item_id: ItemId,
) -> ApiResponse
where
    R: RecordRepository,
    M: ItemMetaRepository,
{
    match service.list_for_item(ctx, item_id) {
        Ok(records) => {
            debug!(
                "event=api_list module=api status=ok item_id={} count={} request_id={}",
                item_id,
                records.len(),
                ctx.request_id
            );
            let items = records
                .iter()
                .map(|record| fields.record_json(ctx, record))
                .collect::<Vec<_>>();
            ApiResponse::ok(200, Value::Array(items))
        }
        Err(err) => failure(service, ctx, err),
    }
}

fn failure<R, M>(service: &NotesService<R, M>, ctx: &RequestContext, err: NotesError) -> ApiResponse
where
    R: RecordRepository,
    M: ItemMetaRepository,
{
    ApiResponse::error(&service.to_api_error(ctx, &err))
}

fn parse_body<T, R, M>(
    service: &NotesService<R, M>,
    ctx: &RequestContext,
    body_json: &str,
) -> Result<T, ApiResponse>
where
    T: DeserializeOwned,
    R: RecordRepository,
    M: ItemMetaRepository,
{
    serde_json::from_str(body_json).map_err(|err| {
        warn!(
            "event=api_request module=api status=rejected code={} line={} column={} request_id={}",
            CODE_INVALID_JSON,
            err.line(),
            err.column(),
            ctx.request_id
        );
        ApiResponse::error(&ApiError::new(
            CODE_INVALID_JSON,
            service.catalog().translate(MSG_INVALID_JSON),
            400,
        ))
    })
}
