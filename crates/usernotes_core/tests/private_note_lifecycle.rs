use rusqlite::Connection;
use usernotes_core::service::surface::{CODE_FORBIDDEN, CODE_LOGIN_REQUIRED, CODE_NOTE_EXISTS};
use usernotes_core::{
    open_db_in_memory, ApiCreate, Capability, FormSubmission, NotesConfig, NotesError,
    NotesService, RecordPatch, RecordRepository, RequestContext, SqliteItemMetaRepository,
    SqliteRecordRepository, Viewer, PRIVATE_NOTE_KIND,
};

const ITEM: i64 = 10;

type Service<'conn> = NotesService<SqliteRecordRepository<'conn>, SqliteItemMetaRepository<'conn>>;

fn service(conn: &Connection) -> Service<'_> {
    NotesService::new(
        SqliteRecordRepository::try_new(conn).unwrap(),
        SqliteItemMetaRepository::try_new(conn).unwrap(),
        NotesConfig::default(),
    )
    .unwrap()
}

fn user(id: i64) -> RequestContext {
    RequestContext::new(Viewer::user(id))
}

fn note_form(body: &str) -> FormSubmission {
    FormSubmission::new(ITEM, body).with_field("user_note", "1")
}

#[test]
fn full_note_lifecycle_for_two_users() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let u1 = user(1);
    let u2 = user(2);

    let note = service
        .submit_form(&u1, note_form("Remember to follow up"))
        .unwrap();
    assert_eq!(note.kind, PRIVATE_NOTE_KIND);
    assert_eq!(note.author_id, Some(1));

    assert!(service.list_for_item(&u2, ITEM).unwrap().is_empty());

    let rejection = service
        .submit_form(&u1, note_form("second note"))
        .unwrap_err();
    assert_eq!(
        rejection.message,
        "You already have a note on this item. Please edit your existing note instead."
    );

    let edited = service
        .submit_form(
            &u1,
            note_form("Actually, done").with_field("comment_ID", note.id.to_string()),
        )
        .unwrap();
    assert_eq!(edited.id, note.id);
    assert_eq!(edited.body, "Actually, done");
    assert_eq!(service.record_count(ITEM).unwrap(), 1);

    let err = service
        .update(&u2, note.id, RecordPatch::body("hijack"))
        .unwrap_err();
    assert!(matches!(err, NotesError::Unauthorized { record_id } if record_id == note.id));

    let mine = service.list_for_item(&u1, ITEM).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].body, "Actually, done");
}

#[test]
fn unflagged_form_submission_is_a_plain_comment() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let comment = service
        .submit_form(&user(1), FormSubmission::new(ITEM, "Great post"))
        .unwrap();
    assert_eq!(comment.kind, "comment");

    let flag_other_value = service
        .submit_form(
            &user(1),
            FormSubmission::new(ITEM, "still a comment").with_field("user_note", "yes"),
        )
        .unwrap();
    assert_eq!(flag_other_value.kind, "comment");

    // Foreign kinds never count against the note quota.
    let note = service.submit_form(&user(1), note_form("mine")).unwrap();
    assert_eq!(note.kind, PRIVATE_NOTE_KIND);
}

#[test]
fn anonymous_note_submission_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let rejection = service
        .submit_form(&RequestContext::anonymous(), note_form("hello"))
        .unwrap_err();
    assert_eq!(rejection.message, "You must be logged in to add a note.");
    assert_eq!(service.record_count(ITEM).unwrap(), 0);
}

#[test]
fn anonymous_plain_comment_still_passes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let comment = service
        .submit_form(&RequestContext::anonymous(), FormSubmission::new(ITEM, "guest"))
        .unwrap();
    assert_eq!(comment.author_id, None);
}

#[test]
fn notes_are_unique_per_item_not_globally() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let u1 = user(1);

    service.submit_form(&u1, note_form("first item")).unwrap();
    let other = service
        .submit_form(&u1, FormSubmission::new(ITEM + 1, "other item").with_field("user_note", "1"))
        .unwrap();
    assert_eq!(other.item_id, ITEM + 1);

    let second_author = service.submit_form(&user(2), note_form("u2 note")).unwrap();
    assert_eq!(second_author.author_id, Some(2));
}

#[test]
fn api_header_creates_note_and_rejects_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let u1 = user(1);
    let request = ApiCreate {
        item_id: ITEM,
        content: "via api".to_string(),
        author_id: None,
        kind: None,
        target_id: None,
    };

    let note = service
        .create_via_api(&u1, Some("1"), request.clone())
        .unwrap();
    assert_eq!(note.kind, PRIVATE_NOTE_KIND);
    assert_eq!(note.author_id, Some(1));

    let err = service.create_via_api(&u1, Some("1"), request).unwrap_err();
    assert_eq!(err.code, CODE_NOTE_EXISTS);
    assert_eq!(err.status, 400);
}

#[test]
fn api_header_zero_is_not_a_note_signal() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let request = ApiCreate {
        item_id: ITEM,
        content: "plain".to_string(),
        author_id: None,
        kind: None,
        target_id: None,
    };

    let record = service.create_via_api(&user(1), Some("0"), request).unwrap();
    assert_eq!(record.kind, "comment");
}

#[test]
fn explicit_kind_forces_caller_authorship() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let request = ApiCreate {
        item_id: ITEM,
        content: "explicit".to_string(),
        author_id: Some(99),
        kind: Some(PRIVATE_NOTE_KIND.to_string()),
        target_id: None,
    };

    let note = service.create_via_api(&user(4), None, request.clone()).unwrap();
    assert_eq!(note.author_id, Some(4));

    let err = service
        .create_via_api(&RequestContext::anonymous(), None, request)
        .unwrap_err();
    assert_eq!(err.code, CODE_LOGIN_REQUIRED);
    assert_eq!(err.status, 401);
}

#[test]
fn foreign_kinds_pass_through_api_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let request = ApiCreate {
        item_id: ITEM,
        content: "ping".to_string(),
        author_id: None,
        kind: Some("pingback".to_string()),
        target_id: None,
    };

    let first = service.create_via_api(&user(1), None, request.clone()).unwrap();
    let second = service.create_via_api(&user(1), None, request).unwrap();
    assert_eq!(first.kind, "pingback");
    assert_ne!(first.id, second.id);
    assert_eq!(service.list_for_item(&user(2), ITEM).unwrap().len(), 2);
}

#[test]
fn moderator_may_edit_but_api_forbids_strangers() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let note = service.submit_form(&user(1), note_form("owned")).unwrap();

    let err = service
        .update_via_api(&user(2), note.id, RecordPatch::body("nope"))
        .unwrap_err();
    assert_eq!(err.code, CODE_FORBIDDEN);
    assert_eq!(err.status, 403);

    let moderator = RequestContext::new(Viewer::user(3).with_capability(Capability::ModerateComments));
    let moderated = service
        .update(&moderator, note.id, RecordPatch::body("moderated"))
        .unwrap();
    assert_eq!(moderated.body, "");
    assert_eq!(moderated.author_id, Some(1));

    let records = SqliteRecordRepository::try_new(&conn).unwrap();
    assert_eq!(records.get_record(note.id).unwrap().unwrap().body, "moderated");
}

#[test]
fn update_response_hides_note_body_from_moderator() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let note = service.submit_form(&user(1), note_form("secret")).unwrap();
    let moderator = RequestContext::new(Viewer::user(9).with_capability(Capability::ModerateComments));
    let hold = RecordPatch {
        status: Some("hold".to_string()),
        ..RecordPatch::default()
    };

    let updated = service.update(&moderator, note.id, hold.clone()).unwrap();
    assert_eq!(updated.status, "hold");
    assert_eq!(updated.body, "");

    let via_api = service.update_via_api(&moderator, note.id, hold).unwrap();
    assert_eq!(via_api.body, "");

    let own = service.update(&user(1), note.id, RecordPatch::default()).unwrap();
    assert_eq!(own.body, "secret");
}

#[test]
fn header_path_cannot_attribute_note_to_another_user() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.submit_form(&user(2), note_form("u2 note")).unwrap();
    let spoofed = ApiCreate {
        item_id: ITEM,
        content: "written by u1".to_string(),
        author_id: Some(2),
        kind: None,
        target_id: None,
    };

    let err = service
        .create_via_api(&user(1), Some("1"), spoofed.clone())
        .unwrap_err();
    assert_eq!(err.code, CODE_FORBIDDEN);
    assert_eq!(err.status, 403);

    let on_fresh_item = ApiCreate {
        item_id: ITEM + 1,
        ..spoofed.clone()
    };
    assert!(service
        .create_via_api(&user(1), Some("1"), on_fresh_item)
        .is_err());
    assert_eq!(service.record_count(ITEM).unwrap(), 1);
    assert_eq!(service.record_count(ITEM + 1).unwrap(), 0);

    let own_id = ApiCreate {
        author_id: Some(1),
        ..spoofed
    };
    let note = service.create_via_api(&user(1), Some("1"), own_id).unwrap();
    assert_eq!(note.author_id, Some(1));
}

#[test]
fn moderator_attribution_still_enforces_one_note_per_author() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let moderator = RequestContext::new(Viewer::user(9).with_capability(Capability::ModerateComments));
    let on_behalf = ApiCreate {
        item_id: ITEM,
        content: "filed for u2".to_string(),
        author_id: Some(2),
        kind: None,
        target_id: None,
    };

    let note = service
        .create_via_api(&moderator, Some("1"), on_behalf.clone())
        .unwrap();
    assert_eq!(note.author_id, Some(2));
    assert_eq!(note.body, "");

    let err = service
        .create_via_api(&moderator, Some("1"), on_behalf)
        .unwrap_err();
    assert_eq!(err.code, CODE_NOTE_EXISTS);
    let rejection = service
        .submit_form(&user(2), note_form("u2 again"))
        .unwrap_err();
    assert!(rejection.message.starts_with("You already have a note"));
}

#[test]
fn stranger_cannot_edit_through_form_target() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let note = service.submit_form(&user(1), note_form("owned")).unwrap();

    let rejection = service
        .submit_form(
            &user(2),
            note_form("overwrite").with_field("comment_ID", note.id.to_string()),
        )
        .unwrap_err();
    assert_eq!(rejection.message, "You cannot edit this note.");

    let records = SqliteRecordRepository::try_new(&conn).unwrap();
    assert_eq!(records.get_record(note.id).unwrap().unwrap().body, "owned");
}

#[test]
fn invalid_targets_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let comment = service
        .submit_form(&user(1), FormSubmission::new(ITEM, "comment"))
        .unwrap();

    let not_a_note = service
        .submit_form(
            &user(1),
            note_form("x").with_field("comment_ID", comment.id.to_string()),
        )
        .unwrap_err();
    assert_eq!(
        not_a_note.message,
        "The selected record is not your note on this item."
    );

    let missing = service
        .submit_form(&user(1), note_form("x").with_field("comment_ID", "4242"))
        .unwrap_err();
    assert_eq!(
        missing.message,
        "The note you are trying to edit does not exist."
    );

    let garbage = service
        .submit_form(&user(1), note_form("x").with_field("comment_ID", "abc"))
        .unwrap_err();
    assert_eq!(
        garbage.message,
        "The selected record is not your note on this item."
    );
    assert_eq!(service.record_count(ITEM).unwrap(), 1);
}

#[test]
fn non_note_updates_are_not_guarded() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let comment = service
        .submit_form(&user(1), FormSubmission::new(ITEM, "comment"))
        .unwrap();

    let updated = service
        .update(&user(2), comment.id, RecordPatch::body("edited by host rules"))
        .unwrap();
    assert_eq!(updated.body, "edited by host rules");
}
