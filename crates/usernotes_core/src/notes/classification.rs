//! Classification layer: tags note submissions before they reach storage.
//!
//! # Invariants
//! - Never queries storage; only mutates the in-flight draft.
//! - Signals combine by logical OR.
//! - The explicit API field forces authorship to the authenticated caller.
//! - Drafts without a signal keep their requested kind untouched.

use crate::context::request::RequestContext;
use crate::model::record::PRIVATE_NOTE_KIND;
use crate::notes::error::{NotesError, NotesResult};
use crate::pipeline::payload::{CreateDraft, SubmissionSignals};
use crate::pipeline::CreateInterceptor;
use crate::repo::record_repo::RecordRepository;
use log::info;

/// Form flag value that marks a note submission.
pub const FORM_FLAG_TRUTHY: &str = "1";

/// Which signal classified a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSignal {
    FormFlag,
    Header,
    ExplicitField,
}

impl ClassificationSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormFlag => "form_flag",
            Self::Header => "header",
            Self::ExplicitField => "explicit_field",
        }
    }
}

/// Returns whether a header value is truthy: non-empty and not `"0"`.
pub fn header_is_truthy(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty() && trimmed != "0"
}

/// Returns the strongest signal present, if any.
///
/// The explicit field wins because it carries the authorship override.
pub fn detect_signal(signals: &SubmissionSignals) -> Option<ClassificationSignal> {
    if signals.explicit_kind {
        return Some(ClassificationSignal::ExplicitField);
    }
    if signals.form_flag.as_deref() == Some(FORM_FLAG_TRUTHY) {
        return Some(ClassificationSignal::FormFlag);
    }
    if signals.header.as_deref().is_some_and(header_is_truthy) {
        return Some(ClassificationSignal::Header);
    }
    None
}

/// Applies classification to one draft.
pub fn classify(ctx: &RequestContext, draft: &mut CreateDraft) -> NotesResult<bool> {
    let Some(signal) = detect_signal(&draft.signals) else {
        return Ok(false);
    };

    if signal == ClassificationSignal::ExplicitField {
        let Some(caller) = ctx.user_id() else {
            return Err(NotesError::Unauthenticated);
        };
        draft.record.author_id = Some(caller);
    }

    draft.record.kind = PRIVATE_NOTE_KIND.to_string();
    info!(
        "event=note_classify module=notes status=ok signal={} channel={} item_id={} request_id={}",
        signal.as_str(),
        draft.channel.as_str(),
        draft.record.item_id,
        ctx.request_id
    );
    Ok(true)
}

/// Create-chain interceptor wrapping [`classify`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl CreateInterceptor for Classifier {
    fn before_create(
        &self,
        ctx: &RequestContext,
        draft: &mut CreateDraft,
        _records: &dyn RecordRepository,
    ) -> NotesResult<()> {
        classify(ctx, draft).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, detect_signal, header_is_truthy, ClassificationSignal};
    use crate::context::request::{RequestContext, Viewer};
    use crate::model::record::NewRecord;
    use crate::notes::error::NotesError;
    use crate::pipeline::payload::{Channel, CreateDraft, SubmissionSignals};

    fn draft(channel: Channel, signals: SubmissionSignals) -> CreateDraft {
        CreateDraft::new(NewRecord::new(4, Some(8), "text"), channel).with_signals(signals)
    }

    #[test]
    fn form_flag_must_be_exactly_one() {
        for (value, expected) in [("1", true), ("true", false), ("0", false), ("", false)] {
            let signals = SubmissionSignals {
                form_flag: Some(value.to_string()),
                ..SubmissionSignals::default()
            };
            assert_eq!(detect_signal(&signals).is_some(), expected, "flag `{value}`");
        }
    }

    #[test]
    fn header_truthiness_follows_host_semantics() {
        assert!(header_is_truthy("1"));
        assert!(header_is_truthy("yes"));
        assert!(!header_is_truthy("0"));
        assert!(!header_is_truthy("  "));
    }

    #[test]
    fn explicit_field_overrides_supplied_author() {
        let ctx = RequestContext::new(Viewer::user(3));
        let mut draft = draft(
            Channel::Api,
            SubmissionSignals {
                explicit_kind: true,
                ..SubmissionSignals::default()
            },
        );
        assert!(classify(&ctx, &mut draft).unwrap());
        assert!(draft.record.is_private_note());
        assert_eq!(draft.record.author_id, Some(3));
    }

    #[test]
    fn explicit_field_requires_authentication() {
        let mut draft = draft(
            Channel::Api,
            SubmissionSignals {
                explicit_kind: true,
                ..SubmissionSignals::default()
            },
        );
        let err = classify(&RequestContext::anonymous(), &mut draft).unwrap_err();
        assert!(matches!(err, NotesError::Unauthenticated));
        assert!(!draft.record.is_private_note());
    }

    #[test]
    fn header_keeps_supplied_author() {
        let ctx = RequestContext::new(Viewer::user(3));
        let mut draft = draft(
            Channel::Api,
            SubmissionSignals {
                header: Some("1".to_string()),
                ..SubmissionSignals::default()
            },
        );
        assert!(classify(&ctx, &mut draft).unwrap());
        assert_eq!(draft.record.author_id, Some(8));
    }

    #[test]
    fn both_signals_present_still_classifies() {
        let signals = SubmissionSignals {
            form_flag: Some("1".to_string()),
            header: None,
            explicit_kind: true,
        };
        assert_eq!(
            detect_signal(&signals),
            Some(ClassificationSignal::ExplicitField)
        );
    }

    #[test]
    fn unsignalled_draft_keeps_foreign_kind() {
        let ctx = RequestContext::new(Viewer::user(3));
        let mut draft = CreateDraft::new(
            NewRecord::new(4, Some(3), "pingback").with_kind("pingback"),
            Channel::Api,
        );
        assert!(!classify(&ctx, &mut draft).unwrap());
        assert_eq!(draft.record.kind, "pingback");
    }
}
