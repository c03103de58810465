//! In-flight payloads handed to create interceptors.

use crate::model::record::{NewRecord, RecordId};

/// Transport a creation request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Classic form POST; failures terminate with a blocking message.
    Form,
    /// JSON API; failures become structured errors.
    Api,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Api => "api",
        }
    }
}

/// Raw classification signals, exactly as the transport delivered them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSignals {
    /// Form flag field value (classic path).
    pub form_flag: Option<String>,
    /// Note header value (API path).
    pub header: Option<String>,
    /// Whether the API body explicitly requested the private-note kind.
    pub explicit_kind: bool,
}

/// Creation request moving through the create chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDraft {
    pub record: NewRecord,
    pub channel: Channel,
    pub signals: SubmissionSignals,
    /// Existing record the caller claims to be editing.
    pub target_id: Option<RecordId>,
}

impl CreateDraft {
    pub fn new(record: NewRecord, channel: Channel) -> Self {
        Self {
            record,
            channel,
            signals: SubmissionSignals::default(),
            target_id: None,
        }
    }

    pub fn with_signals(mut self, signals: SubmissionSignals) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_target(mut self, target_id: Option<RecordId>) -> Self {
        self.target_id = target_id;
        self
    }
}
