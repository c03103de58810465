//! Explicit per-request identity and item context.

use crate::context::capability::{parse_capability, Capability, CapabilityError};
use crate::model::record::{ItemId, UserId};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Identity performing the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    user_id: Option<UserId>,
    capabilities: BTreeSet<Capability>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Authenticated viewer. Ids `<= 0` are the host's anonymous marker.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: (user_id > 0).then_some(user_id),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Grants every capability named by host role strings.
    pub fn with_roles<'a>(
        mut self,
        roles: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, CapabilityError> {
        for role in roles {
            self.capabilities.insert(parse_capability(role)?);
        }
        Ok(self)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Request-scoped context threaded into every pipeline call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlates log events of one request.
    pub request_id: Uuid,
    pub viewer: Viewer,
    /// Item being rendered, when the request has one.
    pub current_item: Option<ItemId>,
    /// Request-authentication token handed to front-end scripts.
    pub auth_token: Option<String>,
}

impl RequestContext {
    pub fn new(viewer: Viewer) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            viewer,
            current_item: None,
            auth_token: None,
        }
    }

    pub fn anonymous() -> Self {
        Self::new(Viewer::anonymous())
    }

    pub fn with_current_item(mut self, item_id: ItemId) -> Self {
        self.current_item = Some(item_id);
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Shortcut for the viewer's user id.
    pub fn user_id(&self) -> Option<UserId> {
        self.viewer.user_id()
    }
}
