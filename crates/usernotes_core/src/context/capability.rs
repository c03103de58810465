//! Viewer capability declarations for record guards.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Permission flag carried by a request's viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Override ownership checks on records of any kind.
    ModerateComments,
    /// Edit items the viewer does not author. Not consulted by note guards.
    EditOthersItems,
}

impl Capability {
    /// Stable string id used by host role declarations.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ModerateComments => CAPABILITY_MODERATE_COMMENTS,
            Self::EditOthersItems => CAPABILITY_EDIT_OTHERS_ITEMS,
        }
    }

    /// User-facing short description.
    pub fn description(self) -> &'static str {
        match self {
            Self::ModerateComments => "Allow editing and moderating comments and notes of any author.",
            Self::EditOthersItems => "Allow editing content items authored by other users.",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role string value for moderation capability.
pub const CAPABILITY_MODERATE_COMMENTS: &str = "moderate_comments";
/// Role string value for cross-author item editing.
pub const CAPABILITY_EDIT_OTHERS_ITEMS: &str = "edit_others_items";

/// Parses one capability from its role string value.
pub fn parse_capability(value: &str) -> Result<Capability, CapabilityError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(CapabilityError::EmptyCapability);
    }

    match normalized {
        CAPABILITY_MODERATE_COMMENTS => Ok(Capability::ModerateComments),
        CAPABILITY_EDIT_OTHERS_ITEMS => Ok(Capability::EditOthersItems),
        other => Err(CapabilityError::UnsupportedCapability(other.to_string())),
    }
}

/// Capability parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    EmptyCapability,
    UnsupportedCapability(String),
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCapability => write!(f, "capability value must not be empty"),
            Self::UnsupportedCapability(value) => write!(f, "capability is unsupported: {value}"),
        }
    }
}

impl Error for CapabilityError {}
