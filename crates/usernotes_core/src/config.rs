//! Runtime configuration for the note overlay.
//!
//! # Responsibility
//! - Name the form fields, API header, metadata key and binding source the
//!   overlay listens on.
//! - Carry the translation table and logging settings.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - Unknown keys are rejected so typos do not silently fall back.
//! - `validate()` runs on every load path.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotesConfig {
    pub form: FormConfig,
    pub api: ApiConfig,
    pub status: StatusConfig,
    /// Source message id -> translated text.
    pub translations: BTreeMap<String, String>,
    pub logging: LoggingConfig,
}

/// Classic form submission field names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Field whose value `"1"` marks a note submission.
    pub flag_field: String,
    /// Field carrying the id of the note being edited.
    pub target_field: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            flag_field: "user_note".to_string(),
            target_field: "comment_ID".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Header that marks an API submission as a note. Matched case-insensitively.
    pub note_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            note_header: "x-user-note".to_string(),
        }
    }
}

/// Status projection surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
    /// Reserved metadata key whose reads are synthesized per viewer.
    pub meta_key: String,
    /// Namespaced block-binding source key.
    pub binding_source: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            meta_key: "user_note_status".to_string(),
            binding_source: "user-notes/note-status".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; build-mode default when absent.
    pub level: Option<String>,
    /// Absolute log directory; file logging stays off when absent.
    pub dir: Option<PathBuf>,
}

/// Configuration load/validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl NotesConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = [
            ("form.flag_field", self.form.flag_field.as_str()),
            ("form.target_field", self.form.target_field.as_str()),
            ("api.note_header", self.api.note_header.as_str()),
            ("status.meta_key", self.status.meta_key.as_str()),
            ("status.binding_source", self.status.binding_source.as_str()),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("`{field}` must not be empty")));
            }
        }

        if self.form.flag_field == self.form.target_field {
            return Err(ConfigError::Invalid(
                "`form.flag_field` and `form.target_field` must differ".to_string(),
            ));
        }

        if !self.status.binding_source.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "`status.binding_source` must be namespaced, got `{}`",
                self.status.binding_source
            )));
        }

        if let Some(dir) = self.logging.dir.as_ref() {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "`logging.dir` must be absolute, got `{}`",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, NotesConfig};

    #[test]
    fn empty_document_uses_defaults() {
        let config = NotesConfig::from_json_str("{}").expect("empty config parses");
        assert_eq!(config, NotesConfig::default());
        assert_eq!(config.form.flag_field, "user_note");
        assert_eq!(config.status.meta_key, "user_note_status");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = NotesConfig::from_json_str(
            r#"{ "api": { "note_header": "x-private" }, "translations": { "Edit note": "Modifier" } }"#,
        )
        .expect("partial config parses");
        assert_eq!(config.api.note_header, "x-private");
        assert_eq!(config.form.target_field, "comment_ID");
        assert_eq!(config.translations.get("Edit note").map(String::as_str), Some("Modifier"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = NotesConfig::from_json_str(r#"{ "statsu": {} }"#).expect_err("typo must fail");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_blank_and_non_namespaced_names() {
        let err = NotesConfig::from_json_str(r#"{ "status": { "meta_key": " " } }"#)
            .expect_err("blank key must fail");
        assert!(err.to_string().contains("status.meta_key"));

        let err = NotesConfig::from_json_str(r#"{ "status": { "binding_source": "flat" } }"#)
            .expect_err("flat source must fail");
        assert!(err.to_string().contains("namespaced"));
    }

    #[test]
    fn rejects_relative_log_dir() {
        let err = NotesConfig::from_json_str(r#"{ "logging": { "dir": "logs" } }"#)
            .expect_err("relative dir must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
