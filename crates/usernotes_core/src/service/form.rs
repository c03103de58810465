//! Note variant of the classic comment form.
//!
//! # Responsibility
//! - Describe the hidden fields and prefill a note form needs.
//! - Rewrite an existing `<textarea>` so it carries the viewer's note body.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TEXTAREA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(<textarea[^>]*>).*?(</textarea>)").expect("valid textarea regex")
});

/// One `<input type="hidden">` emitted into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

/// Form customization for the note variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    /// Reply title; notes render without one.
    pub title_reply: String,
    /// Whether the "logged in as" line is shown.
    pub show_logged_in_as: bool,
    pub hidden_fields: Vec<HiddenField>,
    /// Body of the viewer's existing note, used to prefill the textarea.
    pub existing_body: Option<String>,
}

impl NoteForm {
    /// Renders the hidden fields as HTML inputs.
    pub fn hidden_inputs_html(&self) -> String {
        self.hidden_fields
            .iter()
            .map(|field| {
                format!(
                    r#"<input type="hidden" name="{}" value="{}" />"#,
                    escape_html(&field.name),
                    escape_html(&field.value)
                )
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Prefills `field_html` with the existing note; unchanged when none.
    pub fn prefill(&self, field_html: &str) -> String {
        match self.existing_body.as_deref() {
            Some(body) => prefill_textarea(field_html, body),
            None => field_html.to_string(),
        }
    }
}

/// Replaces the content of the first `<textarea>` with the escaped `body`.
pub fn prefill_textarea(field_html: &str, body: &str) -> String {
    let escaped = escape_html(body);
    TEXTAREA_RE
        .replacen(field_html, 1, |caps: &Captures<'_>| {
            format!("{}{}{}", &caps[1], escaped, &caps[2])
        })
        .into_owned()
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}
