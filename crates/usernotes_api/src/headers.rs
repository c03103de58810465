//! Case-insensitive request header map.

use std::collections::BTreeMap;

/// Request headers keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    values: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header; a repeated name replaces the earlier value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values
            .insert(name.trim().to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.trim().to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::Headers;

    #[test]
    fn lookup_ignores_case() {
        let headers: Headers = [("X-User-Note", "1")].into_iter().collect();
        assert_eq!(headers.get("x-user-note"), Some("1"));
        assert_eq!(headers.get("X-USER-NOTE"), Some("1"));
        assert_eq!(headers.get("content-type"), None);
    }
}
