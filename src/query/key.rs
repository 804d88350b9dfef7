//! Query keys: hierarchical identifiers for cache entries.
//!
//! DESIGN
//! ======
//! A key is an ordered list of string segments. Structured segments (filter
//! bodies) are stored as their canonical JSON text so two equal filters always
//! produce the same key. Prefix matching drives bulk invalidation: the key
//! `["block-documents"]` covers both the list and the count entries.

use std::fmt;

use serde::Serialize;

#[cfg(test)]
#[path = "key_test.rs"]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a plain string segment.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }

    /// Append a structured segment encoded as compact JSON.
    ///
    /// A value serde_json cannot encode (e.g. a map with non-string keys)
    /// becomes `null` and is logged, since such keys can collide.
    #[must_use]
    pub fn json_segment<T: Serialize>(self, value: &T) -> Self {
        let encoded = serde_json::to_string(value).unwrap_or_else(|e| {
            tracing::warn!(key = %self, error = %e, "query key segment is not JSON-encodable");
            "null".to_owned()
        });
        self.segment(encoded)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `prefix` matches the leading segments of this key.
    /// The empty key is a prefix of everything.
    #[must_use]
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl<S: Into<String>> FromIterator<S> for QueryKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
