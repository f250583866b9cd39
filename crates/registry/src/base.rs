//! Identifying metadata for one logical stream.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// What role a session ended up playing once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Unknown,
    Source,
    Sink,
}

/// Identifying metadata for one logical stream, frozen once the owning
/// session is classified.
#[derive(Debug, Clone, Serialize)]
pub struct StreamBase {
    /// Monotonic per-process id, generated at connection accept.
    pub id: u64,
    pub vhost: String,
    pub app: String,
    pub name: String,
    /// The original publish/play request URL, including the query string.
    pub url: String,
    pub classification: Classification,
    /// Free-form request parameters, e.g. from `?a=1&b=2`.
    pub param: BTreeMap<String, String>,
    /// Unix timestamp (seconds) the session was accepted.
    pub on_time: u64,
}

impl StreamBase {
    /// Creates an unclassified base for a freshly accepted connection.
    pub fn new(vhost: impl Into<String>, on_time: u64) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            vhost: vhost.into(),
            app: String::new(),
            name: String::new(),
            url: String::new(),
            classification: Classification::Unknown,
            param: BTreeMap::new(),
            on_time,
        }
    }

    /// Parses a `publish`/`play` stream key of the form `name?a=1&b=2` and
    /// fills in `app`/`name`/`param`/`url`.
    pub fn populate(&mut self, app: impl Into<String>, stream_key: &str, classification: Classification) {
        self.app = app.into();
        self.url = stream_key.to_string();
        self.classification = classification;

        match stream_key.split_once('?') {
            Some((name, query)) => {
                self.name = name.to_string();
                for pair in query.split('&') {
                    if let Some((k, v)) = pair.split_once('=') {
                        self.param.insert(k.to_string(), v.to_string());
                    }
                }
            }
            None => self.name = stream_key.to_string(),
        }
    }

    pub fn get_param(&self, key: &str) -> Option<&str> {
        self.param.get(key).map(String::as_str)
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.param.insert(key.into(), value.into());
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn populate_splits_name_and_params() {
        let mut base = StreamBase::new("localhost", 0);
        base.populate("live", "stream?a=1&b=2", Classification::Source);
        assert_eq!(base.name, "stream");
        assert_eq!(base.get_param("a"), Some("1"));
        assert_eq!(base.get_param("b"), Some("2"));
        assert_eq!(base.classification, Classification::Source);
    }

    #[test]
    fn populate_without_query() {
        let mut base = StreamBase::new("localhost", 0);
        base.populate("live", "demo", Classification::Sink);
        assert_eq!(base.name, "demo");
        assert!(base.param.is_empty());
    }

    #[test]
    fn ids_are_monotonic() {
        let a = StreamBase::new("localhost", 0);
        let b = StreamBase::new("localhost", 0);
        assert!(b.id > a.id);
    }
}
