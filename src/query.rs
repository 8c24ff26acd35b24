//! Query-string parsing for report page URLs.
//!
//! Values are kept exactly as they appear in the URL; no percent-decoding is
//! performed.

use std::collections::HashMap;

use serde::Serialize;

/// Parameter keys in order of appearance plus a last-wins lookup.
///
/// A segment without `=` maps its key to `None`, which is distinct from an
/// empty value (`key=`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    pub keys: Vec<String>,
    pub lookup: HashMap<String, Option<String>>,
}

impl QueryParameters {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lookup.get(key).and_then(|value| value.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in URL order, each paired with its current lookup value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.keys
            .iter()
            .map(|key| (key.as_str(), self.get(key)))
    }
}

/// Split the query component of `url` into ordered keys and a lookup.
///
/// Everything after the first `?` is treated as the query; when there is no
/// `?` the whole input is. Never fails.
pub fn parse_query(url: &str) -> QueryParameters {
    let query = match url.find('?') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };

    let mut params = QueryParameters::default();
    for segment in query.split('&') {
        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key, Some(value.to_string())),
            None => (segment, None),
        };
        params.keys.push(key.to_string());
        params.lookup.insert(key.to_string(), value);
    }
    params
}
