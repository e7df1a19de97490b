//! Request query model and normalisation
//!
//! A [`RequestQuery`] is the key → raw value mapping of one request. It is
//! built once per request, normalised once (fit synonyms folded into `fit`),
//! and read-only from then on.

use std::collections::BTreeMap;

use crate::error::ItsError;

/// Canonical key for the fit family of transforms
pub const FIT_KEY: &str = "fit";

/// Keys accepted as aliases of `fit`
pub const FIT_SYNONYMS: &[&str] = &["crop", "focalcrop"];

/// Ordered mapping from parameter name to raw value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQuery {
    params: BTreeMap<String, String>,
}

impl RequestQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URL query string (`fit=100x100&format=png`)
    ///
    /// Keys and values are percent-decoded; `+` is treated as a space.
    /// A key without `=` maps to an empty value. Later duplicates win.
    pub fn from_query_string(query: &str) -> Self {
        let mut result = Self::new();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            result.insert(decode_component(key), decode_component(value));
        }

        result
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.remove(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Fold the fit synonyms into the canonical `fit` key
    ///
    /// Fails when more than one of `fit`, `crop`, `focalcrop` is present.
    /// Every other key is left untouched.
    pub fn normalize(mut self) -> Result<Self, ItsError> {
        let present = std::iter::once(FIT_KEY)
            .chain(FIT_SYNONYMS.iter().copied())
            .filter(|key| self.contains_key(key))
            .count();

        if present > 1 {
            return Err(ItsError::SynonymConflict);
        }

        for synonym in FIT_SYNONYMS {
            if let Some(value) = self.remove(synonym) {
                self.insert(FIT_KEY, value);
            }
        }

        Ok(self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestQuery {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Self::new();
        for (key, value) in iter {
            query.insert(key, value);
        }
        query
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
