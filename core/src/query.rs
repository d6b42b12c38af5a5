//! Query option builder following the WD API conventions.
//!
//! Eager-load hints go out as repeated `with[]` keys, ids as plain decimal
//! text, booleans as `1`/`0`. Pairs keep insertion order so requests are
//! reproducible in tests.

use std::fmt::Display;

/// Key of the repeated eager-load parameter.
pub const WITH_KEY: &str = "with[]";

/// Ordered list of query parameters for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append eager-load hints, one `with[]` pair per relation path.
    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for relation in relations {
            self.pairs
                .push((WITH_KEY.to_string(), relation.as_ref().to_string()));
        }
        self
    }

    /// Append a scalar parameter.
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn flag(self, key: &str, value: bool) -> Self {
        self.param(key, if value { 1 } else { 0 })
    }

    /// Replace every existing value of `key` with a single new value, or
    /// append it if absent. Used to advance the page counter in place.
    pub fn set(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = 0;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Relation paths requested with `with[]`.
    pub fn relations(&self) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == WITH_KEY)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}
