//! Nested configuration document with dotted-path access.
//!
//! A [`Configuration`] is an opaque JSON-shaped tree. The framework reads a
//! handful of well-known paths (`plugin.reader.mysql.class`, `job.channel`)
//! and passes everything else through to plugins untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A nested key-value document addressed with dotted paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(Value);

impl Configuration {
    /// Creates an empty document (`{}`).
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Wraps an existing JSON value.
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a JSON string into a document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self)
    }

    /// Builds a document from flat dotted keys, expanding each key into nesting.
    pub fn from_flat<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut conf = Self::new();
        for (key, value) in entries {
            conf.set(key.as_ref(), value);
        }
        conf
    }

    /// Returns the value at `path`, if present.
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.0);
        }
        path.split('.')
            .try_fold(&self.0, |node, segment| node.as_object()?.get(segment))
    }

    /// Returns the string at `path`, if present and a string.
    pub fn get_string(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Returns the unsigned integer at `path`, accepting numeric strings.
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        match self.get(path)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns the boolean at `path`, accepting `"true"`/`"false"` strings.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        match self.get(path)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Returns a copy of the subtree at `path`, if present.
    pub fn get_configuration(&self, path: &str) -> Option<Configuration> {
        self.get(path).cloned().map(Self)
    }

    /// Sets `value` at `path`, creating intermediate objects as needed.
    ///
    /// Non-object intermediate nodes are replaced by objects.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let mut node = &mut self.0;
        for segment in path.split('.') {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let Value::Object(map) = node else {
                unreachable!("node was just replaced by an object");
            };
            node = map.entry(segment.to_string()).or_insert(Value::Null);
        }
        *node = value.into();
    }

    /// Deep-merges `other` into `self`. Leaves present in both are taken
    /// from `other` when `overwrite` is set.
    pub fn merge(&mut self, other: &Configuration, overwrite: bool) {
        merge_values(&mut self.0, &other.0, overwrite);
    }

    /// Keys of the object at `path`, sorted.
    pub fn keys(&self, path: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .get(path)
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Whether the document is an empty object or null.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Borrows the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the document, returning the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

fn merge_values(target: &mut Value, source: &Value, overwrite: bool) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) => merge_values(existing, value, overwrite),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => {
            if overwrite || target.is_null() {
                *target = source.clone();
            }
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Value> for Configuration {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_flat_expands_dotted_keys() {
        let conf = Configuration::from_flat([
            ("plugin.reader.mysql.class", "example.MysqlReader"),
            ("plugin.writer.hdfs.class", "example.HdfsWriter"),
        ]);
        assert_eq!(
            conf.get_string("plugin.reader.mysql.class"),
            Some("example.MysqlReader")
        );
        assert_eq!(
            conf.get_configuration("plugin.writer.hdfs").unwrap().into_value(),
            json!({"class": "example.HdfsWriter"})
        );
    }

    #[test]
    fn test_get_missing_path() {
        let conf = Configuration::from_value(json!({"a": {"b": 1}}));
        assert!(conf.get("a.c").is_none());
        assert!(conf.get("a.b.c").is_none());
        assert_eq!(conf.get_u64("a.b"), Some(1));
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut conf = Configuration::from_value(json!({"a": 5}));
        conf.set("a.b", "x");
        assert_eq!(conf.into_value(), json!({"a": {"b": "x"}}));
    }

    #[test]
    fn test_merge_respects_overwrite_flag() {
        let mut base = Configuration::from_value(json!({"a": 1, "n": {"x": 1}}));
        let other = Configuration::from_value(json!({"a": 2, "n": {"y": 2}}));

        let mut kept = base.clone();
        kept.merge(&other, false);
        assert_eq!(kept.into_value(), json!({"a": 1, "n": {"x": 1, "y": 2}}));

        base.merge(&other, true);
        assert_eq!(base.into_value(), json!({"a": 2, "n": {"x": 1, "y": 2}}));
    }

    #[test]
    fn test_lenient_scalars() {
        let conf = Configuration::from_value(json!({"n": "42", "flag": "true"}));
        assert_eq!(conf.get_u64("n"), Some(42));
        assert_eq!(conf.get_bool("flag"), Some(true));
    }
}
