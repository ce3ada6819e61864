use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const SOURCE_MAP_KEY: &str = "sourceMapKey";
pub const SOURCE_MARKDOWN: &str = "sourceMarkdown";

/// Attribute map of a node or mark. Values are JSON so attributes coming
/// from markup properties and from callers share one representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attrs(BTreeMap<String, Value>);

impl Attrs {
    pub fn new() -> Self {
        Attrs(BTreeMap::new())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Non-empty string attribute.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.str(key).filter(|s| !s.is_empty())
    }

    /// Integer attribute. Numeric strings (HTML attributes) are accepted.
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.is_empty() || s == "true",
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn source_map_key(&self) -> Option<&str> {
        self.str(SOURCE_MAP_KEY)
    }

    pub fn source_markdown(&self) -> Option<&str> {
        self.str(SOURCE_MARKDOWN)
    }
}

impl FromIterator<(String, Value)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Attrs(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_accepts_numbers_and_numeric_strings() {
        let attrs = Attrs::new()
            .with("start", 17)
            .with("colspan", "2")
            .with("width", "300%");
        assert_eq!(attrs.int("start"), Some(17));
        assert_eq!(attrs.int("colspan"), Some(2));
        assert_eq!(attrs.int("width"), None);
        assert_eq!(attrs.int("missing"), None);
    }

    #[test]
    fn bool_treats_bare_html_attributes_as_set() {
        let attrs = Attrs::new().with("checked", "").with("open", false);
        assert!(attrs.bool("checked"));
        assert!(!attrs.bool("open"));
    }
}
