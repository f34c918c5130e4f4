//! Ordered parameter maps exchanged with the gateway.
//!
//! Insertion order is part of the wire contract: canonical strings and encoded
//! tokens are built in map order, never sorted.

use std::borrow::Cow;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A scalar parameter value.
///
/// `Null` entries are kept in the map but skipped by canonicalization and
/// form encoding. Booleans are written as `1` / `0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Absent value.
    Null,
    /// Boolean, rendered as `1` or `0`.
    Bool(bool),
    /// Integer, rendered in decimal.
    Int(i64),
    /// Text.
    Str(String),
}

impl ParamValue {
    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String form used on the wire, or `None` for `Null`.
    ///
    /// ```
    /// use opay_gateway::ParamValue;
    ///
    /// assert_eq!(ParamValue::Bool(true).to_wire().as_deref(), Some("1"));
    /// assert_eq!(ParamValue::Int(-5).to_wire().as_deref(), Some("-5"));
    /// assert_eq!(ParamValue::Null.to_wire(), None);
    /// ```
    pub fn to_wire(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(true) => Some(Cow::Borrowed("1")),
            Self::Bool(false) => Some(Cow::Borrowed("0")),
            Self::Int(n) => Some(Cow::Owned(n.to_string())),
            Self::Str(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }

    /// Borrow the text if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        Self::Str(s.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered mapping from parameter name to scalar value.
///
/// Inserting an existing key replaces its value in place, keeping the
/// original position.
///
/// # Example
///
/// ```
/// use opay_gateway::ParameterMap;
///
/// let params = ParameterMap::new()
///     .with("order_nr", "A1")
///     .with("amount", 1000)
///     .with("test", true);
///
/// let keys: Vec<&str> = params.keys().collect();
/// assert_eq!(keys, ["order_nr", "amount", "test"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParameterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a value. Returns the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a text value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Remove an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns true if `key` is present, even with a `Null` value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Number of entries, including `Null` ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate `(key, wire value)` pairs, skipping `Null` entries.
    pub fn wire_pairs(&self) -> impl Iterator<Item = (&str, Cow<'_, str>)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.to_wire().map(|wire| (k.as_str(), wire)))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<ParamValue>> Extend<(K, V)> for ParameterMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl IntoIterator for ParameterMap {
    type Item = (String, ParamValue);
    type IntoIter = std::vec::IntoIter<(String, ParamValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ParameterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = ParameterMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of scalar parameter values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = ParameterMap::new();
                while let Some((key, value)) = access.next_entry::<String, ParamValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_position_on_replace() {
        let mut params = ParameterMap::new().with("a", "1").with("b", "2");
        let previous = params.insert("a", "3");

        assert_eq!(previous, Some(ParamValue::Str("1".into())));
        let pairs: Vec<_> = params.wire_pairs().map(|(k, v)| format!("{k}={v}")).collect();
        assert_eq!(pairs, ["a=3", "b=2"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut params = ParameterMap::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(params.remove("b"), Some(ParamValue::Int(2)));
        assert_eq!(params.keys().collect::<Vec<_>>(), ["a", "c"]);
        assert_eq!(params.remove("missing"), None);
    }

    #[test]
    fn test_wire_pairs_skip_null_and_normalize_bool() {
        let params = ParameterMap::new()
            .with("a", Option::<&str>::None)
            .with("b", true)
            .with("c", false);

        let pairs: Vec<_> = params
            .wire_pairs()
            .map(|(k, v)| (k.to_string(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            [("b".to_string(), "1".to_string()), ("c".to_string(), "0".to_string())]
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let json = r#"{"zeta":"z","alpha":1,"flag":true,"gone":null}"#;
        let params: ParameterMap = serde_json::from_str(json).unwrap();

        assert_eq!(params.keys().collect::<Vec<_>>(), ["zeta", "alpha", "flag", "gone"]);
        assert_eq!(params.get("alpha"), Some(&ParamValue::Int(1)));
        assert_eq!(serde_json::to_string(&params).unwrap(), json);
    }
}
