//! Ordered map type for LACON objects.
//!
//! [`Map`] wraps an [`IndexMap`] so that object keys keep first-assignment
//! order. Re-assigning an existing key replaces the value in place without
//! moving the key, which is what makes the JSON output of a document stable:
//! keys appear in the order the document first mentions them.
//!
//! ## Examples
//!
//! ```rust
//! use lacon::{Map, Value};
//!
//! let mut map = Map::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//! map.insert("name".to_string(), Value::from("Bob"));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["name", "age"]);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Bob"));
//! ```

use crate::Value;
use indexmap::IndexMap;

/// An insertion-ordered map of string keys to LACON values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map(IndexMap<String, Value>);

impl Map {
    /// Creates an empty `Map`.
    #[must_use]
    pub fn new() -> Self {
        Map(IndexMap::new())
    }

    /// Creates an empty `Map` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::{Map, Value};
    ///
    /// let mut map = Map::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns `true` if the map contains a value for the key.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the object stored at `key`, replacing whatever was there
    /// (including arrays and scalars) with an empty object first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lacon::{Map, Value};
    ///
    /// let mut map = Map::new();
    /// map.insert("server".to_string(), Value::from(true));
    /// map.object_entry("server").insert("port".to_string(), Value::from(80));
    /// assert!(map.get("server").unwrap().is_object());
    /// ```
    pub fn object_entry(&mut self, key: &str) -> &mut Map {
        let slot = self
            .0
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        }
    }

    /// Copies every entry of `other` into this map, overwriting on collision.
    pub fn merge(&mut self, other: Map) {
        for (key, value) in other {
            self.0.insert(key, value);
        }
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map(IndexMap::from_iter(iter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overwrites_in_place() {
        let mut base: Map = vec![
            ("a".to_string(), Value::from(1)),
            ("b".to_string(), Value::from(2)),
        ]
        .into_iter()
        .collect();
        let other: Map = vec![
            ("b".to_string(), Value::from(20)),
            ("c".to_string(), Value::from(30)),
        ]
        .into_iter()
        .collect();

        base.merge(other);

        let keys: Vec<_> = base.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(base.get("b"), Some(&Value::from(20)));
    }

    #[test]
    fn test_object_entry_replaces_arrays() {
        let mut map = Map::new();
        map.insert("list".to_string(), Value::Array(vec![Value::from(1)]));
        assert!(map.object_entry("list").is_empty());
        assert!(map.get("list").unwrap().is_object());
    }

    #[test]
    fn test_object_entry_keeps_existing_object() {
        let mut map = Map::new();
        map.object_entry("a").insert("x".to_string(), Value::from(1));
        map.object_entry("a").insert("y".to_string(), Value::from(2));
        assert_eq!(map.get("a").and_then(|v| v.as_object()).map(Map::len), Some(2));
    }
}
