//! Insertion-ordered key/value map.
//!
//! [`OrderedRegistry`] pairs a `HashMap` with a key list recording first-insertion order.
//! Updating an existing key keeps its position, so iteration order is stable across value
//! changes. Join groups rely on this to report member values in declared order.

use std::{collections::HashMap, hash::Hash};

/// A map that remembers the order keys were first inserted.
///
/// Snapshot accessors ([`keys`](Self::keys), [`values`](Self::values),
/// [`entries`](Self::entries)) return owned vectors; mutating them does not touch the registry.
#[derive(Clone, Debug)]
pub struct OrderedRegistry<K, V> {
    map: HashMap<K, V>,
    order: Vec<K>,
}

impl<K, V> Default for OrderedRegistry<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> OrderedRegistry<K, V> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update `key`.
    ///
    /// New keys go to the end of the order; existing keys keep their position. Returns the
    /// previous value, if any.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if !self.map.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.map.insert(key, value)
    }

    /// Value stored for `key`.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.map.get(key)
    }

    /// Mutable access to the value for `key`; the key's position is unaffected.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.map.get_mut(key)
    }

    /// Returns `true` if `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Position of `key` in insertion order.
    #[inline]
    pub fn position(&self, key: &K) -> Option<usize> {
        self.order.iter().position(|k| k == key)
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        self.order.remove(index);
        self.map.remove(key)
    }

    /// Remove every entry and forget the order.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the registry holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(move |key| self.map.get_key_value(key))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<K> {
        self.order.clone()
    }

    /// Values in key insertion order.
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Key/value pairs in insertion order.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut registry = OrderedRegistry::new();
        registry.set(1, "One");
        registry.set(2, "Two");

        assert_eq!(registry.get(&1), Some(&"One"));
        assert_eq!(registry.get(&2), Some(&"Two"));
        assert_eq!(registry.get(&3), None);
    }

    #[test]
    fn contains_key_reports_membership() {
        let mut registry = OrderedRegistry::new();
        registry.set(1, "One");

        assert!(registry.contains_key(&1));
        assert!(!registry.contains_key(&2));
    }

    #[test]
    fn keys_follow_insertion_order() {
        let mut registry = OrderedRegistry::new();
        registry.set(3, "Three");
        registry.set(1, "One");
        registry.set(2, "Two");

        assert_eq!(registry.keys(), vec![3, 1, 2]);
        assert_eq!(registry.values(), vec!["Three", "One", "Two"]);
    }

    #[test]
    fn reset_keeps_original_position() {
        // Given
        let mut registry = OrderedRegistry::new();
        registry.set("a", 1);
        registry.set("b", 2);
        registry.set("c", 3);

        // When
        let previous = registry.set("a", 10);

        // Then
        assert_eq!(previous, Some(1));
        assert_eq!(registry.keys(), vec!["a", "b", "c"]);
        assert_eq!(registry.entries(), vec![("a", 10), ("b", 2), ("c", 3)]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn remove_drops_key_and_order() {
        let mut registry = OrderedRegistry::new();
        registry.set(1, "One");
        registry.set(2, "Two");

        assert_eq!(registry.remove(&1), Some("One"));
        assert_eq!(registry.remove(&1), None);

        assert!(!registry.contains_key(&1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys(), vec![2]);
        assert_eq!(registry.position(&2), Some(0));
    }

    #[test]
    fn reinserted_key_goes_to_the_end() {
        let mut registry = OrderedRegistry::new();
        registry.set(1, "One");
        registry.set(2, "Two");
        registry.remove(&1);
        registry.set(1, "Uno");

        assert_eq!(registry.keys(), vec![2, 1]);
    }

    #[test]
    fn clear_empties_everything() {
        let mut registry = OrderedRegistry::new();
        registry.set(1, "One");
        registry.set(2, "Two");

        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.contains_key(&1));
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn snapshots_are_detached() {
        let mut registry = OrderedRegistry::new();
        registry.set(1, String::from("One"));

        let mut keys = registry.keys();
        keys.push(9);
        let mut values = registry.values();
        values[0].push('!');

        assert_eq!(registry.keys(), vec![1]);
        assert_eq!(registry.get(&1).map(String::as_str), Some("One"));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut registry = OrderedRegistry::new();
        registry.set("hits", 0);

        if let Some(v) = registry.get_mut(&"hits") {
            *v += 1;
        }

        assert_eq!(registry.get(&"hits"), Some(&1));
    }
}
