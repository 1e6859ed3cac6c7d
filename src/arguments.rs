use std::collections::{btree_map, BTreeMap};

/// Arguments parsed from a macro, keyed by argument name.
///
/// Keys iterate in ascending lexical order regardless of the order they were
/// written in. Values written for the same key keep their source order.
///
/// # Examples
///
/// ```
/// use dime::Arguments;
///
/// let mut arguments = Arguments::new();
/// arguments.insert("jkl", "true");
/// arguments.insert("abc", "x");
/// arguments.insert("abc", "y");
///
/// let keys: Vec<_> = arguments.keys().collect();
/// assert_eq!(keys, vec!["abc", "jkl"]);
/// assert_eq!(arguments.get_all("abc"), ["x", "y"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    data: BTreeMap<String, Vec<String>>,
}

impl Arguments {
    /// Create a new, empty [`Arguments`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the given key.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.data.entry(key.into()).or_default().push(value.into());
    }

    /// Append a value to the given key.
    ///
    /// Returns the [`Arguments`], so additional methods may be chained.
    #[inline]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert(key, value);

        self
    }

    /// Record the given key without a value.
    ///
    /// The scanner never produces such a key, but hosts building arguments by hand
    /// may use it to express a bare flag, which the binding layer reads as `true`.
    pub fn insert_flag<K>(&mut self, key: K)
    where
        K: Into<String>,
    {
        self.data.entry(key.into()).or_default();
    }

    /// Return the last value written for the given key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|values| values.last())
            .map(|value| value.as_str())
    }

    /// Return every value written for the given key, in source order.
    #[inline]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.data.get(key).map(|values| values.as_slice()).unwrap_or_default()
    }

    /// Return true if the given key is present, with or without a value.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Iterate over the keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|key| key.as_str())
    }

    /// Iterate over each key and every value written for it.
    pub fn groups(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.data.iter()
    }

    /// Iterate over every key/value pair, ordered by key and then by source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Return the number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if no key is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove every key.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear()
    }

    /// Return a single valued view, holding the last value written for each key.
    ///
    /// Keys recorded without a value are left out.
    pub fn to_single(&self) -> BTreeMap<String, String> {
        self.data
            .iter()
            .filter_map(|(key, values)| values.last().map(|value| (key.clone(), value.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_keys() {
        let arguments = Arguments::new()
            .with("zeta", "1")
            .with("alpha", "2")
            .with("Mid", "3");
        let keys: Vec<_> = arguments.keys().collect();

        assert_eq!(keys, vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn test_values_keep_source_order() {
        let arguments = Arguments::new()
            .with("b", "1")
            .with("a", "x")
            .with("b", "2")
            .with("b", "3");
        let pairs: Vec<_> = arguments.iter().collect();

        assert_eq!(pairs, vec![("a", "x"), ("b", "1"), ("b", "2"), ("b", "3")]);
        assert_eq!(arguments.get("b"), Some("3"));
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn test_flag() {
        let mut arguments = Arguments::new();
        arguments.insert_flag("verbose");

        assert!(arguments.contains_key("verbose"));
        assert_eq!(arguments.get("verbose"), None);
        assert!(arguments.get_all("verbose").is_empty());
        assert!(arguments.to_single().is_empty());
    }

    #[test]
    fn test_to_single() {
        let single = Arguments::new()
            .with("b", "1")
            .with("b", "2")
            .with("a", "x")
            .to_single();
        let keys: Vec<_> = single.keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(single.get("b").map(String::as_str), Some("2"));
    }
}
