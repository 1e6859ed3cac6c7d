use std::{borrow::Cow, collections::HashMap};

use crate::log::Error;

use serde::Serialize;
use serde_json::{to_value, Value};

/// Provides storage for data that handlers can read while a source text is
/// expanded.
///
/// A `Store` is the default context type of an [`Engine`][`crate::Engine`], and can
/// also be used as the [`Environment`][`crate::Environment`] of
/// [`expand_all`][`crate::Engine::expand_all`].
#[derive(Debug, Default)]
pub struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::Store;
    ///
    /// let store = Store::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("BUILD_NUMBER", 42);
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let key = key.into();
        let value = to_value(value).map_err(|e| {
            Error::build(format!("value for `{key}` is unserializable")).with_help(e.to_string())
        })?;

        self.data.insert(key, value);
        Ok(())
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::Store;
    ///
    /// let mut store = Store::new();
    /// store.insert_must("JOB_NAME", "nightly");
    /// ```
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value).unwrap();
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::Store;
    ///
    /// let store = Store::new()
    ///     .with_must("JOB_NAME", "nightly")
    ///     .with_must("BUILD_NUMBER", 42);
    /// ```
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Returns the string corresponding to the key, if the value is a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::Store;
    ///
    /// let store = Store::new()
    ///     .with_must("JOB_NAME", "nightly")
    ///     .with_must("BUILD_NUMBER", 42);
    ///
    /// assert_eq!(store.get_str("JOB_NAME"), Some("nightly"));
    /// assert_eq!(store.get_str("BUILD_NUMBER"), None);
    /// ```
    #[inline]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Returns the value corresponding to the key as text.
    ///
    /// Strings are returned as they are, `null` is treated as missing, and any other
    /// value is returned as JSON.
    pub fn get_text(&self, key: &str) -> Option<Cow<'_, str>> {
        match self.data.get(key)? {
            Value::Null => None,
            Value::String(string) => Some(Cow::Borrowed(string.as_str())),
            value => Some(Cow::Owned(value.to_string())),
        }
    }
}
