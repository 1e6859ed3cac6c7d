//! Contains the [`Handler`] trait, and types useful for creating handlers.
//!
//! A `Handler` resolves a macro name to replacement text. Any type that implements
//! the trait can be registered on an [`Engine`][`crate::Engine`], or passed to a
//! single expansion as a private handler.
//!
//! ## Examples
//!
//! This source calls a macro named `GREETING` with one argument, and a macro named
//! `NAME` with none:
//!
//! ```text
//! ${GREETING, punctuation="!"} $NAME
//! ```
//!
//! Handlers receive the context given to the expansion, the macro name, and its
//! arguments. Arguments arrive ordered by name, so `${X, b=1, a=2}` is seen as
//! `a=2, b=1`.
//!
//! The quickest way to create a handler is [`from_fn`], which accepts a single
//! macro name and a closure:
//!
//! ```
//! use dime::{handler::from_fn, Arguments, Engine, Error, Store};
//!
//! let engine = Engine::new()
//!     .with_handler(from_fn("GREETING", |store: &Store, args: &Arguments| {
//!         let name = store
//!             .get_str("name")
//!             .ok_or_else(|| Error::build("no name in store"))?;
//!
//!         Ok(format!("hello, {name}{}", args.get("punctuation").unwrap_or(".")))
//!     }));
//!
//! let store = Store::new().with_must("name", "taylor");
//! let result = engine.expand(&store, r#"${GREETING, punctuation="!"}"#, true, &[]);
//!
//! assert_eq!(result.unwrap(), "hello, taylor!");
//! ```
//!
//! Handlers that accept several names, or need their declared parameters bound to
//! typed fields, implement the trait themselves or use [`bind`][`crate::bind`].

use crate::{arguments::Arguments, log::Error};
use std::{collections::BTreeMap, marker::PhantomData};

/// Describes a type that can produce the replacement text for a macro.
pub trait Handler<C: ?Sized>: Sync + Send {
    /// Return true if this [`Handler`] evaluates macros with the given name.
    fn accepts_name(&self, name: &str) -> bool;

    /// Produce the replacement text for the named macro.
    ///
    /// `arguments` holds the last value written for each argument name, while
    /// `multiple` holds every value. Both are ordered by argument name.
    ///
    /// # Errors
    ///
    /// May return an [`Error`], which aborts a strict expansion or is rendered in
    /// place of the macro by a lenient one.
    fn evaluate(
        &self,
        context: &C,
        name: &str,
        arguments: &BTreeMap<String, String>,
        multiple: &Arguments,
    ) -> Result<String, Error>;

    /// Return true if the replacement text may itself contain macros, which are
    /// then expanded in turn.
    fn has_nested_content(&self) -> bool {
        false
    }
}

/// A [`Handler`] for one macro name, backed by a closure.
///
/// Created by [`from_fn`] and [`nested_from_fn`].
pub struct FnHandler<C: ?Sized, F> {
    name: String,
    nested: bool,
    function: F,
    context: PhantomData<fn(&C)>,
}

/// Create a [`Handler`] that evaluates macros named `name` by calling `function`.
pub fn from_fn<C, F>(name: &str, function: F) -> FnHandler<C, F>
where
    C: ?Sized,
    F: Fn(&C, &Arguments) -> Result<String, Error> + Sync + Send,
{
    FnHandler {
        name: name.to_string(),
        nested: false,
        function,
        context: PhantomData,
    }
}

/// Create a [`Handler`] like [`from_fn`], whose replacement text is expanded again.
///
/// # Examples
///
/// ```
/// use dime::{handler::{from_fn, nested_from_fn}, Arguments, Engine};
///
/// let engine = Engine::new()
///     .with_handler(nested_from_fn("SUBJECT", |_: &(), _: &Arguments| {
///         Ok("build #$NUMBER".to_string())
///     }))
///     .with_handler(from_fn("NUMBER", |_: &(), _: &Arguments| Ok("42".to_string())));
///
/// assert_eq!(engine.expand(&(), "$SUBJECT", true, &[]).unwrap(), "build #42");
/// ```
pub fn nested_from_fn<C, F>(name: &str, function: F) -> FnHandler<C, F>
where
    C: ?Sized,
    F: Fn(&C, &Arguments) -> Result<String, Error> + Sync + Send,
{
    FnHandler {
        nested: true,
        ..from_fn(name, function)
    }
}

impl<C, F> Handler<C> for FnHandler<C, F>
where
    C: ?Sized,
    F: Fn(&C, &Arguments) -> Result<String, Error> + Sync + Send,
{
    fn accepts_name(&self, name: &str) -> bool {
        self.name == name
    }

    fn evaluate(
        &self,
        context: &C,
        _: &str,
        _: &BTreeMap<String, String>,
        multiple: &Arguments,
    ) -> Result<String, Error> {
        (self.function)(context, multiple)
    }

    fn has_nested_content(&self) -> bool {
        self.nested
    }
}
