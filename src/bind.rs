//! Binds the arguments of a macro to the typed fields of a handler.
//!
//! A [`Binding`] is a table of declared [`Slot`]s. Binding a macro's arguments
//! checks every argument against the table, converts its raw text into the declared
//! [`Kind`], and checks that required slots received a value. The result is
//! deserialized with `serde`, so any `Deserialize` struct whose field names match
//! the slots can be filled in.
//!
//! [`Macro`] ties these together. A type implementing it is constructed fresh from
//! the arguments of every macro it evaluates, and [`BoundHandler`] registers it as
//! a [`Handler`].
//!
//! ## Examples
//!
//! ```
//! use dime::{
//!     bind::{Binding, BoundHandler, Macro, Slot},
//!     Engine, Error, Store,
//! };
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct BuildLog {
//!     #[serde(rename = "maxLines", default)]
//!     max_lines: Option<i64>,
//!     #[serde(rename = "escapeHtml", default)]
//!     escape_html: bool,
//! }
//!
//! impl Macro<Store> for BuildLog {
//!     const NAME: &'static str = "BUILD_LOG";
//!
//!     fn binding() -> Binding {
//!         Binding::new()
//!             .with(Slot::integer("maxLines"))
//!             .with(Slot::boolean("escapeHtml").alias("escape"))
//!     }
//!
//!     fn evaluate(&self, store: &Store, _: &str) -> Result<String, Error> {
//!         let log = store.get_str("log").unwrap_or_default();
//!         let lines: Vec<_> = log.lines().take(self.max_lines.unwrap_or(100) as usize).collect();
//!         let text = lines.join("\n");
//!
//!         Ok(if self.escape_html { text.replace('<', "&lt;") } else { text })
//!     }
//! }
//!
//! let engine = Engine::new().with_handler(BoundHandler::<BuildLog, Store>::new());
//! let store = Store::new().with_must("log", "<b>one</b>\ntwo\nthree");
//!
//! let result = engine.expand(&store, "${BUILD_LOG, maxLines=2, escape=true}", true, &[]);
//! assert_eq!(result.unwrap(), "&lt;b>one&lt;/b>\ntwo");
//!
//! let result = engine.expand(&store, "${BUILD_LOG, lines=2}", false, &[]);
//! assert_eq!(result.unwrap(), "[Error replacing 'BUILD_LOG' - Undefined parameter lines in token BUILD_LOG]");
//! ```

mod slot;

pub use slot::{Kind, Slot};

use crate::{arguments::Arguments, handler::Handler, log::Error};

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, marker::PhantomData};

/// A table of the [`Slot`]s a handler declares.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    slots: Vec<Slot>,
}

impl Binding {
    /// Create a new, empty [`Binding`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a [`Slot`].
    #[inline]
    pub fn add(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    /// Add a [`Slot`].
    ///
    /// Returns the [`Binding`], so additional methods may be chained.
    #[inline]
    pub fn with(mut self, slot: Slot) -> Self {
        self.add(slot);

        self
    }

    /// Return the first [`Slot`] that the argument with the given name binds to.
    pub fn find(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.matches(name))
    }

    /// Bind the arguments of the named macro, returning a map from field name to
    /// converted value.
    ///
    /// A boolean slot whose argument is present without a value binds `true`. When
    /// an argument is written more than once, the last value is bound, unless the
    /// slot accepts [`multiple`][`Slot::multiple`] values.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if an argument matches no slot, a value cannot be
    /// converted, or a required slot receives no value.
    pub fn bind(&self, token: &str, arguments: &Arguments) -> Result<Map<String, Value>, Error> {
        let mut bound = Map::new();

        for (key, values) in arguments.groups() {
            let slot = self
                .find(key)
                .ok_or_else(|| Error::build(format!("Undefined parameter {key} in token {token}")))?;

            let converted = if values.is_empty() {
                if slot.kind != Kind::Boolean {
                    return Err(Error::build(format!(
                        "Parameter {key} in token {token} requires a value"
                    )));
                }
                vec![Value::Bool(true)]
            } else {
                values
                    .iter()
                    .map(|raw| slot.convert(raw, token))
                    .collect::<Result<Vec<_>, _>>()?
            };

            if slot.multiple {
                let entry = bound
                    .entry(slot.field.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(list) = entry {
                    list.extend(converted);
                }
            } else if let Some(last) = converted.into_iter().last() {
                bound.insert(slot.field.clone(), last);
            }
        }

        if let Some(missing) = self
            .slots
            .iter()
            .find(|slot| slot.required && !bound.contains_key(&slot.field))
        {
            return Err(Error::build(format!(
                "Parameter {} in token {token} is required",
                missing.field
            )));
        }

        Ok(bound)
    }

    /// Bind the arguments of the named macro, and deserialize the result into `T`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if binding fails, or the bound values do not fit `T`.
    pub fn bind_into<T>(&self, token: &str, arguments: &Arguments) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let bound = self.bind(token, arguments)?;

        serde_json::from_value(Value::Object(bound)).map_err(|e| {
            Error::build(format!("Invalid parameters in token {token}: {e}"))
        })
    }
}

/// Describes a handler whose parameters are bound from the macro arguments.
pub trait Macro<C: ?Sized>: DeserializeOwned {
    /// The macro name this handler evaluates.
    const NAME: &'static str;

    /// When true, the replacement text is expanded again.
    const NESTED: bool = false;

    /// Return the [`Binding`] declaring the parameters of this handler.
    fn binding() -> Binding;

    /// Return true if this handler evaluates macros with the given name.
    fn accepts_name(name: &str) -> bool {
        name == Self::NAME
    }

    /// Produce the replacement text, with parameters already bound to `self`.
    ///
    /// # Errors
    ///
    /// May return an [`Error`], which aborts a strict expansion or is rendered in
    /// place of the macro by a lenient one.
    fn evaluate(&self, context: &C, name: &str) -> Result<String, Error>;
}

/// A [`Handler`] that binds a fresh [`Macro`] from the arguments of every macro
/// it evaluates.
pub struct BoundHandler<M, C: ?Sized> {
    binding: Binding,
    marker: PhantomData<fn(&C) -> M>,
}

impl<M, C> BoundHandler<M, C>
where
    M: Macro<C>,
    C: ?Sized,
{
    /// Create a new [`BoundHandler`].
    pub fn new() -> Self {
        Self {
            binding: M::binding(),
            marker: PhantomData,
        }
    }
}

impl<M, C> Default for BoundHandler<M, C>
where
    M: Macro<C>,
    C: ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M, C> Handler<C> for BoundHandler<M, C>
where
    M: Macro<C>,
    C: ?Sized,
{
    fn accepts_name(&self, name: &str) -> bool {
        M::accepts_name(name)
    }

    fn evaluate(
        &self,
        context: &C,
        name: &str,
        _: &BTreeMap<String, String>,
        multiple: &Arguments,
    ) -> Result<String, Error> {
        let bound: M = self.binding.bind_into(name, multiple)?;

        bound.evaluate(context, name)
    }

    fn has_nested_content(&self) -> bool {
        M::NESTED
    }
}
