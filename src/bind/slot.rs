use crate::{log::Error, scan::parse_integer};

use serde_json::{Number, Value};
use std::fmt::Display;

/// The type a [`Slot`] converts its raw argument text into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Text, kept as written.
    String,
    /// `true` or `false`, in any case.
    Boolean,
    /// A decimal, hexadecimal (`0x1F`) or octal (`017`) integer.
    Integer,
    /// A decimal number with an optional fraction.
    Float,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::String => write!(f, "string"),
            Kind::Boolean => write!(f, "boolean"),
            Kind::Integer => write!(f, "integer"),
            Kind::Float => write!(f, "float"),
        }
    }
}

/// A named parameter that a handler declares.
///
/// The `field` is the name the converted value is bound to. Arguments are matched
/// against the `field`, or the `alias` when one is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub(super) field: String,
    pub(super) alias: Option<String>,
    pub(super) kind: Kind,
    pub(super) required: bool,
    pub(super) multiple: bool,
}

impl Slot {
    /// Create a new optional, single valued [`Slot`] of the given [`Kind`].
    pub fn new<T>(field: T, kind: Kind) -> Self
    where
        T: Into<String>,
    {
        Self {
            field: field.into(),
            alias: None,
            kind,
            required: false,
            multiple: false,
        }
    }

    /// Create a new [`Slot`] of kind [`Kind::String`].
    #[inline]
    pub fn string<T: Into<String>>(field: T) -> Self {
        Self::new(field, Kind::String)
    }

    /// Create a new [`Slot`] of kind [`Kind::Boolean`].
    #[inline]
    pub fn boolean<T: Into<String>>(field: T) -> Self {
        Self::new(field, Kind::Boolean)
    }

    /// Create a new [`Slot`] of kind [`Kind::Integer`].
    #[inline]
    pub fn integer<T: Into<String>>(field: T) -> Self {
        Self::new(field, Kind::Integer)
    }

    /// Create a new [`Slot`] of kind [`Kind::Float`].
    #[inline]
    pub fn float<T: Into<String>>(field: T) -> Self {
        Self::new(field, Kind::Float)
    }

    /// Set an alternate argument name that also binds to this [`Slot`].
    pub fn alias<T: Into<String>>(mut self, alias: T) -> Self {
        self.alias = Some(alias.into());

        self
    }

    /// Mark the [`Slot`] as required.
    pub fn required(mut self) -> Self {
        self.required = true;

        self
    }

    /// Bind every value written for the [`Slot`] as a list, instead of the last one.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;

        self
    }

    /// Return the name of the field this [`Slot`] binds to.
    #[inline]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Return the [`Kind`].
    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Return true if an argument with the given name binds to this [`Slot`].
    pub fn matches(&self, name: &str) -> bool {
        self.field == name || self.alias.as_deref() == Some(name)
    }

    /// Convert the raw text of an argument into a [`Value`] of this [`Kind`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] naming the parameter and macro when the text does not
    /// describe a value of this `Kind`.
    pub fn convert(&self, raw: &str, token: &str) -> Result<Value, Error> {
        let value = match self.kind {
            Kind::String => Some(Value::String(raw.to_string())),
            Kind::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            Kind::Integer => parse_integer(raw).map(Value::from),
            Kind::Float => raw
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
        };

        value.ok_or_else(|| {
            Error::build(format!(
                "Invalid value {raw} for parameter {} in token {token}",
                self.field
            ))
            .with_help(format!("expected {} {}", article(self.kind), self.kind))
        })
    }
}

fn article(kind: Kind) -> &'static str {
    match kind {
        Kind::Integer => "an",
        _ => "a",
    }
}
