use super::{Pointer, RED, RESET};
use crate::{log::Visual, region::Region};
use std::fmt::{Debug, Display, Formatter, Result};

/// Classifies an [`Error`] so the expansion policy can decide whether it is fatal.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    /// The source text is malformed, or a transform could not be applied.
    ///
    /// Always aborts the expansion, in strict and lenient mode alike.
    Syntax,
    /// No handler accepts the macro name.
    Unresolved,
    /// A handler failed to produce its replacement text.
    Handler,
}

impl ErrorKind {
    /// Return true if lenient expansion may recover from this kind of [`Error`].
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::Syntax)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax"),
            ErrorKind::Unresolved => write!(f, "unresolved"),
            ErrorKind::Handler => write!(f, "handler"),
        }
    }
}

/// Describes an error, and allows adding a contextual help text and visualization.
///
/// # Examples
///
/// Creating an [`Error`] that includes a [`Visual`] of type [`Pointer`]:
///
/// ```
/// use dime::{Error, ErrorKind, Region};
///
/// let error = Error::syntax("unexpected eof")
///     .with_pointer("${NAME, file=\"a.txt\"", Region::new(20..20))
///     .with_name("subject")
///     .with_help("expected `}` to close the macro");
///
/// assert_eq!(error.kind(), ErrorKind::Syntax);
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] produces this output:
///
/// ```text
/// error: unexpected eof
///   --> subject:1:21
///    |
///  1 | ${NAME, file="a.txt"
///    |                     ^---
///    |
///   = help: expected `}` to close the macro
/// ```
pub struct Error {
    /// Decides how the [`Error`] is treated by lenient expansion.
    kind: ErrorKind,
    /// Describes the cause of the [`Error`].
    reason: String,
    /// A visualization to help illustrate the [`Error`].
    visual: Option<Box<dyn Visual>>,
    /// Additional information to display with the [`Error`].
    help: Option<String>,
    /// The name of the source text that the [`Error`] comes from.
    name: Option<String>,
}

impl Error {
    /// Create a new [`Error`] of kind [`ErrorKind::Handler`] with the given reason text.
    ///
    /// This is the constructor handlers use to report a failure. The additional fields
    /// may be populated using the various methods defined on `Error`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dime::{Error, ErrorKind};
    ///
    /// let error = Error::build("file `changes.log` not found")
    ///     .with_help("check the workspace path");
    ///
    /// assert_eq!(error.kind(), ErrorKind::Handler);
    /// ```
    pub fn build<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error {
            kind: ErrorKind::Handler,
            reason: reason.into(),
            name: None,
            visual: None,
            help: None,
        }
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Syntax`].
    pub fn syntax<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(reason).with_kind(ErrorKind::Syntax)
    }

    /// Create a new [`Error`] of kind [`ErrorKind::Unresolved`].
    pub fn unresolved<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Self::build(reason).with_kind(ErrorKind::Unresolved)
    }

    /// Set the [`ErrorKind`].
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;

        self
    }

    /// Set the reason text, which is a short summary of the [`Error`].
    pub fn with_reason<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.reason = text.into();

        self
    }

    /// Set the name text, which names the source text the [`Error`] is related to.
    pub fn with_name<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.name = Some(text.into());

        self
    }

    /// Set the [`Visual`], which is a visualization that helps illustrate the
    /// cause of the error.
    pub fn with_visual(mut self, visual: impl Visual + 'static) -> Self {
        self.visual = Some(Box::new(visual));

        self
    }

    /// Set the visualization to a new [`Pointer`] with the given source text and
    /// [`Region`].
    ///
    /// This is a shortcut for creating a `Pointer` yourself and passing it to
    /// [`with_visual`][`Error::with_visual`].
    pub fn with_pointer<T>(mut self, source: &str, region: T) -> Self
    where
        T: Into<Region>,
    {
        self.visual = Some(Box::new(Pointer::new(source, region.into())));

        self
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        self.help = Some(text.into());

        self
    }

    /// Return the [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the reason text.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Return the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Return true if a [`Visual`] has been set.
    pub fn has_visual(&self) -> bool {
        self.visual.is_some()
    }

    /// Return the name of the source text that the error is related to.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if !f.alternate() {
            writeln!(f, "{self:#}")?;
        }
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("reason", &self.reason)
            .field("name", &self.name)
            .field("visual", &self.visual)
            .field("help", &self.help)
            .finish()?;

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let header = format!("{RED}error{RESET}");
        write!(f, "{header}: {}", self.reason)?;

        if let (Some(visual), true) = (self.visual.as_ref(), f.alternate()) {
            return visual.display(f, self.name.as_deref(), self.help.as_deref());
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.reason == other.reason
            && self.help == other.help
            && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_kind() {
        assert_eq!(Error::build("boom").kind(), ErrorKind::Handler);
        assert_eq!(Error::syntax("boom").kind(), ErrorKind::Syntax);
        assert_eq!(Error::unresolved("boom").kind(), ErrorKind::Unresolved);
    }

    #[test]
    fn test_recoverable() {
        assert!(!ErrorKind::Syntax.is_recoverable());
        assert!(ErrorKind::Unresolved.is_recoverable());
        assert!(ErrorKind::Handler.is_recoverable());
    }

    #[test]
    fn test_display_pointer() {
        let error = Error::syntax("unexpected eof")
            .with_pointer("${NAME", 6..6)
            .with_help("expected `}`");
        let plain = format!("{error}");
        let pretty = format!("{error:#}");

        assert!(plain.ends_with("unexpected eof"));
        assert!(!plain.contains("help"));
        assert!(pretty.contains("--> ?:1:7"));
        assert!(pretty.contains("${NAME"));
        assert!(pretty.contains("= help: expected `}`"));
    }

    #[test]
    fn test_eq_ignores_visual() {
        let a = Error::syntax("invalid syntax").with_pointer("${", 2..2);
        let b = Error::syntax("invalid syntax");

        assert_eq!(a, b);
        assert_ne!(a, Error::build("invalid syntax"));
    }
}
