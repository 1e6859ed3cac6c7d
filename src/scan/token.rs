use crate::{arguments::Arguments, transform::Transform};

/// Working state for the macro currently being read by a
/// [`Scanner`][`super::Scanner`].
///
/// The state is taken from the `Scanner` as a whole when the macro is complete,
/// leaving an empty [`Token`] behind for the next one.
#[derive(Debug, Default)]
pub struct Token {
    /// Name of the macro.
    pub name: String,
    /// Arguments in canonical order.
    pub arguments: Arguments,
    /// Transforms in the order they were attached.
    ///
    /// Applied last to first, so a content length attached before a substring
    /// measures the substring.
    pub transforms: Vec<Transform>,
}
