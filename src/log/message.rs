use super::Error;
use std::fmt::Display;

pub const UNEXPECTED_TOKEN: &str = "unexpected token";
pub const UNEXPECTED_EOF: &str = "unexpected eof";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_LITERAL: &str = "invalid literal";
pub const INVALID_TRANSFORM: &str = "invalid transform";

/// Return an [`Error`] explaining that the end of source was not expected.
pub fn error_eof<T>(source: &str, expected: T) -> Error
where
    T: Display,
{
    let source_len = source.len();
    Error::syntax(UNEXPECTED_EOF)
        .with_pointer(source, source_len..source_len)
        .with_help(format!("expected {expected}, did you close every macro?"))
}

/// Return an [`Error`] explaining that no handler accepts the macro name.
pub fn error_unrecognized(name: &str, source: &str) -> Error {
    Error::unresolved(format!("Unrecognized macro '{name}' in '{source}'"))
}

/// Return the inline text rendered in place of a macro whose handler failed
/// during lenient expansion.
pub fn replacement_failure(name: &str, error: &Error) -> String {
    format!("[Error replacing '{name}' - {}]", error.reason())
}

/// Return a string describing an unexpected character.
pub fn expected_found<T, Y>(expected: T, found: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("expected {expected}, found `{found}`")
}
