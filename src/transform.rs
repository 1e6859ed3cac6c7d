use crate::log::{Error, INVALID_TRANSFORM};

use regex::Regex;
use std::fmt::Display;

/// A post evaluation function applied to the replacement text of a macro.
///
/// Transforms are attached by the syntax of a delimited macro:
///
/// ```text
/// ${#NAME}          content length
/// ${NAME:7:2}       substring, from offset 7 with a length of 2
/// ${NAME#[a-z]+}    strip a matching prefix
/// ${NAME%\.txt}     strip a matching suffix
/// ```
#[derive(Debug, Clone)]
pub enum Transform {
    /// Replace the text with the decimal count of its characters.
    ContentLength,
    /// Keep a range of characters.
    Substring {
        /// Start of the range, counted from the end of the text when negative.
        offset: i64,
        /// Number of characters to keep, or the number of characters to drop
        /// from the end of the text when negative. Runs to the end when absent.
        length: Option<i64>,
    },
    /// Remove a match of the expression anchored at the start of the text.
    StripPrefix(Regex),
    /// Remove a match of the expression anchored at the end of the text.
    StripSuffix(Regex),
}

impl Transform {
    /// Create a [`Transform::StripPrefix`] from the given pattern, anchoring it at the
    /// start if it is not anchored already.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the pattern is not a valid regular expression.
    pub fn strip_prefix(pattern: &str) -> Result<Self, Error> {
        let anchored = if pattern.starts_with('^') {
            pattern.to_string()
        } else {
            format!("^{pattern}")
        };

        Ok(Self::StripPrefix(compile_pattern(&anchored)?))
    }

    /// Create a [`Transform::StripSuffix`] from the given pattern, anchoring it at the
    /// end if it is not anchored already.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the pattern is not a valid regular expression.
    pub fn strip_suffix(pattern: &str) -> Result<Self, Error> {
        let anchored = if ends_with_anchor(pattern) {
            pattern.to_string()
        } else {
            format!("{pattern}$")
        };

        Ok(Self::StripSuffix(compile_pattern(&anchored)?))
    }

    /// Apply the [`Transform`] to the given text.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a [`Transform::Substring`] range falls outside of
    /// the text.
    pub fn apply(&self, text: String) -> Result<String, Error> {
        match self {
            Transform::ContentLength => Ok(text.chars().count().to_string()),
            Transform::Substring { offset, length } => substring(&text, *offset, *length),
            Transform::StripPrefix(regex) => match regex.find(&text) {
                Some(found) if found.start() == 0 => Ok(text[found.end()..].to_string()),
                _ => Ok(text),
            },
            Transform::StripSuffix(regex) => match regex.find(&text) {
                Some(found) if found.end() == text.len() => Ok(text[..found.start()].to_string()),
                _ => Ok(text),
            },
        }
    }
}

impl Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transform::ContentLength => write!(f, "content length (#)"),
            Transform::Substring {
                offset,
                length: Some(length),
            } => write!(f, "substring (:{offset}:{length})"),
            Transform::Substring {
                offset,
                length: None,
            } => write!(f, "substring (:{offset})"),
            Transform::StripPrefix(regex) => write!(f, "strip prefix (#{regex})"),
            Transform::StripSuffix(regex) => write!(f, "strip suffix (%{regex})"),
        }
    }
}

/// Return true if the pattern ends with a `$` anchor rather than an escaped `\$`.
fn ends_with_anchor(pattern: &str) -> bool {
    let Some(rest) = pattern.strip_suffix('$') else {
        return false;
    };
    let escapes = rest.chars().rev().take_while(|c| *c == '\\').count();

    escapes % 2 == 0
}

/// Compile a strip pattern.
fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|error| {
        Error::syntax(INVALID_TRANSFORM)
            .with_help(format!("pattern `{pattern}` is not a valid expression: {error}"))
    })
}

/// Return the range of characters described by `offset` and `length`.
fn substring(text: &str, offset: i64, length: Option<i64>) -> Result<String, Error> {
    let count = text.chars().count() as i64;
    let out_of_range = || {
        Error::syntax(INVALID_TRANSFORM).with_help(format!(
            "substring with offset {offset} and length {} is out of range for \
            a value of {count} characters",
            length.map_or("(none)".to_string(), |length| length.to_string())
        ))
    };

    let begin = if offset < 0 {
        count.checked_add(offset)
    } else {
        Some(offset)
    };
    let begin = match begin {
        Some(begin) if (0..=count).contains(&begin) => begin,
        _ => return Err(out_of_range()),
    };

    let end = match length {
        None => Some(count),
        Some(length) if length < 0 => count.checked_add(length),
        Some(length) => begin.checked_add(length),
    };
    let end = match end {
        Some(end) if (begin..=count).contains(&end) => end,
        _ => return Err(out_of_range()),
    };

    Ok(text
        .chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect())
}
