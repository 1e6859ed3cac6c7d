mod pointer;

pub use pointer::Pointer;

use std::fmt::{Debug, Formatter, Result};

const BLANK: &str = "";
const PIPE: &str = "|";
const EQUAL: &str = "=";
const HIGHLIGHT: &str = "^";

/// Describes a type that can be associated with an Error and used
/// to print a visualization.
pub trait Visual: Debug {
    /// Display the visualization by writing to the given Formatter.
    fn display(&self, formatter: &mut Formatter<'_>, name: Option<&str>, help: Option<&str>)
        -> Result;
}

/// Return the zero indexed line containing the byte `offset`, and the byte offset
/// at which that line begins.
fn get_line_and_start(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;

    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, n);
        }
        n += len;
    }

    let last = lines.len().saturating_sub(1);
    let start = n.saturating_sub(lines.last().map(|line| line.len() + 1).unwrap_or(0));

    (last, start)
}

/// Wrapper for UnicodeWidthStr::width.
fn get_width(s: &str) -> usize {
    unicode_width::UnicodeWidthStr::width(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_start() {
        let lines = vec!["abc", "${X"];

        assert_eq!(get_line_and_start(&lines, 1), (0, 0));
        assert_eq!(get_line_and_start(&lines, 4), (1, 4));
        assert_eq!(get_line_and_start(&lines, 7), (1, 4));
        assert_eq!(get_line_and_start(&lines, 40), (1, 4));
    }
}
