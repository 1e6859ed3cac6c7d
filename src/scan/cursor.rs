use crate::{
    log::{error_eof, expected_found, Error, UNEXPECTED_TOKEN},
    region::Region,
};

/// A position within source text that moves forward one character at a time.
#[derive(Debug, Clone)]
pub struct Cursor<'source> {
    /// Reference to the source text.
    source: &'source str,
    /// Byte position within source.
    position: usize,
}

impl<'source> Cursor<'source> {
    /// Create a new [`Cursor`] at the beginning of the given source.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Return the source text.
    #[inline]
    pub fn source(&self) -> &'source str {
        self.source
    }

    /// Return the byte position of the current character.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Return the current character, or `None` at the end of the source.
    #[inline]
    pub fn current(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Move past the current character.
    #[inline]
    pub fn advance(&mut self) {
        if let Some(c) = self.current() {
            self.position += c.len_utf8();
        }
    }

    /// Move past the current character if it is equal to `expect`, and return true
    /// if it was.
    pub fn eat(&mut self, expect: char) -> bool {
        if self.current() == Some(expect) {
            self.advance();
            return true;
        }

        false
    }

    /// Move past the current character, which must be equal to `expect`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] pointing at the current character when it is anything else.
    pub fn expect(&mut self, expect: char) -> Result<(), Error> {
        if self.eat(expect) {
            return Ok(());
        }

        Err(self.unexpected(format!("`{expect}`")))
    }

    /// Move past any spaces and tabs.
    pub fn skip_blank(&mut self) {
        while matches!(self.current(), Some(' ' | '\t')) {
            self.advance();
        }
    }

    /// Return the text between the given byte position and the current position.
    #[inline]
    pub fn since(&self, begin: usize) -> &'source str {
        &self.source[begin..self.position]
    }

    /// Return a [`Region`] covering the current character.
    pub fn here(&self) -> Region {
        let length = self.current().map(char::len_utf8).unwrap_or(0);

        (self.position..self.position + length).into()
    }

    /// Return an [`Error`] describing the current character as unexpected.
    ///
    /// At the end of the source, the error explains that more text was expected.
    pub fn unexpected<T>(&self, expected: T) -> Error
    where
        T: std::fmt::Display,
    {
        match self.current() {
            Some(found) => Error::syntax(UNEXPECTED_TOKEN)
                .with_pointer(self.source, self.here())
                .with_help(expected_found(expected, found.escape_debug())),
            None => error_eof(self.source, expected),
        }
    }
}
