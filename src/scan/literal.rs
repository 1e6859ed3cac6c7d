use super::cursor::Cursor;
use crate::log::{error_eof, Error, INVALID_LITERAL, INVALID_SYNTAX};

/// Read an identifier, which begins with `_` or an `xid_start` character and
/// continues with `xid_continue` characters.
///
/// # Errors
///
/// Returns an [`Error`] if the current character cannot begin an identifier.
pub fn identifier<'source>(cursor: &mut Cursor<'source>) -> Result<&'source str, Error> {
    match cursor.current() {
        Some(c) if is_ident_start(c) => {
            let begin = cursor.position();
            cursor.advance();
            while cursor.current().is_some_and(is_ident_continue) {
                cursor.advance();
            }

            Ok(cursor.since(begin))
        }
        _ => Err(cursor.unexpected("an identifier")),
    }
}

/// Read an argument value, which is a quoted string, a boolean or a number.
///
/// Quoted strings are returned without quotes and with escape sequences resolved,
/// booleans are returned in lowercase, and numbers are returned as written.
///
/// # Errors
///
/// Returns an [`Error`] if no valid value begins at the cursor.
pub fn value(cursor: &mut Cursor) -> Result<String, Error> {
    match cursor.current() {
        Some('"') => quoted(cursor),
        Some('t' | 'T' | 'f' | 'F') => boolean(cursor).map(|b| b.to_string()),
        Some('-' | '0'..='9') => number(cursor).map(|n| n.to_string()),
        _ => Err(cursor.unexpected("a quoted string, `true`, `false` or a number")),
    }
}

/// Read a quoted string, resolving escape sequences.
///
/// # Errors
///
/// Returns an [`Error`] if the string contains a raw line break, or is never closed.
pub fn quoted(cursor: &mut Cursor) -> Result<String, Error> {
    let begin = cursor.position();
    cursor.expect('"')?;

    let mut text = String::new();
    loop {
        match cursor.current() {
            None => return Err(error_eof(cursor.source(), "`\"` to close the string")),
            Some('"') => {
                cursor.advance();
                return Ok(text);
            }
            Some('\\') => {
                cursor.advance();
                let escaped = match cursor.current() {
                    None => return Err(error_eof(cursor.source(), "an escaped character")),
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('b') => '\u{8}',
                    Some('f') => '\u{c}',
                    Some(c) => c,
                };
                text.push(escaped);
                cursor.advance();
            }
            Some('\n' | '\r') => {
                return Err(Error::syntax(INVALID_LITERAL)
                    .with_pointer(cursor.source(), begin..cursor.position())
                    .with_help("line breaks are not allowed in a string, use `\\n` instead"));
            }
            Some(c) => {
                text.push(c);
                cursor.advance();
            }
        }
    }
}

/// Read a boolean, matching `true` or `false` in any case.
///
/// # Errors
///
/// Returns an [`Error`] if the word at the cursor is not exactly one of the two.
pub fn boolean(cursor: &mut Cursor) -> Result<bool, Error> {
    let begin = cursor.position();
    while cursor.current().is_some_and(is_ident_continue) {
        cursor.advance();
    }

    let word = cursor.since(begin);
    if word.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if word.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::syntax(INVALID_LITERAL)
            .with_pointer(cursor.source(), begin..cursor.position())
            .with_help(format!("expected `true` or `false`, found `{word}`")))
    }
}

/// Read a number, returning the text as written.
///
/// An optional `-` is followed by a hexadecimal (`0x1F`), octal (`017`) or
/// decimal (`0.5`) literal beginning with zero, or by a run of digits that does
/// not begin with zero.
///
/// # Errors
///
/// Returns an [`Error`] if the text at the cursor is not one of these forms.
pub fn number<'source>(cursor: &mut Cursor<'source>) -> Result<&'source str, Error> {
    let begin = cursor.position();
    cursor.eat('-');

    match cursor.current() {
        Some('0') => {
            cursor.advance();
            if cursor.eat('x') || cursor.eat('X') {
                let digits = cursor.position();
                while cursor.current().is_some_and(|c| c.is_ascii_hexdigit()) {
                    cursor.advance();
                }
                if cursor.position() == digits {
                    return Err(cursor.unexpected("a hexadecimal digit"));
                }
            } else {
                let digits = cursor.position();
                while matches!(cursor.current(), Some('0'..='9' | '.')) {
                    cursor.advance();
                }

                let tail = cursor.since(digits);
                let periods = tail.matches('.').count();
                if periods > 1 {
                    return Err(Error::syntax(INVALID_LITERAL)
                        .with_pointer(cursor.source(), begin..cursor.position())
                        .with_help("a number may contain at most one `.`"));
                }
                if periods == 0 && tail.contains(|c| c == '8' || c == '9') {
                    return Err(Error::syntax(INVALID_LITERAL)
                        .with_pointer(cursor.source(), begin..cursor.position())
                        .with_help("a number beginning with `0` is octal, use digits `0` to `7`"));
                }
            }
        }
        Some('1'..='9') => {
            while cursor.current().is_some_and(|c| c.is_ascii_digit()) {
                cursor.advance();
            }
        }
        _ => return Err(cursor.unexpected("a digit")),
    }

    Ok(cursor.since(begin))
}

/// Read a number and convert it to an integer.
///
/// # Errors
///
/// Returns an [`Error`] if the number is not an integer, or does not fit in an `i64`.
pub fn integer(cursor: &mut Cursor) -> Result<i64, Error> {
    let begin = cursor.position();
    let text = number(cursor)?;

    parse_integer(text).ok_or_else(|| {
        Error::syntax(INVALID_SYNTAX)
            .with_pointer(cursor.source(), begin..cursor.position())
            .with_help(format!("expected an integer, found `{text}`"))
    })
}

/// Read the pattern of a strip transform, which runs to an unescaped `}` or `,`.
///
/// `\}` and `\,` put the literal character into the pattern, while any other
/// escape sequence is kept as written.
///
/// # Errors
///
/// Returns an [`Error`] if the source ends before the pattern does.
pub fn pattern(cursor: &mut Cursor) -> Result<String, Error> {
    let mut text = String::new();
    loop {
        match cursor.current() {
            None => return Err(error_eof(cursor.source(), "`}` to close the macro")),
            Some('}' | ',') => return Ok(text),
            Some('\\') => {
                cursor.advance();
                match cursor.current() {
                    Some(c @ ('}' | ',')) => text.push(c),
                    Some(c) => {
                        text.push('\\');
                        text.push(c);
                    }
                    None => return Err(error_eof(cursor.source(), "an escaped character")),
                }
                cursor.advance();
            }
            Some(c) => {
                text.push(c);
                cursor.advance();
            }
        }
    }
}

/// Convert the text of a number literal into an integer.
///
/// Returns `None` for fractions, malformed text and values that overflow.
pub(crate) fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or(digits.strip_prefix("0X")) {
        i128::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i128>().ok()?
    };

    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).ok()
}

/// Return true if the given character is a recognized beginning identifier,
/// meaning '_' or an `xid_start`.
pub fn is_ident_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

/// Return true if the given character is a recognized continue identifier,
/// meaning an `xid_continue`.
pub fn is_ident_continue(c: char) -> bool {
    unicode_ident::is_xid_continue(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{UNEXPECTED_EOF, UNEXPECTED_TOKEN};

    #[test]
    fn test_identifier() {
        let mut cursor = Cursor::new("BUILD_LOG_2,");

        assert_eq!(identifier(&mut cursor), Ok("BUILD_LOG_2"));
        assert_eq!(cursor.current(), Some(','));
    }

    #[test]
    fn test_identifier_invalid_start() {
        for source in ["2ABC", "-x", ""] {
            assert!(identifier(&mut Cursor::new(source)).is_err(), "{source}");
        }
    }

    #[test]
    fn test_quoted_escapes() {
        helper_value(r#""a\"b\\c\n\t\r\b\f\q""#, "a\"b\\c\n\t\r\u{8}\u{c}q");
        helper_value(r#""""#, "");
        helper_value(r#""${NESTED, x=1}""#, "${NESTED, x=1}");
    }

    #[test]
    fn test_quoted_line_break() {
        let error = value(&mut Cursor::new("\"first\nsecond\"")).unwrap_err();

        assert_eq!(error.reason(), INVALID_LITERAL);
    }

    #[test]
    fn test_quoted_unclosed() {
        for source in [r#""open"#, r#""open\"#, r#""escaped quote\""#] {
            let error = value(&mut Cursor::new(source)).unwrap_err();

            assert_eq!(error.reason(), UNEXPECTED_EOF, "{source}");
        }
    }

    #[test]
    fn test_boolean() {
        helper_value("true}", "true");
        helper_value("TRUE,", "true");
        helper_value("fAlSe", "false");
    }

    #[test]
    fn test_boolean_partial() {
        for source in ["t", "tru", "truer", "f", "fals", "falsey", "T1"] {
            let error = value(&mut Cursor::new(source)).unwrap_err();

            assert_eq!(error.reason(), INVALID_LITERAL, "{source}");
        }
    }

    #[test]
    fn test_number() {
        helper_value("0", "0");
        helper_value("42}", "42");
        helper_value("-42", "-42");
        helper_value("0x1aF,", "0x1aF");
        helper_value("0X10", "0X10");
        helper_value("017", "017");
        helper_value("-0.25", "-0.25");
        helper_value("0.", "0.");
    }

    #[test]
    fn test_number_stops_at_non_digit() {
        let mut cursor = Cursor::new("12.5");

        assert_eq!(number(&mut cursor), Ok("12"));
        assert_eq!(cursor.current(), Some('.'));
    }

    #[test]
    fn test_number_invalid() {
        for (source, reason) in [
            ("-", UNEXPECTED_EOF),
            ("-x", UNEXPECTED_TOKEN),
            ("0x", UNEXPECTED_EOF),
            ("0xg", UNEXPECTED_TOKEN),
            ("0.1.2", INVALID_LITERAL),
            ("019", INVALID_LITERAL),
        ] {
            let error = number(&mut Cursor::new(source)).unwrap_err();

            assert_eq!(error.reason(), reason, "{source}");
        }
    }

    #[test]
    fn test_value_invalid_start() {
        let error = value(&mut Cursor::new("'single'")).unwrap_err();

        assert_eq!(error.reason(), UNEXPECTED_TOKEN);
    }

    #[test]
    fn test_integer() {
        assert_eq!(integer(&mut Cursor::new("7")), Ok(7));
        assert_eq!(integer(&mut Cursor::new("-7")), Ok(-7));
        assert_eq!(integer(&mut Cursor::new("0x10")), Ok(16));
        assert_eq!(integer(&mut Cursor::new("010")), Ok(8));
        assert!(integer(&mut Cursor::new("0.5")).is_err());
        assert!(integer(&mut Cursor::new("99999999999999999999")).is_err());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("0"), Some(0));
        assert_eq!(parse_integer("-0x1F"), Some(-31));
        assert_eq!(parse_integer("-017"), Some(-15));
        assert_eq!(parse_integer("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_integer("1.5"), None);
        assert_eq!(parse_integer("abc"), None);
    }

    #[test]
    fn test_pattern() {
        let mut cursor = Cursor::new(r"[a-z]\,\}\d+\\}");

        assert_eq!(pattern(&mut cursor), Ok(r"[a-z],}\d+\\".to_string()));
        assert_eq!(cursor.current(), Some('}'));
        assert!(pattern(&mut Cursor::new("abc")).is_err());
    }

    fn helper_value(source: &str, expect: &str) {
        let mut cursor = Cursor::new(source);

        assert_eq!(value(&mut cursor), Ok(expect.to_string()), "{source}");
    }
}
