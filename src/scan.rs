mod cursor;
mod literal;
mod token;

pub use self::{cursor::Cursor, token::Token};
pub(crate) use literal::parse_integer;

use self::literal::is_ident_start;
use crate::{
    log::{error_eof, Error},
    region::Region,
    session::Session,
    transform::Transform,
};

/// Reads source text once from left to right, copying plain text and handing each
/// complete macro to the [`Session`] for evaluation.
pub struct Scanner<'source, 'session, 'call, C: ?Sized> {
    /// Position within the source text.
    cursor: Cursor<'source>,
    /// The session that evaluates macros.
    session: &'session Session<'call, C>,
    /// Number of nested expansions above this one.
    depth: usize,
    /// The macro currently being read.
    token: Token,
}

impl<'source, 'session, 'call, C: ?Sized> Scanner<'source, 'session, 'call, C> {
    /// Create a new [`Scanner`] over the given source text.
    #[inline]
    pub fn new(session: &'session Session<'call, C>, source: &'source str, depth: usize) -> Self {
        Self {
            cursor: Cursor::new(source),
            session,
            depth,
            token: Token::default(),
        }
    }

    /// Scan the source text and return the expanded result.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the source contains a malformed macro, or when
    /// the [`Session`] fails to evaluate one.
    pub fn scan(mut self) -> Result<String, Error> {
        let mut output = String::with_capacity(self.cursor.source().len());

        while let Some(c) = self.cursor.current() {
            if c != '$' {
                output.push(c);
                self.cursor.advance();
                continue;
            }

            let begin = self.cursor.position();
            self.cursor.advance();

            match self.cursor.current() {
                Some('$') => {
                    self.cursor.advance();
                    output.push('$');
                    self.copy_escaped(&mut output)?;
                }
                Some('{') => {
                    self.cursor.advance();
                    self.scan_delimited()?;
                    self.dispatch(begin, &mut output)?;
                }
                Some(c) if is_ident_start(c) => {
                    self.token.name = literal::identifier(&mut self.cursor)?.to_string();
                    self.dispatch(begin, &mut output)?;
                }
                Some(c) => {
                    // `$5`, `$.`, `$-` and the like are plain text.
                    output.push('$');
                    output.push(c);
                    self.cursor.advance();
                }
                None => output.push('$'),
            }
        }

        Ok(output)
    }

    /// Copy the macro following an escaped `$$` without evaluating it.
    ///
    /// A braced macro is copied up to the first `}` that is not preceded by a `\`,
    /// and a bare macro is copied up to the end of its name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a braced macro is never closed.
    fn copy_escaped(&mut self, output: &mut String) -> Result<(), Error> {
        let begin = self.cursor.position();

        match self.cursor.current() {
            Some('{') => loop {
                self.cursor.advance();
                match self.cursor.current() {
                    None => return Err(error_eof(self.cursor.source(), "`}` to close the macro")),
                    Some('\\') => self.cursor.advance(),
                    Some('}') => {
                        self.cursor.advance();
                        break;
                    }
                    Some(_) => continue,
                }
            },
            Some(c) if is_ident_start(c) => {
                literal::identifier(&mut self.cursor)?;
            }
            _ => return Ok(()),
        }

        output.push_str(self.cursor.since(begin));
        Ok(())
    }

    /// Read a delimited macro into the current [`Token`], assuming the cursor
    /// is just past the opening `${`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the macro is malformed.
    fn scan_delimited(&mut self) -> Result<(), Error> {
        if self.cursor.eat('#') {
            self.token.transforms.push(Transform::ContentLength);
        }

        self.token.name = literal::identifier(&mut self.cursor)?.to_string();

        match self.cursor.current() {
            Some(':') => {
                self.cursor.advance();
                let offset = literal::integer(&mut self.cursor)?;
                let length = if self.cursor.eat(':') {
                    Some(literal::integer(&mut self.cursor)?)
                } else {
                    None
                };
                self.token
                    .transforms
                    .push(Transform::Substring { offset, length });
            }
            Some(marker @ ('#' | '%')) => {
                self.cursor.advance();
                let begin = self.cursor.position();
                let pattern = literal::pattern(&mut self.cursor)?;
                let transform = if marker == '#' {
                    Transform::strip_prefix(&pattern)
                } else {
                    Transform::strip_suffix(&pattern)
                }
                .map_err(|e| e.with_pointer(self.cursor.source(), begin..self.cursor.position()))?;
                self.token.transforms.push(transform);
            }
            _ => {}
        }

        self.cursor.skip_blank();
        while self.cursor.eat(',') {
            self.cursor.skip_blank();
            let key = literal::identifier(&mut self.cursor)?;
            self.cursor.skip_blank();
            self.cursor.expect('=')?;
            self.cursor.skip_blank();
            let value = literal::value(&mut self.cursor)?;
            self.cursor.skip_blank();

            self.token.arguments.insert(key, value);
        }

        self.cursor.expect('}')
    }

    /// Hand the current [`Token`] to the [`Session`], and reset it.
    fn dispatch(&mut self, begin: usize, output: &mut String) -> Result<(), Error> {
        let token = std::mem::take(&mut self.token);
        let region = Region::new(begin..self.cursor.position());

        self.session
            .dispatch(token, self.cursor.source(), region, self.depth, output)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        handler::{from_fn, nested_from_fn, Handler},
        log::{INVALID_LITERAL, INVALID_TRANSFORM, UNEXPECTED_EOF},
        Arguments, Engine, Error, ErrorKind,
    };

    #[test]
    fn test_plain_text() {
        let source = "no macros here, only text {with braces} and \\backslashes";

        assert_eq!(helper_expand(source, true), Ok(source.to_string()));
        assert_eq!(helper_expand("", true), Ok(String::new()));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            helper_expand(r"$$ALPHA and $${ALPHA:1} and $${A\}B} done", true),
            Ok(r"$ALPHA and ${ALPHA:1} and ${A\}B} done".to_string())
        );
        assert_eq!(helper_expand("$$5 $$", true), Ok("$5 $".to_string()));
        assert_eq!(helper_expand("$$$ALPHA", true), Ok("$01234567890abcdefgh".to_string()));
    }

    #[test]
    fn test_escape_unclosed() {
        let error = helper_expand("$${ALPHA", false).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Syntax);
        assert_eq!(error.reason(), UNEXPECTED_EOF);
    }

    #[test]
    fn test_not_a_macro() {
        assert_eq!(helper_expand("costs $69.99", false), Ok("costs $69.99".to_string()));
        assert_eq!(helper_expand("$-1 $. $", true), Ok("$-1 $. $".to_string()));
    }

    #[test]
    fn test_bare() {
        assert_eq!(
            helper_expand("[$ALPHA][$_ALPHA]", false),
            Ok("[01234567890abcdefgh][$_ALPHA]".to_string())
        );
        assert_eq!(helper_expand("$hello/$dear", false), Ok("$hello/$dear".to_string()));
    }

    #[test]
    fn test_unresolved_strict() {
        let error = helper_expand("$hello/$dear", true).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Unresolved);
        assert_eq!(error.reason(), "Unrecognized macro 'hello' in '$hello/$dear'");
    }

    #[test]
    fn test_unresolved_lenient_delimited() {
        assert_eq!(
            helper_expand(r#"<${GHOST, a="b"}> <${#GHOST:1}>"#, false),
            Ok(r#"<${GHOST, a="b"}> <${#GHOST:1}>"#.to_string())
        );
    }

    #[test]
    fn test_argument_order() {
        assert_eq!(
            helper_expand(r#"${TEST,jkl=true,abc="x"}"#, true),
            Ok("abc=x,jkl=true".to_string())
        );
    }

    #[test]
    fn test_argument_values() {
        assert_eq!(
            helper_expand(r#"${TEST, s="a\tb\"c\\", b=FALSE, h=0x1F, o=017, d=0.5, n=-12, z=0}"#, true),
            Ok("b=false,d=0.5,h=0x1F,n=-12,o=017,s=a\tb\"c\\,z=0".to_string())
        );
    }

    #[test]
    fn test_argument_whitespace() {
        assert_eq!(
            helper_expand("${TEST ,  b = 1 ,\ta=\"x\"\t}", true),
            Ok("a=x,b=1".to_string())
        );
    }

    #[test]
    fn test_argument_multiple() {
        assert_eq!(
            helper_expand(r#"${MULTI, v=1, v="two", v=TRUE}"#, true),
            Ok("1+two+true".to_string())
        );
        assert_eq!(
            helper_expand(r#"${TEST, v=1, v="two"}"#, true),
            Ok("v=two".to_string())
        );
    }

    #[test]
    fn test_argument_invalid() {
        let cases = [
            r#"${TEST, a=}"#,
            r#"${TEST, a="b}"#,
            "${TEST, a=\"x\ny\"}",
            r#"${TEST, a=yes}"#,
            r#"${TEST, a=09}"#,
            r#"${TEST, a=0.1.2}"#,
            r#"${TEST, a 1}"#,
            r#"${TEST a=1}"#,
            r#"${TEST, =1}"#,
            r#"${TEST"#,
            r#"${}"#,
        ];

        for source in cases {
            let error = helper_expand(source, false).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Syntax, "{source}");
        }

        let error = helper_expand(r#"${TEST, a=09}"#, false).unwrap_err();
        assert_eq!(error.reason(), INVALID_LITERAL);
    }

    #[test]
    fn test_substring() {
        let cases = [
            ("${ALPHA:7}", "7890abcdefgh"),
            ("${ALPHA:7:2}", "78"),
            ("${ALPHA:7:-2}", "7890abcdef"),
            ("${ALPHA:-7}", "bcdefgh"),
            ("${ALPHA:0x2:010}", "23456789"),
        ];

        for (source, expect) in cases {
            assert_eq!(helper_expand(source, true), Ok(expect.to_string()), "{source}");
        }
    }

    #[test]
    fn test_substring_out_of_range() {
        let error = helper_expand("${ALPHA:20}", false).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Syntax);
        assert_eq!(error.reason(), INVALID_TRANSFORM);

        assert!(helper_expand("${ALPHA:5:30}", false).is_err());
        assert!(helper_expand("${ALPHA:1.5}", false).is_err());

        let error = helper_expand("${ALPHA:1:0x7FFFFFFFFFFFFFFF}", false).unwrap_err();
        assert_eq!(error.reason(), INVALID_TRANSFORM);
    }

    #[test]
    fn test_content_length() {
        assert_eq!(helper_expand("${#TOKEN}", true), Ok("28".to_string()));
        assert_eq!(helper_expand("${#ALPHA:0:3}", true), Ok("3".to_string()));
        assert_eq!(helper_expand("${#FILE%\\.gz}", true), Ok("11".to_string()));
    }

    #[test]
    fn test_strip() {
        let cases = [
            (r"${FILE#[a-z]+\.}", "tar.gz"),
            (r"${FILE#^archive}", ".tar.gz"),
            (r"${FILE#tar}", "archive.tar.gz"),
            (r"${FILE%\.gz}", "archive.tar"),
            (r"${FILE%\.[a-z]+}", "archive.tar"),
            (r"${FILE%zip$}", "archive.tar.gz"),
            (r"${FILE#a\,b}", "archive.tar.gz"),
            (r#"${FILE%\.gz, n="1"}"#, "archive.tar"),
            (r"${PRICE%\$}", "5$ or 7"),
            (r"${PRICE%[0-9]\$}", "5$ or "),
        ];

        for (source, expect) in cases {
            assert_eq!(helper_expand(source, true), Ok(expect.to_string()), "{source}");
        }
    }

    #[test]
    fn test_strip_invalid_pattern() {
        let error = helper_expand("${FILE#[a-}", false).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Syntax);
        assert_eq!(error.reason(), INVALID_TRANSFORM);
        assert!(error.has_visual());
    }

    #[test]
    fn test_handler_failure() {
        assert_eq!(
            helper_expand("<${FAIL}> $ALPHA", false),
            Ok("<[Error replacing 'FAIL' - disk full]> 01234567890abcdefgh".to_string())
        );

        let error = helper_expand("<${FAIL}>", true).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Handler);
        assert_eq!(error.reason(), "disk full");
        assert!(error.has_visual());
    }

    #[test]
    fn test_handler_syntax_failure() {
        let engine = helper_engine().with_handler(from_fn("MALFORMED", |_: &(), _: &Arguments| {
            Err(Error::syntax("bad template"))
        }));

        let error = engine.expand(&(), "<$MALFORMED>", false, &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Syntax);
        assert_eq!(error.reason(), "bad template");
        assert!(error.has_visual());
    }

    #[test]
    fn test_nested() {
        assert_eq!(helper_expand("[$WRAP]", true), Ok("[<abc=1>]".to_string()));
        assert_eq!(helper_expand("${#WRAP}", true), Ok("7".to_string()));
    }

    #[test]
    fn test_recursion_limit() {
        let expect = format!("{}${{SELF}}", "x".repeat(11));

        assert_eq!(helper_expand("${SELF}", true), Ok(expect));
    }

    #[test]
    fn test_recursion_custom_limit() {
        let engine = helper_engine().with_max_depth(2);

        assert_eq!(
            engine.expand(&(), "$SELF", true, &[]),
            Ok("xxx${SELF}".to_string())
        );
        assert_eq!(
            helper_engine().with_max_depth(0).expand(&(), "$SELF", true, &[]),
            Ok("x${SELF}".to_string())
        );
    }

    #[test]
    fn test_nested_syntax_error() {
        let engine = Engine::new().with_handler(nested_from_fn("BROKEN", |_: &(), _: &Arguments| {
            Ok("${UNCLOSED".to_string())
        }));

        let error = engine.expand(&(), "ok $BROKEN", false, &[]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_private_in_nested() {
        let private = from_fn("INNER", |_: &(), _: &Arguments| Ok("private".to_string()));
        let engine = Engine::new().with_handler(nested_from_fn("OUTER", |_: &(), _: &Arguments| {
            Ok("<$INNER>".to_string())
        }));

        let handlers: [&dyn Handler<()>; 1] = [&private];

        assert_eq!(
            engine.expand(&(), "$OUTER", true, &handlers),
            Ok("<private>".to_string())
        );
    }

    fn helper_expand(source: &str, strict: bool) -> Result<String, Error> {
        helper_engine().expand(&(), source, strict, &[])
    }

    fn helper_engine() -> Engine<()> {
        Engine::new()
            .with_handler(from_fn("TEST", |_: &(), args: &Arguments| {
                let pairs: Vec<String> = args
                    .keys()
                    .map(|key| format!("{key}={}", args.get(key).unwrap_or_default()))
                    .collect();

                Ok(pairs.join(","))
            }))
            .with_handler(from_fn("MULTI", |_: &(), args: &Arguments| {
                Ok(args.get_all("v").join("+"))
            }))
            .with_handler(from_fn("ALPHA", |_: &(), _: &Arguments| {
                Ok("01234567890abcdefgh".to_string())
            }))
            .with_handler(from_fn("TOKEN", |_: &(), _: &Arguments| {
                Ok("0123456789012345678901234567".to_string())
            }))
            .with_handler(from_fn("FILE", |_: &(), _: &Arguments| {
                Ok("archive.tar.gz".to_string())
            }))
            .with_handler(from_fn("PRICE", |_: &(), _: &Arguments| {
                Ok("5$ or 7$".to_string())
            }))
            .with_handler(from_fn("FAIL", |_: &(), _: &Arguments| {
                Err(Error::build("disk full"))
            }))
            .with_handler(nested_from_fn("WRAP", |_: &(), _: &Arguments| {
                Ok("<${TEST, abc=1}>".to_string())
            }))
            .with_handler(nested_from_fn("SELF", |_: &(), _: &Arguments| {
                Ok("x${SELF}".to_string())
            }))
    }
}
