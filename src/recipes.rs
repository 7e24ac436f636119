//! Common nom recipes shared by all parsing modules.
//!
//! Every parser in this crate follows the same trimming convention: the
//! input it receives has already been left-trimmed, and the input it returns
//! is right-trimmed. [`rtrim`] is the helper enforcing the second half;
//! [`ltrim`] is only applied once, at the very start of a parse.
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_until, take_while1};
use nom::combinator::{cut, value};
use nom::error::{ErrorKind as NomErrorKind, ParseError};
use nom::Parser;

use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};

/// Characters considered insignificant between tokens.
///
/// On top of ASCII whitespace, this covers the form feed, the byte-order
/// mark and the zero-width space and word-joiner characters.
fn is_trivia_char(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\r' | '\n' | '\x0c' | '\u{FEFF}' | '\u{2060}' | '\u{200B}'
    )
}

fn whitespace(input: Input) -> ParseResult<()> {
    value((), take_while1(is_trivia_char)).parse(input)
}

/// Parse a `// ...` comment, running to the end of the line or of the input.
fn line_comment(input: Input) -> ParseResult<()> {
    value((), (tag("//"), take_till(|c| c == '\n'))).parse(input)
}

/// Parse a `/* ... */` comment.
///
/// Comments do not nest: the first `*/` closes the comment. An unterminated
/// comment is a hard error.
fn block_comment(input: Input) -> ParseResult<()> {
    value((), (tag("/*"), cut(take_until("*/")), cut(tag("*/")))).parse(input)
}

fn trivia(input: Input) -> ParseResult<()> {
    alt((block_comment, line_comment, whitespace)).parse(input)
}

/// Left-trim the input.
pub(crate) fn ltrim(mut input: Input) -> ParseResult<()> {
    loop {
        match trivia(input) {
            Ok((i, ())) => input = i,
            Err(nom::Err::Error(_)) => return Ok((input, ())),
            err @ Err(_) => return err,
        }
    }
}

/// Right-trim after the given parser.
pub(crate) fn rtrim<'a, F, O>(mut inner: F) -> impl FnMut(Input<'a>) -> ParseResult<'a, O>
where
    F: Parser<Input<'a>, Output = O, Error = Error> + 'a,
{
    move |input| {
        let (mut input, output) = inner.parse(input)?;
        input.mark_token_end();
        let (input, ()) = ltrim(input)?;
        Ok((input, output))
    }
}

/// Recognize a keyword.
///
/// This is the same as [`nom::bytes::complete::tag`], but refuses to match
/// inside a word: the keyword must not be followed by an identifier
/// character, so that `allx` is not recognized as `all` followed by `x`.
pub(crate) fn keyword(word: &'static str) -> impl for<'a> Fn(Input<'a>) -> ParseResult<'a, &'static str> {
    move |input: Input| match input.strip_prefix(word) {
        Some(rest) => match rest.cursor().chars().next() {
            Some(c) if c.is_alphanumeric() || c == '_' => Err(nom::Err::Error(
                Error::from_error_kind(input, NomErrorKind::Tag),
            )),
            _ => Ok((rest, word)),
        },
        None => Err(nom::Err::Error(Error::from_error_kind(
            input,
            NomErrorKind::Tag,
        ))),
    }
}

/// Accept a single character satisfying the given predicate.
pub(crate) fn take_one<F>(f: F) -> impl for<'a> Fn(Input<'a>) -> ParseResult<'a, char>
where
    F: Fn(char) -> bool,
{
    move |mut input| match input.cursor().chars().next() {
        Some(c) if f(c) => {
            input.advance(c.len_utf8());
            Ok((input, c))
        }
        _ => Err(nom::Err::Error(Error::from_error_kind(
            input,
            NomErrorKind::Satisfy,
        ))),
    }
}

/// Equivalent to [`nom::combinator::map_res`], for an [`ErrorKind`] error.
///
/// The conversion failure is reported as a hard error spanning the whole
/// output of the inner parser.
pub(crate) fn map_res<'a, O1, O2, F, G>(
    mut parser: F,
    mut f: G,
) -> impl FnMut(Input<'a>) -> ParseResult<'a, O2>
where
    F: Parser<Input<'a>, Output = O1, Error = Error>,
    G: FnMut(O1) -> Result<O2, ErrorKind>,
{
    move |input: Input| {
        let start = input.byte_offset();
        let (input, output) = parser.parse(input)?;
        match f(output) {
            Ok(output) => Ok((input, output)),
            Err(kind) => Err(nom::Err::Failure(Error::new(input.span_from(start), kind))),
        }
    }
}
