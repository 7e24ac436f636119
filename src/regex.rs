//! Parsing of regular expression literals.
//!
//! The body of the literal is not interpreted: everything between the
//! delimiters is kept as written, so that the consuming engine can compile
//! it with whatever regex implementation it uses. Only the `\/` escape is
//! unescaped, as it exists purely to write a `/` inside the literal.
use nom::bytes::complete::take_while;
use nom::character::complete::char;
use nom::combinator::cut;
use nom::error::ErrorKind as NomErrorKind;
use nom::sequence::terminated;
use nom::Parser;

use crate::ast::RegexLiteral;
use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};
use crate::recipes::rtrim;

/// Parse a regular expression literal.
///
/// This is a slash-delimited, escape-aware raw body followed by optional
/// flags, `i` and `s` in either order. The body cannot be empty and cannot
/// contain a newline.
pub(crate) fn regex(input: Input) -> ParseResult<RegexLiteral> {
    let start = input.byte_offset();
    let (input, _) = char('/').parse(input)?;
    let (input, source) = cut(terminated(regex_body, char('/'))).parse(input)?;

    if source.is_empty() {
        return Err(nom::Err::Failure(Error::new(
            input.span_from(start),
            ErrorKind::Syntax(NomErrorKind::NonEmpty),
        )));
    }

    let flags_start = input.byte_offset();
    let (input, flags) = rtrim(take_while(|c| c == 'i' || c == 's')).parse(input)?;
    let (case_insensitive, dot_all) = match flags.cursor() {
        "" => (false, false),
        "i" => (true, false),
        "s" => (false, true),
        "is" | "si" => (true, true),
        _ => {
            return Err(nom::Err::Failure(Error::new(
                input.span_from(flags_start),
                ErrorKind::RegexFlagsInvalid,
            )))
        }
    };

    Ok((
        input,
        RegexLiteral {
            source,
            case_insensitive,
            dot_all,
            span: input.span_from(start),
        },
    ))
}

/// Parse the body of a regex, stopping before the closing delimiter.
///
/// A `\/` pair is unescaped; any other backslash pair is kept verbatim.
/// The parser also stops at a newline or at the end of the input, leaving
/// the caller to report the missing delimiter.
fn regex_body(mut input: Input) -> ParseResult<String> {
    let mut source = String::new();

    loop {
        let chunk = input.cursor();
        let Some(index) = chunk.find(['/', '\\', '\n']) else {
            source.push_str(chunk);
            input.advance(chunk.len());
            return Ok((input, source));
        };

        source.push_str(&chunk[..index]);
        if chunk.as_bytes()[index] != b'\\' {
            // An unescaped '/' or a newline.
            input.advance(index);
            return Ok((input, source));
        }

        match chunk[index + 1..].chars().next() {
            Some('/') => {
                source.push('/');
                input.advance(index + 2);
            }
            Some(c) => {
                source.push('\\');
                source.push(c);
                input.advance(index + 1 + c.len_utf8());
            }
            None => {
                // Trailing backslash at the end of the input.
                input.advance(index + 1);
                return Ok((input, source));
            }
        }
    }
}
