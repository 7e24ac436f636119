//! Parsing of identifiers, pattern references and quoted strings.
use nom::bytes::complete::take_while;
use nom::character::complete::char;
use nom::combinator::{map, opt, recognize};
use nom::error::{ErrorKind as NomErrorKind, ParseError};
use nom::sequence::{pair, preceded};
use nom::Parser;

use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};
use crate::recipes::{rtrim, take_one};

/// Returns true if the char can appear in an identifier, ie a-z, A-Z, 0-9, _
fn is_identifier_char(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_')
}

/// Parse the tail of an identifier, which can be empty.
///
/// This is the part following the sigil of pattern references (`$`, `#`,
/// `@`, `!`), or following the first character of a plain identifier.
/// It does *not* right-trim, as a `*` wildcard can directly follow it in
/// some contexts.
fn identifier_tail(input: Input) -> ParseResult<String> {
    map(
        take_while(is_identifier_char),
        |matched: Input| matched.cursor().to_owned(),
    )
    .parse(input)
}

/// Parse an identifier, `[a-zA-Z_][a-zA-Z0-9_]*`.
///
/// Keywords are identifiers filtered by exact match: this parser accepts
/// them, and the few places where a keyword is forbidden (rule names) check
/// the result against the reserved-word table.
pub(crate) fn identifier(input: Input) -> ParseResult<String> {
    rtrim(map(
        recognize((
            take_one(|c| matches!(c, 'a'..='z' | 'A'..='Z' | '_')),
            take_while(is_identifier_char),
        )),
        |matched: Input| matched.cursor().to_owned(),
    ))
    .parse(input)
}

fn prefixed_name(prefix: char, input: Input) -> ParseResult<String> {
    rtrim(preceded(char(prefix), identifier_tail)).parse(input)
}

/// Parse a pattern identifier, `$[a-zA-Z0-9_]*`.
///
/// A bare `$` yields an empty name, denoting the anonymous pattern.
pub(crate) fn pattern_identifier(input: Input) -> ParseResult<String> {
    prefixed_name('$', input)
}

/// Parse a pattern identifier with an optional trailing `*` wildcard.
pub(crate) fn pattern_identifier_with_wildcard(input: Input) -> ParseResult<(String, bool)> {
    rtrim(pair(
        preceded(char('$'), identifier_tail),
        map(opt(char('*')), |star| star.is_some()),
    ))
    .parse(input)
}

/// Parse a pattern count reference, `#[a-zA-Z0-9_]*`.
pub(crate) fn count_reference(input: Input) -> ParseResult<String> {
    prefixed_name('#', input)
}

/// Parse a pattern offset reference, `@[a-zA-Z0-9_]*`.
pub(crate) fn offset_reference(input: Input) -> ParseResult<String> {
    prefixed_name('@', input)
}

/// Parse a pattern length reference, `![a-zA-Z0-9_]*`.
pub(crate) fn length_reference(input: Input) -> ParseResult<String> {
    prefixed_name('!', input)
}

/// Parse a quoted string with the full escape set.
///
/// Used for meta values, import and include payloads and base64 alphabets.
/// The string can be single- or double-quoted. On top of the escapes of
/// [`pattern_text`], `\uHHHH` and `\UHHHHHHHH` escapes are recognized, and
/// any other escaped character is passed through as itself.
///
/// Non-ascii bytes are allowed, hence the byte string result.
pub(crate) fn quoted(input: Input) -> ParseResult<Vec<u8>> {
    rtrim(|input| string_contents(input, true)).parse(input)
}

/// Parse the quoted text of a text pattern.
///
/// Single- or double-quoted, with the restricted escape set: `\"`, `\'`,
/// `\\`, `\r`, `\t`, `\n` and `\xHH`. Any other escape is an error.
pub(crate) fn pattern_text(input: Input) -> ParseResult<Vec<u8>> {
    rtrim(|input| string_contents(input, false)).parse(input)
}

fn string_contents(mut input: Input, rich: bool) -> ParseResult<Vec<u8>> {
    let delimiter = match input.cursor().chars().next() {
        Some(c @ ('"' | '\'')) => c,
        _ => {
            return Err(nom::Err::Error(Error::from_error_kind(
                input,
                NomErrorKind::Char,
            )))
        }
    };
    input.advance(1);
    let base = input.byte_offset();

    let mut res = Vec::new();
    let mut chars = input.cursor().char_indices();

    while let Some((i, c)) = chars.next() {
        if c == delimiter {
            input.advance(i + 1);
            return Ok((input, res));
        }
        if c != '\\' {
            push_char(&mut res, c);
            continue;
        }

        let Some((j, escaped)) = chars.next() else {
            return Err(escape_error(base, i));
        };
        match escaped {
            't' => res.push(b'\t'),
            'r' => res.push(b'\r'),
            'n' => res.push(b'\n'),
            '"' => res.push(b'"'),
            '\'' => res.push(b'\''),
            '\\' => res.push(b'\\'),
            'x' => {
                let (Some((_, hi)), Some((k, lo))) = (chars.next(), chars.next()) else {
                    return Err(escape_error(base, j));
                };
                let (Some(hi), Some(lo)) = (hi.to_digit(16), lo.to_digit(16)) else {
                    return Err(escape_error(base, k));
                };
                #[allow(clippy::cast_possible_truncation)]
                res.push(((hi as u8) << 4) | (lo as u8));
            }
            'u' | 'U' if rich => {
                let count = if escaped == 'u' { 4 } else { 8 };
                let mut value: u32 = 0;
                let mut end = j;
                for _ in 0..count {
                    let Some((k, c)) = chars.next() else {
                        return Err(escape_error(base, end));
                    };
                    let Some(digit) = c.to_digit(16) else {
                        return Err(escape_error(base, k));
                    };
                    value = (value << 4) | digit;
                    end = k;
                }
                match char::from_u32(value) {
                    Some(c) => push_char(&mut res, c),
                    None => {
                        return Err(nom::Err::Failure(Error::new(
                            (base + i)..(base + end + 1),
                            ErrorKind::EscapeUnicodeInvalid { value },
                        )))
                    }
                }
            }
            // Any other escaped character stands for itself.
            other if rich => push_char(&mut res, other),
            _ => return Err(escape_error(base, j)),
        }
    }

    // The closing delimiter was never found.
    input.advance(input.cursor().len());
    Err(nom::Err::Error(Error::from_error_kind(
        input,
        NomErrorKind::EscapedTransform,
    )))
}

fn escape_error(base: usize, at: usize) -> nom::Err<Error> {
    nom::Err::Error(Error::new(
        (base + at)..(base + at + 1),
        ErrorKind::Syntax(NomErrorKind::EscapedTransform),
    ))
}

fn push_char(res: &mut Vec<u8>, c: char) {
    let mut buf = [0; 4];
    res.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{parse, parse_err};

    #[test]
    fn test_identifier() {
        parse(identifier, "a+", "+", "a");
        parse(identifier, "_*", "*", "_");
        parse(identifier, "A5 c", "c", "A5");
        parse(identifier, "g9b*c", "*c", "g9b");
        parse(identifier, "__1Bd_F+", "+", "__1Bd_F");

        parse_err(identifier, "");
        parse_err(identifier, "*");
        parse_err(identifier, "$");
        parse_err(identifier, "9b");
    }

    #[test]
    fn test_pattern_identifier() {
        parse(pattern_identifier, "$-", "-", "");
        parse(pattern_identifier, "$*", "*", "");
        parse(pattern_identifier, "$a c", "c", "a");
        parse(pattern_identifier, "$9b*c", "*c", "9b");
        parse(pattern_identifier, "$_1Bd_F+", "+", "_1Bd_F");

        parse_err(pattern_identifier, "");
        parse_err(pattern_identifier, "*");
    }

    #[test]
    fn test_pattern_identifier_with_wildcard() {
        parse(
            pattern_identifier_with_wildcard,
            "$_*",
            "",
            ("_".to_owned(), true),
        );
        parse(
            pattern_identifier_with_wildcard,
            "$",
            "",
            (String::new(), false),
        );
        parse(
            pattern_identifier_with_wildcard,
            "$a* c",
            "c",
            ("a".to_owned(), true),
        );
        parse(
            pattern_identifier_with_wildcard,
            "$a *",
            "*",
            ("a".to_owned(), false),
        );

        parse_err(pattern_identifier_with_wildcard, "");
        parse_err(pattern_identifier_with_wildcard, "*");
    }

    #[test]
    fn test_references() {
        parse(count_reference, "#a c", "c", "a");
        parse(count_reference, "# c", "c", "");
        parse(offset_reference, "@9b*c", "*c", "9b");
        parse(offset_reference, "@ c", "c", "");
        parse(length_reference, "!_1Bd_F+", "+", "_1Bd_F");
        parse(length_reference, "! c", "c", "");

        parse_err(count_reference, "$a");
        parse_err(offset_reference, "#a");
        parse_err(length_reference, "@a");
    }

    #[test]
    fn test_quoted() {
        parse(quoted, "\"\" b", "b", "");
        parse(quoted, "\"1\"b", "b", "1");
        parse(quoted, "\"abc +$\" b", "b", "abc +$");
        parse(quoted, r#"" \r \n \t \"\\a""#, "", " \r \n \t \"\\a");
        parse(quoted, r#""\x10 \x32""#, "", "\u{10} 2");
        parse(quoted, r#""\x00 \xFF""#, "", [0, b' ', 255]);
        parse(quoted, r#""é"a"#, "a", [0xc3, 0xa9]);

        // Single quotes, with both quote escapes accepted in both forms.
        parse(quoted, r#"'a"b' c"#, "c", "a\"b");
        parse(quoted, r#"'\'' c"#, "c", "'");
        parse(quoted, r#""\'" c"#, "c", "'");
        parse(quoted, "'a' 'b'", "'b'", "a");

        // Unicode escapes.
        parse(quoted, "\"\\u00e9\"", "", [0xc3, 0xa9]);
        parse(quoted, r#""\U0001F980"a"#, "a", "🦀");

        // Unknown escapes are passed through.
        parse(quoted, r#""\a\0\/""#, "", "a0/");

        parse_err(quoted, "a");
        parse_err(quoted, r#"""#);
        parse_err(quoted, r#""ab"#);
        parse_err(quoted, r#""a\"#);
        parse_err(quoted, r#""a\xAG""#);
        parse_err(quoted, r#""a\x1""#);
        parse_err(quoted, r#""\u123""#);
        parse_err(quoted, r#""\ud800""#);
        parse_err(quoted, "'ab\"");
    }

    #[test]
    fn test_pattern_text() {
        parse(pattern_text, r#""a\tb" c"#, "c", "a\tb");
        parse(pattern_text, r#""\x4d\x5a""#, "", "MZ");
        parse(pattern_text, r#"'\\x' y"#, "y", "\\x");
        // Plain non-ascii characters are fine, only the escape set shrinks.
        parse(pattern_text, r#""é""#, "", [0xc3, 0xa9]);

        // The restricted escape set refuses what `quoted` passes through.
        parse_err(pattern_text, r#""\a""#);
        parse_err(pattern_text, "\"\\u00e9\"");
        parse_err(pattern_text, r#""\U0001F980""#);
        parse_err(pattern_text, r#""ab"#);
    }
}
