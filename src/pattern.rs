//! Parsing of pattern declarations and their modifiers.
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{cut, map, opt};
use nom::multi::many0;
use nom::sequence::{delimited, preceded};
use nom::Parser;

use crate::ast::{PatternDef, PatternModifier, PatternModifierKind, PatternValue, XorRange};
use crate::error::ErrorKind;
use crate::hex;
use crate::input::{Input, ParseResult};
use crate::literal;
use crate::recipes::{keyword, map_res, rtrim};
use crate::regex;
use crate::text;

/// Parse a single pattern declaration, `$name = value modifiers...`.
pub(crate) fn pattern_def(input: Input) -> ParseResult<PatternDef> {
    let start = input.byte_offset();
    let (input, name) = text::pattern_identifier(input)?;
    let name_span = input.span_from(start);

    let (input, _) = cut(rtrim(char('='))).parse(input)?;
    let (input, value) = cut(pattern_value).parse(input)?;
    let (input, modifiers) = modifiers(input)?;

    Ok((
        input,
        PatternDef {
            name,
            name_span,
            value,
            modifiers,
            span: input.span_from(start),
        },
    ))
}

fn pattern_value(input: Input) -> ParseResult<PatternValue> {
    alt((
        map(text::pattern_text, PatternValue::Text),
        map(regex::regex, PatternValue::Regex),
        map(hex::hex_pattern, PatternValue::Hex),
    ))
    .parse(input)
}

/// Parse the modifier list of a pattern declaration.
///
/// The vocabulary is the same whatever the pattern form, and no
/// compatibility or duplication check is applied: which combinations are
/// legal is a semantic concern.
fn modifiers(input: Input) -> ParseResult<Vec<PatternModifier>> {
    many0(modifier).parse(input)
}

fn modifier(input: Input) -> ParseResult<PatternModifier> {
    let start = input.byte_offset();
    let (input, kind) = alt((
        map(rtrim(keyword("nocase")), |_| PatternModifierKind::Nocase),
        map(rtrim(keyword("ascii")), |_| PatternModifierKind::Ascii),
        map(rtrim(keyword("wide")), |_| PatternModifierKind::Wide),
        map(rtrim(keyword("fullword")), |_| PatternModifierKind::Fullword),
        map(rtrim(keyword("private")), |_| PatternModifierKind::Private),
        base64_modifier,
        xor_modifier,
    ))
    .parse(input)?;

    Ok((
        input,
        PatternModifier {
            kind,
            span: input.span_from(start),
        },
    ))
}

/// Parse a base64 or base64wide modifier, with an optional parenthesized
/// alphabet.
///
/// The alphabet length is not checked here.
fn base64_modifier(input: Input) -> ParseResult<PatternModifierKind> {
    let (input, wide) = rtrim(alt((
        map(keyword("base64wide"), |_| true),
        map(keyword("base64"), |_| false),
    )))
    .parse(input)?;

    let (input, alphabet) = opt(delimited(
        rtrim(char('(')),
        cut(text::quoted),
        cut(rtrim(char(')'))),
    ))
    .parse(input)?;

    Ok((
        input,
        if wide {
            PatternModifierKind::Base64Wide(alphabet)
        } else {
            PatternModifierKind::Base64(alphabet)
        },
    ))
}

/// Parse a xor modifier: bare, `xor(n)`, or `xor(a-b)`.
///
/// The values must be bytes; their ordering is not checked here.
fn xor_modifier(input: Input) -> ParseResult<PatternModifierKind> {
    let (input, _) = rtrim(keyword("xor")).parse(input)?;

    let (input, range) = opt(delimited(
        rtrim(char('(')),
        cut((xor_byte, opt(preceded(rtrim(char('-')), xor_byte)))),
        cut(rtrim(char(')'))),
    ))
    .parse(input)?;

    Ok((
        input,
        PatternModifierKind::Xor(range.map(|(from, to)| XorRange { from, to })),
    ))
}

fn xor_byte(input: Input) -> ParseResult<u8> {
    map_res(literal::integer, |value| {
        u8::try_from(value).map_err(|_| ErrorKind::XorByteOutOfRange { value })
    })
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{HexAtom, HexToken, Mask, RegexLiteral};
    use crate::test_helpers::{parse, parse_err};

    #[test]
    fn test_modifier() {
        parse(
            modifier,
            "nocase a",
            "a",
            PatternModifier {
                kind: PatternModifierKind::Nocase,
                span: 0..6,
            },
        );
        parse(
            modifier,
            "wide xor",
            "xor",
            PatternModifier {
                kind: PatternModifierKind::Wide,
                span: 0..4,
            },
        );

        parse_err(modifier, "");
        parse_err(modifier, "w");
        parse_err(modifier, "widexor");
        parse_err(modifier, "nocase8");
    }

    #[test]
    fn test_xor_modifier() {
        parse(
            modifier,
            "xor a",
            "a",
            PatternModifier {
                kind: PatternModifierKind::Xor(None),
                span: 0..3,
            },
        );
        parse(
            modifier,
            "xor(23)",
            "",
            PatternModifier {
                kind: PatternModifierKind::Xor(Some(XorRange {
                    from: 23,
                    to: None,
                })),
                span: 0..7,
            },
        );
        parse(
            modifier,
            "xor ( 12 -15 )b",
            "b",
            PatternModifier {
                kind: PatternModifierKind::Xor(Some(XorRange {
                    from: 12,
                    to: Some(15),
                })),
                span: 0..14,
            },
        );
        parse(
            modifier,
            "xor(0x10-0xff)",
            "",
            PatternModifier {
                kind: PatternModifierKind::Xor(Some(XorRange {
                    from: 0x10,
                    to: Some(0xff),
                })),
                span: 0..14,
            },
        );
        // Bound ordering is not checked here.
        parse(
            modifier,
            "xor(50-4)",
            "",
            PatternModifier {
                kind: PatternModifierKind::Xor(Some(XorRange {
                    from: 50,
                    to: Some(4),
                })),
                span: 0..9,
            },
        );

        parse_err(modifier, "xora");
        parse_err(modifier, "xor(");
        parse_err(modifier, "xor(13");
        parse_err(modifier, "xor()");
        parse_err(modifier, "xor(256)");
        parse_err(modifier, "xor(0-256)");
    }

    #[test]
    fn test_base64_modifier() {
        let alphabet = "!@#$%^&*(){}[].,|ABCDEFGHIJ\x09LMNOPQRSTUVWXYZabcdefghijklmnopqrstu";

        parse(
            modifier,
            "base64 a",
            "a",
            PatternModifier {
                kind: PatternModifierKind::Base64(None),
                span: 0..6,
            },
        );
        parse(
            modifier,
            "base64wide a",
            "a",
            PatternModifier {
                kind: PatternModifierKind::Base64Wide(None),
                span: 0..10,
            },
        );
        parse(
            modifier,
            &format!(r#"base64("{alphabet}")"#),
            "",
            PatternModifier {
                kind: PatternModifierKind::Base64(Some(alphabet.as_bytes().to_vec())),
                span: 0..74,
            },
        );
        // The alphabet length is not checked at this level.
        parse(
            modifier,
            r#"base64wide ( "short" )x"#,
            "x",
            PatternModifier {
                kind: PatternModifierKind::Base64Wide(Some(b"short".to_vec())),
                span: 0..22,
            },
        );

        parse_err(modifier, "base64a");
        parse_err(modifier, "base64widea");
        parse_err(modifier, "base64(");
        parse_err(modifier, "base64(15)");
        parse_err(modifier, r#"base64("a""#);
    }

    #[test]
    fn test_pattern_def() {
        parse(
            pattern_def,
            "$a = \"b\td\" xor ascii \n $next",
            "$next",
            PatternDef {
                name: "a".to_owned(),
                name_span: 0..2,
                value: PatternValue::Text(b"b\td".to_vec()),
                modifiers: vec![
                    PatternModifier {
                        kind: PatternModifierKind::Xor(None),
                        span: 11..14,
                    },
                    PatternModifier {
                        kind: PatternModifierKind::Ascii,
                        span: 15..20,
                    },
                ],
                span: 0..20,
            },
        );
        parse(
            pattern_def,
            "$ = { ?B } private d",
            "d",
            PatternDef {
                name: String::new(),
                name_span: 0..1,
                value: PatternValue::Hex(vec![HexToken::Atom(HexAtom::Masked(0xB, Mask::Left))]),
                modifiers: vec![PatternModifier {
                    kind: PatternModifierKind::Private,
                    span: 11..18,
                }],
                span: 0..18,
            },
        );
        parse(
            pattern_def,
            "$re = /a?b/ s",
            "s",
            PatternDef {
                name: "re".to_owned(),
                name_span: 0..3,
                value: PatternValue::Regex(RegexLiteral {
                    source: "a?b".to_owned(),
                    case_insensitive: false,
                    dot_all: false,
                    span: 6..11,
                }),
                modifiers: Vec::new(),
                span: 0..11,
            },
        );

        parse_err(pattern_def, "");
        parse_err(pattern_def, "a = \"b\"");
        parse_err(pattern_def, "$a");
        parse_err(pattern_def, "$a =");
        parse_err(pattern_def, "$a = b");
    }
}
