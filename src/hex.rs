//! Parsing of byte patterns.
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1};
use nom::combinator::{cut, map, opt};
use nom::error::{ErrorKind as NomErrorKind, ParseError};
use nom::multi::{many1, separated_list1};
use nom::sequence::{preceded, terminated};
use nom::Parser;

use crate::ast::{HexAtom, HexToken, Jump, Mask};
use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};
use crate::recipes::{map_res, rtrim};

/// Parse a byte pattern.
///
/// The input is expected to look like `{ AB ?? [2-4] ( CD | EF ) .. }`.
/// A pattern must contain at least one token, a jump cannot open or close
/// it, and two jumps cannot follow each other.
pub(crate) fn hex_pattern(input: Input) -> ParseResult<Vec<HexToken>> {
    let (input, _) = rtrim(char('{')).parse(input)?;

    cut(terminated(token_sequence, rtrim(char('}')))).parse(input)
}

/// Parse a single hex digit and return its value.
fn nibble(mut input: Input) -> ParseResult<u8> {
    match input.cursor().chars().next().and_then(|c| {
        // The value is below 16, the truncation is a no-op.
        #[allow(clippy::cast_possible_truncation)]
        c.to_digit(16).map(|v| v as u8)
    }) {
        Some(value) => {
            input.advance(1);
            Ok((input, value))
        }
        None => Err(nom::Err::Error(Error::from_error_kind(
            input,
            NomErrorKind::HexDigit,
        ))),
    }
}

/// Parse a byte-pair: two hex digits, either of which can be a `?`
/// wildcard, with an optional leading `~` negation.
///
/// Both characters of the pair must be adjacent: `A B` is not a pair.
fn atom(input: Input) -> ParseResult<HexAtom> {
    let (input, negation) = opt(char('~')).parse(input)?;

    let byte_pair = alt((
        map(tag("??"), |_| (0, Some(Mask::All))),
        map(preceded(char('?'), nibble), |v| (v, Some(Mask::Left))),
        map((nibble, nibble), |(hi, lo)| ((hi << 4) | lo, None)),
        map(terminated(nibble, char('?')), |v| (v, Some(Mask::Right))),
    ));
    let (input, (value, mask)) = if negation.is_some() {
        cut(rtrim(byte_pair)).parse(input)?
    } else {
        rtrim(byte_pair).parse(input)?
    };

    let atom = match (negation.is_some(), mask) {
        (false, None) => HexAtom::Byte(value),
        (true, None) => HexAtom::NotByte(value),
        (false, Some(mask)) => HexAtom::Masked(value, mask),
        (true, Some(mask)) => HexAtom::NotMasked(value, mask),
    };
    Ok((input, atom))
}

fn jump_bound(input: Input) -> ParseResult<u32> {
    map_res(rtrim(digit1), |digits| {
        str::parse(digits.cursor()).map_err(ErrorKind::StrToIntError)
    })
    .parse(input)
}

/// Parse a jump, one of `[n]`, `[n-m]`, `[n-]`, `[-m]` and `[-]`.
///
/// No ordering constraint is applied on the bounds: `[4-2]` parses, and is
/// left for a semantic pass to reject.
fn jump(input: Input) -> ParseResult<Jump> {
    let (input, _) = rtrim(char('[')).parse(input)?;

    cut(terminated(jump_bounds, rtrim(char(']')))).parse(input)
}

fn jump_bounds(input: Input) -> ParseResult<Jump> {
    let (input, from) = opt(jump_bound).parse(input)?;

    match from {
        Some(from) => {
            let (input, dash) = opt(rtrim(char('-'))).parse(input)?;
            if dash.is_none() {
                return Ok((input, Jump::Exact(from)));
            }
            let (input, to) = opt(jump_bound).parse(input)?;
            Ok((
                input,
                Jump::Range {
                    from: Some(from),
                    to,
                },
            ))
        }
        None => {
            let (input, _) = rtrim(char('-')).parse(input)?;
            let (input, to) = opt(jump_bound).parse(input)?;
            Ok((input, Jump::Range { from: None, to }))
        }
    }
}

/// Parse an alternation between byte-pair sequences.
///
/// This looks like `( AB CD | EF )`. Arms only contain byte-pairs: jumps
/// and further alternations do not nest inside an alternation.
fn alternatives(input: Input) -> ParseResult<HexToken> {
    let (input, _) = rtrim(char('(')).parse(input)?;

    cut(terminated(
        map(
            separated_list1(rtrim(char('|')), many1(atom)),
            HexToken::Alternatives,
        ),
        rtrim(char(')')),
    ))
    .parse(input)
}

fn token(input: Input) -> ParseResult<HexToken> {
    alt((
        map(atom, HexToken::Atom),
        map(jump, HexToken::Jump),
        alternatives,
    ))
    .parse(input)
}

/// Parse the token list of a byte pattern and check its shape.
fn token_sequence(input: Input) -> ParseResult<Vec<HexToken>> {
    let start = input.byte_offset();
    let (input, tokens) = many1(token).parse(input)?;

    let is_jump = |token: &HexToken| matches!(token, HexToken::Jump(_));
    if tokens.first().is_some_and(is_jump) || tokens.last().is_some_and(is_jump) {
        return Err(nom::Err::Failure(Error::new(
            input.span_from(start),
            ErrorKind::JumpAtBoundary,
        )));
    }
    if tokens.windows(2).any(|w| is_jump(&w[0]) && is_jump(&w[1])) {
        return Err(nom::Err::Failure(Error::new(
            input.span_from(start),
            ErrorKind::JumpsNotSeparated,
        )));
    }

    Ok((input, tokens))
}
