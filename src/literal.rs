//! Parsing of numeric literals.
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, hex_digit1};
use nom::combinator::{cut, opt, recognize};
use nom::sequence::{pair, preceded};
use nom::Parser;

use crate::error::{Error, ErrorKind};
use crate::input::{Input, ParseResult};
use crate::recipes::{keyword, rtrim};

/// Parse a decimal integer with an optional size unit suffix.
///
/// The suffix must be adjacent to the digits: `5KB` is a single literal
/// scaled by 1024, while `5 KB` is the integer 5 followed by an identifier.
fn decimal_integer(input: Input) -> ParseResult<i64> {
    let start = input.byte_offset();
    let (input, (digits, unit)) = rtrim(pair(
        digit1,
        opt(alt((keyword("KB"), keyword("MB"), keyword("GB")))),
    ))
    .parse(input)?;

    let value = match str::parse::<i64>(&digits) {
        Ok(value) => value,
        Err(e) => {
            return Err(nom::Err::Failure(Error::new(
                input.span_from(start),
                ErrorKind::StrToIntError(e),
            )))
        }
    };

    let coef = match unit {
        Some("KB") => 1024,
        Some("MB") => 1024 * 1024,
        Some("GB") => 1024 * 1024 * 1024,
        _ => return Ok((input, value)),
    };
    match value.checked_mul(coef) {
        Some(value) => Ok((input, value)),
        None => Err(nom::Err::Failure(Error::new(
            input.span_from(start),
            ErrorKind::MulOverflow {
                left: value,
                right: coef,
            },
        ))),
    }
}

/// Parse a hexadecimal integer, `0x` followed by hex digits.
fn hexadecimal_integer(input: Input) -> ParseResult<i64> {
    let start = input.byte_offset();
    let (input, digits) = preceded(tag("0x"), cut(rtrim(hex_digit1))).parse(input)?;

    match i64::from_str_radix(&digits, 16) {
        Ok(value) => Ok((input, value)),
        Err(e) => Err(nom::Err::Failure(Error::new(
            input.span_from(start),
            ErrorKind::StrToHexIntError(e),
        ))),
    }
}

/// Parse an integer literal.
///
/// Can be hexadecimal with a 0x prefix, or decimal with an optional KB, MB
/// or GB suffix.
pub(crate) fn integer(input: Input) -> ParseResult<i64> {
    // The decimal form must be tried last, otherwise it would accept the
    // leading '0' of the '0x' prefix.
    alt((hexadecimal_integer, decimal_integer)).parse(input)
}

/// Parse a float literal, `digits '.' digits`.
///
/// There is no exponent form.
pub(crate) fn float(input: Input) -> ParseResult<f64> {
    let (input, payload) = rtrim(recognize((digit1, char('.'), digit1))).parse(input)?;

    // Cannot fail: the payload matches `[0-9]+ '.' [0-9]+`, which is always
    // a valid input for the f64 implementation of FromStr.
    let value = str::parse::<f64>(&payload).unwrap();
    Ok((input, value))
}
