//! Parsing of the fixed-width integer read pseudo-functions.
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{cut, map};
use nom::sequence::{delimited, pair};
use nom::Parser;

use crate::ast::{Expr, ExprKind, ReadIntKind};
use crate::input::{Input, ParseResult};
use crate::recipes::{keyword, rtrim};

use super::numeric;

/// Parse a read function name, `u?int(8|16|32)(be)?`.
///
/// The `be` suffix on the 8-bit forms is accepted for uniformity and
/// normalized to the endianness-free kind.
fn read_kind(input: Input) -> ParseResult<ReadIntKind> {
    rtrim(alt((
        map(keyword("uint32be"), |_| ReadIntKind::Uint32Be),
        map(keyword("uint32"), |_| ReadIntKind::Uint32),
        map(keyword("uint16be"), |_| ReadIntKind::Uint16Be),
        map(keyword("uint16"), |_| ReadIntKind::Uint16),
        map(keyword("uint8be"), |_| ReadIntKind::Uint8),
        map(keyword("uint8"), |_| ReadIntKind::Uint8),
        map(keyword("int32be"), |_| ReadIntKind::Int32Be),
        map(keyword("int32"), |_| ReadIntKind::Int32),
        map(keyword("int16be"), |_| ReadIntKind::Int16Be),
        map(keyword("int16"), |_| ReadIntKind::Int16),
        map(keyword("int8be"), |_| ReadIntKind::Int8),
        map(keyword("int8"), |_| ReadIntKind::Int8),
    )))
    .parse(input)
}

/// Parse a read expression, eg `uint16be(0x3c)`.
pub(super) fn read_expression(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, (kind, addr)) = pair(
        read_kind,
        cut(delimited(
            rtrim(char('(')),
            numeric::numeric_expression,
            rtrim(char(')')),
        )),
    )
    .parse(input)?;

    Ok((
        input,
        Expr {
            kind: ExprKind::ReadInteger {
                kind,
                addr: Box::new(addr),
            },
            span: input.span_from(start),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{parse, parse_err};

    #[test]
    fn test_read_kind() {
        parse(read_kind, "int8", "", ReadIntKind::Int8);
        parse(read_kind, "int8be a", "a", ReadIntKind::Int8);
        parse(read_kind, "uint8 a", "a", ReadIntKind::Uint8);
        parse(read_kind, "uint8be", "", ReadIntKind::Uint8);
        parse(read_kind, "int16 a", "a", ReadIntKind::Int16);
        parse(read_kind, "int16be a", "a", ReadIntKind::Int16Be);
        parse(read_kind, "uint16 be", "be", ReadIntKind::Uint16);
        parse(read_kind, "uint16be", "", ReadIntKind::Uint16Be);
        parse(read_kind, "int32 b", "b", ReadIntKind::Int32);
        parse(read_kind, "int32be a", "a", ReadIntKind::Int32Be);
        parse(read_kind, "uint32 be", "be", ReadIntKind::Uint32);
        parse(read_kind, "uint32be", "", ReadIntKind::Uint32Be);

        parse_err(read_kind, "");
        parse_err(read_kind, "uint");
        parse_err(read_kind, "int");
        parse_err(read_kind, "int8b");
        parse_err(read_kind, "int8bet");
        parse_err(read_kind, "int9");
        parse_err(read_kind, "uint64");
    }

    #[test]
    fn test_read_expression() {
        parse(
            read_expression,
            "uint8(3)",
            "",
            Expr {
                kind: ExprKind::ReadInteger {
                    kind: ReadIntKind::Uint8,
                    addr: Box::new(Expr {
                        kind: ExprKind::Integer(3),
                        span: 6..7,
                    }),
                },
                span: 0..8,
            },
        );
        parse(
            read_expression,
            "int32be ( filesize - 4 ) b",
            "b",
            Expr {
                kind: ExprKind::ReadInteger {
                    kind: ReadIntKind::Int32Be,
                    addr: Box::new(Expr {
                        kind: ExprKind::Binary {
                            op: crate::ast::BinaryOp::Sub,
                            lhs: Box::new(Expr {
                                kind: ExprKind::Filesize,
                                span: 10..18,
                            }),
                            rhs: Box::new(Expr {
                                kind: ExprKind::Integer(4),
                                span: 21..22,
                            }),
                        },
                        span: 10..22,
                    }),
                },
                span: 0..24,
            },
        );

        parse_err(read_expression, "()");
        parse_err(read_expression, "int16");
        parse_err(read_expression, "uint32(");
        parse_err(read_expression, "uint32()");
        parse_err(read_expression, "uint32be ( 3");
    }
}
