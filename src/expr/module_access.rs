//! Parsing of identifiers and their access chains.
use nom::character::complete::char;
use nom::combinator::cut;
use nom::multi::separated_list0;
use nom::sequence::terminated;
use nom::Parser;

use crate::ast::{AccessOp, AccessOpKind, ModuleAccess};
use crate::input::{Input, ParseResult};
use crate::recipes::rtrim;
use crate::text;

use super::{boolean, numeric};

/// Parse an identifier with its trailing access chain.
///
/// The chain is any combination of `.field`, `[index]` and `(arguments)`
/// suffixes, repeated arbitrarily, eg `a.b.c[0].d(x, y)`.
pub(super) fn module_access(input: Input) -> ParseResult<ModuleAccess> {
    let start = input.byte_offset();
    let (mut input, name) = text::identifier(input)?;
    let name_span = input.span_from(start);

    let mut ops = Vec::new();
    loop {
        let op_start = input.byte_offset();

        if let Ok((i, _)) = rtrim(char('.')).parse(input) {
            let (i, field) = cut(text::identifier).parse(i)?;
            input = i;
            ops.push(AccessOp {
                kind: AccessOpKind::Field(field),
                span: input.span_from(op_start),
            });
            continue;
        }

        if let Ok((i, _)) = rtrim(char('[')).parse(input) {
            let (i, index) = cut(terminated(numeric::numeric_expression, rtrim(char(']'))))
                .parse(i)?;
            input = i;
            ops.push(AccessOp {
                kind: AccessOpKind::Index(Box::new(index)),
                span: input.span_from(op_start),
            });
            continue;
        }

        if let Ok((i, _)) = rtrim(char('(')).parse(input) {
            let (i, arguments) = cut(terminated(
                separated_list0(rtrim(char(',')), boolean::expression),
                rtrim(char(')')),
            ))
            .parse(i)?;
            input = i;
            ops.push(AccessOp {
                kind: AccessOpKind::Call(arguments),
                span: input.span_from(op_start),
            });
            continue;
        }

        break;
    }

    Ok((
        input,
        ModuleAccess {
            name,
            name_span,
            ops,
        },
    ))
}
