//! Parsing of condition expressions.
//!
//! Two mutually recursive precedence cascades implement the expression
//! grammar:
//!
//! - [`boolean::expression`] handles the boolean levels: `or`, `and`,
//!   `not`/`defined`, the equality and string-relational operators, and the
//!   comparison operators.
//! - [`numeric::numeric_expression`] handles the numeric levels: bitwise
//!   operators, shifts, additive and multiplicative operators, unary
//!   negations, down to the primary terms.
//!
//! The two grammars legitimately overlap: an identifier or a parenthesized
//! form is valid in both. The overlap is resolved at explicit decision
//! points with single-token lookahead, never by unbounded backtracking; see
//! `of_for::quantified_with_expr` and the `%`-before-`of` check in the
//! multiplicative level of `numeric`.
mod boolean;
mod module_access;
mod numeric;
mod of_for;
mod pattern_ops;
mod read_integer;

use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::cut;
use nom::sequence::{separated_pair, terminated};
use nom::Parser;

use crate::ast::{BinaryOp, Expr, ExprKind, Span};
use crate::input::{Input, ParseResult};
use crate::recipes::rtrim;

pub(crate) use boolean::expression;

/// Maximum nesting depth of expressions.
///
/// Both cascade entry points bump the depth counter, so a single
/// source-level nesting can account for two increments.
const MAX_EXPR_DEPTH: usize = 40;

/// Build a binary operator application node.
fn binary(op: BinaryOp, lhs: Expr, rhs: Expr, span: Span) -> Expr {
    Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    }
}

/// Parse an inclusive offset range, `'(' expr '..' expr ')'`.
fn range(input: Input) -> ParseResult<(Box<Expr>, Box<Expr>)> {
    let (input, _) = rtrim(char('(')).parse(input)?;

    let (input, (from, to)) = terminated(
        separated_pair(
            numeric::numeric_expression,
            rtrim(tag("..")),
            cut(numeric::numeric_expression),
        ),
        cut(rtrim(char(')'))),
    )
    .parse(input)?;

    Ok((input, (Box::new(from), Box::new(to))))
}
