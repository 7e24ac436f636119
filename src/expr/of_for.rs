//! Parsing of the quantified `of` and `for` expressions.
//!
//! There are two entry points instead of one:
//!
//! - [`quantified`] parses every variant whose first token is unambiguous:
//!   `for ...`, and `all/any/none of ...`.
//! - [`quantified_after_expr`] handles the variant led by a numeric
//!   expression, `expr ('%') of ...`. The caller first parses the
//!   expression, then hands it over; if no `of` follows, the expression is
//!   returned untouched.
//!
//! This split is the declared resolution of the overlap between a plain
//! numeric expression and a quantifier: the decision is made on a single
//! token of lookahead once the shared prefix has been parsed, instead of
//! backtracking over it.
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{cut, map, opt, success};
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded, terminated};
use nom::Parser;

use crate::ast::{
    Expr, ExprKind, Iterable, OfAnchor, PatternSet, Quantifier, RuleSet, SetEntry, Span,
};
use crate::input::{Input, ParseResult};
use crate::recipes::{keyword, rtrim};
use crate::text;

use super::{boolean, module_access, numeric, range};

/// Parse the quantified expressions recognizable on their first token.
pub(super) fn quantified(input: Input) -> ParseResult<Expr> {
    alt((for_expression, of_abbreviated)).parse(input)
}

/// Parse `selection of ...` with a keyword selection.
fn of_abbreviated(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, quantifier) = keyword_quantifier(input)?;
    of_tail(quantifier, start, input)
}

/// Parse `expr ('%') of ...`, the expression having already been parsed.
///
/// If no `of` keyword follows, the expression is given back as is, so that
/// the caller does not have to re-parse it.
pub(super) fn quantified_after_expr<'a>(
    expr: Expr,
    start: usize,
    input: Input<'a>,
) -> ParseResult<'a, Expr> {
    let (input, percent) = opt(rtrim(char('%'))).parse(input)?;
    if keyword("of")(input).is_err() {
        return Ok((input, expr));
    }

    let quantifier = Quantifier::Expr {
        expr: Box::new(expr),
        percent: percent.is_some(),
    };
    of_tail(quantifier, start, input)
}

/// Parse the `of` and what follows, the quantifier having been parsed.
fn of_tail<'a>(quantifier: Quantifier, start: usize, input: Input<'a>) -> ParseResult<'a, Expr> {
    let (input, _) = rtrim(keyword("of")).parse(input)?;

    match rule_set(input) {
        Ok((input, set)) => Ok((
            input,
            Expr {
                kind: ExprKind::OfRules { quantifier, set },
                span: input.span_from(start),
            },
        )),
        Err(nom::Err::Failure(e)) => Err(nom::Err::Failure(e)),
        Err(_) => {
            let (input, set) = cut(pattern_set).parse(input)?;
            let (input, anchor) = of_anchor(input)?;
            Ok((
                input,
                Expr {
                    kind: ExprKind::OfPatterns {
                        quantifier,
                        set,
                        anchor,
                    },
                    span: input.span_from(start),
                },
            ))
        }
    }
}

/// Parse the optional `at expr` or `in range` anchor after a pattern set.
fn of_anchor(input: Input) -> ParseResult<Option<OfAnchor>> {
    alt((
        map(
            preceded(rtrim(keyword("in")), cut(range)),
            |(from, to)| Some(OfAnchor::In { from, to }),
        ),
        map(
            preceded(rtrim(keyword("at")), cut(numeric::numeric_expression)),
            |offset| Some(OfAnchor::At(Box::new(offset))),
        ),
        map(success(()), |()| None),
    ))
    .parse(input)
}

/// Parse a full `for` expression.
///
/// This is either of:
/// - `for selection of set : ( body )`
/// - `for selection bindings in iterable : ( body )`
fn for_expression(input: Input) -> ParseResult<Expr> {
    let start = input.byte_offset();
    let (input, quantifier) = preceded(rtrim(keyword("for")), cut(quantifier)).parse(input)?;
    let (after_of, has_of) = opt(rtrim(keyword("of"))).parse(input)?;

    if has_of.is_some() {
        let (input, set) = cut(terminated(pattern_set, rtrim(char(':')))).parse(after_of)?;
        let (input, body) = cut(parenthesized_body).parse(input)?;

        Ok((
            input,
            Expr {
                kind: ExprKind::ForOf {
                    quantifier,
                    set,
                    body: Box::new(body),
                },
                span: input.span_from(start),
            },
        ))
    } else {
        let (input, (bindings, bindings_span)) =
            cut(terminated(for_bindings, rtrim(keyword("in")))).parse(input)?;
        let (input, (iterable, iterable_span)) =
            cut(terminated(iterable, rtrim(char(':')))).parse(input)?;
        let (input, body) = cut(parenthesized_body).parse(input)?;

        Ok((
            input,
            Expr {
                kind: ExprKind::ForIn {
                    quantifier,
                    bindings,
                    bindings_span,
                    iterable,
                    iterable_span,
                    body: Box::new(body),
                },
                span: input.span_from(start),
            },
        ))
    }
}

fn parenthesized_body(input: Input) -> ParseResult<Expr> {
    delimited(rtrim(char('(')), boolean::expression, rtrim(char(')'))).parse(input)
}

/// Parse a keyword quantifier, `all`, `any` or `none`.
fn keyword_quantifier(input: Input) -> ParseResult<Quantifier> {
    alt((
        map(rtrim(keyword("all")), |_| Quantifier::All),
        map(rtrim(keyword("any")), |_| Quantifier::Any),
        map(rtrim(keyword("none")), |_| Quantifier::None),
    ))
    .parse(input)
}

/// Parse any quantifier: a keyword, or a numeric expression with an
/// optional `%` suffix.
fn quantifier(input: Input) -> ParseResult<Quantifier> {
    match keyword_quantifier(input) {
        Ok(res) => Ok(res),
        Err(nom::Err::Failure(e)) => Err(nom::Err::Failure(e)),
        Err(_) => {
            let (input, expr) = numeric::numeric_expression(input)?;
            let (input, percent) = opt(rtrim(char('%'))).parse(input)?;
            Ok((
                input,
                Quantifier::Expr {
                    expr: Box::new(expr),
                    percent: percent.is_some(),
                },
            ))
        }
    }
}

/// Parse a set of patterns: `them`, or a parenthesized enumeration of
/// pattern identifiers with optional wildcards.
fn pattern_set(input: Input) -> ParseResult<PatternSet> {
    alt((
        map(rtrim(keyword("them")), |_| PatternSet {
            elements: Vec::new(),
        }),
        map(
            delimited(
                rtrim(char('(')),
                cut(separated_list1(rtrim(char(',')), pattern_set_entry)),
                cut(rtrim(char(')'))),
            ),
            |elements| PatternSet { elements },
        ),
    ))
    .parse(input)
}

fn pattern_set_entry(input: Input) -> ParseResult<SetEntry> {
    let start = input.byte_offset();
    let (input, (name, wildcard)) = text::pattern_identifier_with_wildcard(input)?;

    Ok((
        input,
        SetEntry {
            name,
            wildcard,
            span: input.span_from(start),
        },
    ))
}

/// Parse a set of rules: a parenthesized enumeration of rule names with
/// optional wildcards.
fn rule_set(input: Input) -> ParseResult<RuleSet> {
    map(
        delimited(
            rtrim(char('(')),
            separated_list1(rtrim(char(',')), rule_set_entry),
            rtrim(char(')')),
        ),
        |elements| RuleSet { elements },
    )
    .parse(input)
}

fn rule_set_entry(input: Input) -> ParseResult<SetEntry> {
    let start = input.byte_offset();
    let (input, name) = text::identifier(input)?;
    let (input, star) = opt(rtrim(char('*'))).parse(input)?;

    Ok((
        input,
        SetEntry {
            name,
            wildcard: star.is_some(),
            span: input.span_from(start),
        },
    ))
}

/// Parse the bound variables of a `for ... in` expression.
///
/// At least one identifier, optionally parenthesized.
fn for_bindings(input: Input) -> ParseResult<(Vec<String>, Span)> {
    let start = input.byte_offset();
    let (input, names) = alt((
        delimited(
            rtrim(char('(')),
            separated_list1(rtrim(char(',')), text::identifier),
            rtrim(char(')')),
        ),
        separated_list1(rtrim(char(',')), text::identifier),
    ))
    .parse(input)?;

    Ok((input, (names, input.span_from(start))))
}

/// Parse the iterable of a `for ... in` expression: a numeric range, an
/// explicit expression list, or an identifier or module access chain.
fn iterable(input: Input) -> ParseResult<(Iterable, Span)> {
    let start = input.byte_offset();
    let (input, iterable) = alt((
        map(module_access::module_access, Iterable::Identifier),
        iterable_list,
        map(range, |(from, to)| Iterable::Range { from, to }),
    ))
    .parse(input)?;

    Ok((input, (iterable, input.span_from(start))))
}

fn iterable_list(input: Input) -> ParseResult<Iterable> {
    let (input, exprs) = delimited(
        rtrim(char('(')),
        separated_list1(rtrim(char(',')), numeric::numeric_expression),
        rtrim(char(')')),
    )
    .parse(input)?;

    Ok((input, Iterable::List(exprs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ModuleAccess;
    use crate::test_helpers::{parse, parse_check, parse_err};

    #[test]
    fn test_quantifier() {
        parse(quantifier, "any a", "a", Quantifier::Any);
        parse(quantifier, "all a", "a", Quantifier::All);
        parse(quantifier, "none a", "a", Quantifier::None);
        parse(
            quantifier,
            "1a",
            "a",
            Quantifier::Expr {
                expr: Box::new(Expr {
                    kind: ExprKind::Integer(1),
                    span: 0..1,
                }),
                percent: false,
            },
        );
        parse(
            quantifier,
            "50% of",
            "of",
            Quantifier::Expr {
                expr: Box::new(Expr {
                    kind: ExprKind::Integer(50),
                    span: 0..2,
                }),
                percent: true,
            },
        );
        // `anya` is not the keyword `any`: it degrades to an identifier.
        parse(
            quantifier,
            "anya",
            "",
            Quantifier::Expr {
                expr: Box::new(Expr {
                    kind: ExprKind::Identifier(ModuleAccess {
                        name: "anya".to_owned(),
                        name_span: 0..4,
                        ops: vec![],
                    }),
                    span: 0..4,
                }),
                percent: false,
            },
        );

        parse_err(quantifier, "");
        parse_err(keyword_quantifier, "1a");
        parse_err(keyword_quantifier, "anya");
    }

    #[test]
    fn test_pattern_set() {
        parse(
            pattern_set,
            "them a",
            "a",
            PatternSet {
                elements: Vec::new(),
            },
        );
        parse(
            pattern_set,
            "($a, $b* ,$)c",
            "c",
            PatternSet {
                elements: vec![
                    SetEntry {
                        name: "a".to_owned(),
                        wildcard: false,
                        span: 1..3,
                    },
                    SetEntry {
                        name: "b".to_owned(),
                        wildcard: true,
                        span: 5..8,
                    },
                    SetEntry {
                        name: String::new(),
                        wildcard: false,
                        span: 10..11,
                    },
                ],
            },
        );

        parse_err(pattern_set, "");
        parse_err(pattern_set, "(");
        parse_err(pattern_set, "()");
        parse_err(pattern_set, "($a");
        parse_err(pattern_set, "($a,");
        parse_err(pattern_set, "($a,)");
        parse_err(pattern_set, "(a)");
    }

    #[test]
    fn test_rule_set() {
        parse(
            rule_set,
            "(a, chapter_* )b",
            "b",
            RuleSet {
                elements: vec![
                    SetEntry {
                        name: "a".to_owned(),
                        wildcard: false,
                        span: 1..2,
                    },
                    SetEntry {
                        name: "chapter_".to_owned(),
                        wildcard: true,
                        span: 4..13,
                    },
                ],
            },
        );

        parse_err(rule_set, "them");
        parse_err(rule_set, "($a)");
        parse_err(rule_set, "()");
    }

    #[test]
    fn test_of_abbreviated() {
        parse_check(quantified, "all of them b", |expr| {
            assert_eq!(
                expr.kind,
                ExprKind::OfPatterns {
                    quantifier: Quantifier::All,
                    set: PatternSet {
                        elements: Vec::new()
                    },
                    anchor: None,
                },
            );
            assert_eq!(expr.span, 0..11);
        });
        parse_check(quantified, "any of ($a, $b)", |expr| {
            match expr.kind {
                ExprKind::OfPatterns {
                    quantifier, set, ..
                } => {
                    assert_eq!(quantifier, Quantifier::Any);
                    assert_eq!(set.elements.len(), 2);
                }
                kind => panic!("expected an of expression, got {kind:?}"),
            };
        });
        parse_check(quantified, "none of (first, second*)", |expr| {
            match expr.kind {
                ExprKind::OfRules { quantifier, set } => {
                    assert_eq!(quantifier, Quantifier::None);
                    assert_eq!(set.elements.len(), 2);
                    assert!(set.elements[1].wildcard);
                }
                kind => panic!("expected an of expression over rules, got {kind:?}"),
            };
        });

        parse_err(quantified, "all of");
        parse_err(quantified, "any of 3");
    }

    #[test]
    fn test_of_anchors() {
        parse_check(quantified, "all of them in (0..100)", |expr| match expr.kind {
            ExprKind::OfPatterns { anchor, .. } => match anchor {
                Some(OfAnchor::In { from, to }) => {
                    assert_eq!(from.kind, ExprKind::Integer(0));
                    assert_eq!(to.kind, ExprKind::Integer(100));
                }
                anchor => panic!("expected an in anchor, got {anchor:?}"),
            },
            kind => panic!("expected an of expression, got {kind:?}"),
        });
        parse_check(quantified, "any of ($a*) at 100", |expr| match expr.kind {
            ExprKind::OfPatterns { anchor, .. } => match anchor {
                Some(OfAnchor::At(offset)) => {
                    assert_eq!(offset.kind, ExprKind::Integer(100));
                }
                anchor => panic!("expected an at anchor, got {anchor:?}"),
            },
            kind => panic!("expected an of expression, got {kind:?}"),
        });

        parse_err(quantified, "all of them in");
        parse_err(quantified, "all of them in (1..)");
        parse_err(quantified, "all of them at");
    }

    #[test]
    fn test_for_of() {
        parse_check(quantified, "for any of them : ( # > 2 )", |expr| {
            match expr.kind {
                ExprKind::ForOf {
                    quantifier,
                    set,
                    body,
                } => {
                    assert_eq!(quantifier, Quantifier::Any);
                    assert!(set.elements.is_empty());
                    assert!(matches!(body.kind, ExprKind::Binary { .. }));
                }
                kind => panic!("expected a for expression, got {kind:?}"),
            };
        });
        parse_check(quantified, "for 25% of ($x*) : ( $ )", |expr| {
            match expr.kind {
                ExprKind::ForOf { quantifier, .. } => match quantifier {
                    Quantifier::Expr { percent, .. } => assert!(percent),
                    quantifier => panic!("expected an expr quantifier, got {quantifier:?}"),
                },
                kind => panic!("expected a for expression, got {kind:?}"),
            };
        });

        parse_err(quantified, "for");
        parse_err(quantified, "for any of them");
        parse_err(quantified, "for any of them :");
        parse_err(quantified, "for any of them : true");
        parse_err(quantified, "for any of them : ( true");
    }

    #[test]
    fn test_for_in() {
        parse_check(quantified, "for all i in (1..10) : ( true )", |expr| {
            match expr.kind {
                ExprKind::ForIn {
                    quantifier,
                    bindings,
                    bindings_span,
                    iterable,
                    ..
                } => {
                    assert_eq!(quantifier, Quantifier::All);
                    assert_eq!(bindings, vec!["i".to_owned()]);
                    assert_eq!(bindings_span, 8..9);
                    assert!(matches!(iterable, Iterable::Range { .. }));
                }
                kind => panic!("expected a for-in expression, got {kind:?}"),
            };
        });
        parse_check(
            quantified,
            "for any k, v in module.map : ( true )",
            |expr| match expr.kind {
                ExprKind::ForIn {
                    bindings, iterable, ..
                } => {
                    assert_eq!(bindings, vec!["k".to_owned(), "v".to_owned()]);
                    assert!(matches!(iterable, Iterable::Identifier(_)));
                }
                kind => panic!("expected a for-in expression, got {kind:?}"),
            },
        );
        // Parenthesized bindings and an explicit list iterable.
        parse_check(
            quantified,
            "for all (i) in (1, 2, 5) : ( true )",
            |expr| match expr.kind {
                ExprKind::ForIn {
                    bindings, iterable, ..
                } => {
                    assert_eq!(bindings, vec!["i".to_owned()]);
                    match iterable {
                        Iterable::List(exprs) => assert_eq!(exprs.len(), 3),
                        iterable => panic!("expected a list iterable, got {iterable:?}"),
                    }
                }
                kind => panic!("expected a for-in expression, got {kind:?}"),
            },
        );

        // Binding zero identifiers is rejected.
        parse_err(quantified, "for all in (1..10) : ( true )");
        parse_err(quantified, "for all () in (1..10) : ( true )");
        parse_err(quantified, "for all i in : ( true )");
        parse_err(quantified, "for all i in (1..10) : true");
    }
}
