//! Parsing of rule declarations.
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{cut, map, opt};
use nom::multi::many1;
use nom::sequence::preceded;
use nom::Parser;

use crate::ast::{Expr, Meta, MetaValue, PatternDef, Rule, Tag};
use crate::error::{Error, ErrorKind};
use crate::expr;
use crate::input::{Input, ParseResult};
use crate::keywords;
use crate::literal;
use crate::pattern;
use crate::recipes::{keyword, rtrim};
use crate::text;

/// Parse a rule declaration.
///
/// The `private` and `global` modifiers are optional, in that fixed order,
/// each at most once. The body holds an optional meta section, an optional
/// strings section and a mandatory condition section, in that order.
pub(crate) fn rule(input: Input) -> ParseResult<Rule> {
    let (input, is_private) = map(opt(rtrim(keyword("private"))), |p| p.is_some()).parse(input)?;
    let (input, is_global) = map(opt(rtrim(keyword("global"))), |g| g.is_some()).parse(input)?;

    let (input, _) = if is_private || is_global {
        cut(rtrim(keyword("rule"))).parse(input)?
    } else {
        rtrim(keyword("rule")).parse(input)?
    };

    let name_start = input.byte_offset();
    let (input, name) = cut(text::identifier).parse(input)?;
    let name_span = input.span_from(name_start);
    if let Some(word) = keywords::as_keyword(&name) {
        return Err(nom::Err::Failure(Error::new(
            name_span,
            ErrorKind::ReservedRuleName { keyword: word },
        )));
    }

    let (input, tags) = opt(tag_list).parse(input)?;

    let (input, _) = cut(rtrim(char('{'))).parse(input)?;
    let (input, meta) = opt(meta_section).parse(input)?;
    let (input, patterns) = opt(patterns_section).parse(input)?;
    let (input, condition) = condition_section(input)?;
    let (input, _) = cut(rtrim(char('}'))).parse(input)?;

    Ok((
        input,
        Rule {
            name,
            name_span,
            is_private,
            is_global,
            tags: tags.unwrap_or_default(),
            meta: meta.unwrap_or_default(),
            patterns: patterns.unwrap_or_default(),
            condition,
        },
    ))
}

/// Parse the tag list of a rule, `':' identifier+`.
fn tag_list(input: Input) -> ParseResult<Vec<Tag>> {
    let (input, _) = rtrim(char(':')).parse(input)?;

    cut(many1(tag_item)).parse(input)
}

fn tag_item(input: Input) -> ParseResult<Tag> {
    let start = input.byte_offset();
    let (input, name) = text::identifier(input)?;

    Ok((
        input,
        Tag {
            name,
            span: input.span_from(start),
        },
    ))
}

/// Parse the meta section of a rule.
fn meta_section(input: Input) -> ParseResult<Vec<Meta>> {
    let (input, _) = rtrim(keyword("meta")).parse(input)?;
    let (input, _) = cut(rtrim(char(':'))).parse(input)?;

    cut(many1(meta_entry)).parse(input)
}

fn meta_entry(input: Input) -> ParseResult<Meta> {
    let key_start = input.byte_offset();
    let (after_key, key) = text::identifier(input)?;
    let key_span = after_key.span_from(key_start);

    let (input, value) = preceded(rtrim(char('=')), meta_value).parse(after_key)?;

    Ok((
        input,
        Meta {
            key,
            key_span,
            value,
        },
    ))
}

/// Parse a meta value: a quoted string, a non-negative integer, or a
/// boolean.
fn meta_value(input: Input) -> ParseResult<MetaValue> {
    alt((
        map(text::quoted, MetaValue::Bytes),
        map(literal::integer, MetaValue::Integer),
        map(rtrim(keyword("true")), |_| MetaValue::Boolean(true)),
        map(rtrim(keyword("false")), |_| MetaValue::Boolean(false)),
    ))
    .parse(input)
}

/// Parse the strings section of a rule.
fn patterns_section(input: Input) -> ParseResult<Vec<PatternDef>> {
    let (input, _) = rtrim(keyword("strings")).parse(input)?;
    let (input, _) = cut(rtrim(char(':'))).parse(input)?;

    cut(many1(pattern::pattern_def)).parse(input)
}

/// Parse the condition section of a rule.
fn condition_section(input: Input) -> ParseResult<Expr> {
    let (input, _) = rtrim(keyword("condition")).parse(input)?;

    cut(preceded(rtrim(char(':')), expr::expression)).parse(input)
}
