//! Parsing of a whole source file.
use nom::combinator::cut;
use nom::Parser;

use crate::ast::{Component, Import, Include, SourceFile};
use crate::input::{Input, ParseResult};
use crate::recipes::{keyword, ltrim, rtrim};
use crate::rule;
use crate::text;

/// Parse a full source file.
///
/// A file is a greedy repetition of import, include and rule declarations,
/// with no separators. Declarations are kept in file order, as the order is
/// meaningful to consumers resolving names.
pub(crate) fn source_file(input: Input) -> ParseResult<SourceFile> {
    let (mut input, ()) = ltrim(input)?;

    let mut components = Vec::new();
    while !input.cursor().is_empty() {
        match import_declaration(input) {
            Ok((i, import)) => {
                components.push(Component::Import(import));
                input = i;
                continue;
            }
            Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
            Err(_) => (),
        }
        match include_declaration(input) {
            Ok((i, include)) => {
                components.push(Component::Include(include));
                input = i;
                continue;
            }
            Err(nom::Err::Failure(e)) => return Err(nom::Err::Failure(e)),
            Err(_) => (),
        }

        let (i, rule) = rule::rule(input)?;
        components.push(Component::Rule(Box::new(rule)));
        input = i;
    }

    Ok((input, SourceFile { components }))
}

/// Parse an import declaration, `import "name"`.
fn import_declaration(input: Input) -> ParseResult<Import> {
    let start = input.byte_offset();
    let (input, _) = rtrim(keyword("import")).parse(input)?;
    let (input, module) = cut(quoted_payload).parse(input)?;

    Ok((
        input,
        Import {
            module,
            span: input.span_from(start),
        },
    ))
}

/// Parse an include declaration, `include "path"`.
fn include_declaration(input: Input) -> ParseResult<Include> {
    let start = input.byte_offset();
    let (input, _) = rtrim(keyword("include")).parse(input)?;
    let (input, path) = cut(quoted_payload).parse(input)?;

    Ok((
        input,
        Include {
            path,
            span: input.span_from(start),
        },
    ))
}

/// Parse the quoted payload of an import or include declaration.
///
/// The payload is an opaque name for the caller to resolve; non-utf8 bytes
/// are replaced rather than rejected.
fn quoted_payload(input: Input) -> ParseResult<String> {
    let (input, bytes) = text::quoted(input)?;
    Ok((input, String::from_utf8_lossy(&bytes).into_owned()))
}
