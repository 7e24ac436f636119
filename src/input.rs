use std::ops::Range;

use nom::error::{ErrorKind as NomErrorKind, ParseError as NomParseError};
use nom::{Compare, CompareResult, Err, IResult};

use crate::error::Error;

pub(crate) type ParseResult<'a, O> = IResult<Input<'a>, O, Error>;

/// Cursor over the source text being parsed.
///
/// The cursor is a cheap copyable view: the whole source is kept around so
/// that byte offsets (used for spans and diagnostics) can be computed from
/// any position.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Input<'a> {
    /// Whole source text, never modified during the parse.
    source: &'a str,

    /// Slice of `source` that remains to be parsed.
    cursor: &'a str,

    /// Offset of the end of the last parsed token, before any trailing
    /// trivia was skipped. Spans end here rather than at the cursor, so
    /// that they do not cover whitespace or comments.
    token_end: usize,

    /// Current nesting depth of the expression cascades.
    ///
    /// Both expression entry points increment this, so a single source-level
    /// nesting can count twice. See `MAX_EXPR_DEPTH`.
    pub(crate) expr_depth: usize,
}

impl<'a> Input<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            cursor: source,
            token_end: 0,
            expr_depth: 0,
        }
    }

    /// Byte offset of the cursor from the start of the source.
    pub(crate) fn byte_offset(&self) -> usize {
        (self.cursor.as_ptr() as usize) - (self.source.as_ptr() as usize)
    }

    pub(crate) fn cursor(&self) -> &'a str {
        self.cursor
    }

    pub(crate) fn advance(&mut self, count: usize) {
        let count = count.min(self.cursor.len());
        self.cursor = &self.cursor[count..];
    }

    pub(crate) fn strip_prefix(&self, prefix: &str) -> Option<Self> {
        self.cursor
            .strip_prefix(prefix)
            .map(|cursor| Self { cursor, ..*self })
    }

    /// Record the current position as the end of the last token.
    ///
    /// Called before trailing trivia is skipped, so that spans produced by
    /// [`Input::span_from`] stop at the token itself.
    pub(crate) fn mark_token_end(&mut self) {
        self.token_end = self.byte_offset();
    }

    /// Span from a saved start position to the end of the last token.
    pub(crate) fn span_from(&self, start: usize) -> Range<usize> {
        if start <= self.token_end {
            start..self.token_end
        } else {
            // No token was parsed since the start position was saved. This
            // happens when an error is generated on entry to a combinator.
            start..start
        }
    }
}

impl<'a> nom::Input for Input<'a> {
    type Item = char;
    type Iter = std::str::Chars<'a>;
    type IterIndices = std::str::CharIndices<'a>;

    fn input_len(&self) -> usize {
        self.cursor.input_len()
    }

    fn take(&self, count: usize) -> Self {
        Self {
            cursor: self.cursor.take(count),
            ..*self
        }
    }

    fn take_from(&self, count: usize) -> Self {
        Self {
            cursor: self.cursor.take_from(count),
            ..*self
        }
    }

    fn take_split(&self, count: usize) -> (Self, Self) {
        let (suffix, prefix) = self.cursor.take_split(count);
        (
            Self {
                cursor: suffix,
                ..*self
            },
            Self {
                cursor: prefix,
                ..*self
            },
        )
    }

    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.cursor.position(predicate)
    }

    fn iter_elements(&self) -> Self::Iter {
        self.cursor.iter_elements()
    }

    fn iter_indices(&self) -> Self::IterIndices {
        self.cursor.iter_indices()
    }

    fn slice_index(&self, count: usize) -> Result<usize, nom::Needed> {
        self.cursor.slice_index(count)
    }

    fn split_at_position<P, E: NomParseError<Self>>(&self, predicate: P) -> IResult<Self, Self, E>
    where
        P: Fn(Self::Item) -> bool,
    {
        match self.position(predicate) {
            Some(n) => Ok(self.take_split(n)),
            None => Err(Err::Incomplete(nom::Needed::new(1))),
        }
    }

    fn split_at_position1<P, E: NomParseError<Self>>(
        &self,
        predicate: P,
        e: NomErrorKind,
    ) -> IResult<Self, Self, E>
    where
        P: Fn(Self::Item) -> bool,
    {
        match self.position(predicate) {
            Some(0) => Err(Err::Error(E::from_error_kind(*self, e))),
            Some(n) => Ok(self.take_split(n)),
            None => Err(Err::Incomplete(nom::Needed::new(1))),
        }
    }

    fn split_at_position_complete<P, E: NomParseError<Self>>(
        &self,
        predicate: P,
    ) -> IResult<Self, Self, E>
    where
        P: Fn(Self::Item) -> bool,
    {
        match self.split_at_position(predicate) {
            Err(Err::Incomplete(_)) => Ok(self.take_split(self.input_len())),
            res => res,
        }
    }

    fn split_at_position1_complete<P, E: NomParseError<Self>>(
        &self,
        predicate: P,
        e: NomErrorKind,
    ) -> IResult<Self, Self, E>
    where
        P: Fn(Self::Item) -> bool,
    {
        match self.position(predicate) {
            Some(0) => Err(Err::Error(E::from_error_kind(*self, e))),
            Some(n) => Ok(self.take_split(n)),
            None => {
                if self.input_len() == 0 {
                    Err(Err::Error(E::from_error_kind(*self, e)))
                } else {
                    Ok(self.take_split(self.input_len()))
                }
            }
        }
    }
}

impl<'a> nom::FindSubstring<&'a str> for Input<'_> {
    fn find_substring(&self, substr: &'a str) -> Option<usize> {
        self.cursor.find_substring(substr)
    }
}

impl<'a> Compare<&'a str> for Input<'_> {
    fn compare(&self, t: &'a str) -> CompareResult {
        self.cursor.compare(t)
    }

    fn compare_no_case(&self, t: &'a str) -> CompareResult {
        self.cursor.compare_no_case(t)
    }
}

impl nom::Offset for Input<'_> {
    fn offset(&self, second: &Self) -> usize {
        self.cursor.offset(second.cursor)
    }
}

impl std::ops::Deref for Input<'_> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use nom::Input as _;

    use super::Input;

    #[test]
    fn test_advance() {
        let mut input = Input::new("rule a { condition: true }");

        input.advance(0);
        assert_eq!(input.cursor(), "rule a { condition: true }");
        assert_eq!(input.byte_offset(), 0);
        input.advance(5);
        assert_eq!(input.cursor(), "a { condition: true }");
        assert_eq!(input.byte_offset(), 5);
        input.advance(100);
        assert_eq!(input.cursor(), "");
        assert_eq!(input.byte_offset(), 26);
    }

    #[test]
    fn test_strip_prefix() {
        let input = Input::new("import \"pe\"");

        let input = input.strip_prefix("import").unwrap();
        assert_eq!(input.cursor(), " \"pe\"");
        assert_eq!(input.byte_offset(), 6);

        assert!(input.strip_prefix("include").is_none());
    }

    #[test]
    fn test_spans() {
        let mut input = Input::new("abc   def");
        let start = input.byte_offset();

        input.advance(3);
        input.mark_token_end();
        input.advance(3);
        assert_eq!(input.span_from(start), 0..3);

        // A start position past the last token end degrades to an empty span.
        assert_eq!(input.span_from(5), 5..5);
    }

    #[test]
    fn test_nom_input_impl() {
        let input = Input::new("condition: true");
        let (post, pre) = input.take_split(9);

        assert_eq!(pre.cursor(), "condition");
        assert_eq!(pre.byte_offset(), 0);
        assert_eq!(post.cursor(), ": true");
        assert_eq!(post.byte_offset(), 9);

        assert_eq!(input.take(4).cursor(), "cond");
        assert_eq!(input.take_from(4).cursor(), "ition: true");
        assert_eq!(input.input_len(), 15);
    }
}
