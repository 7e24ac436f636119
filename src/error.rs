//! Parsing error types.
use std::num::ParseIntError;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use nom::error::{ErrorKind as NomErrorKind, ParseError};

use crate::input::Input;

/// Parsing error.
///
/// A parse either fully succeeds or reports exactly one error, anchored at
/// the earliest point of failure. There is no recovery and no partial tree:
/// callers wanting best-effort behavior must resynchronize externally, using
/// [`Error::span`] as a hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    /// Span of the error in the input.
    ///
    /// This is a range of byte offsets from the beginning of the input given
    /// to [`crate::parse`].
    span: Range<usize>,

    /// Kind of the error.
    kind: ErrorKind,
}

impl Error {
    #[must_use]
    pub(crate) fn new(span: Range<usize>, kind: ErrorKind) -> Self {
        Self { span, kind }
    }

    /// Span of the error in the parsed input.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Convert to a [`Diagnostic`].
    ///
    /// This can be used to display the error in a user-friendly manner.
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic<()> {
        match &self.kind {
            ErrorKind::Syntax(_) => Diagnostic::error()
                .with_message("syntax error")
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::StrToIntError(err) => Diagnostic::error()
                .with_message(format!("error converting to integer: {err}"))
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::StrToHexIntError(err) => Diagnostic::error()
                .with_message(format!(
                    "error converting hexadecimal notation to integer: {err}"
                ))
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::MulOverflow { left, right } => Diagnostic::error()
                .with_message(format!("multiplication {left} * {right} overflows"))
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::ExprTooDeep => Diagnostic::error()
                .with_message("too many imbricated expressions")
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::ReservedRuleName { keyword } => Diagnostic::error()
                .with_message(format!("cannot use the keyword {keyword} as a rule name"))
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::JumpAtBoundary => Diagnostic::error()
                .with_message("a byte pattern cannot start or end with a jump")
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::JumpsNotSeparated => Diagnostic::error()
                .with_message("two jumps must be separated by at least one byte")
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::RegexFlagsInvalid => Diagnostic::error()
                .with_message("invalid regex flags, expected i, s or both")
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::EscapeUnicodeInvalid { value } => Diagnostic::error()
                .with_message(format!(
                    "invalid unicode escape, {value:#x} is not a scalar value"
                ))
                .with_labels(vec![Label::primary((), self.span.clone())]),

            ErrorKind::XorByteOutOfRange { value } => Diagnostic::error()
                .with_message(format!("xor value {value} invalid, must be in [0-255]"))
                .with_labels(vec![Label::primary((), self.span.clone())]),
        }
    }

    fn from_nom_error_kind(position: usize, kind: NomErrorKind) -> Self {
        Self {
            span: position..(position + 1),
            kind: ErrorKind::Syntax(kind),
        }
    }
}

impl ParseError<Input<'_>> for Error {
    fn from_error_kind(input: Input, kind: NomErrorKind) -> Self {
        Self::from_nom_error_kind(input.byte_offset(), kind)
    }

    fn append(_: Input, _: NomErrorKind, other: Self) -> Self {
        other
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    /// Generic error on nom parsing utilities.
    Syntax(NomErrorKind),

    /// Error converting a string to an integer.
    StrToIntError(ParseIntError),

    /// Error converting a string to an integer in base 16.
    StrToHexIntError(ParseIntError),

    /// Overflow on the multiplication implied by a size unit suffix.
    MulOverflow { left: i64, right: i64 },

    /// An expression contains too many imbricated expressions.
    ExprTooDeep,

    /// A reserved keyword is used as a rule name.
    ReservedRuleName { keyword: &'static str },

    /// A jump is at the beginning or the end of a byte pattern.
    JumpAtBoundary,

    /// Two jumps follow each other in a byte pattern.
    JumpsNotSeparated,

    /// The flags on a regex are not drawn from `i`, `s`, `is`, `si`.
    RegexFlagsInvalid,

    /// A `\u` or `\U` escape designates an invalid unicode scalar value.
    EscapeUnicodeInvalid { value: u32 },

    /// A value used in a xor modifier is outside the [0-255] range.
    XorByteOutOfRange { value: i64 },
}
