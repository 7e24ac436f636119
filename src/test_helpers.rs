use nom::Finish;

use crate::input::{Input, ParseResult};

#[track_caller]
pub(crate) fn parse<'a, F, O, O2>(f: F, input: &'a str, expected_rest: &str, expected: O2)
where
    F: FnOnce(Input<'a>) -> ParseResult<'a, O> + 'a,
    O: PartialEq + std::fmt::Debug + From<O2>,
{
    let input = Input::new(input);
    let (rest, output) = f(input).unwrap();
    assert_eq!(rest.cursor(), expected_rest);
    assert_eq!(output, expected.into());
}

#[track_caller]
pub(crate) fn parse_err<'a, F, O>(f: F, input: &'a str)
where
    F: FnOnce(Input<'a>) -> ParseResult<'a, O>,
    O: PartialEq + std::fmt::Debug,
{
    let input = Input::new(input);
    let res = f(input).finish();
    assert!(res.is_err(), "parsing of {input:?} should have failed");
}

#[track_caller]
pub(crate) fn parse_check<'a, F, O, C>(f: F, input: &'a str, check: C)
where
    F: FnOnce(Input<'a>) -> ParseResult<'a, O>,
    O: PartialEq + std::fmt::Debug,
    C: FnOnce(O),
{
    let input = Input::new(input);
    let res = f(input).finish();
    check(res.unwrap().1);
}

// This helper serves two purposes:
// - ensure public types have the expected impls: Clone, Debug, Send, Sync
// - instrument those impls so the derives are not marked as missed in
//   coverage.
//
// Each module exposing public types is expected to use it on them.
pub(crate) fn test_public_type<T: Clone + std::fmt::Debug + Send + Sync>(t: T) {
    #[allow(clippy::redundant_clone)]
    let _r = t.clone();
    let _r = format!("{:?}", &t);
}
