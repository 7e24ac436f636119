//! Parser for YARA rules.
//!
//! This crate performs the lexical and syntactic analysis of YARA files,
//! producing a concrete syntax tree in which every node carries its source
//! span. It is a syntax-level front-end only: semantic validation (modifier
//! compatibility, name uniqueness, module signatures) and evaluation of
//! rules against scanned data are the concern of the consuming engine.
//!
//! The main entrypoint is [`parse`], which parses the contents of a whole
//! file:
//!
//! ```rust
//! use yara_syntax::ast;
//!
//! let file = yara_syntax::parse(r#"
//! import "pe"
//!
//! private rule example : demo {
//!     meta:
//!         author = "me"
//!     strings:
//!         $mz = { 4D 5A }
//!         $a = "\\mspaint.exe" wide
//!     condition:
//!         pe.is_dll() and all of them
//! }"#)?;
//!
//! assert_eq!(file.components.len(), 2);
//! match &file.components[1] {
//!     ast::Component::Rule(rule) => {
//!         assert_eq!(rule.name, "example");
//!         assert!(rule.is_private);
//!         assert_eq!(rule.patterns.len(), 2);
//!     }
//!     component => panic!("expected a rule, got {component:?}"),
//! }
//! # Ok::<(), yara_syntax::error::Error>(())
//! ```

// Deny most of allowed by default lints from rustc.
#![deny(explicit_outlives_requirements)]
#![deny(keyword_idents)]
#![deny(macro_use_extern_crate)]
#![deny(missing_docs)]
#![deny(non_ascii_idents)]
#![deny(noop_method_call)]
#![deny(rust_2021_compatibility)]
#![deny(single_use_lifetimes)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
#![deny(unused_extern_crates)]
#![deny(unused_import_braces)]
#![deny(unused_lifetimes)]
#![deny(unused_qualifications)]
#![deny(unused_results)]
// Do the same for clippy
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
// Allow some useless pedantic lints
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::range_plus_one)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::single_match_else)]
#![deny(clippy::cargo)]

// Parsing uses the [`nom`] crate.
//
// All of the parsing functions, unless otherwise indicated, depend on the
// following invariants:
// - The received input has already been left-trimmed
// - The returned input is right-trimmed
// The [`recipes::rtrim`] function is provided to make this easier.

pub mod ast;
pub mod error;

mod expr;
mod file;
mod hex;
mod input;
mod keywords;
mod literal;
mod pattern;
mod recipes;
mod regex;
mod rule;
mod text;

/// Parse a YARA file.
///
/// # Errors
///
/// Returns an error if the parsing fails, or if there is trailing data in
/// the file that has not been parsed.
pub fn parse(input: &str) -> Result<ast::SourceFile, error::Error> {
    use nom::Finish;

    let input = input::Input::new(input);
    let (_, file) = file::source_file(input).finish()?;

    Ok(file)
}

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(parse("  global rule c { condition: false }").is_ok());
        assert!(parse("  global rule c { condtion: false }").is_err());
        assert!(parse("").is_ok());
    }

    #[test]
    fn test_error_position() {
        // The reported error carries the offset of the failure, usable by
        // callers to resynchronize.
        let err = parse("rule a { condition: true } ???").unwrap_err();
        assert_eq!(err.span().start, 27);
    }

    #[test]
    fn test_leading_trivia() {
        assert!(parse("\u{FEFF}\u{200B} // header\nrule a { condition: true }").is_ok());
    }
}
