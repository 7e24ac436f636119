//! Nodes of the concrete syntax tree.
//!
//! All nodes are built bottom-up during a single parse pass, are immutable
//! once built, and are owned exclusively by the caller of [`crate::parse`].
//! Every node carries the [`Span`] of the source text it was parsed from,
//! so that downstream tools can emit diagnostics or query the tree without
//! re-parsing.

/// Span of a node in the parsed input, as a range of byte offsets.
pub type Span = std::ops::Range<usize>;

/// A parsed source file.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    /// Top-level declarations, in file order.
    ///
    /// The order is semantically meaningful for consumers resolving names,
    /// and is preserved exactly.
    pub components: Vec<Component>,
}

/// A top-level declaration in a source file.
#[derive(Clone, Debug, PartialEq)]
pub enum Component {
    /// A `import "name"` declaration.
    Import(Import),
    /// A `include "path"` declaration.
    Include(Include),
    /// A rule declaration.
    Rule(Box<Rule>),
}

/// An import of an external module.
#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    /// Name of the imported module.
    ///
    /// The name is an opaque payload: resolving it is the caller's concern.
    pub module: String,
    /// Span of the whole declaration.
    pub span: Span,
}

/// An inclusion of another rules file.
#[derive(Clone, Debug, PartialEq)]
pub struct Include {
    /// Path of the included file, left unresolved.
    pub path: String,
    /// Span of the whole declaration.
    pub span: Span,
}

/// A rule declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    /// Name of the rule.
    pub name: String,
    /// Span of the rule name.
    pub name_span: Span,

    /// Is the rule private.
    pub is_private: bool,
    /// Is the rule global.
    pub is_global: bool,

    /// Tags associated with the rule.
    pub tags: Vec<Tag>,

    /// Entries of the meta section.
    pub meta: Vec<Meta>,

    /// Patterns declared in the strings section.
    pub patterns: Vec<PatternDef>,

    /// Condition of the rule.
    pub condition: Expr,
}

/// A tag on a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// The tag itself.
    pub name: String,
    /// Span of the tag.
    pub span: Span,
}

/// A key/value entry in the meta section of a rule.
///
/// Keys are not required to be unique: uniqueness is a semantic concern.
#[derive(Clone, Debug, PartialEq)]
pub struct Meta {
    /// Name of the entry.
    pub key: String,
    /// Span of the key.
    pub key_span: Span,
    /// Value of the entry.
    pub value: MetaValue,
}

/// Value of a meta entry.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    /// A quoted string value.
    Bytes(Vec<u8>),
    /// A non-negative integer value.
    Integer(i64),
    /// A boolean value.
    Boolean(bool),
}

/// A pattern declared in the strings section of a rule.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternDef {
    /// Name of the pattern, without the leading `$`.
    ///
    /// Empty for an anonymous pattern.
    pub name: String,
    /// Span of the `$`-prefixed name.
    pub name_span: Span,

    /// Value of the pattern.
    pub value: PatternValue,

    /// Modifiers applied to the pattern, in declaration order.
    ///
    /// Duplicated or incompatible combinations are accepted here and left
    /// to a semantic validation pass.
    pub modifiers: Vec<PatternModifier>,

    /// Span of the whole declaration.
    pub span: Span,
}

/// Value of a pattern declaration.
#[derive(Clone, Debug, PartialEq)]
pub enum PatternValue {
    /// A quoted text pattern, decoded into raw bytes.
    Text(Vec<u8>),
    /// A brace-delimited byte pattern.
    Hex(Vec<HexToken>),
    /// A slash-delimited regular expression.
    Regex(RegexLiteral),
}

/// A single modifier on a pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternModifier {
    /// Which modifier this is.
    pub kind: PatternModifierKind,
    /// Span of the modifier, arguments included.
    pub span: Span,
}

/// The modifier vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternModifierKind {
    /// `nocase`
    Nocase,
    /// `ascii`
    Ascii,
    /// `wide`
    Wide,
    /// `fullword`
    Fullword,
    /// `private`
    Private,
    /// `base64`, with an optional custom alphabet.
    ///
    /// The alphabet length is not checked at this level.
    Base64(Option<Vec<u8>>),
    /// `base64wide`, with an optional custom alphabet.
    Base64Wide(Option<Vec<u8>>),
    /// `xor`, with an optional byte value or range of byte values.
    Xor(Option<XorRange>),
}

/// Argument of a `xor` modifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XorRange {
    /// First value of the range.
    pub from: u8,
    /// End of the range, inclusive, when written as `xor(a-b)`.
    ///
    /// `from > to` is accepted at this level.
    pub to: Option<u8>,
}

/// A token in a byte pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HexToken {
    /// A byte-pair, possibly masked or negated.
    Atom(HexAtom),
    /// A variable-length gap, eg `[5-10]`, `[3-]`, `[-]`.
    Jump(Jump),
    /// A pipe-separated group of byte-pair sequences, eg `( 12 34 | 98 )`.
    ///
    /// Arms contain only atoms: jumps and nested alternations inside an
    /// alternation are rejected by the grammar, which this representation
    /// makes unexpressible.
    Alternatives(Vec<Vec<HexAtom>>),
}

/// A byte-pair in a byte pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HexAtom {
    /// A fully declared byte, eg `9C`.
    Byte(u8),
    /// A negated byte, eg `~9C`.
    NotByte(u8),
    /// A masked byte, eg `?5`, `C?`, `??`.
    Masked(u8, Mask),
    /// A negated masked byte, eg `~?C`.
    NotMasked(u8, Mask),
}

/// Mask applied on a byte-pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mask {
    /// The left nibble is masked, ie `?X`.
    Left,
    /// The right nibble is masked, ie `X?`.
    Right,
    /// Both nibbles are masked, ie `??`.
    All,
}

/// A jump inside a byte pattern.
///
/// The written forms stay distinguishable, so that the tree can be
/// re-serialized to the original text. Bound ordering is not checked at
/// this level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Jump {
    /// `[n]`: a gap of exactly `n` bytes.
    Exact(u32),
    /// `[a-b]`, `[a-]`, `[-b]` or `[-]`: a gap of `a` to `b` bytes,
    /// inclusive, each bound defaulting when absent to 0 and infinity
    /// respectively.
    Range {
        /// Lower bound, if written.
        from: Option<u32>,
        /// Upper bound, if written.
        to: Option<u32>,
    },
}

/// A regular expression literal.
///
/// The body is kept as written, only unescaping `\/`: compiling it is the
/// concern of the consuming engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegexLiteral {
    /// The expression between the `/` delimiters.
    pub source: String,
    /// Case insensitive, the `i` flag.
    pub case_insensitive: bool,
    /// `.` matches newlines, the `s` flag.
    pub dot_all: bool,
    /// Span of the whole literal, flags included.
    pub span: Span,
}

/// A condition expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// Kind of the expression.
    pub kind: ExprKind,
    /// Span of the expression.
    pub span: Span,
}

/// The different kinds of condition expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// A boolean literal.
    Boolean(bool),
    /// An integer literal, size unit applied.
    Integer(i64),
    /// A float literal.
    Float(f64),
    /// A quoted string literal, decoded into raw bytes.
    Bytes(Vec<u8>),
    /// A regular expression literal.
    Regex(RegexLiteral),
    /// The `filesize` keyword.
    Filesize,

    /// An identifier, optionally followed by an access chain.
    Identifier(ModuleAccess),

    /// A pattern match test, eg `$a`.
    Pattern(String),
    /// A pattern match test at a given offset, eg `$a at 100`.
    PatternAt {
        /// Name of the pattern, empty if anonymous.
        name: String,
        /// Span of the `$`-prefixed name.
        name_span: Span,
        /// Offset at which the pattern must match.
        offset: Box<Expr>,
    },
    /// A pattern match test within an offset range, eg `$a in (0..100)`.
    PatternIn {
        /// Name of the pattern, empty if anonymous.
        name: String,
        /// Span of the `$`-prefixed name.
        name_span: Span,
        /// Start of the offset range, inclusive.
        from: Box<Expr>,
        /// End of the offset range, inclusive.
        to: Box<Expr>,
    },

    /// A pattern match count, eg `#a`, optionally over an offset range.
    Count {
        /// Name of the pattern, empty if anonymous.
        name: String,
        /// Range restricting which matches are counted.
        range: Option<(Box<Expr>, Box<Expr>)>,
    },
    /// The offset of a pattern match, eg `@a` or `@a[2]`.
    Offset {
        /// Name of the pattern, empty if anonymous.
        name: String,
        /// Occurrence number, 1-based; first match when absent.
        index: Option<Box<Expr>>,
    },
    /// The length of a pattern match, eg `!a` or `!a[2]`.
    Length {
        /// Name of the pattern, empty if anonymous.
        name: String,
        /// Occurrence number, 1-based; first match when absent.
        index: Option<Box<Expr>>,
    },

    /// A fixed-width integer read from the scanned data, eg `uint32be(0)`.
    ReadInteger {
        /// Which read function was named.
        kind: ReadIntKind,
        /// Address to read at.
        addr: Box<Expr>,
    },

    /// A unary operator application.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// A binary operator application.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left-hand side operand.
        lhs: Box<Expr>,
        /// Right-hand side operand.
        rhs: Box<Expr>,
    },
    /// A `matches` test of a string against a regular expression.
    Matches {
        /// The tested expression.
        expr: Box<Expr>,
        /// The regular expression it is matched against.
        regex: RegexLiteral,
    },

    /// A conjunction of two or more expressions.
    And(Vec<Expr>),
    /// A disjunction of two or more expressions.
    Or(Vec<Expr>),
    /// A boolean negation.
    Not(Box<Expr>),
    /// A `defined` test.
    Defined(Box<Expr>),

    /// A quantifier over a set of patterns, eg `2 of ($a, $b)`,
    /// `all of them`, `any of ($x*) in (0..100)`.
    OfPatterns {
        /// How many patterns of the set must match.
        quantifier: Quantifier,
        /// The set of patterns.
        set: PatternSet,
        /// Optional `at`/`in` restriction on where the patterns match.
        anchor: Option<OfAnchor>,
    },
    /// A quantifier over a set of rules, eg `any of (rule_a, chapter_*)`.
    OfRules {
        /// How many rules of the set must match.
        quantifier: Quantifier,
        /// The set of rules.
        set: RuleSet,
    },

    /// A `for` iteration over a set of patterns, eg
    /// `for all of them : ( # > 2 )`.
    ForOf {
        /// How many patterns of the set must satisfy the body.
        quantifier: Quantifier,
        /// The set of patterns.
        set: PatternSet,
        /// Condition evaluated for each pattern.
        body: Box<Expr>,
    },
    /// A `for` iteration binding variables over an iterable, eg
    /// `for any k, v in module.map : ( v == 1 )`.
    ForIn {
        /// How many iterations must satisfy the body.
        quantifier: Quantifier,
        /// Names bound on each iteration, at least one.
        bindings: Vec<String>,
        /// Span of the binding list.
        bindings_span: Span,
        /// What is iterated over.
        iterable: Iterable,
        /// Span of the iterable.
        iterable_span: Span,
        /// Condition evaluated on each iteration.
        body: Box<Expr>,
    },
}

/// An identifier with its trailing access chain.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleAccess {
    /// The base identifier.
    pub name: String,
    /// Span of the base identifier.
    pub name_span: Span,
    /// Chain of accesses applied to the base, eg `.b`, `[3]`, `(x, y)`.
    pub ops: Vec<AccessOp>,
}

/// A single operation in an access chain.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessOp {
    /// Kind of the operation.
    pub kind: AccessOpKind,
    /// Span of the operation.
    pub span: Span,
}

/// The kinds of operations in an access chain.
#[derive(Clone, Debug, PartialEq)]
pub enum AccessOpKind {
    /// A subfield access, ie `.name`.
    Field(String),
    /// A subscript, ie `[expr]`.
    Index(Box<Expr>),
    /// A function call, ie `(arguments)`.
    Call(Vec<Expr>),
}

/// Size and signedness of a [`ExprKind::ReadInteger`] expression.
///
/// The `be` suffix on the 8-bit forms is accepted and normalized away, as
/// endianness does not apply to a single byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadIntKind {
    /// `int8`
    Int8,
    /// `uint8`
    Uint8,
    /// `int16`
    Int16,
    /// `uint16`
    Uint16,
    /// `int32`
    Int32,
    /// `uint32`
    Uint32,
    /// `int16be`
    Int16Be,
    /// `uint16be`
    Uint16Be,
    /// `int32be`
    Int32Be,
    /// `uint32be`
    Uint32Be,
}

/// A unary operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation, `-`.
    Neg,
    /// Bitwise negation, `~`.
    BitNot,
}

/// A binary operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// `*`
    Mul,
    /// `\`
    Div,
    /// `%`
    Mod,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `|`
    BitOr,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `contains` or `icontains`
    Contains {
        /// True for the `icontains` form.
        case_insensitive: bool,
    },
    /// `startswith` or `istartswith`
    StartsWith {
        /// True for the `istartswith` form.
        case_insensitive: bool,
    },
    /// `endswith` or `iendswith`
    EndsWith {
        /// True for the `iendswith` form.
        case_insensitive: bool,
    },
    /// `iequals`
    IEquals,
}

/// How many elements of a set or iteration must match.
#[derive(Clone, Debug, PartialEq)]
pub enum Quantifier {
    /// All of them.
    All,
    /// At least one.
    Any,
    /// None of them.
    None,
    /// A computed count, eg `2 of ...`, or percentage, eg `50% of ...`.
    Expr {
        /// The count or percentage.
        expr: Box<Expr>,
        /// True if a `%` sign followed the expression.
        percent: bool,
    },
}

/// An `at` or `in` restriction on a pattern-set quantifier.
#[derive(Clone, Debug, PartialEq)]
pub enum OfAnchor {
    /// All selected patterns must match at this offset.
    At(Box<Expr>),
    /// All selected patterns must match within this offset range.
    In {
        /// Start of the range, inclusive.
        from: Box<Expr>,
        /// End of the range, inclusive.
        to: Box<Expr>,
    },
}

/// A set of patterns in a quantified expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternSet {
    /// Elements of the set.
    ///
    /// Empty when the set was written as `them`, which designates every
    /// pattern of the rule.
    pub elements: Vec<SetEntry>,
}

/// A set of rule names in a quantified expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleSet {
    /// Elements of the set.
    pub elements: Vec<SetEntry>,
}

/// A single element of a pattern or rule set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetEntry {
    /// Name of the element, without any `$` prefix.
    pub name: String,
    /// True if the name had a trailing `*` wildcard.
    pub wildcard: bool,
    /// Span of the element.
    pub span: Span,
}

/// What a `for … in` expression iterates over.
#[derive(Clone, Debug, PartialEq)]
pub enum Iterable {
    /// A numeric range, eg `(1..10)`.
    Range {
        /// Start of the range, inclusive.
        from: Box<Expr>,
        /// End of the range, inclusive.
        to: Box<Expr>,
    },
    /// An explicit list of expressions, eg `(1, 2, 5)`.
    List(Vec<Expr>),
    /// An identifier or module access chain, eg `pe.sections`.
    Identifier(ModuleAccess),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_public_type;

    #[test]
    fn test_public_types() {
        test_public_type(SourceFile {
            components: Vec::new(),
        });
        test_public_type(Component::Import(Import {
            module: "pe".to_owned(),
            span: 0..11,
        }));
        test_public_type(MetaValue::Boolean(true));
        test_public_type(PatternModifierKind::Xor(Some(XorRange {
            from: 0,
            to: Some(255),
        })));
        test_public_type(HexToken::Atom(HexAtom::Masked(0x0f, Mask::Left)));
        test_public_type(Jump::Range {
            from: None,
            to: Some(4),
        });
        test_public_type(ExprKind::Filesize);
        test_public_type(ReadIntKind::Uint32Be);
        test_public_type(BinaryOp::Contains {
            case_insensitive: false,
        });
        test_public_type(Quantifier::All);
        test_public_type(Iterable::List(Vec::new()));
    }
}
