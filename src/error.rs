//! Error types. Construction-time errors ([`GrammarError`]) prevent
//! the tokenizer or parser from existing; runtime errors carry the
//! smallest localized evidence of the failure.

use thiserror::Error;

use crate::diag::GuruMeditation;

/// Structural grammar error, raised while building the grammar index
/// or one of the tokenizers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The root symbol is not a `RulesDef`.
    #[error("grammar root must be a rules definition")]
    NotRulesDef,
    /// A nonterminal is referenced but never defined.
    #[error("nonterminal `{0}` is referenced but never defined")]
    UndefinedNonterminal(String),
    /// A nonterminal is defined more than once.
    #[error("nonterminal `{0}` is defined more than once")]
    DuplicateDefinition(String),
    /// An operator has the wrong number of children.
    #[error("{op} takes {expected} children, found {found}")]
    ArityMismatch {
        /// Operator name.
        op: &'static str,
        /// Expected arity, described.
        expected: &'static str,
        /// Arity found.
        found: usize,
    },
    /// A definition or root operator appears below the top level, or a
    /// definition is malformed.
    #[error("invalid operator nesting: {0}")]
    InvalidNesting(&'static str),
    /// A repeat range with `from > to`.
    #[error("repeat range {from}..{to} is reversed")]
    InvalidRepeatRange {
        /// Minimum repetitions.
        from: usize,
        /// Maximum repetitions.
        to: usize,
    },
    /// A byte range with `lo > hi`.
    #[error("byte range {lo:#04x}..{hi:#04x} is reversed")]
    InvalidByteRange {
        /// Low bound.
        lo: u8,
        /// High bound.
        hi: u8,
    },
    /// The same terminal is owned by more than one rule and duplicate
    /// handling is not enabled.
    #[error("terminal `{0}` is owned by more than one rule")]
    DuplicateTerminal(String),
    /// The legacy tokenizer met a byte-range terminal.
    #[error("byte ranges require the advanced tokenizer")]
    RangeInLegacyLexer,
}

/// Tokenizer failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// No terminal matched at the given byte offset.
    #[error("no terminal matches input at byte {offset}")]
    NoMatch {
        /// Byte offset of the first unrecognized input.
        offset: usize,
    },
}

/// Parser failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The start nonterminal is not defined in the grammar.
    #[error("unknown start nonterminal `{0}`")]
    UnknownStart(String),
    /// No production yields a successful parse.
    #[error("no production matches at token {at}")]
    NoParse {
        /// Index of the furthest token reached.
        at: usize,
    },
    /// The shift-reduce parser can neither shift nor reduce.
    #[error("parser is stuck at token {at}")]
    Stuck {
        /// Index of the next unconsumed token.
        at: usize,
    },
    /// Candidate reductions survived every resolution step.
    #[error("ambiguous reduction at token {at}: {candidates:?}")]
    Ambiguous {
        /// Index of the next unconsumed token.
        at: usize,
        /// Names of the surviving candidate rules.
        candidates: Vec<String>,
    },
    /// An internal invariant was violated; the parse was aborted.
    #[error(transparent)]
    Internal(#[from] GuruMeditation),
}
