//! Tokenizers. The legacy tokenizer scans with a growing window over
//! a flat literal map; the advanced tokenizer resolves overlapping
//! literals and byte ranges into disjoint symbols with candidate-type
//! sets and scans longest-match.

mod advanced;
mod cache;
mod legacy;

pub use self::advanced::Lexer;
pub use self::cache::TermCache;
pub use self::legacy::LexerLegacy;

use crate::error::{GrammarError, TokenizeError};
use crate::grammar::{CandidateSet, Grammar, RuleId};
use crate::symbol::ByteString;

/// A token: the matched bytes and the set of nonterminals that could
/// have produced them. Legacy tokens carry singletons; the parser
/// resolves richer sets using rule context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The matched input bytes.
    pub value: ByteString,
    /// Candidate owning rules.
    pub types: CandidateSet,
}

impl Token {
    /// Creates a token.
    pub fn new(value: ByteString, types: CandidateSet) -> Self {
        Token { value, types }
    }

    /// The owning rule, when the candidate set is a singleton.
    pub fn ty(&self) -> Option<RuleId> {
        if self.types.len() == 1 {
            self.types.iter().next()
        } else {
            None
        }
    }
}

/// Tokenizer configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LexerConfig {
    /// Use the advanced tokenizer.
    pub advanced: bool,
    /// Fragment overlapping terminals into disjoint symbols at build
    /// time. Required for overlapping byte ranges.
    pub handle_duplicates: bool,
    /// Union candidate sets of identical terminals without
    /// fragmenting overlapping ranges.
    pub handle_duplicates_at_runtime: bool,
}

impl LexerConfig {
    /// Legacy configuration.
    pub fn legacy() -> Self {
        LexerConfig::default()
    }

    /// Advanced tokenizer without duplicate handling.
    pub fn advanced() -> Self {
        LexerConfig {
            advanced: true,
            ..LexerConfig::default()
        }
    }

    /// Enables build-time fragmentation of overlapping terminals.
    pub fn handle_duplicates(mut self) -> Self {
        self.handle_duplicates = true;
        self
    }

    /// Defers duplicate handling to candidate-set union at runtime.
    pub fn handle_duplicates_at_runtime(mut self) -> Self {
        self.handle_duplicates_at_runtime = true;
        self
    }
}

/// Either tokenizer behind one `run` surface.
pub enum AnyLexer {
    /// The legacy growing-window tokenizer.
    Legacy(LexerLegacy),
    /// The advanced disjoint-terminal tokenizer.
    Advanced(Lexer),
}

impl AnyLexer {
    /// Tokenizes the input with whichever mode was built.
    pub fn run(&self, text: &[u8]) -> Result<Vec<Token>, TokenizeError> {
        match self {
            AnyLexer::Legacy(lexer) => lexer.run(text),
            AnyLexer::Advanced(lexer) => lexer.run(text),
        }
    }
}

/// Builds the tokenizer selected by the configuration.
pub fn make_lexer(grammar: &Grammar, config: LexerConfig) -> Result<AnyLexer, GrammarError> {
    if config.advanced {
        Lexer::new(grammar, config).map(AnyLexer::Advanced)
    } else {
        LexerLegacy::new(grammar).map(AnyLexer::Legacy)
    }
}
