//! The grammar symbol type. A symbol is either a terminal literal, a
//! nonterminal reference, a byte range, or an operator applied to an
//! ordered sequence of child symbols.

mod dsl;
mod intersect;

pub use self::dsl::{
    alter, comment, concat, define, define_terminated, except, group, nterm, optional, repeat,
    repeat_at_least, repeat_exact, repeat_range, rules_def, special_seq, term, term_range,
};
pub use self::intersect::{intersect_pieces, symbols_intersect, Piece, Provenance};

/// Byte string used for terminal literals and nonterminal names.
pub type ByteString = Vec<u8>;

/// Operator kinds of the combinator algebra.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpKind {
    /// Ordered sequence.
    Concat,
    /// Ordered choice.
    Alter,
    /// Rule definition; arity 2 or 3 with a trailing `End`.
    Define,
    /// Zero or one occurrence.
    Optional,
    /// Zero or more occurrences.
    Repeat,
    /// Transparent grouping.
    Group,
    /// Comment; matches nothing.
    Comment,
    /// Special sequence; matches nothing.
    SpecialSeq,
    /// First child must match, second must not.
    Except,
    /// Definition terminator.
    End,
    /// Grammar root; holds the rule definitions.
    RulesDef,
    /// Exactly `n` occurrences.
    RepeatExact(usize),
    /// At least `n` occurrences.
    RepeatAtLeast(usize),
    /// Between `m` and `n` occurrences.
    RepeatRange(usize, usize),
}

impl OpKind {
    /// Whether the operator may match the empty token sequence
    /// regardless of its body.
    pub fn nullable(self) -> bool {
        match self {
            OpKind::Optional | OpKind::Repeat | OpKind::Comment | OpKind::SpecialSeq => true,
            OpKind::RepeatExact(n) | OpKind::RepeatAtLeast(n) => n == 0,
            OpKind::RepeatRange(m, _) => m == 0,
            _ => false,
        }
    }

    /// Whether the operator repeats its body.
    pub fn repeats(self) -> bool {
        match self {
            OpKind::Repeat | OpKind::RepeatAtLeast(_) => true,
            OpKind::RepeatExact(n) => n > 1,
            OpKind::RepeatRange(_, n) => n > 1,
            _ => false,
        }
    }
}

/// A grammar symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Matches its literal byte sequence.
    Terminal(ByteString),
    /// Matches whatever its defining rule matches.
    Nonterminal(ByteString),
    /// Matches any single byte in the inclusive range.
    TerminalRange(u8, u8),
    /// An operator over child symbols.
    Op(OpKind, Vec<Symbol>),
}

impl Symbol {
    /// Checks whether this symbol is a terminal literal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Checks whether this symbol is a nonterminal reference.
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_))
    }

    /// Checks whether this symbol is a byte range.
    pub fn is_range(&self) -> bool {
        matches!(self, Symbol::TerminalRange(..))
    }

    /// Checks whether this symbol is a terminal literal or a byte range.
    pub fn is_terminal_kind(&self) -> bool {
        self.is_terminal() || self.is_range()
    }

    /// Checks whether this symbol is an operator.
    pub fn is_operator(&self) -> bool {
        matches!(self, Symbol::Op(..))
    }

    /// Returns the operator kind, if this symbol is an operator.
    pub fn kind(&self) -> Option<OpKind> {
        match self {
            Symbol::Op(kind, _) => Some(*kind),
            _ => None,
        }
    }

    /// Returns the name of a terminal or nonterminal.
    pub fn name(&self) -> Option<&[u8]> {
        match self {
            Symbol::Terminal(name) | Symbol::Nonterminal(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the child symbols of an operator, or an empty slice.
    pub fn children(&self) -> &[Symbol] {
        match self {
            Symbol::Op(_, children) => children,
            _ => &[],
        }
    }

    /// Walks the symbol tree in pre-order, passing each symbol and its
    /// depth to the visitor.
    pub fn traverse<F>(&self, visitor: &mut F)
    where
        F: FnMut(&Symbol, usize),
    {
        self.do_traverse(visitor, 0);
    }

    fn do_traverse<F>(&self, visitor: &mut F, depth: usize)
    where
        F: FnMut(&Symbol, usize),
    {
        visitor(self, depth);
        for child in self.children() {
            child.do_traverse(visitor, depth + 1);
        }
    }

    /// Rewrites a chain of single-child `Concat` or `Alter` wrappers
    /// into the two-child form consumed by pretty-printers:
    /// `A(A(A(x)))` becomes `A(x, A(x, A(x)))`. Stops as soon as the
    /// arity differs from one or the operator kind changes. Any other
    /// symbol is returned unchanged.
    pub fn flatten(&self) -> Symbol {
        if let Symbol::Op(kind, children) = self {
            if matches!(kind, OpKind::Concat | OpKind::Alter) && children.len() == 1 {
                let child = &children[0];
                if child.kind() == Some(*kind) && child.children().len() == 1 {
                    return Symbol::Op(*kind, vec![self.innermost().clone(), child.flatten()]);
                }
            }
        }
        self.clone()
    }

    /// The payload at the bottom of a single-child same-kind chain.
    fn innermost(&self) -> &Symbol {
        let mut cur = self;
        while let Symbol::Op(kind, children) = cur {
            if children.len() != 1 || children[0].kind() != Some(*kind) {
                if children.len() == 1 {
                    return &children[0];
                }
                break;
            }
            cur = &children[0];
        }
        cur
    }
}
