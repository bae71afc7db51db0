//! Combinator constructors. A grammar is assembled by nesting these
//! into a single [`rules_def`] value.

use super::{OpKind, Symbol};

/// Creates a terminal literal.
pub fn term(name: impl AsRef<[u8]>) -> Symbol {
    Symbol::Terminal(name.as_ref().to_vec())
}

/// Creates a nonterminal reference.
pub fn nterm(name: impl AsRef<[u8]>) -> Symbol {
    Symbol::Nonterminal(name.as_ref().to_vec())
}

/// Creates a byte range terminal matching any byte in `lo..=hi`.
pub fn term_range(lo: u8, hi: u8) -> Symbol {
    Symbol::TerminalRange(lo, hi)
}

fn op(kind: OpKind, children: impl IntoIterator<Item = Symbol>) -> Symbol {
    Symbol::Op(kind, children.into_iter().collect())
}

/// Ordered sequence of symbols.
pub fn concat(children: impl IntoIterator<Item = Symbol>) -> Symbol {
    op(OpKind::Concat, children)
}

/// Ordered choice between alternatives.
pub fn alter(children: impl IntoIterator<Item = Symbol>) -> Symbol {
    op(OpKind::Alter, children)
}

/// Zero or one occurrence of `body`.
pub fn optional(body: Symbol) -> Symbol {
    op(OpKind::Optional, [body])
}

/// Zero or more occurrences of `body`.
pub fn repeat(body: Symbol) -> Symbol {
    op(OpKind::Repeat, [body])
}

/// Transparent grouping.
pub fn group(body: Symbol) -> Symbol {
    op(OpKind::Group, [body])
}

/// Matches `body` unless `exception` also matches.
pub fn except(body: Symbol, exception: Symbol) -> Symbol {
    op(OpKind::Except, [body, exception])
}

/// A comment; matches nothing.
pub fn comment(body: Symbol) -> Symbol {
    op(OpKind::Comment, [body])
}

/// A special sequence; matches nothing.
pub fn special_seq(body: Symbol) -> Symbol {
    op(OpKind::SpecialSeq, [body])
}

/// Exactly `times` occurrences of `body`.
pub fn repeat_exact(times: usize, body: Symbol) -> Symbol {
    op(OpKind::RepeatExact(times), [body])
}

/// At least `times` occurrences of `body`.
pub fn repeat_at_least(times: usize, body: Symbol) -> Symbol {
    op(OpKind::RepeatAtLeast(times), [body])
}

/// Between `from` and `to` occurrences of `body`.
pub fn repeat_range(from: usize, to: usize, body: Symbol) -> Symbol {
    op(OpKind::RepeatRange(from, to), [body])
}

/// Defines a nonterminal: `lhs` must be a [`nterm`].
pub fn define(lhs: Symbol, body: Symbol) -> Symbol {
    op(OpKind::Define, [lhs, body])
}

/// Defines a nonterminal with an explicit [`OpKind::End`] terminator.
pub fn define_terminated(lhs: Symbol, body: Symbol) -> Symbol {
    op(OpKind::Define, [lhs, body, Symbol::Op(OpKind::End, vec![])])
}

/// The grammar root holding all rule definitions.
pub fn rules_def(defines: impl IntoIterator<Item = Symbol>) -> Symbol {
    op(OpKind::RulesDef, defines)
}
