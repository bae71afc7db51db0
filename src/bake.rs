//! The pretty-printer ("bakery") interface. The core does not render
//! grammars itself; it dispatches one callback per operator kind to an
//! external printer, consulting the printer's operator precedences to
//! decide where grouping must be inserted.

use crate::symbol::{OpKind, Symbol};

/// Printer protocol: one method per operator kind, plus the
/// precedence map consulted during recursive baking.
pub trait Bakery {
    /// Renders a terminal literal.
    fn bake_terminal(&self, name: &[u8]) -> String;
    /// Renders a nonterminal reference.
    fn bake_nonterminal(&self, name: &[u8]) -> String;
    /// Renders a byte range.
    fn bake_terminal_range(&self, lo: u8, hi: u8) -> String;
    /// Renders a sequence from already-baked parts.
    fn bake_concat(&self, parts: &[String]) -> String;
    /// Renders an alternation from already-baked parts.
    fn bake_alter(&self, parts: &[String]) -> String;
    /// Renders a definition.
    fn bake_define(&self, lhs: String, rhs: String) -> String;
    /// Renders an optional body.
    fn bake_optional(&self, inner: String) -> String;
    /// Renders a repeated body.
    fn bake_repeat(&self, inner: String) -> String;
    /// Renders an explicit group.
    fn bake_group(&self, inner: String) -> String;
    /// Renders a comment.
    fn bake_comment(&self, inner: String) -> String;
    /// Renders a special sequence.
    fn bake_special_seq(&self, inner: String) -> String;
    /// Renders an exception.
    fn bake_except(&self, lhs: String, rhs: String) -> String;
    /// Renders the definition terminator.
    fn bake_end(&self) -> String;
    /// Renders the whole ruleset from baked definitions.
    fn bake_rules_def(&self, defines: &[String]) -> String;
    /// Renders an exact repetition.
    fn bake_repeat_exact(&self, times: usize, inner: String) -> String;
    /// Renders a lower-bounded repetition.
    fn bake_repeat_ge(&self, times: usize, inner: String) -> String;
    /// Renders a bounded repetition.
    fn bake_repeat_range(&self, from: usize, to: usize, inner: String) -> String;

    /// Binding strength of an operator in the printed notation, or
    /// `None` when the operator never needs grouping.
    fn precedence(&self, kind: OpKind) -> Option<u8>;

    /// Precedence of the outermost scope.
    fn outer_precedence(&self) -> Option<u8> {
        None
    }
}

impl Symbol {
    /// Renders the symbol through the given printer. A child operator
    /// that binds looser than its context is baked inside an explicit
    /// group.
    pub fn bake<B: Bakery>(&self, bakery: &B) -> String {
        self.bake_prec(bakery, bakery.outer_precedence())
    }

    fn bake_prec<B: Bakery>(&self, bakery: &B, outer: Option<u8>) -> String {
        match self {
            Symbol::Terminal(name) => bakery.bake_terminal(name),
            Symbol::Nonterminal(name) => bakery.bake_nonterminal(name),
            Symbol::TerminalRange(lo, hi) => bakery.bake_terminal_range(*lo, *hi),
            Symbol::Op(kind, children) => {
                let mine = bakery.precedence(*kind);
                if let (Some(mine), Some(outer)) = (mine, outer) {
                    if mine < outer {
                        return bakery.bake_group(self.bake_prec(bakery, None));
                    }
                }
                let scope = match (mine, outer) {
                    (Some(mine), Some(outer)) => Some(mine.max(outer)),
                    (mine, outer) => mine.or(outer),
                };
                self.bake_op(bakery, *kind, children, scope)
            }
        }
    }

    fn bake_op<B: Bakery>(
        &self,
        bakery: &B,
        kind: OpKind,
        children: &[Symbol],
        scope: Option<u8>,
    ) -> String {
        let bake_all = |symbols: &[Symbol]| -> Vec<String> {
            symbols
                .iter()
                .map(|child| child.bake_prec(bakery, scope))
                .collect()
        };
        match kind {
            OpKind::Concat => bakery.bake_concat(&bake_all(children)),
            OpKind::Alter => bakery.bake_alter(&bake_all(children)),
            OpKind::Except => bakery.bake_except(
                children[0].bake_prec(bakery, scope),
                children[1].bake_prec(bakery, scope),
            ),
            // Bracketed forms open a fresh scope.
            OpKind::Define => {
                let lhs = children[0].bake_prec(bakery, None);
                let rhs = children[1].bake_prec(bakery, None);
                let mut out = bakery.bake_define(lhs, rhs);
                out.push_str(&bakery.bake_end());
                out
            }
            OpKind::Optional => bakery.bake_optional(children[0].bake_prec(bakery, None)),
            OpKind::Repeat => bakery.bake_repeat(children[0].bake_prec(bakery, None)),
            OpKind::Group => bakery.bake_group(children[0].bake_prec(bakery, None)),
            OpKind::Comment => bakery.bake_comment(children[0].bake_prec(bakery, None)),
            OpKind::SpecialSeq => bakery.bake_special_seq(children[0].bake_prec(bakery, None)),
            OpKind::End => bakery.bake_end(),
            OpKind::RulesDef => {
                let parts: Vec<String> = children
                    .iter()
                    .map(|child| child.bake_prec(bakery, None))
                    .collect();
                bakery.bake_rules_def(&parts)
            }
            // Prefix repetition binds tightest; composite children
            // get grouped.
            OpKind::RepeatExact(times) => {
                bakery.bake_repeat_exact(times, children[0].bake_prec(bakery, Some(u8::MAX)))
            }
            OpKind::RepeatAtLeast(times) => {
                bakery.bake_repeat_ge(times, children[0].bake_prec(bakery, Some(u8::MAX)))
            }
            OpKind::RepeatRange(from, to) => {
                bakery.bake_repeat_range(from, to, children[0].bake_prec(bakery, Some(u8::MAX)))
            }
        }
    }
}
