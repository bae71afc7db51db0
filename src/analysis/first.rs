//! FIRST analysis over combinator bodies: which rules may derive the
//! empty sequence, which symbols may begin a body, and which rules
//! may transitively begin a derivation of another rule.

use bit_matrix::BitMatrix;
use bit_vec::BitVec;

use crate::grammar::{Grammar, RuleId};
use crate::symbol::{ByteString, OpKind, Symbol};

/// A symbol that may begin or follow a derivation. Nonterminals stand
/// for themselves; they are resolved through [`FirstSets::begins`]
/// when matched against concrete tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FollowItem {
    /// A terminal literal.
    Term(ByteString),
    /// A byte range.
    Range(u8, u8),
    /// A nonterminal, by rule id.
    Rule(RuleId),
}

/// Nullability and leftmost-symbol tables for the whole grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirstSets {
    nullable: BitVec,
    reach: Vec<BitVec>,
}

impl FirstSets {
    /// Computes rule nullability by fixpoint, then the transitive
    /// leftmost-reachability closure between rules.
    pub fn new(grammar: &Grammar) -> Self {
        let n = grammar.num_rules();
        let mut nullable = BitVec::from_elem(n, false);
        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                if !nullable[rule.id.usize()] && body_nullable(grammar, rule.body, &nullable) {
                    nullable.set(rule.id.usize(), true);
                    changed = true;
                }
            }
        }

        let mut matrix = BitMatrix::new(n, n);
        for rule in grammar.rules() {
            for item in first_items(grammar, rule.body, &nullable) {
                if let FollowItem::Rule(id) = item {
                    matrix.set(rule.id.usize(), id.usize(), true);
                }
            }
        }
        matrix.transitive_closure();

        let reach = (0..n)
            .map(|row| {
                let mut bits = BitVec::from_elem(n, false);
                for (col, present) in matrix.iter_row(row).enumerate() {
                    if present {
                        bits.set(col, true);
                    }
                }
                bits
            })
            .collect();

        FirstSets { nullable, reach }
    }

    /// Whether the rule may derive the empty token sequence.
    pub fn rule_nullable(&self, rule: RuleId) -> bool {
        self.nullable[rule.usize()]
    }

    /// Whether a body expression may derive the empty token sequence.
    pub fn nullable(&self, grammar: &Grammar, sym: &Symbol) -> bool {
        body_nullable(grammar, sym, &self.nullable)
    }

    /// The syntactic first items of a body expression.
    pub fn firsts(&self, grammar: &Grammar, sym: &Symbol) -> Vec<FollowItem> {
        first_items(grammar, sym, &self.nullable)
    }

    /// Whether `leading` may begin a derivation of `of`, directly or
    /// through any chain of rules.
    pub fn begins(&self, of: RuleId, leading: RuleId) -> bool {
        of == leading || self.reach[of.usize()][leading.usize()]
    }
}

fn body_nullable(grammar: &Grammar, sym: &Symbol, nullable: &BitVec) -> bool {
    match sym {
        Symbol::Terminal(_) | Symbol::TerminalRange(..) => false,
        Symbol::Nonterminal(name) => grammar
            .rule_id(name)
            .map(|id| nullable[id.usize()])
            .unwrap_or(false),
        Symbol::Op(kind, children) => {
            if kind.nullable() {
                return true;
            }
            match kind {
                OpKind::Concat => children
                    .iter()
                    .all(|child| body_nullable(grammar, child, nullable)),
                OpKind::Alter => children
                    .iter()
                    .any(|child| body_nullable(grammar, child, nullable)),
                OpKind::Group
                | OpKind::Except
                | OpKind::RepeatExact(_)
                | OpKind::RepeatAtLeast(_)
                | OpKind::RepeatRange(..) => body_nullable(grammar, &children[0], nullable),
                _ => false,
            }
        }
    }
}

fn first_items(grammar: &Grammar, sym: &Symbol, nullable: &BitVec) -> Vec<FollowItem> {
    let mut out = vec![];
    collect_first_items(grammar, sym, nullable, &mut out);
    out
}

fn collect_first_items(
    grammar: &Grammar,
    sym: &Symbol,
    nullable: &BitVec,
    out: &mut Vec<FollowItem>,
) {
    let push = |out: &mut Vec<FollowItem>, item: FollowItem| {
        if !out.contains(&item) {
            out.push(item);
        }
    };
    match sym {
        Symbol::Terminal(lit) => push(out, FollowItem::Term(lit.clone())),
        Symbol::TerminalRange(lo, hi) => push(out, FollowItem::Range(*lo, *hi)),
        Symbol::Nonterminal(name) => {
            if let Some(id) = grammar.rule_id(name) {
                push(out, FollowItem::Rule(id));
            }
        }
        Symbol::Op(kind, children) => match kind {
            OpKind::Concat => {
                for child in children {
                    collect_first_items(grammar, child, nullable, out);
                    if !body_nullable(grammar, child, nullable) {
                        break;
                    }
                }
            }
            OpKind::Alter => {
                for child in children {
                    collect_first_items(grammar, child, nullable, out);
                }
            }
            OpKind::Optional
            | OpKind::Group
            | OpKind::Repeat
            | OpKind::RepeatExact(_)
            | OpKind::RepeatAtLeast(_)
            | OpKind::RepeatRange(..)
            | OpKind::Except => collect_first_items(grammar, &children[0], nullable, out),
            OpKind::Comment | OpKind::SpecialSeq => {}
            OpKind::Define | OpKind::RulesDef | OpKind::End => {}
        },
    }
}
