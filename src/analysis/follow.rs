//! Follow sets over combinator bodies. For every rule the set holds
//! the symbols that may appear immediately after an occurrence of the
//! rule's nonterminal in any sentential form; the shift-reduce
//! parser's lookahead consults it before committing a reduction.

use crate::grammar::{Grammar, RuleId};
use crate::lexer::Token;
use crate::symbol::{OpKind, Symbol};

use super::first::{FirstSets, FollowItem};

/// Follow sets for every rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FollowSets {
    sets: Vec<Vec<FollowItem>>,
}

impl FollowSets {
    /// Computes all follow sets of the grammar by fixpoint iteration,
    /// seeding each body walk with the current follow set of the rule
    /// being walked.
    pub fn new(grammar: &Grammar, first: &FirstSets) -> Self {
        let mut this = FollowSets {
            sets: vec![vec![]; grammar.num_rules()],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                let after = this.sets[rule.id.usize()].clone();
                this.walk(grammar, first, rule.body, &after, &mut changed);
            }
        }
        this
    }

    /// The follow set of a rule.
    pub fn follow(&self, rule: RuleId) -> &[FollowItem] {
        &self.sets[rule.usize()]
    }

    /// Checks whether the given lookahead token is admitted after a
    /// reduction of `rule`. An empty follow set admits nothing; the
    /// caller treats end of input as universally admissible.
    pub fn admits(&self, first: &FirstSets, rule: RuleId, next: &Token) -> bool {
        self.sets[rule.usize()].iter().any(|item| match item {
            FollowItem::Term(lit) => next.value == *lit,
            FollowItem::Range(lo, hi) => {
                !next.value.is_empty() && next.value.iter().all(|b| lo <= b && b <= hi)
            }
            FollowItem::Rule(r) => next.types.iter().any(|c| first.begins(*r, c)),
        })
    }

    fn add(&mut self, target: RuleId, items: &[FollowItem], changed: &mut bool) {
        for item in items {
            if !self.sets[target.usize()].contains(item) {
                self.sets[target.usize()].push(item.clone());
                *changed = true;
            }
        }
    }

    /// Walks one body right-to-left in spirit: `after` holds what may
    /// follow the whole of `sym` in the current sentential form.
    fn walk(
        &mut self,
        grammar: &Grammar,
        first: &FirstSets,
        sym: &Symbol,
        after: &[FollowItem],
        changed: &mut bool,
    ) {
        match sym {
            Symbol::Terminal(_) | Symbol::TerminalRange(..) => {}
            Symbol::Nonterminal(name) => {
                if let Some(id) = grammar.rule_id(name) {
                    self.add(id, after, changed);
                }
            }
            Symbol::Op(kind, children) => match kind {
                OpKind::Concat => {
                    for (i, child) in children.iter().enumerate() {
                        let mut next = vec![];
                        let mut exhausted = true;
                        for following in &children[i + 1..] {
                            extend_unique(&mut next, &first.firsts(grammar, following));
                            if !first.nullable(grammar, following) {
                                exhausted = false;
                                break;
                            }
                        }
                        if exhausted {
                            extend_unique(&mut next, after);
                        }
                        self.walk(grammar, first, child, &next, changed);
                    }
                }
                OpKind::Alter => {
                    for child in children {
                        self.walk(grammar, first, child, after, changed);
                    }
                }
                OpKind::Optional | OpKind::Group => {
                    self.walk(grammar, first, &children[0], after, changed);
                }
                OpKind::Repeat
                | OpKind::RepeatExact(_)
                | OpKind::RepeatAtLeast(_)
                | OpKind::RepeatRange(..) => {
                    let mut next = vec![];
                    if kind.repeats() {
                        // The body may follow itself around the loop.
                        extend_unique(&mut next, &first.firsts(grammar, &children[0]));
                    }
                    extend_unique(&mut next, after);
                    self.walk(grammar, first, &children[0], &next, changed);
                }
                OpKind::Except => {
                    self.walk(grammar, first, &children[0], after, changed);
                }
                OpKind::Comment | OpKind::SpecialSeq => {}
                OpKind::Define | OpKind::RulesDef | OpKind::End => {}
            },
        }
    }
}

fn extend_unique(out: &mut Vec<FollowItem>, items: &[FollowItem]) {
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
}
