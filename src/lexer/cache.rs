//! The terminal cache: every terminal occurrence in the grammar,
//! grouped by owning rule and flattened with candidate-type sets.
//! The advanced tokenizer builds its scan set from this.

use crate::grammar::{CandidateSet, Grammar, RuleId};
use crate::symbol::Symbol;

/// Terminal occurrences of a grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermCache {
    per_rule: Vec<Vec<Symbol>>,
    all: Vec<(Symbol, CandidateSet)>,
}

impl TermCache {
    /// Walks every rule body and records its terminal occurrences.
    /// The flattened list keeps one entry per distinct source
    /// position, each owned by the rule it appears in.
    pub fn new(grammar: &Grammar) -> Self {
        let mut per_rule = vec![vec![]; grammar.num_rules()];
        let mut all = vec![];
        for rule in grammar.rules() {
            rule.body.traverse(&mut |sym, _| {
                if sym.is_terminal_kind() {
                    per_rule[rule.id.usize()].push(sym.clone());
                    all.push((sym.clone(), CandidateSet::singleton(rule.id)));
                }
            });
        }
        TermCache { per_rule, all }
    }

    /// Terminal occurrences of one rule, in body order.
    pub fn rule_terminals(&self, rule: RuleId) -> &[Symbol] {
        &self.per_rule[rule.usize()]
    }

    /// All terminal occurrences with their owners.
    pub fn occurrences(&self) -> &[(Symbol, CandidateSet)] {
        &self.all
    }
}
