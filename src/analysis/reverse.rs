//! Reverse-rule analysis: which rules reference a given nonterminal,
//! directly and transitively, and which rules can never contain it.

use bit_matrix::BitMatrix;

use crate::grammar::{Grammar, RuleId};
use crate::symbol::Symbol;

/// Reverse-rule tables, indexed by rule id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReverseRules {
    direct: Vec<Vec<RuleId>>,
    star: Vec<Vec<RuleId>>,
    disjoint: Vec<Vec<RuleId>>,
}

impl ReverseRules {
    /// Builds the direct reverse-rule tree, its transitive closure,
    /// and the disjoint-rule table.
    pub fn new(grammar: &Grammar) -> Self {
        let n = grammar.num_rules();
        let mut references = BitMatrix::new(n, n);
        for rule in grammar.rules() {
            rule.body.traverse(&mut |sym, _| {
                if let Symbol::Nonterminal(name) = sym {
                    // Validation guarantees the name resolves.
                    if let Some(referenced) = grammar.rule_id(name) {
                        references.set(rule.id.usize(), referenced.usize(), true);
                    }
                }
            });
        }

        let mut direct = vec![vec![]; n];
        for referencing in 0..n {
            for (referenced, present) in references.iter_row(referencing).enumerate() {
                if present && referencing != referenced {
                    direct[referenced].push(RuleId::from(referencing));
                }
            }
        }

        references.transitive_closure();

        let mut star = vec![vec![]; n];
        let mut disjoint = vec![vec![]; n];
        for target in 0..n {
            for other in 0..n {
                if other == target {
                    continue;
                }
                if references[(other, target)] {
                    star[target].push(RuleId::from(other));
                } else {
                    disjoint[target].push(RuleId::from(other));
                }
            }
        }

        ReverseRules {
            direct,
            star,
            disjoint,
        }
    }

    /// Rules whose body references `target` directly.
    pub fn direct(&self, target: RuleId) -> &[RuleId] {
        &self.direct[target.usize()]
    }

    /// Rules from which `target` is reachable through any chain of
    /// references, excluding `target` itself.
    pub fn star(&self, target: RuleId) -> &[RuleId] {
        &self.star[target.usize()]
    }

    /// Rules that can never transitively contain `target`.
    pub fn disjoint(&self, target: RuleId) -> &[RuleId] {
        &self.disjoint[target.usize()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{alter, concat, define, nterm, repeat, rules_def, term};

    fn grammar() -> Grammar {
        // digit <- number <- op; stray is referenced by nobody.
        Grammar::new(rules_def([
            define(nterm("digit"), alter([term("0"), term("1")])),
            define(nterm("number"), repeat(nterm("digit"))),
            define(nterm("op"), concat([nterm("number"), term("+"), nterm("number")])),
            define(nterm("stray"), term("!")),
        ]))
        .unwrap()
    }

    #[test]
    fn direct_and_transitive_references() {
        let g = grammar();
        let rr = ReverseRules::new(&g);
        let digit = g.rule_id(b"digit").unwrap();
        let number = g.rule_id(b"number").unwrap();
        let op = g.rule_id(b"op").unwrap();
        assert_eq!(rr.direct(digit), &[number]);
        assert_eq!(rr.star(digit), &[number, op]);
        assert_eq!(rr.direct(op), &[]);
    }

    #[test]
    fn disjoint_is_the_complement() {
        let g = grammar();
        let rr = ReverseRules::new(&g);
        let digit = g.rule_id(b"digit").unwrap();
        let stray = g.rule_id(b"stray").unwrap();
        let op = g.rule_id(b"op").unwrap();
        assert_eq!(rr.disjoint(digit), &[stray]);
        // Nothing contains op or stray except themselves.
        assert_eq!(rr.star(stray), &[]);
        assert_eq!(rr.disjoint(stray).len(), 3);
        assert!(rr.disjoint(op).contains(&digit));
    }
}
