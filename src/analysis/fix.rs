//! Deterministic prefix and postfix positions. For a rule `X` and a
//! symbol `t` occurring in its body, the prefix position of `t` is the
//! stack offset at which `t` appears in *every* derivation of `X`, if
//! a single such offset exists; the postfix position is the analogous
//! distance from the end. The context manager matches shifted symbols
//! against these tables to track which rules the parse is inside.

use crate::grammar::{Grammar, RuleId};
use crate::lexer::Token;
use crate::symbol::{OpKind, Symbol};

/// Deterministic positions of one symbol within one rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixEntry {
    /// The rule the symbol occurs in.
    pub rule: RuleId,
    /// Offset from the start of the rule's derivations, if fixed.
    pub prefix: Option<usize>,
    /// Distance from the end of the rule's derivations, if fixed.
    pub postfix: Option<usize>,
}

/// Lengths of the deterministic windows of one rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixLimits {
    /// Number of deterministic leading positions.
    pub prefix_len: usize,
    /// Number of deterministic trailing positions.
    pub postfix_len: usize,
}

/// Prefix/postfix position tables for the whole grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixTables {
    nterm_entries: Vec<Vec<FixEntry>>,
    term_entries: Vec<(Symbol, Vec<FixEntry>)>,
    limits: Vec<FixLimits>,
}

/// Symbolic width of a subexpression on the parse stack.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Width {
    Det(usize),
    Indet,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Dir {
    Forward,
    Backward,
}

impl FixTables {
    /// Scans every rule body in both directions and distributes the
    /// deterministic positions to their target symbols.
    pub fn new(grammar: &Grammar) -> Self {
        let n = grammar.num_rules();
        let mut this = FixTables {
            nterm_entries: vec![vec![]; n],
            term_entries: vec![],
            limits: vec![FixLimits::default(); n],
        };

        for rule in grammar.rules() {
            let mut forward = vec![];
            scan(rule.body, Dir::Forward, 0, &mut forward);
            let mut backward = vec![];
            scan(rule.body, Dir::Backward, 0, &mut backward);

            this.limits[rule.id.usize()] = FixLimits {
                prefix_len: forward.iter().map(|(_, p)| p + 1).max().unwrap_or(0),
                postfix_len: backward.iter().map(|(_, p)| p + 1).max().unwrap_or(0),
            };

            for (sym, pos) in forward {
                this.entry_mut(grammar, &sym, rule.id).prefix = Some(pos);
            }
            for (sym, pos) in backward {
                let entry = this.entry_mut(grammar, &sym, rule.id);
                // Only the first occurrence per direction is resolved.
                if entry.postfix.is_none() {
                    entry.postfix = Some(pos);
                }
            }
        }
        this
    }

    /// Position entries for a reduced nonterminal.
    pub fn entries_for_rule(&self, rule: RuleId) -> &[FixEntry] {
        &self.nterm_entries[rule.usize()]
    }

    /// Position entries for a shifted token: the union over every
    /// stored terminal symbol the token's value matches.
    pub fn entries_for_token(&self, token: &Token) -> Vec<FixEntry> {
        let mut out = vec![];
        for (sym, entries) in &self.term_entries {
            if token_matches(token, sym) {
                out.extend_from_slice(entries);
            }
        }
        out
    }

    /// Deterministic window lengths of a rule.
    pub fn limits(&self, rule: RuleId) -> FixLimits {
        self.limits[rule.usize()]
    }

    /// The distinct terminal symbols with fixed positions, with their
    /// entries.
    pub fn terminals(&self) -> impl Iterator<Item = (&Symbol, &[FixEntry])> {
        self.term_entries
            .iter()
            .map(|(symbol, entries)| (symbol, entries.as_slice()))
    }

    fn entry_mut(&mut self, grammar: &Grammar, sym: &Symbol, rule: RuleId) -> &mut FixEntry {
        let entries = match sym {
            Symbol::Nonterminal(name) => {
                let id = grammar.rule_id(name).expect("validated reference");
                &mut self.nterm_entries[id.usize()]
            }
            _ => {
                let at = self.term_entries.iter().position(|(s, _)| s == sym);
                let at = at.unwrap_or_else(|| {
                    self.term_entries.push((sym.clone(), vec![]));
                    self.term_entries.len() - 1
                });
                &mut self.term_entries[at].1
            }
        };
        match entries.iter().position(|e| e.rule == rule) {
            Some(at) => &mut entries[at],
            None => {
                entries.push(FixEntry {
                    rule,
                    prefix: None,
                    postfix: None,
                });
                entries.last_mut().expect("just pushed")
            }
        }
    }
}

fn token_matches(token: &Token, sym: &Symbol) -> bool {
    match sym {
        Symbol::Terminal(lit) => token.value == *lit,
        Symbol::TerminalRange(lo, hi) => {
            !token.value.is_empty() && token.value.iter().all(|b| lo <= b && b <= hi)
        }
        _ => false,
    }
}

/// Collects `(symbol, position)` pairs for the deterministic window in
/// the given direction and returns the symbolic width of `sym`.
fn scan(sym: &Symbol, dir: Dir, pos: usize, out: &mut Vec<(Symbol, usize)>) -> Width {
    match sym {
        Symbol::Terminal(_) | Symbol::TerminalRange(..) | Symbol::Nonterminal(_) => {
            if !out.iter().any(|(s, _)| s == sym) {
                out.push((sym.clone(), pos));
            }
            Width::Det(1)
        }
        Symbol::Op(kind, children) => match kind {
            OpKind::Concat => {
                let mut cur = pos;
                for child in iter_dir(children, dir) {
                    match scan(child, dir, cur, out) {
                        Width::Det(w) => cur += w,
                        Width::Indet => return Width::Indet,
                    }
                }
                Width::Det(cur - pos)
            }
            OpKind::Group => scan(&children[0], dir, pos, out),
            OpKind::Except => scan(&children[0], dir, pos, out),
            OpKind::RepeatExact(n) if *n >= 1 => {
                match scan(&children[0], dir, pos, out) {
                    Width::Det(w) => Width::Det(w * n),
                    Width::Indet => Width::Indet,
                }
            }
            OpKind::RepeatAtLeast(n) if *n >= 1 => {
                // The first repetition in scan order is fixed; the
                // total width is open-ended.
                scan(&children[0], dir, pos, out);
                Width::Indet
            }
            OpKind::RepeatRange(m, n) if *m >= 1 => {
                let unit = scan(&children[0], dir, pos, out);
                match unit {
                    Width::Det(w) if m == n => Width::Det(w * m),
                    _ => Width::Indet,
                }
            }
            OpKind::Comment | OpKind::SpecialSeq => Width::Det(0),
            _ => Width::Indet,
        },
    }
}

fn iter_dir<'a>(children: &'a [Symbol], dir: Dir) -> Box<dyn Iterator<Item = &'a Symbol> + 'a> {
    match dir {
        Dir::Forward => Box::new(children.iter()),
        Dir::Backward => Box::new(children.iter().rev()),
    }
}
