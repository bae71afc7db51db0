//! The grammar index: validates a `RulesDef` symbol tree and exposes
//! rule lookup by name or dense rule id, plus terminal enumeration.

use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::error::GrammarError;
use crate::symbol::{ByteString, OpKind, Symbol};

/// Dense rule identifier, assigned in source order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(u32);

impl RuleId {
    /// Casts the id to `usize` for table indexing.
    #[inline]
    pub fn usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for RuleId {
    #[inline]
    fn from(id: usize) -> Self {
        RuleId(id as u32)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A small sorted set of rule ids, used as the candidate-type set of
/// tokens and terminals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateSet {
    ids: SmallVec<[RuleId; 4]>,
}

impl CandidateSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        CandidateSet::default()
    }

    /// Creates a singleton set.
    pub fn singleton(id: RuleId) -> Self {
        let mut set = CandidateSet::new();
        set.insert(id);
        set
    }

    /// Inserts a rule id, keeping the set sorted and deduplicated.
    pub fn insert(&mut self, id: RuleId) {
        if let Err(pos) = self.ids.binary_search(&id) {
            self.ids.insert(pos, id);
        }
    }

    /// Checks membership.
    pub fn contains(&self, id: RuleId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    /// Unions another set into this one.
    pub fn union(&mut self, other: &CandidateSet) {
        for &id in &other.ids {
            self.insert(id);
        }
    }

    /// Iterates over the members in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.ids.iter().copied()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Checks whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<RuleId> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = RuleId>>(iter: I) -> Self {
        let mut set = CandidateSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// References a rule's components.
#[derive(Clone, Copy)]
pub struct RuleRef<'a> {
    /// The rule id.
    pub id: RuleId,
    /// The defined nonterminal's name.
    pub name: &'a [u8],
    /// The rule body.
    pub body: &'a Symbol,
}

/// A validated grammar with its index.
#[derive(Clone, Debug)]
pub struct Grammar {
    root: Symbol,
    names: Vec<ByteString>,
    by_name: HashMap<ByteString, RuleId>,
}

impl Grammar {
    /// Validates a `RulesDef` symbol tree and builds the index.
    pub fn new(root: Symbol) -> Result<Self, GrammarError> {
        let defines = match &root {
            Symbol::Op(OpKind::RulesDef, defines) => defines,
            _ => return Err(GrammarError::NotRulesDef),
        };

        let mut names = vec![];
        let mut by_name = HashMap::new();
        for def in defines {
            let name = define_lhs(def)?;
            let id = RuleId::from(names.len());
            if by_name.insert(name.to_vec(), id).is_some() {
                return Err(GrammarError::DuplicateDefinition(display(name)));
            }
            names.push(name.to_vec());
        }

        let grammar = Grammar {
            root,
            names,
            by_name,
        };
        for rule in grammar.rules() {
            grammar.validate_body(rule.body)?;
        }
        Ok(grammar)
    }

    /// Number of rules.
    pub fn num_rules(&self) -> usize {
        self.names.len()
    }

    /// The root `RulesDef` symbol.
    pub fn root(&self) -> &Symbol {
        &self.root
    }

    /// Looks up a rule id by nonterminal name.
    pub fn rule_id(&self, name: &[u8]) -> Option<RuleId> {
        self.by_name.get(name).copied()
    }

    /// The name of a rule.
    pub fn name(&self, id: RuleId) -> &[u8] {
        &self.names[id.usize()]
    }

    /// The name of a rule, lossily decoded for messages.
    pub fn name_string(&self, id: RuleId) -> String {
        display(self.name(id))
    }

    /// The body of a rule.
    pub fn body(&self, id: RuleId) -> &Symbol {
        let def = &self.root.children()[id.usize()];
        &def.children()[1]
    }

    /// Iterates over the rules in source order.
    pub fn rules(&self) -> impl Iterator<Item = RuleRef<'_>> {
        self.names.iter().enumerate().map(|(i, name)| {
            let id = RuleId::from(i);
            RuleRef {
                id,
                name,
                body: self.body(id),
            }
        })
    }

    /// All distinct terminal symbols (literals and ranges) in source
    /// order of first occurrence.
    pub fn all_terminals(&self) -> Vec<Symbol> {
        let mut seen = vec![];
        for rule in self.rules() {
            rule.body.traverse(&mut |sym, _| {
                if sym.is_terminal_kind() && !seen.contains(sym) {
                    seen.push(sym.clone());
                }
            });
        }
        seen
    }

    /// All defined nonterminal names in source order.
    pub fn all_nonterminals(&self) -> Vec<&[u8]> {
        self.names.iter().map(|name| name.as_slice()).collect()
    }

    /// Maps each distinct terminal to the set of rules whose body
    /// contains it.
    pub fn terminal_to_rules(&self) -> Vec<(Symbol, CandidateSet)> {
        let mut out: Vec<(Symbol, CandidateSet)> = vec![];
        for rule in self.rules() {
            rule.body.traverse(&mut |sym, _| {
                if sym.is_terminal_kind() {
                    match out.iter_mut().find(|(s, _)| s == sym) {
                        Some((_, owners)) => owners.insert(rule.id),
                        None => out.push((sym.clone(), CandidateSet::singleton(rule.id))),
                    }
                }
            });
        }
        out
    }

    /// Checks one rule body against the structural invariants.
    fn validate_body(&self, body: &Symbol) -> Result<(), GrammarError> {
        match body {
            Symbol::Terminal(_) => Ok(()),
            Symbol::Nonterminal(name) => {
                if self.by_name.contains_key(name.as_slice()) {
                    Ok(())
                } else {
                    Err(GrammarError::UndefinedNonterminal(display(name)))
                }
            }
            Symbol::TerminalRange(lo, hi) => {
                if lo <= hi {
                    Ok(())
                } else {
                    Err(GrammarError::InvalidByteRange { lo: *lo, hi: *hi })
                }
            }
            Symbol::Op(kind, children) => {
                check_arity(*kind, children.len())?;
                match kind {
                    OpKind::Define => {
                        return Err(GrammarError::InvalidNesting(
                            "definitions are only allowed at the top level",
                        ))
                    }
                    OpKind::RulesDef => {
                        return Err(GrammarError::InvalidNesting(
                            "the rules definition is only allowed at the root",
                        ))
                    }
                    OpKind::End => {
                        return Err(GrammarError::InvalidNesting(
                            "the end operator only terminates a definition",
                        ))
                    }
                    OpKind::RepeatRange(from, to) if from > to => {
                        return Err(GrammarError::InvalidRepeatRange {
                            from: *from,
                            to: *to,
                        })
                    }
                    _ => {}
                }
                for child in children {
                    self.validate_body(child)?;
                }
                Ok(())
            }
        }
    }
}

/// Extracts and checks the left-hand side of a top-level definition.
fn define_lhs(def: &Symbol) -> Result<&[u8], GrammarError> {
    let children = match def {
        Symbol::Op(OpKind::Define, children) => children,
        _ => {
            return Err(GrammarError::InvalidNesting(
                "the rules definition may only contain definitions",
            ))
        }
    };
    if !(children.len() == 2 || children.len() == 3) {
        return Err(GrammarError::ArityMismatch {
            op: "definition",
            expected: "2 or 3",
            found: children.len(),
        });
    }
    if children.len() == 3 && children[2].kind() != Some(OpKind::End) {
        return Err(GrammarError::InvalidNesting(
            "a definition may only end with the end operator",
        ));
    }
    match &children[0] {
        Symbol::Nonterminal(name) => Ok(name),
        _ => Err(GrammarError::InvalidNesting(
            "a definition must have a nonterminal on its left-hand side",
        )),
    }
}

fn check_arity(kind: OpKind, found: usize) -> Result<(), GrammarError> {
    let (op, expected, ok) = match kind {
        OpKind::Concat => ("concatenation", "at least 1", found >= 1),
        OpKind::Alter => ("alternation", "at least 1", found >= 1),
        OpKind::Optional => ("optional", "exactly 1", found == 1),
        OpKind::Repeat => ("repeat", "exactly 1", found == 1),
        OpKind::Group => ("group", "exactly 1", found == 1),
        OpKind::Comment => ("comment", "exactly 1", found == 1),
        OpKind::SpecialSeq => ("special sequence", "exactly 1", found == 1),
        OpKind::Except => ("exception", "exactly 2", found == 2),
        OpKind::End => ("end", "exactly 0", found == 0),
        OpKind::RepeatExact(_) => ("exact repeat", "exactly 1", found == 1),
        OpKind::RepeatAtLeast(_) => ("lower-bounded repeat", "exactly 1", found == 1),
        OpKind::RepeatRange(..) => ("ranged repeat", "exactly 1", found == 1),
        OpKind::Define | OpKind::RulesDef => return Ok(()),
    };
    if ok {
        Ok(())
    } else {
        Err(GrammarError::ArityMismatch { op, expected, found })
    }
}

pub(crate) fn display(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}
