//! The context manager. While the shift-reduce parser runs, this
//! tracks how many times the parse is currently "inside" each rule by
//! matching shifted symbols against the deterministic prefix/postfix
//! position tables. The resulting counters gate reductions: a rule
//! that can never contain a currently-open rule is not reducible.

use crate::analysis::{FixEntry, FixTables, ReverseRules};
use crate::diag::{Diagnostics, GuruMeditation};
use crate::grammar::RuleId;

/// Open anchor candidates, one slot per rule.
#[derive(Clone, Debug)]
struct CtxTodo {
    anchors: Vec<Option<usize>>,
    open: Vec<RuleId>,
}

impl CtxTodo {
    fn new(num_rules: usize) -> Self {
        CtxTodo {
            anchors: vec![None; num_rules],
            open: vec![],
        }
    }

    fn reset(&mut self) {
        self.anchors.iter_mut().for_each(|a| *a = None);
        self.open.clear();
    }

    fn len(&self) -> usize {
        self.open.len()
    }

    fn get(&self, rule: RuleId) -> Option<usize> {
        self.anchors[rule.usize()]
    }

    fn add(&mut self, rule: RuleId, anchor: usize) {
        if self.anchors[rule.usize()].is_none() {
            self.open.push(rule);
        }
        self.anchors[rule.usize()] = Some(anchor);
    }

    fn remove(&mut self, rule: RuleId) {
        if self.anchors[rule.usize()].take().is_some() {
            self.open.retain(|&r| r != rule);
        }
    }

    fn sole(&self) -> Option<(RuleId, usize)> {
        match self.open.as_slice() {
            [rule] => Some((*rule, self.anchors[rule.usize()].expect("open anchor"))),
            _ => None,
        }
    }

    /// Drops candidates anchored at or above the reduced region.
    fn drop_from(&mut self, base: usize) {
        let anchors = &self.anchors;
        let stale: Vec<RuleId> = self
            .open
            .iter()
            .copied()
            .filter(|r| anchors[r.usize()].map(|a| a >= base).unwrap_or(false))
            .collect();
        for rule in stale {
            self.remove(rule);
        }
    }
}

/// A committed non-ambiguous prefix or postfix match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Commit {
    rule: RuleId,
    anchor: usize,
}

/// Runtime tracker of rule nesting, driven by shifted symbols.
pub struct ContextManager<'a> {
    fixes: &'a FixTables,
    reverse: &'a ReverseRules,
    context: Vec<u32>,
    prefix_todo: CtxTodo,
    postfix_todo: CtxTodo,
    prefix: Vec<Commit>,
    postfix: Vec<Commit>,
}

impl<'a> ContextManager<'a> {
    /// Creates a manager over the precomputed tables.
    pub fn new(num_rules: usize, fixes: &'a FixTables, reverse: &'a ReverseRules) -> Self {
        ContextManager {
            fixes,
            reverse,
            context: vec![0; num_rules],
            prefix_todo: CtxTodo::new(num_rules),
            postfix_todo: CtxTodo::new(num_rules),
            prefix: vec![],
            postfix: vec![],
        }
    }

    /// Clears all counters and candidates; call before each parse.
    pub fn reset(&mut self) {
        self.context.iter_mut().for_each(|c| *c = 0);
        self.prefix_todo.reset();
        self.postfix_todo.reset();
        self.prefix.clear();
        self.postfix.clear();
    }

    /// Consumes the position entries of a token shifted at stack
    /// index `at` and commits a candidate once it is unique. Tokens
    /// both advance open candidates and open new ones.
    pub fn shift_token(&mut self, entries: &[FixEntry], at: usize) {
        self.advance(entries, at, true);
    }

    /// Consumes the position entries of a reduced nonterminal placed
    /// at stack index `at`. Reduced symbols only confirm or drop open
    /// candidates; anchoring on them would open a candidate at every
    /// plausible position and poison the counters.
    pub fn shift_reduced(&mut self, entries: &[FixEntry], at: usize) {
        self.advance(entries, at, false);
    }

    fn advance(&mut self, entries: &[FixEntry], at: usize, may_open: bool) {
        for entry in entries {
            // A symbol fixed in both windows is tracked through the
            // prefix only; opening both would keep the candidate
            // ambiguous against itself.
            if let Some(pre) = entry.prefix {
                self.advance_prefix(entry.rule, pre, at, may_open);
            } else if let Some(post_dist) = entry.postfix {
                self.advance_postfix(entry.rule, post_dist, at, may_open);
            }
        }

        if self.prefix_todo.len() + self.postfix_todo.len() == 1 {
            if let Some((rule, anchor)) = self.prefix_todo.sole() {
                self.prefix.push(Commit { rule, anchor });
                self.context[rule.usize()] += 1;
                self.prefix_todo.remove(rule);
                log::trace!("ctx: committed prefix of rule {rule} at {anchor}");
            } else if let Some((rule, anchor)) = self.postfix_todo.sole() {
                self.postfix.push(Commit { rule, anchor });
                self.context[rule.usize()] += 1;
                self.postfix_todo.remove(rule);
                log::trace!("ctx: committed postfix of rule {rule} at {anchor}");
            }
        }
    }

    fn advance_prefix(&mut self, rule: RuleId, pre: usize, at: usize, may_open: bool) {
        // A commitment for the rule absorbs consistent continuations.
        if self
            .prefix
            .iter()
            .any(|c| c.rule == rule && c.anchor + pre == at)
        {
            return;
        }
        match self.prefix_todo.get(rule) {
            Some(anchor) => {
                if anchor + pre != at {
                    self.prefix_todo.remove(rule);
                }
            }
            None => {
                if may_open && pre <= at && self.check_ctx(rule) {
                    self.prefix_todo.add(rule, at - pre);
                }
            }
        }
    }

    fn advance_postfix(&mut self, rule: RuleId, post_dist: usize, at: usize, may_open: bool) {
        let len = self.fixes.limits(rule).postfix_len;
        // Relative index of this symbol within the postfix window.
        let offset = match (len - 1).checked_sub(post_dist) {
            Some(offset) => offset,
            None => return,
        };
        if self
            .postfix
            .iter()
            .any(|c| c.rule == rule && c.anchor + offset == at)
        {
            return;
        }
        match self.postfix_todo.get(rule) {
            Some(anchor) => {
                if anchor + offset != at {
                    self.postfix_todo.remove(rule);
                }
            }
            None => {
                if may_open && offset <= at && self.check_ctx(rule) {
                    self.postfix_todo.add(rule, at - offset);
                }
            }
        }
    }

    /// Checks whether a reduction to `rule` is admissible in the
    /// current context: false iff some rule that can never contain it
    /// is currently open.
    pub fn check_ctx(&self, rule: RuleId) -> bool {
        self.reverse
            .disjoint(rule)
            .iter()
            .all(|r| self.context[r.usize()] == 0)
    }

    /// Settles commitments after `rule` was reduced over the stack
    /// region `[base, top)`. Geometry violations are fatal.
    pub fn apply_reduce(
        &mut self,
        rule: RuleId,
        base: usize,
        top: usize,
        diag: &mut dyn Diagnostics,
    ) -> Result<(), GuruMeditation> {
        if let Some(at) = self.postfix.iter().rposition(|c| c.rule == rule) {
            let commit = self.postfix[at];
            let len = self.fixes.limits(rule).postfix_len;
            if commit.anchor + len != top {
                return Err(self.meditate(
                    diag,
                    "match candidate reduced in an illegal postfix position",
                ));
            }
            self.postfix.remove(at);
            self.decrement(rule, diag)?;
        } else if let Some(at) = self.prefix.iter().rposition(|c| c.rule == rule) {
            let commit = self.prefix[at];
            if commit.anchor != base {
                return Err(self.meditate(
                    diag,
                    "match candidate reduced in an illegal prefix position",
                ));
            }
            self.prefix.remove(at);
            self.decrement(rule, diag)?;
        }

        // Commitments and candidates anchored inside the popped
        // region can no longer complete.
        let stale: Vec<Commit> = self
            .prefix
            .iter()
            .chain(self.postfix.iter())
            .copied()
            .filter(|c| c.anchor >= base)
            .collect();
        for commit in stale {
            self.prefix.retain(|c| c != &commit);
            self.postfix.retain(|c| c != &commit);
            self.decrement(commit.rule, diag)?;
        }
        self.prefix_todo.drop_from(base);
        self.postfix_todo.drop_from(base);
        Ok(())
    }

    /// Current nesting counter of a rule.
    pub fn counter(&self, rule: RuleId) -> u32 {
        self.context[rule.usize()]
    }

    /// Checks that every counter is zero, as required after accept.
    pub fn is_clear(&self) -> bool {
        self.context.iter().all(|&c| c == 0)
    }

    fn decrement(
        &mut self,
        rule: RuleId,
        diag: &mut dyn Diagnostics,
    ) -> Result<(), GuruMeditation> {
        if self.context[rule.usize()] == 0 {
            return Err(self.meditate(diag, "context counter underflow"));
        }
        self.context[rule.usize()] -= 1;
        Ok(())
    }

    fn meditate(&self, diag: &mut dyn Diagnostics, message: &str) -> GuruMeditation {
        let record = GuruMeditation::new(message, file!(), line!());
        diag.guru_meditation(&record.message, record.file, record.line);
        record
    }
}
