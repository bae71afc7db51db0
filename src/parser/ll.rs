//! The top-down parser: a recursive interpreter over combinator
//! bodies. Speculation clones the cursor and the node under
//! construction; a failed attempt discards its clone, a successful
//! one replaces the parent copy.

use crate::error::ParseError;
use crate::grammar::{display, Grammar};
use crate::lexer::Token;
use crate::symbol::{OpKind, Symbol};
use crate::tree::TreeNode;

/// How alternatives are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alternation {
    /// Adopt the first alternative that parses.
    #[default]
    PickFirst,
    /// Adopt the alternative that consumes the most tokens.
    PickLongest,
}

/// Recursive-descent parser over a validated grammar.
pub struct LlParser<'g> {
    grammar: &'g Grammar,
    policy: Alternation,
}

impl<'g> LlParser<'g> {
    /// Creates a parser with the [`Alternation::PickFirst`] policy.
    pub fn new(grammar: &'g Grammar) -> Self {
        LlParser {
            grammar,
            policy: Alternation::PickFirst,
        }
    }

    /// Sets the alternation policy.
    pub fn with_policy(mut self, policy: Alternation) -> Self {
        self.policy = policy;
        self
    }

    /// Parses the whole token stream starting from the named rule and
    /// returns the tree rooted at it.
    pub fn run(&self, start: &[u8], tokens: &[Token]) -> Result<TreeNode, ParseError> {
        let id = self
            .grammar
            .rule_id(start)
            .ok_or_else(|| ParseError::UnknownStart(display(start)))?;
        let mut root = TreeNode::named(start);
        let mut pos = 0;
        let mut furthest = 0;
        let ok = self.parse(
            self.grammar.body(id),
            &mut root,
            &mut pos,
            tokens,
            &mut furthest,
        );
        if ok && pos == tokens.len() {
            Ok(root)
        } else {
            Err(ParseError::NoParse {
                at: furthest.max(pos),
            })
        }
    }

    fn parse(
        &self,
        symbol: &Symbol,
        node: &mut TreeNode,
        pos: &mut usize,
        tokens: &[Token],
        furthest: &mut usize,
    ) -> bool {
        match symbol {
            Symbol::Terminal(lit) => {
                if *pos < tokens.len() && tokens[*pos].value == *lit {
                    node.add(TreeNode::leaf(&tokens[*pos].value));
                    *pos += 1;
                    *furthest = (*furthest).max(*pos);
                    true
                } else {
                    false
                }
            }
            Symbol::TerminalRange(lo, hi) => {
                let matched = *pos < tokens.len()
                    && !tokens[*pos].value.is_empty()
                    && tokens[*pos].value.iter().all(|b| lo <= b && b <= hi);
                if matched {
                    node.add(TreeNode::leaf(&tokens[*pos].value));
                    *pos += 1;
                    *furthest = (*furthest).max(*pos);
                    true
                } else {
                    false
                }
            }
            Symbol::Nonterminal(name) => {
                // Validation guarantees the rule exists.
                let id = match self.grammar.rule_id(name) {
                    Some(id) => id,
                    None => return false,
                };
                let mut child = TreeNode::named(name);
                if self.parse(self.grammar.body(id), &mut child, pos, tokens, furthest) {
                    node.add(child);
                    true
                } else {
                    false
                }
            }
            Symbol::Op(kind, children) => {
                self.parse_op(*kind, children, node, pos, tokens, furthest)
            }
        }
    }

    fn parse_op(
        &self,
        kind: OpKind,
        children: &[Symbol],
        node: &mut TreeNode,
        pos: &mut usize,
        tokens: &[Token],
        furthest: &mut usize,
    ) -> bool {
        match kind {
            OpKind::Concat => {
                let start = *pos;
                for child in children {
                    if !self.parse(child, node, pos, tokens, furthest) {
                        *pos = start;
                        return false;
                    }
                }
                true
            }
            OpKind::Alter => self.parse_alter(children, node, pos, tokens, furthest),
            OpKind::Optional => {
                let mut speculative = node.clone();
                let mut p = *pos;
                if self.parse(&children[0], &mut speculative, &mut p, tokens, furthest) {
                    *node = speculative;
                    *pos = p;
                }
                true
            }
            OpKind::Repeat => {
                self.parse_repeated(&children[0], node, pos, tokens, furthest, usize::MAX);
                true
            }
            OpKind::Group => self.parse(&children[0], node, pos, tokens, furthest),
            OpKind::Except => {
                let mut speculative = node.clone();
                let mut p = *pos;
                if !self.parse(&children[0], &mut speculative, &mut p, tokens, furthest) {
                    return false;
                }
                let mut scratch = TreeNode::default();
                let mut exception_pos = *pos;
                if self.parse(
                    &children[1],
                    &mut scratch,
                    &mut exception_pos,
                    tokens,
                    furthest,
                ) {
                    return false;
                }
                *node = speculative;
                *pos = p;
                true
            }
            OpKind::RepeatExact(times) => {
                self.parse_counted(&children[0], node, pos, tokens, furthest, times, Some(times))
            }
            OpKind::RepeatAtLeast(times) => {
                self.parse_counted(&children[0], node, pos, tokens, furthest, times, None)
            }
            OpKind::RepeatRange(from, to) => {
                self.parse_counted(&children[0], node, pos, tokens, furthest, from, Some(to))
            }
            OpKind::Comment | OpKind::SpecialSeq => true,
            OpKind::Define | OpKind::RulesDef | OpKind::End => false,
        }
    }

    fn parse_alter(
        &self,
        children: &[Symbol],
        node: &mut TreeNode,
        pos: &mut usize,
        tokens: &[Token],
        furthest: &mut usize,
    ) -> bool {
        let mut best: Option<(TreeNode, usize)> = None;
        for child in children {
            let mut speculative = node.clone();
            let mut p = *pos;
            if self.parse(child, &mut speculative, &mut p, tokens, furthest) {
                match self.policy {
                    Alternation::PickFirst => {
                        *node = speculative;
                        *pos = p;
                        return true;
                    }
                    Alternation::PickLongest => {
                        let better = best.as_ref().map(|&(_, at)| p > at).unwrap_or(true);
                        if better {
                            best = Some((speculative, p));
                        }
                    }
                }
            }
        }
        if let Some((tree, p)) = best {
            *node = tree;
            *pos = p;
            true
        } else {
            false
        }
    }

    /// `min` required repetitions, then optional ones up to `max`.
    fn parse_counted(
        &self,
        body: &Symbol,
        node: &mut TreeNode,
        pos: &mut usize,
        tokens: &[Token],
        furthest: &mut usize,
        min: usize,
        max: Option<usize>,
    ) -> bool {
        let start = *pos;
        let mut speculative = node.clone();
        let mut p = *pos;
        for _ in 0..min {
            if !self.parse(body, &mut speculative, &mut p, tokens, furthest) {
                *pos = start;
                return false;
            }
        }
        *node = speculative;
        *pos = p;
        let remaining = max.map(|max| max - min).unwrap_or(usize::MAX);
        self.parse_repeated(body, node, pos, tokens, furthest, remaining);
        true
    }

    /// Greedy speculative repetitions, at most `limit` of them.
    fn parse_repeated(
        &self,
        body: &Symbol,
        node: &mut TreeNode,
        pos: &mut usize,
        tokens: &[Token],
        furthest: &mut usize,
        limit: usize,
    ) {
        let mut taken = 0;
        while taken < limit {
            let mut speculative = node.clone();
            let mut p = *pos;
            if !self.parse(body, &mut speculative, &mut p, tokens, furthest) {
                break;
            }
            if p == *pos {
                // A nullable body makes no progress; stop looping.
                break;
            }
            *node = speculative;
            *pos = p;
            taken += 1;
        }
    }
}
