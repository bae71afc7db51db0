//! The shift-reduce parser: a stack machine over grammar symbols.
//! Each iteration shifts the next token, then reduces as long as a
//! unique candidate survives lookahead, context filtering and
//! longest-match preference.

use crate::analysis::Analyses;
use crate::diag::Diagnostics;
use crate::error::ParseError;
use crate::grammar::{display, Grammar, RuleId};
use crate::lexer::Token;
use crate::symbol::{OpKind, Symbol};
use crate::tree::TreeNode;

use super::context::ContextManager;

/// Shift-reduce parser configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SrConfig {
    /// Filter reduction candidates against their follow sets.
    pub lookahead: bool,
    /// Filter reduction candidates against the rule context.
    pub heuristic_ctx: bool,
    /// Report each shift and reduce to the diagnostics sink.
    pub pretty_print: bool,
}

impl SrConfig {
    /// Default configuration: plain longest-match resolution.
    pub fn new() -> Self {
        SrConfig::default()
    }

    /// Enables lookahead(1) filtering.
    pub fn lookahead(mut self) -> Self {
        self.lookahead = true;
        self
    }

    /// Enables contextual reducibility filtering.
    pub fn heuristic_ctx(mut self) -> Self {
        self.heuristic_ctx = true;
        self
    }

    /// Enables step reporting.
    pub fn pretty_print(mut self) -> Self {
        self.pretty_print = true;
        self
    }
}

/// One stack element: a shifted token or a reduced nonterminal, with
/// the tree built for it.
struct Entry {
    sym: StackSym,
    node: TreeNode,
}

enum StackSym {
    Token(Token),
    Reduced(RuleId),
}

#[derive(Clone, Copy)]
struct Candidate {
    rule: RuleId,
    span: usize,
}

fn merge(dst: &mut Vec<usize>, src: Vec<usize>) {
    for end in src {
        if !dst.contains(&end) {
            dst.push(end);
        }
    }
}

/// Bottom-up parser over a validated grammar and its analyses.
pub struct SrParser<'g> {
    grammar: &'g Grammar,
    analyses: Analyses,
    config: SrConfig,
}

impl<'g> SrParser<'g> {
    /// Builds the analyses and the parser.
    pub fn new(grammar: &'g Grammar, config: SrConfig) -> Self {
        SrParser {
            grammar,
            analyses: Analyses::new(grammar),
            config,
        }
    }

    /// The analyses backing this parser.
    pub fn analyses(&self) -> &Analyses {
        &self.analyses
    }

    /// Parses the tokens starting from the named rule. Accepts when
    /// the input is exhausted and the stack holds exactly the start
    /// symbol.
    pub fn run(
        &self,
        start: &[u8],
        tokens: &[Token],
        diag: &mut dyn Diagnostics,
    ) -> Result<TreeNode, ParseError> {
        let start_id = self
            .grammar
            .rule_id(start)
            .ok_or_else(|| ParseError::UnknownStart(display(start)))?;

        let mut stack: Vec<Entry> = vec![];
        let mut ctx = ContextManager::new(
            self.grammar.num_rules(),
            &self.analyses.fixes,
            &self.analyses.reverse,
        );
        ctx.reset();
        let mut input = 0;

        loop {
            // Reduce until no unique candidate remains.
            while let Some(candidate) = self.pick_reduction(&stack, tokens.get(input), &ctx, input)?
            {
                self.reduce(&mut stack, candidate, &mut ctx, diag)?;
            }

            if input == tokens.len() {
                return self.accept(stack, start_id, &ctx, input);
            }

            let token = &tokens[input];
            input += 1;
            if self.config.pretty_print {
                diag.shift(&token.value);
            }
            log::trace!("shift {:?}", String::from_utf8_lossy(&token.value));
            stack.push(Entry {
                node: TreeNode::leaf(&token.value),
                sym: StackSym::Token(token.clone()),
            });
            if self.config.heuristic_ctx {
                let entries = self.analyses.fixes.entries_for_token(token);
                ctx.shift_token(&entries, stack.len() - 1);
            }
        }
    }

    fn accept(
        &self,
        mut stack: Vec<Entry>,
        start_id: RuleId,
        ctx: &ContextManager<'_>,
        at: usize,
    ) -> Result<TreeNode, ParseError> {
        let accepted = matches!(
            stack.as_slice(),
            [Entry {
                sym: StackSym::Reduced(id),
                ..
            }] if *id == start_id
        );
        if accepted {
            debug_assert!(!self.config.heuristic_ctx || ctx.is_clear());
            Ok(stack.pop().expect("single entry").node)
        } else {
            Err(ParseError::Stuck { at })
        }
    }

    /// Collects candidate reductions and resolves them to at most one:
    /// lookahead, then context, then longest match.
    fn pick_reduction(
        &self,
        stack: &[Entry],
        next: Option<&Token>,
        ctx: &ContextManager<'_>,
        at: usize,
    ) -> Result<Option<Candidate>, ParseError> {
        let mut candidates = vec![];
        for rule in self.grammar.rules() {
            if let Some(span) = self.longest_match(rule.id, stack) {
                candidates.push(Candidate {
                    rule: rule.id,
                    span,
                });
            }
        }

        if self.config.lookahead {
            if let Some(next) = next {
                candidates
                    .retain(|c| self.analyses.follow.admits(&self.analyses.first, c.rule, next));
            }
        }
        if self.config.heuristic_ctx {
            candidates.retain(|c| ctx.check_ctx(c.rule));
        }
        if let Some(longest) = candidates.iter().map(|c| c.span).max() {
            candidates.retain(|c| c.span == longest);
        }

        match candidates.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            several => Err(ParseError::Ambiguous {
                at,
                candidates: several
                    .iter()
                    .map(|c| self.grammar.name_string(c.rule))
                    .collect(),
            }),
        }
    }

    /// The longest stack suffix the rule's body matches, skipping the
    /// degenerate self-reduction of a single already-reduced symbol.
    fn longest_match(&self, rule: RuleId, stack: &[Entry]) -> Option<usize> {
        let body = self.grammar.body(rule);
        for span in (1..=stack.len()).rev() {
            let suffix = &stack[stack.len() - span..];
            if span == 1 {
                if let StackSym::Reduced(id) = &suffix[0].sym {
                    if *id == rule {
                        continue;
                    }
                }
            }
            if self.ends(body, suffix, rule, 0).contains(&span) {
                return Some(span);
            }
        }
        None
    }

    /// All offsets at which `sym` can finish matching, starting at
    /// `start` within the suffix. The match is structural: tokens
    /// match terminals by value and candidate-set membership, reduced
    /// symbols match nonterminal references.
    fn ends(&self, sym: &Symbol, suffix: &[Entry], rule: RuleId, start: usize) -> Vec<usize> {
        match sym {
            Symbol::Terminal(lit) => match suffix.get(start) {
                Some(Entry {
                    sym: StackSym::Token(token),
                    ..
                }) if token.value == *lit && token.types.contains(rule) => vec![start + 1],
                _ => vec![],
            },
            Symbol::TerminalRange(lo, hi) => match suffix.get(start) {
                Some(Entry {
                    sym: StackSym::Token(token),
                    ..
                }) if !token.value.is_empty()
                    && token.value.iter().all(|b| lo <= b && b <= hi)
                    && token.types.contains(rule) =>
                {
                    vec![start + 1]
                }
                _ => vec![],
            },
            Symbol::Nonterminal(name) => match suffix.get(start) {
                Some(Entry {
                    sym: StackSym::Reduced(id),
                    ..
                }) if self.grammar.rule_id(name) == Some(*id) => vec![start + 1],
                _ => vec![],
            },
            Symbol::Op(kind, children) => match kind {
                OpKind::Concat => {
                    let mut ends = vec![start];
                    for child in children {
                        ends = self.step(child, suffix, rule, &ends);
                        if ends.is_empty() {
                            break;
                        }
                    }
                    ends
                }
                OpKind::Alter => {
                    let mut ends = vec![];
                    for child in children {
                        merge(&mut ends, self.ends(child, suffix, rule, start));
                    }
                    ends
                }
                OpKind::Optional => {
                    let mut ends = vec![start];
                    merge(&mut ends, self.ends(&children[0], suffix, rule, start));
                    ends
                }
                OpKind::Repeat => self.closure(&children[0], suffix, rule, vec![start]),
                OpKind::Group => self.ends(&children[0], suffix, rule, start),
                OpKind::Except => {
                    let matched = self.ends(&children[0], suffix, rule, start);
                    matched
                        .into_iter()
                        .filter(|&end| {
                            !self
                                .ends(&children[1], suffix, rule, start)
                                .contains(&end)
                        })
                        .collect()
                }
                OpKind::RepeatExact(times) => {
                    let mut ends = vec![start];
                    for _ in 0..*times {
                        ends = self.step(&children[0], suffix, rule, &ends);
                        if ends.is_empty() {
                            break;
                        }
                    }
                    ends
                }
                OpKind::RepeatAtLeast(times) => {
                    let mut ends = vec![start];
                    for _ in 0..*times {
                        ends = self.step(&children[0], suffix, rule, &ends);
                        if ends.is_empty() {
                            break;
                        }
                    }
                    self.closure(&children[0], suffix, rule, ends)
                }
                OpKind::RepeatRange(from, to) => {
                    let mut ends = vec![start];
                    for _ in 0..*from {
                        ends = self.step(&children[0], suffix, rule, &ends);
                        if ends.is_empty() {
                            break;
                        }
                    }
                    let mut all = ends.clone();
                    for _ in *from..*to {
                        ends = self.step(&children[0], suffix, rule, &ends);
                        if ends.is_empty() {
                            break;
                        }
                        merge(&mut all, ends.clone());
                    }
                    all
                }
                OpKind::Comment | OpKind::SpecialSeq => vec![start],
                OpKind::Define | OpKind::RulesDef | OpKind::End => vec![],
            },
        }
    }

    /// Advances every end offset by one match of `sym`.
    fn step(&self, sym: &Symbol, suffix: &[Entry], rule: RuleId, ends: &[usize]) -> Vec<usize> {
        let mut out = vec![];
        for &end in ends {
            merge(&mut out, self.ends(sym, suffix, rule, end));
        }
        out
    }

    /// Transitive closure of `step`, for unbounded repetition.
    fn closure(&self, sym: &Symbol, suffix: &[Entry], rule: RuleId, seed: Vec<usize>) -> Vec<usize> {
        let mut all = seed.clone();
        let mut frontier = seed;
        while !frontier.is_empty() {
            let mut fresh = vec![];
            for end in self.step(sym, suffix, rule, &frontier) {
                if !all.contains(&end) {
                    all.push(end);
                    fresh.push(end);
                }
            }
            frontier = fresh;
        }
        all
    }

    fn reduce(
        &self,
        stack: &mut Vec<Entry>,
        candidate: Candidate,
        ctx: &mut ContextManager<'_>,
        diag: &mut dyn Diagnostics,
    ) -> Result<(), ParseError> {
        let top = stack.len();
        let base = top - candidate.span;
        let name = self.grammar.name(candidate.rule);
        if self.config.pretty_print {
            diag.reduce(name, candidate.span);
        }
        log::trace!(
            "reduce {} <- {} symbols",
            String::from_utf8_lossy(name),
            candidate.span
        );

        let mut node = TreeNode::named(name);
        for entry in stack.drain(base..) {
            node.add(entry.node);
        }
        stack.push(Entry {
            sym: StackSym::Reduced(candidate.rule),
            node,
        });

        if self.config.heuristic_ctx {
            ctx.apply_reduce(candidate.rule, base, top, diag)
                .map_err(ParseError::Internal)?;
            let entries = self.analyses.fixes.entries_for_rule(candidate.rule);
            ctx.shift_reduced(entries, base);
        }
        Ok(())
    }
}
