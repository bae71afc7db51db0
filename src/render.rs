//! Plain-text rendering of parse trees and analysis tables, for
//! diagnostics and debugging. Nothing here is consumed by the parsers
//! themselves.

use std::fmt::Write;

use crate::analysis::{FixTables, FollowItem, FollowSets, ReverseRules};
use crate::grammar::{Grammar, RuleId};
use crate::symbol::Symbol;
use crate::tree::TreeNode;

/// Renders a parse tree with one line per node, indented by depth:
/// `name (N elems) : value`.
pub fn render_tree(node: &TreeNode) -> String {
    let mut out = String::new();
    node.traverse(&mut |node, depth| {
        for _ in 0..depth {
            out.push_str("|  ");
        }
        let _ = writeln!(
            out,
            "{} ({} elems) : {}",
            String::from_utf8_lossy(&node.name),
            node.children.len(),
            String::from_utf8_lossy(&node.value),
        );
    });
    out
}

/// Renders the reverse-rule tree: each rule followed by the rules
/// that reference it and the rules that can never contain it.
pub fn render_reverse(grammar: &Grammar, reverse: &ReverseRules) -> String {
    let mut out = String::new();
    for rule in grammar.rules() {
        let _ = writeln!(
            out,
            "{} <- {{{}}} disjoint {{{}}}",
            String::from_utf8_lossy(rule.name),
            names(grammar, reverse.direct(rule.id)),
            names(grammar, reverse.disjoint(rule.id)),
        );
    }
    out
}

/// Renders every follow set, one rule per line.
pub fn render_follow(grammar: &Grammar, follow: &FollowSets) -> String {
    let mut out = String::new();
    for rule in grammar.rules() {
        let items: Vec<String> = follow
            .follow(rule.id)
            .iter()
            .map(|item| render_item(grammar, item))
            .collect();
        let _ = writeln!(
            out,
            "{} -> {}",
            String::from_utf8_lossy(rule.name),
            items.join(" "),
        );
    }
    out
}

/// Renders the deterministic prefix/postfix positions of every
/// terminal and nonterminal.
pub fn render_fixes(grammar: &Grammar, fixes: &FixTables) -> String {
    let mut out = String::new();
    for rule in grammar.rules() {
        for entry in fixes.entries_for_rule(rule.id) {
            let _ = writeln!(
                out,
                "{} in {}: {}",
                String::from_utf8_lossy(rule.name),
                grammar.name_string(entry.rule),
                positions(entry.prefix, entry.postfix),
            );
        }
    }
    for (symbol, entries) in fixes.terminals() {
        for entry in entries {
            let _ = writeln!(
                out,
                "{} in {}: {}",
                render_terminal(symbol),
                grammar.name_string(entry.rule),
                positions(entry.prefix, entry.postfix),
            );
        }
    }
    out
}

fn positions(prefix: Option<usize>, postfix: Option<usize>) -> String {
    match (prefix, postfix) {
        (Some(pre), Some(post)) => format!("prefix {pre}, postfix {post}"),
        (Some(pre), None) => format!("prefix {pre}"),
        (None, Some(post)) => format!("postfix {post}"),
        (None, None) => "unfixed".into(),
    }
}

fn names(grammar: &Grammar, rules: &[RuleId]) -> String {
    let list: Vec<String> = rules.iter().map(|&id| grammar.name_string(id)).collect();
    list.join(" ")
}

fn render_item(grammar: &Grammar, item: &FollowItem) -> String {
    match item {
        FollowItem::Term(lit) => format!("\"{}\"", String::from_utf8_lossy(lit)),
        FollowItem::Range(lo, hi) => format!("[{}-{}]", *lo as char, *hi as char),
        FollowItem::Rule(id) => grammar.name_string(*id),
    }
}

fn render_terminal(symbol: &Symbol) -> String {
    match symbol {
        Symbol::Terminal(lit) => format!("\"{}\"", String::from_utf8_lossy(lit)),
        Symbol::TerminalRange(lo, hi) => format!("[{}-{}]", *lo as char, *hi as char),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyses;
    use crate::symbol::{concat, define, nterm, rules_def, term};

    fn grammar() -> Grammar {
        Grammar::new(rules_def([
            define(nterm("val"), term("v")),
            define(nterm("pair"), concat([nterm("val"), term(":"), nterm("val")])),
        ]))
        .unwrap()
    }

    #[test]
    fn tree_rendering_indents_by_depth() {
        let mut root = TreeNode::named("pair");
        let mut val = TreeNode::named("val");
        val.add(TreeNode::leaf("v"));
        root.add(val);
        let text = render_tree(&root);
        assert_eq!(
            text,
            "pair (1 elems) : \n|  val (1 elems) : \n|  |   (0 elems) : v\n"
        );
    }

    #[test]
    fn analysis_renderings_name_every_rule() {
        let g = grammar();
        let analyses = Analyses::new(&g);
        let reverse = render_reverse(&g, &analyses.reverse);
        assert!(reverse.contains("val <- {pair}"));
        let follow = render_follow(&g, &analyses.follow);
        assert!(follow.contains("val -> \":\""));
        let fixes = render_fixes(&g, &analyses.fixes);
        assert!(fixes.contains("val in pair: prefix 0"));
        assert!(fixes.contains("\":\" in pair: prefix 1, postfix 1"));
    }
}
