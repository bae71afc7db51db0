//! Shared grammars and a small EBNF printer/reader used by the
//! round-trip tests.

#![allow(dead_code)]

use gbnf::bake::Bakery;
use gbnf::symbol::{
    alter, concat, define, nterm, repeat, repeat_at_least, rules_def, term, term_range,
};
use gbnf::{Grammar, OpKind, Symbol};

/// `digit = "0" | ... | "9" ; number = digit+`
pub fn digits() -> Grammar {
    let digit_terms = (b'0'..=b'9').map(|b| term([b]));
    Grammar::new(rules_def([
        define(nterm("digit"), alter(digit_terms)),
        define(nterm("number"), repeat_at_least(1, nterm("digit"))),
    ]))
    .unwrap()
}

/// The calculator grammar: binary operators over numbers and
/// parenthesized groups, all alternated through `op`.
pub fn calc() -> Grammar {
    let digit_terms = (b'0'..=b'9').map(|b| term([b]));
    Grammar::new(rules_def([
        define(nterm("digit"), alter(digit_terms)),
        define(nterm("number"), repeat_at_least(1, nterm("digit"))),
        define(
            nterm("add"),
            concat([nterm("op"), term("+"), nterm("op")]),
        ),
        define(
            nterm("sub"),
            concat([nterm("op"), term("-"), nterm("op")]),
        ),
        define(
            nterm("mul"),
            concat([nterm("op"), term("*"), nterm("op")]),
        ),
        define(
            nterm("div"),
            concat([nterm("op"), term("/"), nterm("op")]),
        ),
        define(
            nterm("group"),
            concat([term("("), nterm("op"), term(")")]),
        ),
        define(
            nterm("op"),
            alter([
                nterm("number"),
                nterm("add"),
                nterm("sub"),
                nterm("mul"),
                nterm("div"),
                nterm("group"),
            ]),
        ),
    ]))
    .unwrap()
}

/// Nested comma-separated groups and arrays over lowercase strings.
pub fn nested() -> Grammar {
    Grammar::new(rules_def([
        define(nterm("char"), repeat(term_range(b'a', b'z'))),
        define(nterm("string"), repeat(nterm("char"))),
        define(
            nterm("group"),
            concat([
                term("("),
                nterm("op"),
                repeat(concat([term(","), nterm("op")])),
                term(")"),
            ]),
        ),
        define(
            nterm("array"),
            concat([
                term("["),
                nterm("op"),
                repeat(concat([term(","), nterm("op")])),
                term("]"),
            ]),
        ),
        define(
            nterm("op"),
            alter([nterm("string"), nterm("group"), nterm("array")]),
        ),
    ]))
    .unwrap()
}

/// Routes `log` output into the test harness; set `RUST_LOG=trace`
/// to watch the parsers work.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Renders a tree as `name(child, ..)` with leaves as quoted bytes,
/// for compact structural assertions.
pub fn sketch(node: &gbnf::TreeNode) -> String {
    if node.name.is_empty() {
        return format!("{:?}", String::from_utf8_lossy(&node.value));
    }
    let children: Vec<String> = node.children.iter().map(sketch).collect();
    format!(
        "{}({})",
        String::from_utf8_lossy(&node.name),
        children.join(", ")
    )
}

/// A plain EBNF printer: `name = body ;`, `,` for sequences, `|` for
/// alternatives, `[ ]`, `{ }`, `( )` brackets.
pub struct EbnfBakery;

impl Bakery for EbnfBakery {
    fn bake_terminal(&self, name: &[u8]) -> String {
        format!("\"{}\"", String::from_utf8_lossy(name))
    }

    fn bake_nonterminal(&self, name: &[u8]) -> String {
        String::from_utf8_lossy(name).into_owned()
    }

    fn bake_terminal_range(&self, lo: u8, hi: u8) -> String {
        format!("\"{}\" .. \"{}\"", lo as char, hi as char)
    }

    fn bake_concat(&self, parts: &[String]) -> String {
        parts.join(" , ")
    }

    fn bake_alter(&self, parts: &[String]) -> String {
        parts.join(" | ")
    }

    fn bake_define(&self, lhs: String, rhs: String) -> String {
        format!("{lhs} = {rhs}")
    }

    fn bake_optional(&self, inner: String) -> String {
        format!("[ {inner} ]")
    }

    fn bake_repeat(&self, inner: String) -> String {
        format!("{{ {inner} }}")
    }

    fn bake_group(&self, inner: String) -> String {
        format!("( {inner} )")
    }

    fn bake_comment(&self, inner: String) -> String {
        format!("(* {inner} *)")
    }

    fn bake_special_seq(&self, inner: String) -> String {
        format!("? {inner} ?")
    }

    fn bake_except(&self, lhs: String, rhs: String) -> String {
        format!("{lhs} - {rhs}")
    }

    fn bake_end(&self) -> String {
        " ;".into()
    }

    fn bake_rules_def(&self, defines: &[String]) -> String {
        defines.join("\n")
    }

    fn bake_repeat_exact(&self, times: usize, inner: String) -> String {
        format!("{times} * {inner}")
    }

    fn bake_repeat_ge(&self, times: usize, inner: String) -> String {
        format!("{times} *+ {inner}")
    }

    fn bake_repeat_range(&self, from: usize, to: usize, inner: String) -> String {
        format!("{from}-{to} * {inner}")
    }

    fn precedence(&self, kind: OpKind) -> Option<u8> {
        match kind {
            OpKind::Alter => Some(1),
            OpKind::Concat => Some(2),
            OpKind::Except => Some(3),
            _ => None,
        }
    }
}

/// Reads the output of [`EbnfBakery`] back into a symbol tree.
/// Parentheses shape the parse without creating `Group` nodes, so a
/// grammar without explicit groups round-trips to symbol equality.
pub fn read_ebnf(text: &str) -> Symbol {
    let mut reader = Reader {
        chars: text.chars().collect(),
        at: 0,
    };
    let mut defines = vec![];
    reader.skip_ws();
    while !reader.done() {
        let name = reader.ident();
        reader.expect('=');
        let body = reader.alternation();
        reader.expect(';');
        defines.push(define(nterm(name), body));
        reader.skip_ws();
    }
    rules_def(defines)
}

struct Reader {
    chars: Vec<char>,
    at: usize,
}

impl Reader {
    fn done(&self) -> bool {
        self.at >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.at).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.at += 1;
        }
    }

    fn expect(&mut self, c: char) {
        self.skip_ws();
        assert_eq!(self.peek(), Some(c), "expected {c:?} at {}", self.at);
        self.at += 1;
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.at += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> String {
        self.skip_ws();
        let start = self.at;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.at += 1;
        }
        assert!(self.at > start, "expected identifier at {}", start);
        self.chars[start..self.at].iter().collect()
    }

    fn quoted(&mut self) -> String {
        self.expect('"');
        let start = self.at;
        while matches!(self.peek(), Some(c) if c != '"') {
            self.at += 1;
        }
        let lit: String = self.chars[start..self.at].iter().collect();
        self.expect('"');
        lit
    }

    fn alternation(&mut self) -> Symbol {
        let mut arms = vec![self.sequence()];
        while self.eat('|') {
            arms.push(self.sequence());
        }
        if arms.len() == 1 {
            arms.pop().unwrap()
        } else {
            alter(arms)
        }
    }

    fn sequence(&mut self) -> Symbol {
        let mut parts = vec![self.unary()];
        while self.eat(',') {
            parts.push(self.unary());
        }
        if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            concat(parts)
        }
    }

    fn number(&mut self) -> usize {
        self.skip_ws();
        let start = self.at;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.at += 1;
        }
        let digits: String = self.chars[start..self.at].iter().collect();
        digits.parse().unwrap()
    }

    fn unary(&mut self) -> Symbol {
        self.skip_ws();
        if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            // `N * x`, `N *+ x` or `N-M * x`.
            let low = self.number();
            if self.eat('-') {
                let high = self.number();
                self.expect('*');
                return gbnf::symbol::repeat_range(low, high, self.unary());
            }
            self.expect('*');
            if self.eat('+') {
                return repeat_at_least(low, self.unary());
            }
            return gbnf::symbol::repeat_exact(low, self.unary());
        }
        match self.peek() {
            Some('(') => {
                self.expect('(');
                let inner = self.alternation();
                self.expect(')');
                inner
            }
            Some('{') => {
                self.expect('{');
                let inner = self.alternation();
                self.expect('}');
                repeat(inner)
            }
            Some('[') => {
                self.expect('[');
                let inner = self.alternation();
                self.expect(']');
                gbnf::symbol::optional(inner)
            }
            Some('"') => {
                let lit = self.quoted();
                if self.eat('.') {
                    self.expect('.');
                    let hi = self.quoted();
                    term_range(lit.as_bytes()[0], hi.as_bytes()[0])
                } else {
                    term(lit)
                }
            }
            _ => nterm(self.ident()),
        }
    }
}
