//! The legacy tokenizer: a single pass with a growing window that
//! emits a token whenever the window equals a known literal.

use std::collections::HashMap;

use crate::error::{GrammarError, TokenizeError};
use crate::grammar::{display, CandidateSet, Grammar, RuleId};
use crate::symbol::{ByteString, Symbol};

use super::Token;

/// Tokenizer over a flat `literal -> owning rule` map. Byte ranges
/// and duplicate literals are not supported; use [`super::Lexer`].
#[derive(Clone, Debug)]
pub struct LexerLegacy {
    literals: HashMap<ByteString, RuleId>,
}

impl LexerLegacy {
    /// Flattens the grammar's terminals into the literal map.
    pub fn new(grammar: &Grammar) -> Result<Self, GrammarError> {
        let mut literals = HashMap::new();
        for rule in grammar.rules() {
            let mut err = None;
            rule.body.traverse(&mut |sym, _| match sym {
                Symbol::Terminal(lit) => {
                    if let Some(owner) = literals.insert(lit.clone(), rule.id) {
                        if owner != rule.id {
                            err.get_or_insert(GrammarError::DuplicateTerminal(display(lit)));
                        }
                    }
                }
                Symbol::TerminalRange(..) => {
                    err.get_or_insert(GrammarError::RangeInLegacyLexer);
                }
                _ => {}
            });
            if let Some(err) = err {
                return Err(err);
            }
        }
        log::debug!("legacy lexer built with {} literals", literals.len());
        Ok(LexerLegacy { literals })
    }

    /// Tokenizes the input. The window `[pos, i)` grows until it
    /// equals a known literal; the token is emitted and the window
    /// restarts after it. Adjacent same-type tokens are not merged.
    pub fn run(&self, text: &[u8]) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = vec![];
        let mut pos = 0;
        for i in 0..text.len() {
            let window = &text[pos..i + 1];
            if let Some(&owner) = self.literals.get(window) {
                tokens.push(Token::new(window.to_vec(), CandidateSet::singleton(owner)));
                pos = i + 1;
            }
        }
        if pos == text.len() {
            Ok(tokens)
        } else {
            Err(TokenizeError::NoMatch { offset: pos })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{alter, define, nterm, repeat, rules_def, term, term_range};

    fn digits() -> Grammar {
        Grammar::new(rules_def([
            define(nterm("digit"), alter([term("1"), term("2")])),
            define(nterm("number"), repeat(nterm("digit"))),
        ]))
        .unwrap()
    }

    #[test]
    fn consumes_whole_input_or_reports_offset() {
        let grammar = digits();
        let lexer = LexerLegacy::new(&grammar).unwrap();
        let tokens = lexer.run(b"121").unwrap();
        let values: Vec<&[u8]> = tokens.iter().map(|t| t.value.as_slice()).collect();
        assert_eq!(values, vec![&b"1"[..], b"2", b"1"]);
        assert_eq!(lexer.run(b"12x"), Err(TokenizeError::NoMatch { offset: 2 }));
    }

    #[test]
    fn adjacent_same_type_tokens_stay_separate() {
        let grammar = digits();
        let lexer = LexerLegacy::new(&grammar).unwrap();
        let tokens = lexer.run(b"11").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].ty(), tokens[1].ty());
    }

    #[test]
    fn duplicate_literal_across_rules_is_rejected() {
        let grammar = Grammar::new(rules_def([
            define(nterm("a"), term("x")),
            define(nterm("b"), term("x")),
        ]))
        .unwrap();
        assert_eq!(
            LexerLegacy::new(&grammar).unwrap_err(),
            GrammarError::DuplicateTerminal("x".into())
        );
    }

    #[test]
    fn ranges_are_rejected() {
        let grammar = Grammar::new(rules_def([define(nterm("ch"), term_range(b'a', b'z'))]))
            .unwrap();
        assert_eq!(
            LexerLegacy::new(&grammar).unwrap_err(),
            GrammarError::RangeInLegacyLexer
        );
    }
}
