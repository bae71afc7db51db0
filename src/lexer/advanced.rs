//! The advanced tokenizer. Every terminal occurrence is cached with
//! its owning rule; overlapping occurrences are collapsed into a set
//! of mutually disjoint symbols carrying candidate-type sets, and the
//! input is scanned longest-match against that set.

use std::collections::VecDeque;

use crate::error::{GrammarError, TokenizeError};
use crate::grammar::{display, CandidateSet, Grammar};
use crate::symbol::{intersect_pieces, symbols_intersect, Provenance, Symbol};

use super::{LexerConfig, TermCache, Token};

/// One scannable terminal with its candidate owners.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ScanSymbol {
    symbol: Symbol,
    types: CandidateSet,
}

/// Tokenizer over a disjoint terminal set, with byte-range support.
#[derive(Clone, Debug)]
pub struct Lexer {
    symbols: Vec<ScanSymbol>,
}

impl Lexer {
    /// Builds the terminal cache and, depending on the configuration,
    /// collapses it into a disjoint symbol set.
    pub fn new(grammar: &Grammar, config: LexerConfig) -> Result<Self, GrammarError> {
        let cache = TermCache::new(grammar);
        let occurrences: Vec<ScanSymbol> = cache
            .occurrences()
            .iter()
            .map(|(symbol, types)| ScanSymbol {
                symbol: symbol.clone(),
                types: types.clone(),
            })
            .collect();

        let symbols = if config.handle_duplicates {
            collapse(occurrences)
        } else {
            merge_identical(occurrences, config.handle_duplicates_at_runtime)?
        };
        log::debug!("advanced lexer built with {} scan symbols", symbols.len());
        Ok(Lexer { symbols })
    }

    /// The scan set: each symbol with its candidate owners. With
    /// duplicate handling enabled, single-byte footprints never
    /// overlap between entries.
    pub fn scan_symbols(&self) -> impl Iterator<Item = (&Symbol, &CandidateSet)> {
        self.symbols.iter().map(|scan| (&scan.symbol, &scan.types))
    }

    /// Scans the input longest-match. At every position the longest
    /// matching literal wins; a byte range matches a single byte.
    /// Emitted tokens carry the full candidate set of the matched
    /// symbol. Adjacent same-type tokens are not merged.
    pub fn run(&self, text: &[u8]) -> Result<Vec<Token>, TokenizeError> {
        let mut tokens = vec![];
        let mut pos = 0;
        while pos < text.len() {
            let mut best: Option<(usize, &ScanSymbol)> = None;
            for scan in &self.symbols {
                let len = match &scan.symbol {
                    Symbol::Terminal(lit) => {
                        if text[pos..].starts_with(lit) {
                            lit.len()
                        } else {
                            continue;
                        }
                    }
                    Symbol::TerminalRange(lo, hi) => {
                        if *lo <= text[pos] && text[pos] <= *hi {
                            1
                        } else {
                            continue;
                        }
                    }
                    _ => continue,
                };
                let longer = match best {
                    Some((best_len, _)) => len > best_len,
                    None => true,
                };
                if longer {
                    best = Some((len, scan));
                }
            }
            match best {
                Some((len, scan)) => {
                    tokens.push(Token::new(text[pos..pos + len].to_vec(), scan.types.clone()));
                    pos += len;
                }
                None => return Err(TokenizeError::NoMatch { offset: pos }),
            }
        }
        Ok(tokens)
    }
}

/// Unions candidate sets of identical symbols. Without the runtime
/// duplicate flag, a terminal owned by several rules is a build
/// error, and so are distinct single-byte footprints that overlap;
/// with it, identical symbols merge and overlapping ranges are left
/// as they are, resolved first-match.
fn merge_identical(
    occurrences: Vec<ScanSymbol>,
    allow_duplicates: bool,
) -> Result<Vec<ScanSymbol>, GrammarError> {
    let mut out: Vec<ScanSymbol> = vec![];
    for occ in occurrences {
        match out.iter_mut().find(|have| have.symbol == occ.symbol) {
            Some(have) => {
                if !allow_duplicates && have.types != occ.types {
                    return Err(GrammarError::DuplicateTerminal(describe(&occ.symbol)));
                }
                have.types.union(&occ.types);
            }
            None => out.push(occ),
        }
    }
    if !allow_duplicates {
        let multi_byte = |s: &Symbol| matches!(s, Symbol::Terminal(lit) if lit.len() > 1);
        for (i, a) in out.iter().enumerate() {
            for b in &out[i + 1..] {
                if symbols_intersect(&a.symbol, &b.symbol)
                    && !multi_byte(&a.symbol)
                    && !multi_byte(&b.symbol)
                {
                    return Err(GrammarError::DuplicateTerminal(describe(&a.symbol)));
                }
            }
        }
    }
    Ok(out)
}

/// Pairwise fragmentation fixpoint. Each pending symbol is collapsed
/// against the already-disjoint set: identical symbols merge their
/// candidate sets; overlapping symbols are replaced by their disjoint
/// pieces, which are reprocessed until nothing overlaps.
fn collapse(occurrences: Vec<ScanSymbol>) -> Vec<ScanSymbol> {
    let mut disjoint: Vec<ScanSymbol> = vec![];
    let mut pending: VecDeque<ScanSymbol> = occurrences.into();

    'next: while let Some(mut item) = pending.pop_front() {
        for i in 0..disjoint.len() {
            if disjoint[i].symbol == item.symbol {
                disjoint[i].types.union(&item.types);
                continue 'next;
            }
            if !symbols_intersect(&disjoint[i].symbol, &item.symbol) {
                continue;
            }
            match intersect_pieces(&disjoint[i].symbol, &item.symbol) {
                Some(pieces) => {
                    let have = disjoint.remove(i);
                    for piece in pieces {
                        let types = match piece.from {
                            Provenance::Left => have.types.clone(),
                            Provenance::Right => item.types.clone(),
                            Provenance::Union => {
                                let mut both = have.types.clone();
                                both.union(&item.types);
                                both
                            }
                        };
                        pending.push_back(ScanSymbol {
                            symbol: piece.symbol,
                            types,
                        });
                    }
                    continue 'next;
                }
                None => {
                    // A multi-byte literal over a range: the literal
                    // absorbs the range's owners and both stay; the
                    // scanner's longest-match keeps them apart.
                    if item.symbol.is_terminal() {
                        let range_types = disjoint[i].types.clone();
                        item.types.union(&range_types);
                    } else {
                        let item_types = item.types.clone();
                        disjoint[i].types.union(&item_types);
                    }
                }
            }
        }
        disjoint.push(item);
    }
    disjoint
}

fn describe(sym: &Symbol) -> String {
    match sym {
        Symbol::Terminal(lit) => display(lit),
        Symbol::TerminalRange(lo, hi) => {
            format!("[{}-{}]", *lo as char, *hi as char)
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{concat, define, nterm, repeat, rules_def, term, term_range};

    #[test]
    fn keyword_and_range_disambiguate() {
        // "if" is a keyword; [a-z] names a character class elsewhere.
        let grammar = Grammar::new(rules_def([
            define(nterm("kw"), term("if")),
            define(nterm("ch"), repeat(term_range(b'a', b'z'))),
        ]))
        .unwrap();
        let kw = grammar.rule_id(b"kw").unwrap();
        let ch = grammar.rule_id(b"ch").unwrap();

        let lexer = Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates()).unwrap();
        let tokens = lexer.run(b"ifx").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].value, b"if".to_vec());
        assert!(tokens[0].types.contains(kw));
        assert!(tokens[0].types.contains(ch));
        assert_eq!(tokens[1].value, b"x".to_vec());
        assert_eq!(tokens[1].ty(), Some(ch));
    }

    #[test]
    fn ranges_emit_one_token_per_byte() {
        let grammar = Grammar::new(rules_def([define(
            nterm("ch"),
            repeat(term_range(b'a', b'z')),
        )]))
        .unwrap();
        let lexer = Lexer::new(&grammar, LexerConfig::advanced()).unwrap();
        let tokens = lexer.run(b"abc").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].value, b"a".to_vec());
    }

    #[test]
    fn failure_reports_byte_offset() {
        let grammar = Grammar::new(rules_def([define(
            nterm("ch"),
            repeat(term_range(b'a', b'z')),
        )]))
        .unwrap();
        let lexer = Lexer::new(&grammar, LexerConfig::advanced()).unwrap();
        assert_eq!(lexer.run(b"ab9"), Err(TokenizeError::NoMatch { offset: 2 }));
    }

    #[test]
    fn duplicate_terminal_without_handling_is_rejected() {
        let grammar = Grammar::new(rules_def([
            define(nterm("a"), term("x")),
            define(nterm("b"), concat([term("x"), term("y")])),
        ]))
        .unwrap();
        assert!(Lexer::new(&grammar, LexerConfig::advanced()).is_err());
        let lexer =
            Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates_at_runtime()).unwrap();
        let tokens = lexer.run(b"xy").unwrap();
        assert_eq!(tokens[0].types.len(), 2);
        assert_eq!(tokens[1].types.len(), 1);
    }

    #[test]
    fn collapsed_scan_set_is_disjoint() {
        let grammar = Grammar::new(rules_def([
            define(nterm("kw"), term("if")),
            define(nterm("low"), repeat(term_range(b'a', b'm'))),
            define(nterm("wide"), repeat(term_range(b'a', b'z'))),
        ]))
        .unwrap();
        let lexer = Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates()).unwrap();

        let symbols: Vec<&Symbol> = lexer.scan_symbols().map(|(sym, _)| sym).collect();
        for (i, a) in symbols.iter().enumerate() {
            for b in &symbols[i + 1..] {
                // Only a multi-byte literal may share bytes with a
                // range; the scanner separates those by length.
                let multi_byte_literal = |sym: &Symbol| {
                    matches!(sym, Symbol::Terminal(lit) if lit.len() > 1)
                };
                assert!(
                    !symbols_intersect(a, b) || multi_byte_literal(a) || multi_byte_literal(b),
                    "scan symbols {a:?} and {b:?} overlap"
                );
            }
        }
    }

    #[test]
    fn overlapping_ranges_union_their_owners() {
        let grammar = Grammar::new(rules_def([
            define(nterm("low"), repeat(term_range(b'a', b'm'))),
            define(nterm("wide"), repeat(term_range(b'a', b'z'))),
        ]))
        .unwrap();
        let low = grammar.rule_id(b"low").unwrap();
        let wide = grammar.rule_id(b"wide").unwrap();
        let lexer = Lexer::new(&grammar, LexerConfig::advanced().handle_duplicates()).unwrap();

        let tokens = lexer.run(b"cz").unwrap();
        assert!(tokens[0].types.contains(low));
        assert!(tokens[0].types.contains(wide));
        assert_eq!(tokens[1].ty(), Some(wide));
    }
}
