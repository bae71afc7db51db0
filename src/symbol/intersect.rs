//! Byte-footprint intersection of terminal symbols, and fragmentation
//! of overlapping pairs into disjoint pieces. The advanced tokenizer
//! runs the fragmentation to a fixpoint so that every scanned byte
//! resolves to exactly one symbol with a known candidate-type set.

use super::Symbol;

/// Which side of an intersected pair a fragment's candidate types
/// come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provenance {
    /// Candidates of the first symbol.
    Left,
    /// Candidates of the second symbol.
    Right,
    /// Union of both candidate sets.
    Union,
}

/// A disjoint fragment produced by [`intersect_pieces`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Piece {
    /// The fragment symbol.
    pub symbol: Symbol,
    /// Where its candidate types come from.
    pub from: Provenance,
}

impl Piece {
    fn new(symbol: Symbol, from: Provenance) -> Self {
        Piece { symbol, from }
    }
}

/// Checks whether the byte footprints of two terminal symbols overlap.
/// Two literals overlap only when equal; a literal overlaps a range
/// when any of its bytes lies in the range; two ranges overlap when
/// their intervals do. Operators and nonterminals never intersect.
pub fn symbols_intersect(a: &Symbol, b: &Symbol) -> bool {
    match (a, b) {
        (Symbol::Terminal(x), Symbol::Terminal(y)) => x == y,
        (Symbol::Terminal(lit), Symbol::TerminalRange(lo, hi))
        | (Symbol::TerminalRange(lo, hi), Symbol::Terminal(lit)) => {
            lit.iter().any(|byte| lo <= byte && byte <= hi)
        }
        (Symbol::TerminalRange(la, ha), Symbol::TerminalRange(lb, hb)) => la <= hb && lb <= ha,
        _ => false,
    }
}

/// Splits an overlapping pair into disjoint fragments. Returns `None`
/// when the symbols do not overlap, are identical (identical symbols
/// are merged by the caller, not fragmented), or are a multi-byte
/// literal over a range: the literal then takes the union of
/// candidates while the range stays intact, since the scanner's
/// longest-match rule already keeps them apart. Single-byte range
/// fragments collapse into literals.
pub fn intersect_pieces(a: &Symbol, b: &Symbol) -> Option<Vec<Piece>> {
    if a == b || !symbols_intersect(a, b) {
        return None;
    }
    match (a, b) {
        (Symbol::Terminal(lit), Symbol::TerminalRange(lo, hi)) if lit.len() == 1 => {
            Some(literal_range_pieces(lit, *lo, *hi, Provenance::Right))
        }
        (Symbol::TerminalRange(lo, hi), Symbol::Terminal(lit)) if lit.len() == 1 => {
            Some(literal_range_pieces(lit, *lo, *hi, Provenance::Left))
        }
        (Symbol::TerminalRange(la, ha), Symbol::TerminalRange(lb, hb)) => {
            Some(range_range_pieces(*la, *ha, *lb, *hb))
        }
        _ => None,
    }
}

fn range_symbol(lo: u8, hi: u8) -> Symbol {
    if lo == hi {
        Symbol::Terminal(vec![lo])
    } else {
        Symbol::TerminalRange(lo, hi)
    }
}

/// A single-byte literal punches a hole in a range it overlaps: the
/// literal keeps its value with the union of candidates, and the
/// remainders of the range keep the range's own candidates.
fn literal_range_pieces(lit: &[u8], lo: u8, hi: u8, range_side: Provenance) -> Vec<Piece> {
    let byte = lit[0];
    let mut pieces = vec![Piece::new(Symbol::Terminal(lit.to_vec()), Provenance::Union)];
    if lo < byte {
        pieces.push(Piece::new(range_symbol(lo, byte - 1), range_side));
    }
    if byte < hi {
        pieces.push(Piece::new(range_symbol(byte + 1, hi), range_side));
    }
    pieces
}

/// Two overlapping ranges split into at most three disjoint intervals:
/// the part below the overlap, the overlap with unioned candidates,
/// and the part above.
fn range_range_pieces(la: u8, ha: u8, lb: u8, hb: u8) -> Vec<Piece> {
    let lo_min = la.min(lb);
    let lo_max = la.max(lb);
    let hi_min = ha.min(hb);
    let hi_max = ha.max(hb);
    let lower_side = if la < lb {
        Provenance::Left
    } else {
        Provenance::Right
    };
    let upper_side = if ha > hb {
        Provenance::Left
    } else {
        Provenance::Right
    };

    let mut pieces = vec![];
    if lo_min < lo_max {
        pieces.push(Piece::new(range_symbol(lo_min, lo_max - 1), lower_side));
    }
    pieces.push(Piece::new(range_symbol(lo_max, hi_min), Provenance::Union));
    if hi_min < hi_max {
        pieces.push(Piece::new(range_symbol(hi_min + 1, hi_max), upper_side));
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{term, term_range};

    #[test]
    fn range_intersection_is_interval_overlap() {
        assert!(symbols_intersect(&term_range(b'a', b'm'), &term_range(b'k', b'z')));
        assert!(!symbols_intersect(&term_range(b'a', b'c'), &term_range(b'd', b'z')));
        assert!(symbols_intersect(&term("if"), &term_range(b'a', b'z')));
        assert!(!symbols_intersect(&term("0"), &term_range(b'a', b'z')));
    }

    #[test]
    fn single_byte_literal_punches_hole() {
        let pieces = intersect_pieces(&term("c"), &term_range(b'a', b'e')).unwrap();
        assert_eq!(
            pieces,
            vec![
                Piece::new(term("c"), Provenance::Union),
                Piece::new(term_range(b'a', b'b'), Provenance::Right),
                Piece::new(term_range(b'd', b'e'), Provenance::Right),
            ]
        );
    }

    #[test]
    fn long_literal_does_not_fragment_the_range() {
        assert!(symbols_intersect(&term("if"), &term_range(b'a', b'z')));
        assert!(intersect_pieces(&term("if"), &term_range(b'a', b'z')).is_none());
    }

    #[test]
    fn overlapping_ranges_split_in_three() {
        let pieces = intersect_pieces(&term_range(b'a', b'm'), &term_range(b'k', b'z')).unwrap();
        assert_eq!(
            pieces,
            vec![
                Piece::new(term_range(b'a', b'j'), Provenance::Left),
                Piece::new(term_range(b'k', b'm'), Provenance::Union),
                Piece::new(term_range(b'n', b'z'), Provenance::Right),
            ]
        );
    }

    #[test]
    fn identical_symbols_are_not_fragmented() {
        assert!(intersect_pieces(&term("x"), &term("x")).is_none());
        assert!(intersect_pieces(&term_range(b'a', b'z'), &term_range(b'a', b'z')).is_none());
    }
}
