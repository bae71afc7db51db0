//! Static analyses over a validated grammar: reverse-rule tables,
//! follow sets, and deterministic prefix/postfix positions. All of
//! them are pure functions of the grammar, built once and immutable
//! afterwards.

mod first;
mod fix;
mod follow;
mod reverse;

pub use self::first::{FirstSets, FollowItem};
pub use self::fix::{FixEntry, FixLimits, FixTables};
pub use self::follow::FollowSets;
pub use self::reverse::ReverseRules;

use crate::grammar::Grammar;

/// The full set of precomputed analyses consumed by the shift-reduce
/// parser and its context manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analyses {
    /// Reverse-rule tables.
    pub reverse: ReverseRules,
    /// Nullability and leftmost-symbol tables.
    pub first: FirstSets,
    /// Follow sets.
    pub follow: FollowSets,
    /// Prefix/postfix position tables.
    pub fixes: FixTables,
}

impl Analyses {
    /// Builds every analysis for the grammar.
    pub fn new(grammar: &Grammar) -> Self {
        let reverse = ReverseRules::new(grammar);
        let first = FirstSets::new(grammar);
        let follow = FollowSets::new(grammar, &first);
        let fixes = FixTables::new(grammar);
        log::debug!("analyses built for {} rules", grammar.num_rules());
        Analyses {
            reverse,
            first,
            follow,
            fixes,
        }
    }
}
