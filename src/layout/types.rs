use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// The arrangement heuristics, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RuleKind {
    Column,
    StrictLine,
    StrictIfThen,
    RelaxedLine,
    RelaxedIfThen,
    Fallback,
}

impl RuleKind {
    pub fn name(self) -> &'static str {
        match self {
            RuleKind::Column => "column",
            RuleKind::StrictLine => "line",
            RuleKind::StrictIfThen => "if-then",
            RuleKind::RelaxedLine => "relaxed-line",
            RuleKind::RelaxedIfThen => "relaxed-if-then",
            RuleKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened during one `arrange` call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArrangeReport {
    /// Rule applications, fallback prunes and splits included.
    pub passes: usize,
    pub hits: BTreeMap<RuleKind, usize>,
    /// Group edges cut by the fallback to break cycles and diamonds.
    pub pruned_edges: usize,
    /// Unknown configurations resolved by the roots/rest split.
    pub forced_splits: usize,
    /// The pass cap was hit and the leftovers were put on a grid.
    pub grid_fallback: bool,
}

impl ArrangeReport {
    pub fn hits(&self, kind: RuleKind) -> usize {
        self.hits.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn record(&mut self, kind: RuleKind) {
        self.passes += 1;
        *self.hits.entry(kind).or_default() += 1;
    }
}
