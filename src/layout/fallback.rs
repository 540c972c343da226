use std::collections::{HashSet, VecDeque};

use tracing::{trace, warn};

use super::group::{GroupId, GroupSet};
use super::rules::{Rule, Step};
use super::types::RuleKind;

/// Last resort when no clean or approximate shape matches.
///
/// First tries to turn the graph into a spanning forest by cutting edges; if
/// there is nothing left to cut, splits roots from what they reach.
pub(crate) struct FallbackRule;

impl Rule for FallbackRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Fallback
    }

    fn find(&self, set: &GroupSet) -> Option<Step> {
        if set.len() <= 1 {
            return None;
        }
        let roots = roots(set);
        let cuts = spanning_cuts(set, &roots);
        if !cuts.is_empty() {
            trace!(cut = cuts.len(), "pruning group edges");
            return Some(Step::Prune(cuts));
        }

        warn!(groups = %set.describe(), "unknown configuration");
        let mut rest = reachable(set, &roots);
        if rest.is_empty() {
            rest = set
                .order()
                .iter()
                .copied()
                .filter(|g| !roots.contains(g))
                .collect();
        }
        if rest.is_empty() {
            return Some(Step::Column(roots));
        }
        Some(Step::Split { roots, rest })
    }
}

/// Groups without predecessors, or the first group when every group has one.
pub(crate) fn roots(set: &GroupSet) -> Vec<GroupId> {
    let roots: Vec<GroupId> = set
        .order()
        .iter()
        .copied()
        .filter(|g| set.group(*g).from.is_empty())
        .collect();
    if roots.is_empty() {
        set.order().iter().take(1).copied().collect()
    } else {
        roots
    }
}

/// Edges a depth-first walk from `roots` would have to drop to end up with a
/// spanning forest: any edge into a group the walk already reached.
///
/// Which side of a diamond or cycle loses its edge depends on successor order.
pub(crate) fn spanning_cuts(set: &GroupSet, roots: &[GroupId]) -> Vec<(GroupId, GroupId)> {
    let mut visited: HashSet<GroupId> = HashSet::new();
    let mut cuts = Vec::new();
    for &root in roots {
        if !visited.insert(root) {
            continue;
        }
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (node, cursor) = *top;
            let succs = &set.group(node).to;
            if cursor >= succs.len() {
                stack.pop();
                continue;
            }
            top.1 += 1;
            let child = succs[cursor];
            if visited.insert(child) {
                stack.push((child, 0));
            } else {
                cuts.push((node, child));
            }
        }
    }
    cuts
}

/// Everything reachable from `roots`, excluding the roots, in discovery order.
fn reachable(set: &GroupSet, roots: &[GroupId]) -> Vec<GroupId> {
    let mut seen: HashSet<GroupId> = roots.iter().copied().collect();
    let mut queue: VecDeque<GroupId> = roots.iter().copied().collect();
    let mut out = Vec::new();
    while let Some(id) = queue.pop_front() {
        for &next in &set.group(id).to {
            if seen.insert(next) {
                out.push(next);
                queue.push_back(next);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::group::tests::{id, set_of};

    #[test]
    fn roots_fall_back_to_first_group() {
        let set = set_of(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(roots(&set), vec![id(&set, 0)]);
        let set = set_of(3, &[(1, 2)]);
        assert_eq!(roots(&set), vec![id(&set, 0), id(&set, 1)]);
    }

    #[test]
    fn spanning_cuts_break_back_edges() {
        let set = set_of(3, &[(0, 1), (1, 2), (2, 0)]);
        let cuts = spanning_cuts(&set, &roots(&set));
        assert_eq!(cuts, vec![(id(&set, 2), id(&set, 0))]);
    }

    #[test]
    fn spanning_cuts_break_diamonds() {
        // 0 -> {1, 2} -> 3: the second way into 3 is cut
        let set = set_of(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let cuts = spanning_cuts(&set, &roots(&set));
        assert_eq!(cuts, vec![(id(&set, 2), id(&set, 3))]);
    }

    #[test]
    fn spanning_cuts_leave_trees_alone() {
        let set = set_of(4, &[(0, 1), (0, 2), (2, 3)]);
        assert!(spanning_cuts(&set, &roots(&set)).is_empty());
    }

    #[test]
    fn fallback_prunes_before_splitting() {
        let set = set_of(3, &[(0, 1), (1, 2), (2, 0)]);
        let step = FallbackRule.find(&set).unwrap();
        assert_eq!(step, Step::Prune(vec![(id(&set, 2), id(&set, 0))]));
    }

    #[test]
    fn fallback_splits_roots_from_reachable_groups() {
        // 0 -> 1 -> 2 is a tree from the only root, 3 <-> 4 is out of reach
        let set = set_of(5, &[(0, 1), (1, 2), (3, 4), (4, 3)]);
        let step = FallbackRule.find(&set).unwrap();
        assert_eq!(
            step,
            Step::Split {
                roots: vec![id(&set, 0)],
                rest: vec![id(&set, 1), id(&set, 2)],
            }
        );
    }

    #[test]
    fn fallback_splits_off_unreachable_groups() {
        // the lone root reaches nothing; the cycle becomes the right column
        let set = set_of(3, &[(1, 2), (2, 1)]);
        let step = FallbackRule.find(&set).unwrap();
        assert_eq!(
            step,
            Step::Split {
                roots: vec![id(&set, 0)],
                rest: vec![id(&set, 1), id(&set, 2)],
            }
        );
    }

    #[test]
    fn fallback_is_idle_on_a_single_group() {
        let set = set_of(1, &[]);
        assert!(FallbackRule.find(&set).is_none());
    }
}
