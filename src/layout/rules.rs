use super::group::{GroupId, GroupSet};
use super::types::RuleKind;

/// A pending change to the group graph, produced by a [`Rule`] match.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    /// Stack top to bottom and merge.
    Column(Vec<GroupId>),
    /// Reserve fan-out room, lay out left to right and merge.
    Line(Vec<GroupId>),
    /// Put `branch` under `head`, indented, and merge the pair.
    IfThen { head: GroupId, branch: GroupId },
    /// Cut these group edges; no geometry changes.
    Prune(Vec<(GroupId, GroupId)>),
    /// Two side-by-side columns, roots on the left.
    Split {
        roots: Vec<GroupId>,
        rest: Vec<GroupId>,
    },
}

/// A local shape recognizer over the current groups.
pub(crate) trait Rule {
    fn kind(&self) -> RuleKind;
    fn find(&self, set: &GroupSet) -> Option<Step>;
}

fn same_set(a: &[GroupId], b: &[GroupId]) -> bool {
    a.iter().all(|g| b.contains(g)) && b.iter().all(|g| a.contains(g))
}

fn intersects(a: &[GroupId], b: &[GroupId]) -> bool {
    a.iter().any(|g| b.contains(g))
}

/// Single-entry single-exit chains.
pub(crate) struct ColumnRule;

impl Rule for ColumnRule {
    fn kind(&self) -> RuleKind {
        RuleKind::Column
    }

    fn find(&self, set: &GroupSet) -> Option<Step> {
        for &head in set.order() {
            let g = set.group(head);
            // not a chain head: its only predecessor flows straight into it
            if g.from.len() == 1 && set.group(g.from[0]).to.len() == 1 {
                continue;
            }
            let mut chain = vec![head];
            let mut cur = head;
            loop {
                let c = set.group(cur);
                if c.to.len() != 1 {
                    break;
                }
                let next = c.to[0];
                if set.group(next).from.len() != 1 || chain.contains(&next) {
                    break;
                }
                chain.push(next);
                cur = next;
            }
            if chain.len() > 1 {
                return Some(Step::Column(chain));
            }
        }
        None
    }
}

/// Siblings sharing their predecessors and (some of) their successors.
pub(crate) struct LineRule {
    pub(crate) strict: bool,
}

impl Rule for LineRule {
    fn kind(&self) -> RuleKind {
        if self.strict {
            RuleKind::StrictLine
        } else {
            RuleKind::RelaxedLine
        }
    }

    fn find(&self, set: &GroupSet) -> Option<Step> {
        for &id in set.order() {
            let g = set.group(id);
            let line: Vec<GroupId> = set
                .order()
                .iter()
                .copied()
                .filter(|&other| {
                    let o = set.group(other);
                    same_set(&g.from, &o.from)
                        && if self.strict {
                            same_set(&g.to, &o.to)
                        } else {
                            intersects(&g.to, &o.to)
                        }
                })
                .collect();
            if line.len() > 1 {
                return Some(Step::Line(line));
            }
        }
        None
    }
}

/// `head -> branch -> join` alongside `head -> join`.
pub(crate) struct IfThenRule {
    pub(crate) strict: bool,
}

impl Rule for IfThenRule {
    fn kind(&self) -> RuleKind {
        if self.strict {
            RuleKind::StrictIfThen
        } else {
            RuleKind::RelaxedIfThen
        }
    }

    fn find(&self, set: &GroupSet) -> Option<Step> {
        for &head in set.order().iter().rev() {
            let g = set.group(head);
            let branch = g.to.iter().copied().find(|&candidate| {
                let b = set.group(candidate);
                let rejoins = b.to.len() == 1 && g.to.contains(&b.to[0]);
                let dead_end = !self.strict && b.to.is_empty();
                let exclusive = !self.strict || b.from == [head];
                (rejoins || dead_end) && exclusive
            });
            if let Some(branch) = branch {
                return Some(Step::IfThen { head, branch });
            }
        }
        None
    }
}
