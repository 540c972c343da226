use std::fmt::Write as _;

use crate::config::LayoutConfig;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct GroupId(usize);

/// Transient aggregate of boxes. Only lives for one arrangement.
#[derive(Debug, Clone, Default)]
pub(crate) struct Group {
    /// Indices into [`GroupSet::boxes`].
    pub(crate) members: Vec<usize>,
    pub(crate) bounds: Rect,
    pub(crate) to: Vec<GroupId>,
    pub(crate) from: Vec<GroupId>,
}

/// The live groups plus the box rectangles they move around.
///
/// Every box belongs to exactly one live group, and no group lists itself in
/// its own `to`/`from`.
#[derive(Debug, Clone)]
pub(crate) struct GroupSet {
    pub(crate) boxes: Vec<Rect>,
    groups: Vec<Group>,
    order: Vec<GroupId>,
}

fn push_unique(list: &mut Vec<GroupId>, id: GroupId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

impl GroupSet {
    /// One centered singleton group per box. `edges` index into `sizes`.
    pub(crate) fn new(
        sizes: &[(f32, f32)],
        edges: &[(usize, usize)],
        config: &LayoutConfig,
    ) -> Self {
        let boxes: Vec<Rect> = sizes
            .iter()
            .map(|&(w, h)| Rect::new(-w / 2.0, -h / 2.0, w, h))
            .collect();
        let mut groups: Vec<Group> = boxes
            .iter()
            .enumerate()
            .map(|(idx, b)| Group {
                members: vec![idx],
                bounds: Rect::new(
                    b.x - config.group_margin_left,
                    b.y - config.group_margin_top,
                    b.width + config.group_extra_width,
                    b.height + config.group_extra_height,
                ),
                to: Vec::new(),
                from: Vec::new(),
            })
            .collect();
        for &(src, dst) in edges {
            if src == dst || src >= groups.len() || dst >= groups.len() {
                continue;
            }
            push_unique(&mut groups[src].to, GroupId(dst));
            push_unique(&mut groups[dst].from, GroupId(src));
        }
        let order = (0..groups.len()).map(GroupId).collect();
        Self {
            boxes,
            groups,
            order,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Live groups, in their stable iteration order.
    pub(crate) fn order(&self) -> &[GroupId] {
        &self.order
    }

    pub(crate) fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub(crate) fn position(&self, id: GroupId) -> Option<usize> {
        self.order.iter().position(|g| *g == id)
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.order.iter().map(|id| self.group(*id).to.len()).sum()
    }

    /// Translates the group and every box it holds.
    pub(crate) fn move_group(&mut self, id: GroupId, dx: f32, dy: f32) {
        let group = &mut self.groups[id.0];
        group.bounds.translate(dx, dy);
        for &member in &group.members {
            self.boxes[member].translate(dx, dy);
        }
    }

    /// Grows the group rectangle without moving its boxes.
    pub(crate) fn pad(&mut self, id: GroupId, dx: f32, dy: f32, dw: f32, dh: f32) {
        let bounds = &mut self.groups[id.0].bounds;
        bounds.x += dx;
        bounds.y += dy;
        bounds.width += dw;
        bounds.height += dh;
    }

    /// Lays the groups out left to right, the whole row centered on x = 0.
    pub(crate) fn align_horizontal(&mut self, ids: &[GroupId]) {
        let total: f32 = ids.iter().map(|id| self.group(*id).bounds.width).sum();
        let mut nx = -total / 2.0;
        for &id in ids {
            let bounds = self.group(id).bounds;
            self.move_group(id, nx - bounds.x, 0.0);
            nx += bounds.width;
        }
    }

    /// Stacks the groups top to bottom, the whole column centered on y = 0.
    pub(crate) fn align_vertical(&mut self, ids: &[GroupId]) {
        let total: f32 = ids.iter().map(|id| self.group(*id).bounds.height).sum();
        let mut ny = -total / 2.0;
        for &id in ids {
            let bounds = self.group(id).bounds;
            self.move_group(id, 0.0, ny - bounds.y);
            ny += bounds.height;
        }
    }

    /// Removes the group edge `src -> dst` on both ends.
    pub(crate) fn cut_edge(&mut self, src: GroupId, dst: GroupId) {
        self.groups[src.0].to.retain(|g| *g != dst);
        self.groups[dst.0].from.retain(|g| *g != src);
    }

    /// Replaces `ids` with one group covering all of them.
    ///
    /// Edges between members disappear, neighbors are rewired to the new
    /// group, and it takes the slot of the lowest-positioned member.
    pub(crate) fn merge(&mut self, ids: &[GroupId]) -> GroupId {
        let merged_id = GroupId(self.groups.len());
        let mut merged = Group::default();
        let mut bounds: Option<Rect> = None;
        for &id in ids {
            let group = std::mem::take(&mut self.groups[id.0]);
            bounds = Some(match bounds {
                Some(acc) => acc.union(&group.bounds),
                None => group.bounds,
            });
            merged.members.extend(group.members);
            for t in group.to {
                push_unique(&mut merged.to, t);
            }
            for f in group.from {
                push_unique(&mut merged.from, f);
            }
        }
        merged.bounds = bounds.unwrap_or_default();
        merged.to.retain(|g| !ids.contains(g));
        merged.from.retain(|g| !ids.contains(g));

        for &t in &merged.to {
            let from = &mut self.groups[t.0].from;
            from.retain(|g| !ids.contains(g));
            from.push(merged_id);
        }
        for &f in &merged.from {
            let to = &mut self.groups[f.0].to;
            to.retain(|g| !ids.contains(g));
            to.push(merged_id);
        }
        self.groups.push(merged);

        let slot = ids
            .iter()
            .filter_map(|id| self.position(*id))
            .min()
            .unwrap_or(self.order.len());
        self.order.retain(|g| !ids.contains(g));
        self.order.insert(slot.min(self.order.len()), merged_id);
        merged_id
    }

    /// `0 -> [1, 2]; 1 -> []` style dump, by position in the live order.
    pub(crate) fn describe(&self) -> String {
        let mut out = String::new();
        for (idx, &id) in self.order.iter().enumerate() {
            let targets: Vec<String> = self
                .group(id)
                .to
                .iter()
                .filter_map(|t| self.position(*t))
                .map(|p| p.to_string())
                .collect();
            if idx > 0 {
                out.push_str("; ");
            }
            let _ = write!(out, "{idx} -> [{}]", targets.join(", "));
        }
        out
    }
}
