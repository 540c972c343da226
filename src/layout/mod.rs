mod fallback;
mod group;
mod rules;
pub(crate) mod types;
pub use types::*;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::graph::{BoxGraph, BoxHandle};
use fallback::FallbackRule;
use group::{GroupId, GroupSet};
use rules::{ColumnRule, IfThenRule, LineRule, Rule, Step};

/// Clean shapes first, then approximations, then the structural fallback.
const RULES: [&dyn Rule; 6] = [
    &ColumnRule,
    &LineRule { strict: true },
    &IfThenRule { strict: true },
    &LineRule { strict: false },
    &IfThenRule { strict: false },
    &FallbackRule,
];

/// Places every box of `graph`, writing only `x`/`y` and the order of the
/// adjacency lists.
pub(crate) fn arrange_boxes<K, C>(
    graph: &mut BoxGraph<K, C>,
    config: &LayoutConfig,
) -> ArrangeReport {
    let mut report = ArrangeReport::default();
    if graph.is_empty() {
        return report;
    }

    let handles: Vec<BoxHandle> = graph.handles().to_vec();
    let slot_of: HashMap<BoxHandle, usize> = handles
        .iter()
        .enumerate()
        .map(|(idx, h)| (*h, idx))
        .collect();
    let mut sizes = Vec::with_capacity(handles.len());
    let mut edges = Vec::new();
    for (idx, handle) in handles.iter().enumerate() {
        let Some(b) = graph.get(*handle) else {
            continue;
        };
        sizes.push((b.width(), b.height()));
        edges.extend(
            b.to()
                .iter()
                .filter_map(|t| slot_of.get(t))
                .map(|&dst| (idx, dst)),
        );
    }

    let mut set = GroupSet::new(&sizes, &edges, config);
    run(&mut set, config, &mut report);

    for (handle, rect) in handles.iter().zip(&set.boxes) {
        if let Some(b) = graph.get_mut(*handle) {
            b.set_position(rect.x, rect.y);
        }
    }
    graph.sort_adjacency_by_x();
    debug!(
        boxes = handles.len(),
        passes = report.passes,
        pruned = report.pruned_edges,
        splits = report.forced_splits,
        "arranged graph"
    );
    report
}

/// Applies rules until a single group is left or the pass cap is hit.
pub(crate) fn run(set: &mut GroupSet, config: &LayoutConfig, report: &mut ArrangeReport) {
    let cap = config
        .max_passes
        .unwrap_or_else(|| set.len() + set.edge_count() + 1);
    while set.len() > 1 {
        if report.passes >= cap {
            warn!(
                groups = set.len(),
                passes = report.passes,
                "layout pass cap reached, placing remaining groups on a grid"
            );
            place_on_grid(set);
            report.grid_fallback = true;
            break;
        }
        let Some((kind, step)) = RULES
            .iter()
            .find_map(|rule| rule.find(set).map(|step| (rule.kind(), step)))
        else {
            // unreachable with the fallback in place, but never spin
            place_on_grid(set);
            report.grid_fallback = true;
            break;
        };
        debug!(rule = %kind, groups = set.len(), "applying layout rule");
        report.record(kind);
        match &step {
            Step::Prune(cuts) => report.pruned_edges += cuts.len(),
            Step::Split { .. } => report.forced_splits += 1,
            _ => {}
        }
        apply(set, step, config);
    }
}

fn apply(set: &mut GroupSet, step: Step, config: &LayoutConfig) {
    match step {
        Step::Column(ids) => {
            set.align_vertical(&ids);
            set.merge(&ids);
        }
        Step::Line(ids) => {
            let edge_total: usize = ids
                .iter()
                .map(|id| set.group(*id).to.len() + set.group(*id).from.len())
                .sum();
            let dy = config.fan_reserve * edge_total as f32;
            for &id in &ids {
                set.pad(id, 0.0, -dy / 2.0, 0.0, dy);
            }
            set.align_horizontal(&ids);
            set.merge(&ids);
        }
        Step::IfThen { head, branch } => {
            set.pad(branch, 0.0, -config.branch_pad / 2.0, 0.0, config.branch_pad);
            set.align_vertical(&[head, branch]);
            let left = set.group(branch).bounds.x;
            set.move_group(branch, config.branch_indent - left, 0.0);
            set.merge(&[head, branch]);
        }
        Step::Prune(cuts) => {
            for (src, dst) in cuts {
                set.cut_edge(src, dst);
            }
        }
        Step::Split { roots, rest } => {
            let left = column(set, &roots, config);
            let right = column(set, &rest, config);
            set.align_horizontal(&[left, right]);
            set.merge(&[left, right]);
        }
    }
}

/// One widened column out of `ids`, for either side of a forced split.
fn column(set: &mut GroupSet, ids: &[GroupId], config: &LayoutConfig) -> GroupId {
    set.align_vertical(ids);
    let merged = set.merge(ids);
    set.pad(merged, -config.split_offset, 0.0, config.split_extra_width, 0.0);
    merged
}

/// Rows of roughly `sqrt(n)` groups in discovery order, stacked and merged.
fn place_on_grid(set: &mut GroupSet) {
    let ids = set.order().to_vec();
    if ids.len() <= 1 {
        return;
    }
    let per_row = (ids.len() as f64).sqrt().ceil() as usize;
    let mut rows = Vec::new();
    for chunk in ids.chunks(per_row.max(1)) {
        set.align_horizontal(chunk);
        rows.push(set.merge(chunk));
    }
    set.align_vertical(&rows);
    set.merge(&rows);
}
