//! Orthogonal arrow routes between already placed boxes.
//!
//! Routes are computed in viewport space: box coordinates minus the view
//! origin, scaled by the zoom factor. Nothing here depends on how the boxes
//! were laid out.

use serde::Serialize;

use crate::config::RouteConfig;
use crate::geometry::Rect;
use crate::graph::{BoxGraph, BoxHandle};

/// Slack kept around the graph when fitting it into a viewport.
const FIT_SLACK: f32 = 10.0;
/// Fitted zoom factors this close to 1 snap to 1.
const FIT_SNAP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouteKind {
    /// Destination is below the source: one straight leg.
    Direct,
    /// Destination is clear on the left.
    Z,
    /// Destination is clear on the right.
    InverseZ,
    /// No side is clear: go around the wider of the two boxes.
    TurnAround,
    /// Both ends are off screen; nothing to draw.
    Culled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Segment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn offset_y(self, dy: f32) -> Self {
        Self::new(self.x1, self.y1 + dy, self.x2, self.y2 + dy)
    }

    /// Clamps each coordinate on its own, so axis-aligned segments stay that way.
    fn clamped(self, limit: f32) -> Self {
        let c = |v: f32| v.max(-limit).min(limit);
        Self::new(c(self.x1), c(self.y1), c(self.x2), c(self.y2))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    /// Stubs, body legs, arrowhead arms, then the doubled legs.
    pub segments: Vec<Segment>,
    pub kind: RouteKind,
}

impl RouteResult {
    fn culled() -> Self {
        Self {
            segments: Vec::new(),
            kind: RouteKind::Culled,
        }
    }
}

/// Position of an edge among the parallel edges sharing one of its ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub count: usize,
}

impl Slot {
    pub const SINGLE: Slot = Slot { index: 0, count: 1 };

    pub fn new(index: usize, count: usize) -> Self {
        Self {
            index,
            count: count.max(index + 1),
        }
    }

    /// Horizontal anchor offset, spreading siblings around the center.
    pub fn offset(self, spacing: f32) -> f32 {
        let center = (self.count.saturating_sub(1) / 2) as f32;
        (self.index as f32 - center) * spacing
    }
}

/// The visible part of the canvas. `width`/`height` are in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            zoom: 1.0,
        }
    }

    /// View of `bounds` at a given zoom, centered on it.
    pub fn centered(bounds: Rect, width: f32, height: f32, zoom: f32) -> Self {
        let zoom = if zoom > 0.0 && zoom.is_finite() { zoom } else { 1.0 };
        Self {
            x: bounds.x + (bounds.width - width / zoom) / 2.0,
            y: bounds.y + (bounds.height - height / zoom) / 2.0,
            width,
            height,
            zoom,
        }
    }

    /// Zooms out just enough to show `bounds`, never zooming in past 1.
    pub fn fit(bounds: Option<Rect>, width: f32, height: f32) -> Self {
        let Some(bounds) = bounds else {
            return Self::new(0.0, 0.0, width, height);
        };
        let padded = Rect::new(
            bounds.x - FIT_SLACK,
            bounds.y - FIT_SLACK,
            bounds.width + 2.0 * FIT_SLACK,
            bounds.height + 2.0 * FIT_SLACK,
        );
        let mut zoom = (width / padded.width).min(height / padded.height);
        if !zoom.is_finite() || zoom > 1.0 || (zoom - 1.0).abs() < FIT_SNAP {
            zoom = 1.0;
        }
        Self::centered(padded, width, height, zoom)
    }

    /// Top-left corner of a world rectangle, in screen units.
    pub fn project(&self, rect: Rect) -> Rect {
        Rect::new(
            (rect.x - self.x) * self.zoom,
            (rect.y - self.y) * self.zoom,
            rect.width * self.zoom,
            rect.height * self.zoom,
        )
    }
}

/// Scales a point towards the origin until both coordinates fit in `limit`.
fn clamp_point(mut x: f32, mut y: f32, limit: f32) -> (f32, f32) {
    if x.abs() > limit {
        let s = x.abs() / limit;
        x /= s;
        y /= s;
    }
    if y.abs() > limit {
        let s = y.abs() / limit;
        x /= s;
        y /= s;
    }
    (x, y)
}

/// Routes the arrow from the bottom of `from` to the top of `to`.
pub fn compute_route(
    from: Rect,
    to: Rect,
    fan_out: Slot,
    fan_in: Slot,
    viewport: &Viewport,
    config: &RouteConfig,
) -> RouteResult {
    let x1 = from.center_x() + fan_out.offset(config.fan_spacing) - viewport.x;
    let y1 = from.bottom() - viewport.y;
    let x2 = to.center_x() + fan_in.offset(config.fan_spacing) - viewport.x;
    let y2 = to.y - viewport.y;

    // vertical culling only, in unscaled units
    let visible = viewport.height / viewport.zoom;
    let margin = config.margin;
    if (y1 + margin < 0.0 && y2 < 0.0) || (y1 > visible && y2 - margin > visible) {
        return RouteResult::culled();
    }

    let zoom = viewport.zoom;
    let m = margin * zoom;
    let half_from = from.width * zoom / 2.0;
    let half_to = to.width * zoom / 2.0;
    let (x1, mut y1) = clamp_point(x1 * zoom, y1 * zoom, config.coord_limit);
    let (x2, mut y2) = clamp_point(x2 * zoom, y2 * zoom, config.coord_limit);

    let mut segments = Vec::with_capacity(12);
    if m > 1.0 {
        segments.push(Segment::new(x1, y1, x1, y1 + m));
        segments.push(Segment::new(x2, y2 - m, x2, y2));
        y1 += m;
        y2 -= m;
    }

    let (kind, legs) = if y2 + m >= y1 - m {
        (RouteKind::Direct, vec![Segment::new(x1, y1, x2, y2)])
    } else if x1 - half_from - m >= x2 + half_to + m {
        let x = ((x1 - half_from - m) + (x2 + half_to + m)) / 2.0;
        (RouteKind::Z, detour(x1, y1, x2, y2, x))
    } else if x1 + half_from + m <= x2 - half_to - m {
        let x = ((x1 + half_from + m) + (x2 - half_to - m)) / 2.0;
        (RouteKind::InverseZ, detour(x1, y1, x2, y2, x))
    } else {
        let x = if x1 <= x2 {
            (x1 - half_from - m).min(x2 - half_to - m)
        } else {
            (x1 + half_from + m).max(x2 + half_to + m)
        };
        (RouteKind::TurnAround, detour(x1, y1, x2, y2, x))
    };
    segments.extend(legs.iter().copied());

    if m > 1.0 {
        let tip_y = y2 + m;
        segments.push(Segment::new(x2 - m / 2.0, tip_y - m / 2.0, x2, tip_y));
        segments.push(Segment::new(x2 + m / 2.0, tip_y - m / 2.0, x2, tip_y));
    }

    if kind != RouteKind::Direct {
        let first = legs[0];
        let last = legs[legs.len() - 1];
        segments.push(first.offset_y(config.emphasis_offset));
        segments.push(last.offset_y(config.emphasis_offset));
    }

    let limit = config.coord_limit.abs();
    for s in &mut segments {
        *s = s.clamped(limit);
    }
    RouteResult { segments, kind }
}

/// Across at the source level, up or down at `x`, across to the destination.
fn detour(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> Vec<Segment> {
    vec![
        Segment::new(x1, y1, x, y1),
        Segment::new(x, y1, x, y2),
        Segment::new(x, y2, x2, y2),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeRoute {
    #[serde(skip)]
    pub from: BoxHandle,
    #[serde(skip)]
    pub to: BoxHandle,
    #[serde(flatten)]
    pub route: RouteResult,
}

/// Routes every edge of `graph`, using each edge's position in the sorted
/// adjacency lists as its fan slot. Culled edges are kept.
pub fn route_graph<K, C>(
    graph: &BoxGraph<K, C>,
    viewport: &Viewport,
    config: &RouteConfig,
) -> Vec<EdgeRoute> {
    let mut routes = Vec::with_capacity(graph.edge_count());
    for (handle, src) in graph.boxes() {
        for (out_idx, &target) in src.to().iter().enumerate() {
            let Some(dst) = graph.get(target) else {
                continue;
            };
            let in_idx = dst.from().iter().position(|h| *h == handle).unwrap_or(0);
            let route = compute_route(
                src.rect(),
                dst.rect(),
                Slot::new(out_idx, src.to().len()),
                Slot::new(in_idx, dst.from().len()),
                viewport,
                config,
            );
            routes.push(EdgeRoute {
                from: handle,
                to: target,
                route,
            });
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Viewport {
        Viewport::new(-500.0, -500.0, 1000.0, 1000.0)
    }

    fn route(from: Rect, to: Rect) -> RouteResult {
        compute_route(from, to, Slot::SINGLE, Slot::SINGLE, &view(), &RouteConfig::default())
    }

    fn is_orthogonal(segments: &[Segment]) -> bool {
        segments
            .iter()
            .all(|s| (s.x1 - s.x2).abs() < 1e-4 || (s.y1 - s.y2).abs() < 1e-4)
    }

    #[test]
    fn stacked_boxes_route_directly() {
        let r = route(
            Rect::new(-20.0, -100.0, 40.0, 20.0),
            Rect::new(-20.0, 0.0, 40.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::Direct);
        // stubs, the leg, two arrowhead arms
        assert_eq!(r.segments.len(), 5);
        assert_eq!(r.segments[0], Segment::new(500.0, 420.0, 500.0, 428.0));
        assert_eq!(r.segments[2], Segment::new(500.0, 428.0, 500.0, 492.0));
    }

    #[test]
    fn back_edge_with_left_clearance_is_z() {
        let r = route(
            Rect::new(100.0, 100.0, 40.0, 20.0),
            Rect::new(-100.0, 0.0, 40.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::Z);
        let body = &r.segments[2..5];
        assert!(is_orthogonal(body));
        // vertical leg runs in the gap between the boxes
        let gap_x = body[1].x1 + view().x;
        assert!(gap_x > -60.0 && gap_x < 100.0);
        assert!(body[1].y2 < body[1].y1);
    }

    #[test]
    fn back_edge_with_right_clearance_is_inverse_z() {
        let r = route(
            Rect::new(-100.0, 100.0, 40.0, 20.0),
            Rect::new(100.0, 0.0, 40.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::InverseZ);
        assert!(is_orthogonal(&r.segments[2..5]));
    }

    #[test]
    fn back_edge_over_itself_turns_around() {
        let r = route(
            Rect::new(-20.0, 100.0, 40.0, 20.0),
            Rect::new(-30.0, 0.0, 60.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::TurnAround);
        let body = &r.segments[2..5];
        assert!(is_orthogonal(body));
        // goes around the wider destination on the left
        assert_eq!(body[1].x1, 500.0 - 30.0 - 8.0);
    }

    #[test]
    fn detours_double_their_horizontal_legs() {
        let r = route(
            Rect::new(-20.0, 100.0, 40.0, 20.0),
            Rect::new(-30.0, 0.0, 60.0, 20.0),
        );
        let n = r.segments.len();
        assert_eq!(n, 9);
        assert_eq!(r.segments[n - 2], r.segments[2].offset_y(1.0));
        assert_eq!(r.segments[n - 1], r.segments[4].offset_y(1.0));
    }

    #[test]
    fn off_screen_edges_are_culled() {
        let r = route(
            Rect::new(0.0, -900.0, 40.0, 20.0),
            Rect::new(0.0, -700.0, 40.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::Culled);
        assert!(r.segments.is_empty());
        let r = route(
            Rect::new(0.0, 700.0, 40.0, 20.0),
            Rect::new(0.0, 900.0, 40.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::Culled);
    }

    #[test]
    fn partially_visible_edges_are_kept() {
        let r = route(
            Rect::new(0.0, -900.0, 40.0, 20.0),
            Rect::new(0.0, 0.0, 40.0, 20.0),
        );
        assert_eq!(r.kind, RouteKind::Direct);
    }

    #[test]
    fn far_coordinates_are_clamped() {
        let config = RouteConfig {
            coord_limit: 1000.0,
            ..RouteConfig::default()
        };
        let r = compute_route(
            Rect::new(4000.0, -20.0, 0.0, 20.0),
            Rect::new(0.0, 100.0, 0.0, 20.0),
            Slot::SINGLE,
            Slot::SINGLE,
            &Viewport::new(0.0, 0.0, 1000.0, 1000.0),
            &config,
        );
        for s in &r.segments {
            for v in [s.x1, s.y1, s.x2, s.y2] {
                assert!(v.abs() <= 1000.0, "{s:?}");
            }
        }
        // the source anchor keeps its slope: x scaled by 4, y by 4
        assert_eq!(r.segments[0].x1, 1000.0);
        assert_eq!(r.segments[0].y1, 0.0);
    }

    #[test]
    fn detours_around_huge_boxes_stay_in_range() {
        let config = RouteConfig::default();
        let limit = config.coord_limit;
        // back edge between two boxes far wider than the coordinate range
        let r = compute_route(
            Rect::new(-50000.0, 100.0, 100000.0, 20.0),
            Rect::new(-50000.0, 0.0, 100000.0, 20.0),
            Slot::SINGLE,
            Slot::SINGLE,
            &Viewport::new(0.0, 0.0, 1000.0, 1000.0),
            &config,
        );
        assert_eq!(r.kind, RouteKind::TurnAround);
        for s in &r.segments {
            for v in [s.x1, s.y1, s.x2, s.y2] {
                assert!(v.is_finite() && v.abs() <= limit, "{s:?}");
            }
        }
        assert!(is_orthogonal(&r.segments[2..5]));
    }

    #[test]
    fn degenerate_boxes_still_route() {
        let r = route(Rect::new(0.0, 0.0, 0.0, 0.0), Rect::new(0.0, 0.0, 0.0, 0.0));
        assert_ne!(r.kind, RouteKind::Culled);
        assert!(!r.segments.is_empty());
        assert!(r.segments.iter().all(|s| s.x1.is_finite() && s.y2.is_finite()));
    }

    #[test]
    fn slots_spread_around_center() {
        let offsets: Vec<f32> = (0..3).map(|i| Slot::new(i, 3).offset(4.0)).collect();
        assert_eq!(offsets, vec![-4.0, 0.0, 4.0]);
        assert_eq!(Slot::SINGLE.offset(4.0), 0.0);
    }

    #[test]
    fn zoom_scales_route() {
        let mut v = view();
        v.zoom = 0.5;
        let r = compute_route(
            Rect::new(-20.0, -100.0, 40.0, 20.0),
            Rect::new(-20.0, 0.0, 40.0, 20.0),
            Slot::SINGLE,
            Slot::SINGLE,
            &v,
            &RouteConfig::default(),
        );
        assert_eq!(r.segments[0], Segment::new(250.0, 210.0, 250.0, 214.0));
    }

    #[test]
    fn fit_zooms_out_for_large_graphs() {
        let v = Viewport::fit(Some(Rect::new(0.0, 0.0, 1980.0, 380.0)), 1000.0, 800.0);
        assert_eq!(v.zoom, 0.5);
        assert_eq!(v.x, -10.0);
        let small = Viewport::fit(Some(Rect::new(0.0, 0.0, 100.0, 100.0)), 1000.0, 800.0);
        assert_eq!(small.zoom, 1.0);
        assert_eq!(small.x, -10.0 + (120.0 - 1000.0) / 2.0);
    }

    #[test]
    fn route_graph_uses_sibling_slots() {
        let mut g: BoxGraph<u8, ()> = BoxGraph::new();
        for i in 0..3 {
            let h = g.create_box(i, ()).unwrap();
            g.get_mut(h).unwrap().set_size(40.0, 20.0);
        }
        g.link_boxes(&0, &1).unwrap();
        g.link_boxes(&0, &2).unwrap();
        g.arrange();
        let v = Viewport::fit(g.bounds(), 800.0, 600.0);
        let routes = route_graph(&g, &v, &RouteConfig::default());
        assert_eq!(routes.len(), 2);
        let starts: Vec<f32> = routes.iter().map(|r| r.route.segments[0].x1).collect();
        assert_eq!(starts[1] - starts[0], 4.0);
        assert!(routes.iter().all(|r| r.route.kind == RouteKind::Direct));
    }
}
