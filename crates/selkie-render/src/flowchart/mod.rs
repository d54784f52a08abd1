//! Flowchart layout: node sizing, placement strategy chain, edge routing.

pub mod layering;
pub mod order;
pub mod strategy;

use crate::model::{Bounds, EdgeLayout, FlowchartLayout, NodeLayout, Point};
use crate::text::{TextMeasurer, TextStyle};
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use selkie_core::{FlowchartModel, NodeShape};

use strategy::PlacementContext;

const NODE_PAD_X: f64 = 16.0;
const NODE_PAD_Y: f64 = 10.0;
const MIN_NODE_WIDTH: f64 = 60.0;
const MIN_NODE_HEIGHT: f64 = 36.0;
const EDGE_LABEL_OFFSET: f64 = 12.0;
const PARALLEL_EDGE_FAN: f64 = 18.0;
const SELF_LOOP_EXTENT: f64 = 28.0;
const FIGURE_MARGIN: f64 = 24.0;

/// Computes the complete positioned flowchart: every node gets a unique finite coordinate, every
/// edge a boundary-clipped polyline.
pub fn layout_flowchart(
    model: &FlowchartModel,
    measurer: &dyn TextMeasurer,
) -> Result<FlowchartLayout> {
    if model.nodes.is_empty() {
        return Err(Error::InvalidModel {
            message: "flowchart has no nodes".to_string(),
        });
    }

    let sizes = node_sizes(model, measurer);
    let cx = PlacementContext {
        model,
        sizes: &sizes,
    };

    let mut placed: Option<Vec<Point>> = None;
    for s in strategy::default_strategies() {
        if let Some(points) = s.attempt(&cx) {
            let usable = points.len() == model.nodes.len()
                && points.iter().all(|p| p.x.is_finite() && p.y.is_finite());
            if usable {
                tracing::debug!(strategy = s.name(), "flowchart placement succeeded");
                placed = Some(points);
                break;
            }
            tracing::debug!(strategy = s.name(), "flowchart placement degenerate");
        }
    }
    let Some(mut points) = placed else {
        // The single-row terminal cannot decline, so this is unreachable for non-empty models.
        return Err(Error::InvalidModel {
            message: "no placement strategy produced coordinates".to_string(),
        });
    };

    resolve_overlaps(&mut points, &sizes);

    let nodes: Vec<NodeLayout> = model
        .nodes
        .values()
        .enumerate()
        .map(|(v, node)| NodeLayout {
            id: node.id.clone(),
            label: node.label.clone(),
            shape: node.shape,
            x: points[v].x,
            y: points[v].y,
            width: sizes[v].0,
            height: sizes[v].1,
        })
        .collect();

    let edges = route_edges(model, &nodes, measurer);

    let mut bounds = Bounds::EMPTY;
    for n in &nodes {
        bounds.expand_rect(n.x, n.y, n.width, n.height);
    }
    for e in &edges {
        for p in &e.points {
            bounds.expand_point(p.x, p.y);
        }
        if let (Some(pos), Some((w, h))) = (e.label_pos, e.label_size) {
            bounds.expand_rect(pos.x, pos.y, w, h);
        }
    }
    bounds.pad(FIGURE_MARGIN);

    Ok(FlowchartLayout {
        direction: model.direction,
        nodes,
        edges,
        bounds,
    })
}

/// Shape extents from measured label size plus padding. Shapes affect sizing (a diamond needs
/// slack around its text) but never placement.
fn node_sizes(model: &FlowchartModel, measurer: &dyn TextMeasurer) -> Vec<(f64, f64)> {
    let style = TextStyle::default();
    model
        .nodes
        .values()
        .map(|node| {
            let text = if node.label.is_empty() {
                node.id.as_str()
            } else {
                node.label.as_str()
            };
            let metrics = measurer.measure(text, &style);
            let mut w = (metrics.width + 2.0 * NODE_PAD_X).max(MIN_NODE_WIDTH);
            let mut h = (metrics.height + 2.0 * NODE_PAD_Y).max(MIN_NODE_HEIGHT);
            if node.shape == NodeShape::Diamond {
                w *= 1.35;
                h *= 1.6;
            }
            (w, h)
        })
        .collect()
}

/// Deterministic de-overlap pass: any two node boxes that intersect are pushed apart along the
/// axis of least penetration. Placement strategies already space their results; this guards the
/// non-overlap property against force-tier near-collisions.
fn resolve_overlaps(points: &mut [Point], sizes: &[(f64, f64)]) {
    const GAP: f64 = 8.0;
    const PASSES: usize = 16;

    for _ in 0..PASSES {
        let mut moved = false;
        for a in 0..points.len() {
            for b in (a + 1)..points.len() {
                let need_x = (sizes[a].0 + sizes[b].0) / 2.0 + GAP;
                let need_y = (sizes[a].1 + sizes[b].1) / 2.0 + GAP;
                let mut dx = points[b].x - points[a].x;
                let dy = points[b].y - points[a].y;
                if dx.abs() >= need_x || dy.abs() >= need_y {
                    continue;
                }
                if dx == 0.0 && dy == 0.0 {
                    // Identical centers: separate along x, later node to the right.
                    dx = 1.0;
                }
                let pen_x = need_x - dx.abs();
                let pen_y = need_y - dy.abs();
                if pen_x <= pen_y {
                    let shift = pen_x / 2.0 * if dx >= 0.0 { 1.0 } else { -1.0 };
                    points[a].x -= shift;
                    points[b].x += shift;
                } else {
                    let shift = pen_y / 2.0 * if dy >= 0.0 { 1.0 } else { -1.0 };
                    points[a].y -= shift;
                    points[b].y += shift;
                }
                moved = true;
            }
        }
        if !moved {
            break;
        }
    }
}

/// Point where the segment from a rectangle's center toward `target` leaves the rectangle.
fn boundary_point(center: Point, size: (f64, f64), toward: Point) -> Point {
    let dx = toward.x - center.x;
    let dy = toward.y - center.y;
    if dx == 0.0 && dy == 0.0 {
        return Point::new(center.x + size.0 / 2.0, center.y);
    }
    let tx = if dx != 0.0 {
        (size.0 / 2.0) / dx.abs()
    } else {
        f64::INFINITY
    };
    let ty = if dy != 0.0 {
        (size.1 / 2.0) / dy.abs()
    } else {
        f64::INFINITY
    };
    let t = tx.min(ty).min(1.0);
    Point::new(center.x + dx * t, center.y + dy * t)
}

fn route_edges(
    model: &FlowchartModel,
    nodes: &[NodeLayout],
    measurer: &dyn TextMeasurer,
) -> Vec<EdgeLayout> {
    let label_style = TextStyle {
        font_size: 14.0,
        ..TextStyle::default()
    };
    // Multiplicity per ordered pair so parallel edges fan apart instead of stacking.
    let mut pair_count: FxHashMap<(usize, usize), usize> = FxHashMap::default();

    model
        .edges
        .iter()
        .filter_map(|edge| {
            let u = model.node_index(&edge.from)?;
            let v = model.node_index(&edge.to)?;
            let k = {
                let slot = pair_count.entry((u, v)).or_insert(0);
                let k = *slot;
                *slot += 1;
                k
            };

            let label_size = edge
                .label
                .as_deref()
                .map(|l| {
                    let m = measurer.measure(l, &label_style);
                    (m.width, m.height)
                });

            if u == v {
                return Some(self_loop_edge(edge.label.clone(), &nodes[u], k, label_size));
            }

            let a = &nodes[u];
            let b = &nodes[v];
            let ca = Point::new(a.x, a.y);
            let cb = Point::new(b.x, b.y);

            // Parallel edges bend through an offset midpoint; the first edge runs straight.
            let mut mid: Option<Point> = None;
            if k > 0 {
                let dx = cb.x - ca.x;
                let dy = cb.y - ca.y;
                let len = (dx * dx + dy * dy).sqrt().max(1.0);
                let side = if k % 2 == 1 { 1.0 } else { -1.0 };
                let magnitude = PARALLEL_EDGE_FAN * k.div_ceil(2) as f64 * side;
                mid = Some(Point::new(
                    (ca.x + cb.x) / 2.0 - dy / len * magnitude,
                    (ca.y + cb.y) / 2.0 + dx / len * magnitude,
                ));
            }

            let start = boundary_point(ca, (a.width, a.height), mid.unwrap_or(cb));
            let end = boundary_point(cb, (b.width, b.height), mid.unwrap_or(ca));
            let mut points = vec![start];
            if let Some(m) = mid {
                points.push(m);
            }
            points.push(end);

            let label_anchor = mid.unwrap_or(Point::new(
                (start.x + end.x) / 2.0,
                (start.y + end.y) / 2.0,
            ));
            let label_pos = edge.label.as_ref().map(|_| {
                // Offset perpendicular to the segment so the text does not sit on the line.
                let dx = end.x - start.x;
                let dy = end.y - start.y;
                let len = (dx * dx + dy * dy).sqrt().max(1.0);
                Point::new(
                    label_anchor.x - dy / len * EDGE_LABEL_OFFSET,
                    label_anchor.y + dx / len * EDGE_LABEL_OFFSET,
                )
            });

            Some(EdgeLayout {
                from: edge.from.clone(),
                to: edge.to.clone(),
                label: edge.label.clone(),
                points,
                label_pos,
                label_size,
                self_loop: false,
            })
        })
        .collect()
}

/// A self-loop is drawn as a small rectangular detour on the node's right side; repeated loops
/// extend further out.
fn self_loop_edge(
    label: Option<String>,
    node: &NodeLayout,
    k: usize,
    label_size: Option<(f64, f64)>,
) -> EdgeLayout {
    let right = node.x + node.width / 2.0;
    let extent = SELF_LOOP_EXTENT + k as f64 * 14.0;
    let top = node.y - node.height / 4.0;
    let bottom = node.y + node.height / 4.0;
    let points = vec![
        Point::new(right, top),
        Point::new(right + extent, top),
        Point::new(right + extent, bottom),
        Point::new(right, bottom),
    ];
    let label_pos = label
        .as_ref()
        .map(|_| Point::new(right + extent + EDGE_LABEL_OFFSET, node.y));
    EdgeLayout {
        from: node.id.clone(),
        to: node.id.clone(),
        label,
        points,
        label_pos,
        label_size,
        self_loop: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::UnicodeWidthTextMeasurer;
    use selkie_core::{Diagram, parse};

    fn layout(text: &str) -> FlowchartLayout {
        let Diagram::Flowchart(model) = parse(text).unwrap() else {
            unreachable!()
        };
        layout_flowchart(&model, &UnicodeWidthTextMeasurer::default()).unwrap()
    }

    fn overlap(a: &NodeLayout, b: &NodeLayout) -> bool {
        (a.x - b.x).abs() < (a.width + b.width) / 2.0
            && (a.y - b.y).abs() < (a.height + b.height) / 2.0
    }

    #[test]
    fn every_node_appears_once_with_finite_coordinates() {
        let l = layout("graph TD\nA-->B\nB-->C\nB-->A\nD");
        assert_eq!(l.nodes.len(), 4);
        let mut ids: Vec<&str> = l.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
        for n in &l.nodes {
            assert!(n.x.is_finite() && n.y.is_finite());
        }
    }

    #[test]
    fn disconnected_components_do_not_overlap() {
        let l = layout("graph TD\nA-->B\nC-->D");
        for a in 0..l.nodes.len() {
            for b in (a + 1)..l.nodes.len() {
                assert!(
                    !overlap(&l.nodes[a], &l.nodes[b]),
                    "{} overlaps {}",
                    l.nodes[a].id,
                    l.nodes[b].id
                );
            }
        }
    }

    #[test]
    fn edges_clip_to_node_boundaries_not_centers() {
        let l = layout("graph TD\nA-->B");
        let edge = &l.edges[0];
        let a = &l.nodes[0];
        let b = &l.nodes[1];
        let start = edge.points.first().unwrap();
        let end = edge.points.last().unwrap();
        assert!((start.x, start.y) != (a.x, a.y), "polyline starts at the source center");
        assert!((end.x, end.y) != (b.x, b.y), "polyline ends at the target center");
        // The endpoint sits on the target's top boundary for a top-down chain.
        assert!((end.y - (b.y - b.height / 2.0)).abs() < 1e-6);
    }

    #[test]
    fn self_loops_and_parallel_edges_route_without_panic() {
        let l = layout("graph TD\nA-->A\nA-->B\nA-->B\nA-->B");
        assert_eq!(l.edges.len(), 4);
        let self_loop = &l.edges[0];
        assert!(self_loop.self_loop);
        assert!(self_loop.points.len() >= 2);
        // The three parallel edges must not share identical polylines.
        assert_ne!(l.edges[1].points, l.edges[2].points);
        assert_ne!(l.edges[2].points, l.edges[3].points);
    }

    #[test]
    fn edge_labels_sit_off_the_line() {
        let l = layout("graph TD\nA -->|yes| B");
        let edge = &l.edges[0];
        let pos = edge.label_pos.unwrap();
        let start = edge.points.first().unwrap();
        let end = edge.points.last().unwrap();
        // Vertical segment: the label must be displaced horizontally.
        assert!((pos.x - (start.x + end.x) / 2.0).abs() > 1.0);
    }

    #[test]
    fn layout_is_structurally_idempotent() {
        let text = "graph LR\nA[Alpha]-->B{Beta?}\nB-->|yes| C\nB-->|no| A\nC-->C";
        let a = layout(text);
        let b = layout(text);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_model_is_an_invalid_model_error() {
        let model = FlowchartModel::new(selkie_core::Direction::TopDown);
        let err = layout_flowchart(&model, &UnicodeWidthTextMeasurer::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidModel { .. }));
    }

    #[test]
    fn bounds_contain_every_node_box() {
        let l = layout("graph TD\nA-->B\nB-->C");
        for n in &l.nodes {
            assert!(n.x - n.width / 2.0 >= l.bounds.min_x);
            assert!(n.x + n.width / 2.0 <= l.bounds.max_x);
            assert!(n.y - n.height / 2.0 >= l.bounds.min_y);
            assert!(n.y + n.height / 2.0 <= l.bounds.max_y);
        }
    }
}
