//! Flowchart placement strategies.
//!
//! Placement is an ordered chain of strategies tried until one produces coordinates. The chain
//! ends in [`SingleRowStrategy`], which cannot fail, so layout as a whole never does.

use super::layering;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use selkie_core::{Direction, FlowchartModel};

use crate::model::Point;

/// Inputs shared by every strategy: the model plus the measured size of each node's shape,
/// indexed by declaration order.
pub struct PlacementContext<'a> {
    pub model: &'a FlowchartModel,
    pub sizes: &'a [(f64, f64)],
}

impl PlacementContext<'_> {
    pub fn node_count(&self) -> usize {
        self.model.nodes.len()
    }
}

/// One placement attempt. `None` signals failure or a degenerate result; the caller moves on to
/// the next strategy in the chain.
pub trait PlacementStrategy {
    fn name(&self) -> &'static str;
    fn attempt(&self, cx: &PlacementContext<'_>) -> Option<Vec<Point>>;
}

/// The default chain: optional external layout, hierarchical layering, seeded force-directed
/// placement, and the guaranteed single-row terminal.
pub fn default_strategies() -> Vec<Box<dyn PlacementStrategy>> {
    let mut chain: Vec<Box<dyn PlacementStrategy>> = Vec::new();
    #[cfg(feature = "sugiyama")]
    chain.push(Box::new(SugiyamaStrategy::default()));
    chain.push(Box::new(LayeredStrategy::default()));
    chain.push(Box::new(ForceStrategy::default()));
    chain.push(Box::new(SingleRowStrategy));
    chain
}

/// Gap between adjacent layers, on top of the measured node extents.
const LAYER_GAP: f64 = 56.0;
/// Gap between adjacent nodes within a layer.
const NODE_GAP: f64 = 48.0;

/// The algorithmic core: cycle-broken BFS layering, barycenter ordering, then coordinates.
///
/// The layer index maps to the axis matching the declared direction; the within-layer order maps
/// to the perpendicular axis, with each layer centered as a block. Flow-axis spacing grows with
/// the largest measured node in the layer, so label size feeds spacing but never layering.
#[derive(Debug, Default)]
pub struct LayeredStrategy;

impl PlacementStrategy for LayeredStrategy {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn attempt(&self, cx: &PlacementContext<'_>) -> Option<Vec<Point>> {
        let n = cx.node_count();
        if n == 0 {
            return None;
        }
        // With no layer-defining edges at all the "hierarchy" is one flat layer; that result is
        // degenerate and better served by the force tier.
        let edges = layering::edge_indices(cx.model);
        if n > 1 && edges.iter().all(|(u, v)| u == v) {
            return None;
        }

        let layered = layering::layered_graph(cx.model);
        let layer_count = layered.layer.iter().copied().max().unwrap_or(0) + 1;

        // Per-layer extents along both axes. "Main" is the flow axis, "cross" the perpendicular.
        let vertical = cx.model.direction == Direction::TopDown;
        let main_extent = |v: usize| if vertical { cx.sizes[v].1 } else { cx.sizes[v].0 };
        let cross_extent = |v: usize| if vertical { cx.sizes[v].0 } else { cx.sizes[v].1 };

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        for v in 0..n {
            members[layered.layer[v]].push(v);
        }
        for nodes in &mut members {
            nodes.sort_by_key(|&v| layered.order[v]);
        }

        // Flow-axis position per layer: cumulative over the thickest node of each layer.
        let mut layer_main = vec![0.0f64; layer_count];
        let mut cursor = 0.0;
        for (l, nodes) in members.iter().enumerate() {
            let thickness = nodes
                .iter()
                .map(|&v| main_extent(v))
                .fold(0.0f64, f64::max);
            layer_main[l] = cursor + thickness / 2.0;
            cursor += thickness + LAYER_GAP;
        }

        let mut points = vec![Point::new(0.0, 0.0); n];
        for (l, nodes) in members.iter().enumerate() {
            let total: f64 = nodes.iter().map(|&v| cross_extent(v)).sum::<f64>()
                + NODE_GAP * nodes.len().saturating_sub(1) as f64;
            // Center the layer as a block around the cross-axis origin.
            let mut cross = -total / 2.0;
            for &v in nodes {
                let center = cross + cross_extent(v) / 2.0;
                points[v] = if vertical {
                    Point::new(center, layer_main[l])
                } else {
                    Point::new(layer_main[l], center)
                };
                cross += cross_extent(v) + NODE_GAP;
            }
        }
        Some(points)
    }
}

/// Spring/repulsion placement with a fixed seed, for inputs with no usable hierarchy
/// (edge-free graphs, self-loop tangles). Direction is ignored by design.
#[derive(Debug)]
pub struct ForceStrategy {
    pub iterations: usize,
    pub seed: u64,
}

impl Default for ForceStrategy {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: 0x5e14_1e00,
        }
    }
}

impl PlacementStrategy for ForceStrategy {
    fn name(&self) -> &'static str {
        "force"
    }

    fn attempt(&self, cx: &PlacementContext<'_>) -> Option<Vec<Point>> {
        let n = cx.node_count();
        if n == 0 {
            return None;
        }

        let spring_constant = 0.1;
        let repulsion_constant = 60_000.0;
        let damping = 0.85;
        let ideal_length = 160.0;
        let min_distance: f64 = 1.0;

        // Grid seed positions with deterministic jitter so symmetric graphs still separate.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let columns = (n as f64).sqrt().ceil() as usize;
        let mut pos: Vec<Point> = (0..n)
            .map(|v| {
                let col = (v % columns) as f64;
                let row = (v / columns) as f64;
                Point::new(
                    col * ideal_length + rng.random_range(-20.0..20.0),
                    row * ideal_length + rng.random_range(-20.0..20.0),
                )
            })
            .collect();

        let springs: Vec<(usize, usize)> = layering::edge_indices(cx.model)
            .into_iter()
            .filter(|(u, v)| u != v)
            .collect();

        let mut velocity = vec![(0.0f64, 0.0f64); n];
        for _ in 0..self.iterations {
            let mut force = vec![(0.0f64, 0.0f64); n];

            for a in 0..n {
                for b in (a + 1)..n {
                    let dx = pos[a].x - pos[b].x;
                    let dy = pos[a].y - pos[b].y;
                    let dist = (dx * dx + dy * dy).sqrt().max(min_distance);
                    let push = repulsion_constant / (dist * dist);
                    force[a].0 += push * dx / dist;
                    force[a].1 += push * dy / dist;
                    force[b].0 -= push * dx / dist;
                    force[b].1 -= push * dy / dist;
                }
            }

            for &(u, v) in &springs {
                let dx = pos[v].x - pos[u].x;
                let dy = pos[v].y - pos[u].y;
                let dist = (dx * dx + dy * dy).sqrt().max(min_distance);
                let pull = spring_constant * (dist - ideal_length);
                force[u].0 += pull * dx / dist;
                force[u].1 += pull * dy / dist;
                force[v].0 -= pull * dx / dist;
                force[v].1 -= pull * dy / dist;
            }

            for v in 0..n {
                velocity[v].0 = (velocity[v].0 + force[v].0) * damping;
                velocity[v].1 = (velocity[v].1 + force[v].1) * damping;
                pos[v].x += velocity[v].0;
                pos[v].y += velocity[v].1;
            }
        }

        if pos.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return None;
        }
        Some(pos)
    }
}

/// Terminal strategy: one node per column in declaration order. Cannot fail.
#[derive(Debug)]
pub struct SingleRowStrategy;

impl PlacementStrategy for SingleRowStrategy {
    fn name(&self) -> &'static str {
        "single-row"
    }

    fn attempt(&self, cx: &PlacementContext<'_>) -> Option<Vec<Point>> {
        let mut points = Vec::with_capacity(cx.node_count());
        let mut x = 0.0;
        for v in 0..cx.node_count() {
            let (w, _) = cx.sizes[v];
            points.push(Point::new(x + w / 2.0, 0.0));
            x += w + NODE_GAP;
        }
        Some(points)
    }
}

#[cfg(feature = "sugiyama")]
pub use self::sugiyama::SugiyamaStrategy;

#[cfg(feature = "sugiyama")]
mod sugiyama {
    use super::*;
    use rustc_hash::FxHashMap;

    /// External hierarchical layout via the `rust-sugiyama` crate. Adopts its coordinates
    /// verbatim (scaled to node extents); any panic or empty result falls through to the
    /// built-in layering.
    #[derive(Debug, Default)]
    pub struct SugiyamaStrategy;

    impl PlacementStrategy for SugiyamaStrategy {
        fn name(&self) -> &'static str {
            "sugiyama"
        }

        fn attempt(&self, cx: &PlacementContext<'_>) -> Option<Vec<Point>> {
            let n = cx.node_count();
            let edges: Vec<(u32, u32)> = layering::edge_indices(cx.model)
                .into_iter()
                .filter(|(u, v)| u != v)
                .map(|(u, v)| (u as u32, v as u32))
                .collect();
            if edges.is_empty() {
                return None;
            }

            let layouts = std::panic::catch_unwind(move || {
                let config = rust_sugiyama::configure::Config {
                    minimum_length: 1,
                    vertex_spacing: 3.0,
                    ..Default::default()
                };
                rust_sugiyama::from_edges(&edges, &config)
            });
            let results = match layouts {
                Ok(results) if !results.is_empty() => results,
                Ok(_) => {
                    tracing::debug!("rust-sugiyama returned no components");
                    return None;
                }
                Err(_) => {
                    tracing::debug!("rust-sugiyama panicked; falling back");
                    return None;
                }
            };

            let max_w = cx.sizes.iter().map(|s| s.0).fold(1.0f64, f64::max);
            let max_h = cx.sizes.iter().map(|s| s.1).fold(1.0f64, f64::max);
            let (h_spacing, v_spacing) = (max_w + super::NODE_GAP, max_h + super::LAYER_GAP);

            let mut placed: FxHashMap<usize, Point> = FxHashMap::default();
            let mut component_offset = 0.0f64;
            for (coords, _, _) in &results {
                let mut component_max = component_offset;
                for &(id, (x, y)) in coords {
                    if id >= n {
                        continue;
                    }
                    let px = component_offset + (x as f64) * h_spacing;
                    let py = (y as f64) * v_spacing;
                    component_max = component_max.max(px + h_spacing);
                    placed.insert(id, Point::new(px, py));
                }
                component_offset = component_max + h_spacing;
            }
            if placed.is_empty() {
                return None;
            }

            // Nodes sugiyama never saw (isolated) get a row of their own below the drawing.
            let bottom = placed
                .values()
                .map(|p| p.y)
                .fold(f64::NEG_INFINITY, f64::max)
                + v_spacing;
            let mut free_x = 0.0;
            let mut points = Vec::with_capacity(n);
            for v in 0..n {
                match placed.get(&v) {
                    Some(p) => points.push(*p),
                    None => {
                        points.push(Point::new(free_x, bottom));
                        free_x += h_spacing;
                    }
                }
            }

            // The crate lays out top-down; mirror the axes for left-right flow.
            if cx.model.direction == Direction::LeftRight {
                for p in &mut points {
                    std::mem::swap(&mut p.x, &mut p.y);
                }
            }
            Some(points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selkie_core::{Diagram, parse};

    fn flow_model(text: &str) -> FlowchartModel {
        match parse(text).unwrap() {
            Diagram::Flowchart(m) => m,
            _ => unreachable!(),
        }
    }

    fn uniform_sizes(n: usize) -> Vec<(f64, f64)> {
        vec![(80.0, 40.0); n]
    }

    #[test]
    fn layered_declines_edge_free_multi_node_graphs() {
        let model = flow_model("graph TD\nA\nB\nC");
        let sizes = uniform_sizes(3);
        let cx = PlacementContext {
            model: &model,
            sizes: &sizes,
        };
        assert!(LayeredStrategy.attempt(&cx).is_none());
    }

    #[test]
    fn layered_orders_top_down_chain_along_y() {
        let model = flow_model("graph TD\nA-->B\nB-->C");
        let sizes = uniform_sizes(3);
        let cx = PlacementContext {
            model: &model,
            sizes: &sizes,
        };
        let points = LayeredStrategy.attempt(&cx).unwrap();
        assert!(points[0].y < points[1].y);
        assert!(points[1].y < points[2].y);
        // A single chain stays centered on the cross axis.
        assert_eq!(points[0].x, points[1].x);
    }

    #[test]
    fn layered_orders_left_right_chain_along_x() {
        let model = flow_model("graph LR\nA-->B\nB-->C");
        let sizes = uniform_sizes(3);
        let cx = PlacementContext {
            model: &model,
            sizes: &sizes,
        };
        let points = LayeredStrategy.attempt(&cx).unwrap();
        assert!(points[0].x < points[1].x);
        assert!(points[1].x < points[2].x);
    }

    #[test]
    fn force_gives_distinct_positions_to_pathological_input() {
        // Only self-loops: no hierarchy to speak of, but nodes must still separate.
        let model = flow_model("graph TD\nA-->A\nB-->B\nC");
        let sizes = uniform_sizes(3);
        let cx = PlacementContext {
            model: &model,
            sizes: &sizes,
        };
        let points = ForceStrategy::default().attempt(&cx).unwrap();
        for a in 0..points.len() {
            for b in (a + 1)..points.len() {
                let dx = points[a].x - points[b].x;
                let dy = points[a].y - points[b].y;
                assert!((dx * dx + dy * dy).sqrt() > 1.0, "nodes {a} and {b} coincide");
            }
        }
    }

    #[test]
    fn force_is_deterministic_across_runs() {
        let model = flow_model("graph TD\nA\nB\nC\nD");
        let sizes = uniform_sizes(4);
        let cx = PlacementContext {
            model: &model,
            sizes: &sizes,
        };
        let a = ForceStrategy::default().attempt(&cx).unwrap();
        let b = ForceStrategy::default().attempt(&cx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_row_always_succeeds() {
        let model = flow_model("graph TD\nA\nB");
        let sizes = uniform_sizes(2);
        let cx = PlacementContext {
            model: &model,
            sizes: &sizes,
        };
        let points = SingleRowStrategy.attempt(&cx).unwrap();
        assert_eq!(points.len(), 2);
        assert!(points[0].x < points[1].x);
    }
}
