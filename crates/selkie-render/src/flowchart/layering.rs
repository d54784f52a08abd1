//! Hierarchical layer assignment with explicit cycle breaking.
//!
//! Layering runs in two separate passes so each is testable on its own:
//! 1. a DFS with white/gray/black coloring marks back-edges (any edge into a gray node), which
//!    are then excluded from the layer-defining edge set;
//! 2. a worklist BFS from every in-degree-0 root assigns each node the maximum layer reachable
//!    from any root, so a node at the end of a longer chain sits at the depth it conceptually
//!    belongs to.
//!
//! Back-edges and self-loops are still rendered; they just never constrain layers.

use rustc_hash::FxHashSet;
use selkie_core::FlowchartModel;
use std::collections::VecDeque;

/// Layer/order assignment over node declaration indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredGraph {
    /// `layer[v] >= 0` for every node `v`; `layer[u] < layer[v]` for every non-back-edge `(u, v)`.
    pub layer: Vec<usize>,
    /// Position of each node within its layer, after crossing reduction.
    pub order: Vec<usize>,
    /// Indices into the model's edge list that were exempted from layering.
    pub back_edges: FxHashSet<usize>,
}

/// Edge list as declaration-index pairs, in declaration order.
pub fn edge_indices(model: &FlowchartModel) -> Vec<(usize, usize)> {
    model
        .edges
        .iter()
        .filter_map(|e| Some((model.node_index(&e.from)?, model.node_index(&e.to)?)))
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// DFS coloring pass: returns the indices of edges whose inclusion would create a cycle.
///
/// Self-loops are back-edges by definition. Roots are tried in declaration order so the marking
/// is deterministic for any input.
pub fn mark_back_edges(node_count: usize, edges: &[(usize, usize)]) -> FxHashSet<usize> {
    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, &(u, _)) in edges.iter().enumerate() {
        out_edges[u].push(idx);
    }

    fn dfs(
        v: usize,
        edges: &[(usize, usize)],
        out_edges: &[Vec<usize>],
        color: &mut [Color],
        back: &mut FxHashSet<usize>,
    ) {
        color[v] = Color::Gray;
        for &idx in &out_edges[v] {
            let (_, w) = edges[idx];
            match color[w] {
                Color::Gray => {
                    back.insert(idx);
                }
                Color::White => dfs(w, edges, out_edges, color, back),
                Color::Black => {}
            }
        }
        color[v] = Color::Black;
    }

    let mut color = vec![Color::White; node_count];
    let mut back = FxHashSet::default();
    for v in 0..node_count {
        if color[v] == Color::White {
            dfs(v, edges, &out_edges, &mut color, &mut back);
        }
    }
    back
}

/// BFS layer assignment over the cycle-broken edge set.
///
/// Every in-degree-0 node seeds layer 0; when no such node exists (a pure cycle), the node with
/// the lowest declaration order seeds instead. A node reached from several roots keeps the
/// maximum layer any of them pushes it to. Nodes the traversal never reaches (isolated after
/// cycle breaking) are parked together on the layer after the deepest reached one.
pub fn assign_layers(
    node_count: usize,
    edges: &[(usize, usize)],
    back_edges: &FxHashSet<usize>,
) -> Vec<usize> {
    let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut in_degree = vec![0usize; node_count];
    for (idx, &(u, v)) in edges.iter().enumerate() {
        if back_edges.contains(&idx) {
            continue;
        }
        out_edges[u].push(v);
        in_degree[v] += 1;
    }

    let mut roots: Vec<usize> = (0..node_count).filter(|&v| in_degree[v] == 0).collect();
    if roots.is_empty() && node_count > 0 {
        roots.push(0);
    }

    let mut layer: Vec<Option<usize>> = vec![None; node_count];
    let mut queue: VecDeque<usize> = VecDeque::new();
    for &root in &roots {
        layer[root] = Some(0);
        queue.push_back(root);
    }

    // Worklist relaxation: revisiting is required because a later root (or a longer chain) can
    // push an already-visited node deeper. The broken edge set is acyclic, so this terminates.
    while let Some(u) = queue.pop_front() {
        let u_layer = layer[u].unwrap_or(0);
        for &v in &out_edges[u] {
            let candidate = u_layer + 1;
            if layer[v].is_none_or(|cur| candidate > cur) {
                layer[v] = Some(candidate);
                queue.push_back(v);
            }
        }
    }

    let deepest = layer.iter().flatten().copied().max().unwrap_or(0);
    let orphan_layer = if layer.iter().any(|l| l.is_none()) && layer.iter().any(|l| l.is_some()) {
        deepest + 1
    } else {
        0
    };
    layer
        .into_iter()
        .map(|l| l.unwrap_or(orphan_layer))
        .collect()
}

/// Full layering pipeline: cycle breaking, layer assignment, crossing reduction.
pub fn layered_graph(model: &FlowchartModel) -> LayeredGraph {
    let node_count = model.nodes.len();
    let edges = edge_indices(model);
    let back_edges = mark_back_edges(node_count, &edges);
    let layer = assign_layers(node_count, &edges, &back_edges);
    let order = super::order::order_within_layers(node_count, &edges, &back_edges, &layer);
    LayeredGraph {
        layer,
        order,
        back_edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selkie_core::{Diagram, parse};

    fn flow_model(text: &str) -> selkie_core::FlowchartModel {
        match parse(text).unwrap() {
            Diagram::Flowchart(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn back_edge_in_cycle_is_marked_and_layers_hold() {
        // A-->B, B-->C, B-->A: the return edge is exempt, the chain still layers 0/1/2.
        let model = flow_model("graph TD\nA-->B\nB-->C\nB-->A");
        let layered = layered_graph(&model);
        assert_eq!(layered.layer, vec![0, 1, 2]);
        assert_eq!(layered.back_edges.len(), 1);
        assert!(layered.back_edges.contains(&2));
    }

    #[test]
    fn pure_cycle_seeds_from_lowest_declaration_order() {
        let model = flow_model("graph TD\nA-->B\nB-->C\nC-->A");
        let layered = layered_graph(&model);
        assert_eq!(layered.layer[0], 0);
        assert_eq!(layered.layer[1], 1);
        assert_eq!(layered.layer[2], 2);
    }

    #[test]
    fn multi_root_merge_keeps_the_maximum_layer() {
        // C is one hop from D but two hops from A; it must sit at layer 2.
        let model = flow_model("graph TD\nA-->B\nB-->C\nD-->C");
        let layered = layered_graph(&model);
        assert_eq!(layered.layer[model.node_index("C").unwrap()], 2);
        assert_eq!(layered.layer[model.node_index("D").unwrap()], 0);
    }

    #[test]
    fn self_loop_never_constrains_its_node() {
        let model = flow_model("graph TD\nA-->A\nA-->B");
        let layered = layered_graph(&model);
        assert!(layered.back_edges.contains(&0));
        assert_eq!(layered.layer, vec![0, 1]);
    }

    #[test]
    fn layer_invariant_holds_for_all_non_back_edges() {
        let model = flow_model("graph TD\nA-->B\nB-->C\nA-->C\nC-->A\nB-->B");
        let layered = layered_graph(&model);
        for (idx, (u, v)) in edge_indices(&model).into_iter().enumerate() {
            if layered.back_edges.contains(&idx) {
                continue;
            }
            assert!(
                layered.layer[u] < layered.layer[v],
                "edge {idx} violates the layer invariant"
            );
        }
    }

    #[test]
    fn disconnected_components_all_get_layers() {
        let model = flow_model("graph TD\nA-->B\nC-->D\nE");
        let layered = layered_graph(&model);
        assert_eq!(layered.layer.len(), 5);
        assert_eq!(layered.layer[model.node_index("C").unwrap()], 0);
        assert_eq!(layered.layer[model.node_index("D").unwrap()], 1);
    }
}
