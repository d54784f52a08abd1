//! Within-layer ordering (crossing reduction).
//!
//! Nodes are ordered by the median of their predecessors' within-layer positions, swept top to
//! bottom a fixed number of times. Nodes without predecessors keep their current slot, ties break
//! by declaration order, so the result is deterministic for a given model.

use rustc_hash::FxHashSet;

const SWEEPS: usize = 2;

/// Computes each node's position within its layer.
///
/// `edges` and `back_edges` are as produced by [`super::layering`]; back-edges do not pull on
/// the ordering.
pub fn order_within_layers(
    node_count: usize,
    edges: &[(usize, usize)],
    back_edges: &FxHashSet<usize>,
    layer: &[usize],
) -> Vec<usize> {
    let layer_count = layer.iter().copied().max().map_or(0, |m| m + 1);

    // Initial order: declaration order within each layer.
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    for v in 0..node_count {
        layers[layer[v]].push(v);
    }

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, &(u, v)) in edges.iter().enumerate() {
        if back_edges.contains(&idx) || u == v {
            continue;
        }
        preds[v].push(u);
    }

    let mut order = vec![0usize; node_count];
    let assign = |layers: &[Vec<usize>], order: &mut [usize]| {
        for nodes in layers {
            for (pos, &v) in nodes.iter().enumerate() {
                order[v] = pos;
            }
        }
    };
    assign(&layers, &mut order);

    for _ in 0..SWEEPS {
        for l in 1..layer_count {
            let mut keyed: Vec<(f64, usize)> = layers[l]
                .iter()
                .map(|&v| {
                    let key = median_of_predecessors(v, &preds, &order)
                        .unwrap_or(order[v] as f64);
                    (key, v)
                })
                .collect();
            // Stable sort on the barycenter key; equal keys fall back to declaration order,
            // which is the node index itself.
            keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal).then(a.1.cmp(&b.1)));
            layers[l] = keyed.into_iter().map(|(_, v)| v).collect();
            assign(&layers, &mut order);
        }
    }

    order
}

fn median_of_predecessors(v: usize, preds: &[Vec<usize>], order: &[usize]) -> Option<f64> {
    if preds[v].is_empty() {
        return None;
    }
    let mut positions: Vec<usize> = preds[v].iter().map(|&u| order[u]).collect();
    positions.sort_unstable();
    let n = positions.len();
    let median = if n % 2 == 1 {
        positions[n / 2] as f64
    } else {
        (positions[n / 2 - 1] + positions[n / 2]) as f64 / 2.0
    };
    Some(median)
}
