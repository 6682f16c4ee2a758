//! Layered layout by breadth-first import depth.

use std::collections::VecDeque;

use super::{Canvas, LayoutGraph, Placement, LABEL_PADDING};

/// Layers never get closer than this vertically.
const MIN_LAYER_GAP: f32 = 80.0;

/// Groups node indices into depth layers.
///
/// Roots are nodes without incoming edges; if there are none (every node sits
/// on a cycle) the node with the most outgoing edges is used. Nodes the
/// traversal never reaches form one extra, deepest layer.
pub(crate) fn assign_layers(graph: &LayoutGraph) -> Vec<Vec<usize>> {
    let n = graph.len();
    if n == 0 {
        return Vec::new();
    }

    let mut roots: Vec<usize> = (0..n).filter(|&i| graph.incoming[i].is_empty()).collect();
    if roots.is_empty() {
        let busiest = (0..n)
            .max_by(|&a, &b| {
                graph.outgoing[a]
                    .len()
                    .cmp(&graph.outgoing[b].len())
                    .then(b.cmp(&a))
            })
            .unwrap_or(0);
        roots.push(busiest);
    }

    let mut visited = vec![false; n];
    let mut layers: Vec<Vec<usize>> = Vec::new();
    let mut queue = VecDeque::new();
    for &root in &roots {
        visited[root] = true;
        queue.push_back((root, 0usize));
    }

    while let Some((node, depth)) = queue.pop_front() {
        if layers.len() <= depth {
            layers.resize_with(depth + 1, Vec::new);
        }
        layers[depth].push(node);

        for &next in &graph.outgoing[node] {
            if !visited[next] {
                visited[next] = true;
                queue.push_back((next, depth + 1));
            }
        }
    }

    let unreachable: Vec<usize> = (0..n).filter(|&i| !visited[i]).collect();
    if !unreachable.is_empty() {
        layers.push(unreachable);
    }

    layers
}

pub(crate) fn layout(graph: &LayoutGraph, canvas: Canvas) -> Placement {
    let layers = assign_layers(graph);
    let mut points = vec![(0.0, 0.0); graph.len()];

    let layer_gap = (canvas.height / (layers.len() + 1) as f32).max(MIN_LAYER_GAP);
    let mut width = canvas.width;

    for (depth, layer) in layers.iter().enumerate() {
        let y = layer_gap * (depth + 1) as f32;
        let labels: f32 = layer.iter().map(|&i| graph.nodes[i].label_width).sum();
        let needed = labels + LABEL_PADDING * (layer.len() + 1) as f32;

        if needed > canvas.width {
            let mut cursor = LABEL_PADDING;
            for &i in layer {
                let w = graph.nodes[i].label_width;
                points[i] = (cursor + w / 2.0, y);
                cursor += w + LABEL_PADDING;
            }
            width = width.max(cursor);
        } else {
            let step = canvas.width / (layer.len() + 1) as f32;
            for (slot, &i) in layer.iter().enumerate() {
                points[i] = (step * (slot + 1) as f32, y);
            }
        }
    }

    Placement {
        points,
        width,
        height: layer_gap * (layers.len() + 1) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::graph;
    use crate::layout::{LayoutEngine, LayoutStrategy, VisibilityFilter};

    fn prepared(ids: &[&str], pairs: &[(&str, &str)]) -> LayoutGraph {
        let (nodes, edges) = graph(ids, pairs);
        LayoutEngine::new().prepare(&nodes, &edges, &VisibilityFilter::default())
    }

    fn depth_of(layers: &[Vec<usize>], node: usize) -> usize {
        layers.iter().position(|l| l.contains(&node)).unwrap()
    }

    #[test]
    fn test_chain_depths() {
        let g = prepared(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let layers = assign_layers(&g);
        assert_eq!(layers, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn test_same_layer_same_y() {
        let g = prepared(
            &["root", "x", "y", "z"],
            &[("root", "x"), ("root", "y"), ("x", "z")],
        );
        let placement = layout(
            &g,
            Canvas {
                width: 800.0,
                height: 600.0,
            },
        );
        assert_eq!(placement.points[1].1, placement.points[2].1);
        assert!(placement.points[0].1 < placement.points[1].1);
        assert!(placement.points[1].1 < placement.points[3].1);
        assert_ne!(placement.points[1].0, placement.points[2].0);
    }

    #[test]
    fn test_pure_cycle_starts_from_busiest_node() {
        let g = prepared(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "b")],
        );
        let layers = assign_layers(&g);
        assert_eq!(layers[0], vec![2]);
        assert_eq!(layers.iter().map(Vec::len).sum::<usize>(), 3);
    }

    #[test]
    fn test_unreachable_cycle_gets_deepest_layer() {
        // root -> leaf, plus a detached cycle p <-> q
        let g = prepared(
            &["root", "leaf", "p", "q"],
            &[("root", "leaf"), ("p", "q"), ("q", "p")],
        );
        let layers = assign_layers(&g);
        assert_eq!(layers.len(), 3);
        assert_eq!(depth_of(&layers, 0), 0);
        assert_eq!(depth_of(&layers, 1), 1);
        assert_eq!(layers[2], vec![2, 3]);
    }

    #[test]
    fn test_diamond_takes_shortest_depth() {
        let g = prepared(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("a", "c"), ("c", "d")],
        );
        let layers = assign_layers(&g);
        assert_eq!(depth_of(&layers, 2), 1);
        assert_eq!(depth_of(&layers, 3), 2);
    }

    #[test]
    fn test_crowded_layer_spaced_by_label_width() {
        let ids: Vec<String> = (0..12).map(|i| format!("feature_module_{i}.ts")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let g = prepared(&id_refs, &[]);
        let placement = layout(
            &g,
            Canvas {
                width: 300.0,
                height: 400.0,
            },
        );

        assert!(placement.width > 300.0);
        let mut xs: Vec<f32> = placement.points.iter().map(|p| p.0).collect();
        xs.sort_by(f32::total_cmp);
        for (pair, node) in xs.windows(2).zip(&g.nodes) {
            assert!(pair[1] - pair[0] >= node.label_width);
        }
    }

    #[test]
    fn test_layout_strategy_roundtrip_through_engine() {
        let (nodes, edges) = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let config = crate::layout::LayoutConfig::new(LayoutStrategy::Hierarchical, 600.0, 400.0);
        let layout = LayoutEngine::new().compute_layout(&nodes, &edges, &config);
        let ys: Vec<f32> = ["a", "b", "c"].iter().map(|id| layout.positions[*id].y).collect();
        assert!(ys[0] < ys[1] && ys[1] < ys[2]);
    }
}
