//! Rooted tree layout with width-proportional subtrees.
//!
//! Trees are kept in a flat arena in breadth-first order, so every parent
//! slot precedes its children. Subtree widths are then a single reverse pass
//! and placement a single forward pass, with no recursion.
//!
//! Each root sees its whole reachable subtree, so a file shared by two roots
//! reserves width under both. It is drawn once, at its first slot.

use std::collections::VecDeque;

use super::{hierarchical, Canvas, LayoutGraph, Placement, LABEL_PADDING};

const MIN_LEVEL_GAP: f32 = 80.0;

#[derive(Debug, Clone)]
struct Slot {
    node: usize,
    depth: usize,
    children: Vec<usize>,
}

/// Nodes with outgoing edges and no incoming edges.
fn roots(graph: &LayoutGraph) -> Vec<usize> {
    (0..graph.len())
        .filter(|&i| !graph.outgoing[i].is_empty() && graph.incoming[i].is_empty())
        .collect()
}

/// Grows one breadth-first tree from `root`, skipping nodes already in it.
/// Every node reached is marked in `reached`.
fn grow(graph: &LayoutGraph, root: usize, reached: &mut [bool], arena: &mut Vec<Slot>) -> usize {
    let root_slot = arena.len();
    let mut visited = vec![false; graph.len()];
    visited[root] = true;
    reached[root] = true;
    arena.push(Slot {
        node: root,
        depth: 0,
        children: Vec::new(),
    });

    let mut queue = VecDeque::from([root_slot]);
    while let Some(slot) = queue.pop_front() {
        let node = arena[slot].node;
        let depth = arena[slot].depth;
        for &next in &graph.outgoing[node] {
            if visited[next] {
                continue;
            }
            visited[next] = true;
            reached[next] = true;
            let child = arena.len();
            arena.push(Slot {
                node: next,
                depth: depth + 1,
                children: Vec::new(),
            });
            arena[slot].children.push(child);
            queue.push_back(child);
        }
    }

    root_slot
}

pub(crate) fn layout(graph: &LayoutGraph, canvas: Canvas) -> Placement {
    let tree_roots = roots(graph);
    if tree_roots.is_empty() {
        return hierarchical::layout(graph, canvas);
    }

    let mut reached = vec![false; graph.len()];
    let mut arena: Vec<Slot> = Vec::with_capacity(graph.len());
    let mut forest = Vec::new();
    for root in tree_roots {
        forest.push(grow(graph, root, &mut reached, &mut arena));
    }
    // Whatever no root reaches (isolated files, detached cycles) becomes its own tree.
    for node in 0..graph.len() {
        if !reached[node] {
            forest.push(grow(graph, node, &mut reached, &mut arena));
        }
    }

    let mut required = vec![0.0_f32; arena.len()];
    for slot in (0..arena.len()).rev() {
        let own = graph.nodes[arena[slot].node].label_width + LABEL_PADDING;
        let children: f32 = arena[slot].children.iter().map(|&c| required[c]).sum();
        required[slot] = own.max(children);
    }

    // first slot of each node in arena order; later slots only reserve width
    let mut placed_at = vec![usize::MAX; graph.len()];
    for (slot, entry) in arena.iter().enumerate() {
        if placed_at[entry.node] == usize::MAX {
            placed_at[entry.node] = slot;
        }
    }

    let max_depth = (0..graph.len())
        .map(|node| arena[placed_at[node]].depth)
        .max()
        .unwrap_or(0);
    let level_gap = (canvas.height / (max_depth + 1) as f32).max(MIN_LEVEL_GAP);

    let total: f32 = forest.iter().map(|&r| required[r]).sum();
    let width = canvas.width.max(total);
    let scale = width / total;

    // (left edge, span) per slot
    let mut spans = vec![(0.0_f32, 0.0_f32); arena.len()];
    let mut cursor = 0.0;
    for &root in &forest {
        let span = required[root] * scale;
        spans[root] = (cursor, span);
        cursor += span;
    }

    let mut points = vec![(0.0, 0.0); graph.len()];
    for slot in 0..arena.len() {
        let (left, span) = spans[slot];
        let node = arena[slot].node;
        if placed_at[node] == slot {
            let depth = arena[slot].depth;
            points[node] = (left + span / 2.0, level_gap * depth as f32 + level_gap / 2.0);
        }

        let children = &arena[slot].children;
        let demand: f32 = children.iter().map(|&c| required[c]).sum();
        if demand <= 0.0 {
            continue;
        }
        let mut child_left = left;
        for &child in children {
            let child_span = span * required[child] / demand;
            spans[child] = (child_left, child_span);
            child_left += child_span;
        }
    }

    Placement {
        points,
        width,
        height: level_gap * (max_depth + 1) as f32,
    }
}
