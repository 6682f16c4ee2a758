//! Concentric ring layout ordered by node importance.

use std::f32::consts::{FRAC_PI_2, TAU};

use super::{Canvas, LayoutGraph, Placement, LABEL_PADDING};

/// Target node count per ring, innermost first. The last ring takes any overflow.
pub(crate) const RING_SIZES: [usize; 5] = [1, 6, 12, 18, 24];
/// Space kept between the outermost ring and the canvas edge.
pub(crate) const MARGIN: f32 = 60.0;
/// Minimum radial distance between neighbouring rings.
const MIN_RING_GAP: f32 = 70.0;

/// Splits nodes (already in importance order) into rings.
pub(crate) fn rings(order: &[usize]) -> Vec<Vec<usize>> {
    let mut rings = Vec::new();
    let mut rest = order;

    for (ring, &size) in RING_SIZES.iter().enumerate() {
        if rest.is_empty() {
            break;
        }
        let take = if ring == RING_SIZES.len() - 1 {
            rest.len()
        } else {
            size.min(rest.len())
        };
        rings.push(rest[..take].to_vec());
        rest = &rest[take..];
    }

    rings
}

pub(crate) fn layout(graph: &LayoutGraph, canvas: Canvas) -> Placement {
    let mut order: Vec<usize> = (0..graph.len()).collect();
    order.sort_by(|&a, &b| {
        let (na, nb) = (&graph.nodes[a], &graph.nodes[b]);
        nb.importance
            .total_cmp(&na.importance)
            .then_with(|| na.id.cmp(&nb.id))
    });
    let rings = rings(&order);

    let ring_steps = rings.len().saturating_sub(1).max(1) as f32;
    let base = ((canvas.width.min(canvas.height) / 2.0 - MARGIN).max(MIN_RING_GAP)) / ring_steps;

    let mut radii = Vec::with_capacity(rings.len());
    for (index, ring) in rings.iter().enumerate() {
        let mut radius = base * index as f32;
        // A lone node only sits at the center when it is the innermost ring.
        if index > 0 || ring.len() > 1 {
            let required: f32 = ring
                .iter()
                .map(|&i| graph.nodes[i].label_width + LABEL_PADDING)
                .sum();
            if required > TAU * radius {
                radius = required / TAU;
            }
        }
        if let Some(&inner) = radii.last() {
            radius = radius.max(inner + MIN_RING_GAP);
        }
        radii.push(radius);
    }

    let outer = radii.last().copied().unwrap_or(0.0);
    let cx = (canvas.width / 2.0).max(outer + MARGIN);
    let cy = (canvas.height / 2.0).max(outer + MARGIN);

    let mut points = vec![(cx, cy); graph.len()];
    for (ring, &radius) in rings.iter().zip(&radii) {
        let count = ring.len() as f32;
        for (slot, &i) in ring.iter().enumerate() {
            let angle = -FRAC_PI_2 + TAU * slot as f32 / count;
            points[i] = (cx + radius * angle.cos(), cy + radius * angle.sin());
        }
    }

    Placement {
        points,
        width: canvas.width.max(2.0 * cx),
        height: canvas.height.max(2.0 * cy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::graph;
    use crate::layout::{LayoutEngine, VisibilityFilter};

    fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn test_ring_partition() {
        let order: Vec<usize> = (0..70).collect();
        let sizes: Vec<usize> = rings(&order).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 6, 12, 18, 33]);

        let small: Vec<usize> = (0..5).collect();
        let sizes: Vec<usize> = rings(&small).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 4]);

        assert!(rings(&[]).is_empty());
    }

    #[test]
    fn test_most_important_node_at_center() {
        let ids = ["hub", "a", "b", "c", "d", "e", "f"];
        let pairs: Vec<(&str, &str)> = ids[1..].iter().map(|id| (*id, "hub")).collect();
        let (nodes, edges) = graph(&ids, &pairs);
        let g = LayoutEngine::new().prepare(&nodes, &edges, &VisibilityFilter::default());

        let canvas = Canvas {
            width: 800.0,
            height: 800.0,
        };
        let placement = layout(&g, canvas);
        assert_eq!(placement.points[0], (400.0, 400.0));

        let ring: Vec<f32> = (1..7)
            .map(|i| distance(placement.points[i], (400.0, 400.0)))
            .collect();
        for r in &ring {
            assert!((r - ring[0]).abs() < 1e-3);
            assert!(*r > 0.0);
        }
    }

    #[test]
    fn test_crowded_ring_grows_to_fit_labels() {
        let ids: Vec<String> = (0..30)
            .map(|i| format!("src/components/VeryDescriptiveName{i}.tsx"))
            .collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let (nodes, edges) = graph(&id_refs, &[]);
        let g = LayoutEngine::new().prepare(&nodes, &edges, &VisibilityFilter::default());

        let placement = layout(
            &g,
            Canvas {
                width: 400.0,
                height: 400.0,
            },
        );

        assert!(placement.width > 400.0);
        let center = (placement.width / 2.0, placement.height / 2.0);
        for point in &placement.points {
            assert!(point.0 >= 0.0 && point.1 >= 0.0);
            assert!(distance(*point, center) <= placement.width / 2.0);
        }
    }
}
