//! Force-directed refinement.
//!
//! [`step`] is a plain function over a position slice so any host loop (a
//! frame callback, a CLI loop, a test) can drive it. [`ForceSimulation`] wraps
//! it with the seeded starting grid, the tick cap and the data version the
//! positions were built from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::{Canvas, Layout, LayoutGraph, LayoutStrategy, NodePosition, PositionMap, LABEL_PADDING};

/// Refinement stops after this many ticks.
pub const MAX_TICKS: u32 = 300;

/// Largest random offset applied to a grid cell on initialization.
const JITTER: f32 = 12.0;
/// Golden angle in radians, used to separate nodes that sit on top of each other.
const GOLDEN_ANGLE: f32 = 2.399_963;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceParams {
    /// Velocity is multiplied by this at the start of every tick
    pub damping: f32,
    /// Extra clearance on top of both radii before repulsion kicks in
    pub min_distance: f32,
    pub repulsion: f32,
    pub spring: f32,
    /// Rest length of an edge, before adding both radii
    pub edge_length: f32,
    /// Added to each node's radius to keep it off the walls
    pub wall_margin: f32,
    pub max_speed: f32,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            damping: 0.85,
            min_distance: 60.0,
            repulsion: 4000.0,
            spring: 0.02,
            edge_length: 120.0,
            wall_margin: 10.0,
            max_speed: 40.0,
        }
    }
}

/// The box every node is kept inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    fn clamp(&self, pos: &mut NodePosition, margin: f32) {
        let pad = pos.radius + margin;
        clamp_axis(&mut pos.x, &mut pos.vx, pad, self.width - pad);
        clamp_axis(&mut pos.y, &mut pos.vy, pad, self.height - pad);
    }
}

fn clamp_axis(value: &mut f32, velocity: &mut f32, lo: f32, hi: f32) {
    if lo > hi {
        // box narrower than the node
        *value = (lo + hi) / 2.0;
        *velocity = 0.0;
    } else if *value < lo {
        *value = lo;
        *velocity = 0.0;
    } else if *value > hi {
        *value = hi;
        *velocity = 0.0;
    }
}

/// Advances every node by one tick.
///
/// Applies damping, pairwise repulsion between nodes closer than
/// `min_distance + r_a + r_b`, spring attraction along `edges`, then
/// integrates and clamps each node into `bounds`.
pub fn step(
    positions: &mut [NodePosition],
    edges: &[(usize, usize)],
    bounds: Bounds,
    params: &ForceParams,
) {
    for pos in positions.iter_mut() {
        pos.vx *= params.damping;
        pos.vy *= params.damping;
    }

    let n = positions.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (positions[i], positions[j]);
            let threshold = params.min_distance + a.radius + b.radius;
            let (mut dx, mut dy) = (b.x - a.x, b.y - a.y);
            let mut distance = (dx * dx + dy * dy).sqrt();
            if distance >= threshold {
                continue;
            }
            if distance < 1e-3 {
                let angle = GOLDEN_ANGLE * (i * n + j) as f32;
                dx = angle.cos();
                dy = angle.sin();
                distance = 1.0;
            }

            let d = distance.max(1.0);
            let force = params.repulsion / (d * d);
            let (fx, fy) = (dx / distance * force, dy / distance * force);
            positions[i].vx -= fx;
            positions[i].vy -= fy;
            positions[j].vx += fx;
            positions[j].vy += fy;
        }
    }

    for &(from, to) in edges {
        if from == to || from >= n || to >= n {
            continue;
        }
        let (a, b) = (positions[from], positions[to]);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let distance = (dx * dx + dy * dy).sqrt().max(0.01);
        let target = params.edge_length + a.radius + b.radius;
        let force = params.spring * (distance - target);
        let (fx, fy) = (dx / distance * force, dy / distance * force);
        positions[from].vx += fx;
        positions[from].vy += fy;
        positions[to].vx -= fx;
        positions[to].vy -= fy;
    }

    for pos in positions.iter_mut() {
        let speed = (pos.vx * pos.vx + pos.vy * pos.vy).sqrt();
        if speed > params.max_speed {
            let scale = params.max_speed / speed;
            pos.vx *= scale;
            pos.vy *= scale;
        }
        pos.x += pos.vx;
        pos.y += pos.vy;
        bounds.clamp(pos, params.wall_margin);
    }
}

/// Grid cell positions sized by the average label width, with seeded jitter.
fn initial_positions(graph: &LayoutGraph, bounds: Bounds, seed: u64) -> Vec<NodePosition> {
    let mut rng = StdRng::seed_from_u64(seed);

    let column_width = graph.average_label_width() + LABEL_PADDING;
    let columns = ((bounds.width / column_width) as usize).clamp(1, graph.len().max(1));
    let rows = graph.len().div_ceil(columns);
    let row_height = bounds.height / (rows + 1) as f32;
    let offset = (bounds.width - column_width * columns as f32).max(0.0) / 2.0;

    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let (column, row) = (i % columns, i / columns);
            let x = offset + column_width * (column as f32 + 0.5) + rng.gen_range(-JITTER..=JITTER);
            let y = row_height * (row + 1) as f32 + rng.gen_range(-JITTER..=JITTER);
            NodePosition::at(x, y, node.radius)
        })
        .collect()
}

/// A force layout in progress.
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    ids: Vec<String>,
    positions: Vec<NodePosition>,
    edges: Vec<(usize, usize)>,
    bounds: Bounds,
    params: ForceParams,
    ticks: u32,
    data_version: u64,
}

impl ForceSimulation {
    pub(crate) fn new(graph: &LayoutGraph, canvas: Canvas, seed: u64, data_version: u64) -> Self {
        let bounds = Bounds {
            width: canvas.width,
            height: canvas.height,
        };
        let params = ForceParams::default();
        let mut positions = initial_positions(graph, bounds, seed);
        for pos in &mut positions {
            bounds.clamp(pos, params.wall_margin);
        }

        Self {
            ids: graph.nodes.iter().map(|n| n.id.clone()).collect(),
            positions,
            edges: graph.edges.clone(),
            bounds,
            params,
            ticks: 0,
            data_version,
        }
    }

    pub fn with_params(mut self, params: ForceParams) -> Self {
        self.params = params;
        self
    }

    /// Runs one step. Returns false once the tick cap is reached.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        step(&mut self.positions, &self.edges, self.bounds, &self.params);
        self.ticks += 1;
        true
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.ticks >= MAX_TICKS
    }

    /// Version of the graph data these positions were built from.
    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn positions(&self) -> PositionMap {
        self.ids
            .iter()
            .cloned()
            .zip(self.positions.iter().copied())
            .collect()
    }

    pub fn layout(&self) -> Layout {
        Layout {
            strategy: LayoutStrategy::Force,
            width: self.bounds.width,
            height: self.bounds.height,
            positions: self.positions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::test_support::graph;
    use crate::layout::{LayoutEngine, VisibilityFilter};

    fn simulation(ids: &[&str], pairs: &[(&str, &str)], seed: u64) -> ForceSimulation {
        let (nodes, edges) = graph(ids, pairs);
        let g = LayoutEngine::new().prepare(&nodes, &edges, &VisibilityFilter::default());
        ForceSimulation::new(
            &g,
            Canvas {
                width: 600.0,
                height: 400.0,
            },
            seed,
            1,
        )
    }

    fn in_bounds(sim: &ForceSimulation) -> bool {
        let b = sim.bounds();
        sim.positions().values().all(|p| {
            p.x.is_finite()
                && p.y.is_finite()
                && p.x >= 0.0
                && p.x <= b.width
                && p.y >= 0.0
                && p.y <= b.height
        })
    }

    #[test]
    fn test_stays_in_bounds() {
        let ids: Vec<String> = (0..25).map(|i| format!("m{i}.js")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let pairs: Vec<(&str, &str)> = id_refs.windows(2).map(|w| (w[0], w[1])).collect();
        let mut sim = simulation(&id_refs, &pairs, 3);

        assert!(in_bounds(&sim));
        while sim.tick() {
            assert!(in_bounds(&sim));
        }
    }

    #[test]
    fn test_stops_at_tick_cap() {
        let mut sim = simulation(&["a", "b"], &[("a", "b")], 0);
        let mut count = 0;
        while sim.tick() {
            count += 1;
        }
        assert_eq!(count, MAX_TICKS);
        assert!(sim.is_finished());
        assert!(!sim.tick());
        assert_eq!(sim.ticks(), MAX_TICKS);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let ids = ["a", "b", "c", "d"];
        let pairs = [("a", "b"), ("b", "c"), ("c", "d")];
        let mut first = simulation(&ids, &pairs, 42);
        let mut second = simulation(&ids, &pairs, 42);
        for _ in 0..50 {
            first.tick();
            second.tick();
        }
        assert_eq!(first.positions(), second.positions());
        assert_eq!(first.data_version(), 1);
    }

    #[test]
    fn test_coincident_nodes_separate() {
        let mut positions = vec![NodePosition::at(100.0, 100.0, 8.0); 3];
        let bounds = Bounds {
            width: 400.0,
            height: 400.0,
        };
        step(&mut positions, &[], bounds, &ForceParams::default());

        for i in 0..3 {
            for j in (i + 1)..3 {
                let (a, b) = (positions[i], positions[j]);
                assert!((a.x - b.x).abs() + (a.y - b.y).abs() > 0.1);
            }
        }
    }

    #[test]
    fn test_spring_pulls_distant_nodes_together() {
        let mut positions = vec![
            NodePosition::at(20.0, 200.0, 10.0),
            NodePosition::at(780.0, 200.0, 10.0),
        ];
        let bounds = Bounds {
            width: 800.0,
            height: 400.0,
        };
        let before = positions[1].x - positions[0].x;
        for _ in 0..20 {
            step(&mut positions, &[(0, 1)], bounds, &ForceParams::default());
        }
        assert!(positions[1].x - positions[0].x < before);
    }

    #[test]
    fn test_clamp_zeroes_velocity_at_wall() {
        let mut positions = vec![NodePosition {
            x: 5.0,
            y: 50.0,
            radius: 10.0,
            vx: -30.0,
            vy: 0.0,
        }];
        step(
            &mut positions,
            &[],
            Bounds {
                width: 100.0,
                height: 100.0,
            },
            &ForceParams::default(),
        );
        assert_eq!(positions[0].x, 20.0);
        assert_eq!(positions[0].vx, 0.0);
    }
}
