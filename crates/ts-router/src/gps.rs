//! `Gps` — precomputed shortest-path trees for every junction.
//!
//! # Cost units
//!
//! Edge cost is the edge's routing length (its lane 0) in **millimetres**
//! divided by `max(priority, 1)`, rounded, and at least 1.  Integer costs
//! make equal-cost comparisons exact, which the priority tie-break relies
//! on.  Edges without lanes are not traversable.
//!
//! # Tie-break
//!
//! When a relaxation reaches a junction at exactly its current best cost,
//! the edge with the higher declared priority replaces the recorded
//! predecessor.  Costs are strictly positive, so every predecessor chain
//! strictly decreases in cost and can never loop.
//!
//! # Staleness
//!
//! Trees are only rebuilt by [`Gps::update`].  Callers must invoke it after
//! every topology change; nothing invalidates them automatically.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;
use tracing::info;

use ts_core::{EdgeId, JunctionId};
use ts_net::Net;

use crate::{RouterError, RouterResult};

// ── Graph view ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
struct Link {
    edge:     EdgeId,
    to:       JunctionId,
    cost:     u64,
    priority: i32,
}

/// Read-only adjacency extracted from the registry once per update.
struct Graph {
    junctions: Vec<JunctionId>,
    out:       FxHashMap<JunctionId, Vec<Link>>,
}

impl Graph {
    fn from_net(net: &Net) -> Self {
        let junctions: Vec<JunctionId> = net.junctions().map(|j| j.id).collect();
        let mut out: FxHashMap<JunctionId, Vec<Link>> = FxHashMap::default();
        for edge in net.edges() {
            let Some(length) = net.edge_length(edge.id) else {
                continue;
            };
            out.entry(edge.from()).or_default().push(Link {
                edge:     edge.id,
                to:       edge.to(),
                cost:     edge_cost_mm(length, edge.priority),
                priority: edge.priority,
            });
        }
        Self { junctions, out }
    }
}

/// Length in millimetres scaled down by priority.
#[inline]
pub fn edge_cost_mm(length_m: f64, priority: i32) -> u64 {
    let scaled = length_m.max(0.0) * 1000.0 / f64::from(priority.max(1));
    (scaled.round() as u64).max(1)
}

// ── Shortest-path tree ────────────────────────────────────────────────────────

/// Dijkstra result for one source junction.
#[derive(Clone, Debug, Default)]
struct Tree {
    /// For every reachable junction except the source: the edge entering it
    /// and the junction that edge starts from.
    pred: FxHashMap<JunctionId, (EdgeId, JunctionId)>,
    cost: FxHashMap<JunctionId, u64>,
}

fn shortest_path_tree(graph: &Graph, source: JunctionId) -> Tree {
    let mut tree = Tree::default();
    let mut pred_priority: FxHashMap<JunctionId, i32> = FxHashMap::default();
    tree.cost.insert(source, 0);

    // Secondary key JunctionId keeps pop order deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, JunctionId)>> = BinaryHeap::new();
    heap.push(Reverse((0, source)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        // Skip stale heap entries.
        if tree.cost.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }
        for link in graph.out.get(&node).into_iter().flatten() {
            if link.to == source {
                continue;
            }
            let new_cost = cost.saturating_add(link.cost);
            match tree.cost.get(&link.to).copied() {
                Some(best) if new_cost > best => {}
                Some(best) if new_cost == best => {
                    if pred_priority.get(&link.to).is_some_and(|&p| link.priority > p) {
                        tree.pred.insert(link.to, (link.edge, node));
                        pred_priority.insert(link.to, link.priority);
                    }
                }
                _ => {
                    tree.cost.insert(link.to, new_cost);
                    tree.pred.insert(link.to, (link.edge, node));
                    pred_priority.insert(link.to, link.priority);
                    heap.push(Reverse((new_cost, link.to)));
                }
            }
        }
    }
    tree
}

// ── Gps ───────────────────────────────────────────────────────────────────────

/// A shortest path between two junctions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Edges to traverse in order.  Empty only for `from == to`.
    pub edges:   Vec<EdgeId>,
    /// Sum of edge costs in (priority-scaled) millimetres.
    pub cost_mm: u64,
}

/// All-pairs routing guidance.
#[derive(Clone, Debug, Default)]
pub struct Gps {
    trees: FxHashMap<JunctionId, Tree>,
}

impl Gps {
    /// An empty router that knows no junctions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build trees for every junction of `net`.
    pub fn build(net: &Net) -> Self {
        let mut gps = Self::new();
        gps.update(net);
        gps
    }

    /// Recompute every junction's tree from scratch.
    ///
    /// With the `parallel` feature the sources are spread over the current
    /// Rayon pool; each tree only reads the shared graph.
    pub fn update(&mut self, net: &Net) {
        let graph = Graph::from_net(net);

        #[cfg(feature = "parallel")]
        let trees = {
            use rayon::prelude::*;
            graph
                .junctions
                .par_iter()
                .map(|&s| (s, shortest_path_tree(&graph, s)))
                .collect::<FxHashMap<_, _>>()
        };

        #[cfg(not(feature = "parallel"))]
        let trees = graph
            .junctions
            .iter()
            .map(|&s| (s, shortest_path_tree(&graph, s)))
            .collect::<FxHashMap<_, _>>();

        self.trees = trees;
        info!(
            junctions = self.trees.len(),
            reachable_pairs = self.trees.values().map(|t| t.pred.len()).sum::<usize>(),
            "router trees rebuilt",
        );
    }

    /// The edge leaving `from` on the shortest path to `to`.
    ///
    /// `None` when `from == to`, when `to` is unreachable, or when either
    /// junction was unknown at the last update.
    pub fn next_edge(&self, from: JunctionId, to: JunctionId) -> Option<EdgeId> {
        if from == to {
            return None;
        }
        let tree = self.trees.get(&from)?;
        let mut cur = to;
        // A chain never has more hops than there are junctions.
        for _ in 0..self.trees.len() {
            let &(edge, prev) = tree.pred.get(&cur)?;
            if prev == from {
                return Some(edge);
            }
            cur = prev;
        }
        None
    }

    /// `true` if `to` can be reached from `from` (and they differ).
    pub fn is_reachable(&self, from: JunctionId, to: JunctionId) -> bool {
        from != to && self.trees.get(&from).is_some_and(|t| t.pred.contains_key(&to))
    }

    /// The full shortest path.
    ///
    /// `Ok(None)` when `to` is unreachable; an error if `from` or `to` were not
    /// junctions of the net at the last update.
    pub fn route(&self, from: JunctionId, to: JunctionId) -> RouterResult<Option<Route>> {
        let tree = self.trees.get(&from).ok_or(RouterError::UnknownJunction(from))?;
        if !self.trees.contains_key(&to) {
            return Err(RouterError::UnknownJunction(to));
        }
        if from == to {
            return Ok(Some(Route { edges: Vec::new(), cost_mm: 0 }));
        }
        let Some(&cost_mm) = tree.cost.get(&to) else {
            return Ok(None);
        };
        let mut edges = Vec::new();
        let mut cur = to;
        while cur != from {
            let &(edge, prev) = tree
                .pred
                .get(&cur)
                .ok_or(RouterError::BrokenTree { from, junction: cur })?;
            edges.push(edge);
            cur = prev;
            if edges.len() > self.trees.len() {
                return Err(RouterError::BrokenTree { from, junction: cur });
            }
        }
        edges.reverse();
        Ok(Some(Route { edges, cost_mm }))
    }

    /// Number of source junctions with a tree.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
