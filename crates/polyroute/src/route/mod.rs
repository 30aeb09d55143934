//! Routes over a mesh graph and the strategies that produce them.
//!
//! Purpose
//! - A [`Route`] is a closed sequence of half-edges plus the edge
//!   classification a strand compiler needs: which half-edges are kissing-loop
//!   hairpins and which edges form the spanning tree.
//! - Four strategies build routes: [`atrail`] (single cover, non-crossing),
//!   [`euler`] (single cover of the checkerboarded graph), [`sterna`]
//!   (spanning-tree double cover) and [`xtrna`] (rotation-system double cover).
//!
//! Walk rule
//! - After a regular half-edge the walk stands at its destination.
//! - A kissing-loop half-edge is a hairpin into the middle of its edge: the
//!   walk returns to the half-edge's origin.
//!
//! Routers never mutate the caller's graph. Strategies that augment it work
//! on a clone and return it in [`Routed`].

pub mod atrail;
pub mod euler;
mod persist;
pub mod spanning;
pub mod sterna;
pub mod xtrna;

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GraphResult, RouteResult};
use crate::graph::{EdgeId, Graph, HalfEdgeId, VertexId};

pub use atrail::{ATrailCfg, Transition};
pub use persist::RouteDoc;
pub use spanning::{SpanningTree, TreeKind};
pub use sterna::{CoTreeOrder, SternaCfg, SternaRouter};
pub use xtrna::{XtrnaCfg, XtrnaRouter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    ATrail,
    Euler,
    Sterna,
    Xtrna,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::ATrail => "atrail",
            Strategy::Euler => "euler",
            Strategy::Sterna => "sterna",
            Strategy::Xtrna => "xtrna",
        }
    }
}

/// Configuration for every strategy, as read from a config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterCfg {
    pub atrail: ATrailCfg,
    pub sterna: SternaCfg,
    pub xtrna: XtrnaCfg,
}

impl RouterCfg {
    /// Override the seed of every seeded strategy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.atrail.seed = seed;
        self.sterna.seed = seed;
        self.xtrna.seed = seed;
        self
    }
}

/// Route `graph` with the chosen strategy.
pub fn route(graph: &Graph, strategy: Strategy, cfg: &RouterCfg) -> RouteResult<Routed> {
    match strategy {
        Strategy::ATrail => atrail::atrail_route(graph, &cfg.atrail),
        Strategy::Euler => euler::euler_route(graph),
        Strategy::Sterna => SternaRouter::new(cfg.sterna.clone()).route(graph),
        Strategy::Xtrna => XtrnaRouter::new(cfg.xtrna.clone()).route(graph),
    }
}

/// A route together with the (possibly augmented) graph it walks.
#[derive(Clone, Debug)]
pub struct Routed {
    pub graph: Graph,
    pub route: Route,
}

/// Running and maximal number of simultaneously open kissing loops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KissingLoopCost {
    pub open: i64,
    pub worst: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
    pub trail: Vec<HalfEdgeId>,
    pub kissing_loops: BTreeSet<HalfEdgeId>,
    pub tree_edges: BTreeSet<EdgeId>,
}

impl Route {
    pub fn new(trail: Vec<HalfEdgeId>) -> Self {
        Self {
            trail,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    #[inline]
    pub fn is_kissing_loop(&self, h: HalfEdgeId) -> bool {
        self.kissing_loops.contains(&h)
    }

    /// Vertex the walk stands at after traversing `h`.
    pub fn next_vertex(&self, graph: &Graph, h: HalfEdgeId) -> VertexId {
        if self.is_kissing_loop(h) {
            graph.origin(h)
        } else {
            graph.dest(h)
        }
    }

    /// Every entry starts where the previous one (cyclically) left the walk.
    pub fn is_closed(&self, graph: &Graph) -> bool {
        let n = self.trail.len();
        (0..n).all(|i| {
            self.next_vertex(graph, self.trail[i]) == graph.origin(self.trail[(i + 1) % n])
        })
    }

    /// True if a half-edge repeats back to back, or a regular half-edge is
    /// followed by one leaving the same vertex.
    pub fn has_immediate_repetition(&self, graph: &Graph) -> bool {
        let n = self.trail.len();
        (0..n).any(|i| {
            let (a, b) = (self.trail[i], self.trail[(i + 1) % n]);
            a == b || (!self.is_kissing_loop(a) && graph.origin(a) == graph.origin(b))
        })
    }

    /// Number of traversals of each edge, indexed by edge id.
    pub fn visit_counts(&self, edge_count: usize) -> Vec<usize> {
        let mut counts = vec![0; edge_count];
        for h in &self.trail {
            if let Some(c) = counts.get_mut(h.edge().0) {
                *c += 1;
            }
        }
        counts
    }

    /// A kissing loop opens at the first hairpin into an edge and closes at the
    /// second.
    pub fn kissing_loop_cost(&self) -> KissingLoopCost {
        let mut open: HashSet<EdgeId> = HashSet::new();
        let mut cost = KissingLoopCost::default();
        for &h in &self.trail {
            if !self.is_kissing_loop(h) {
                continue;
            }
            if open.remove(&h.edge()) {
                cost.open -= 1;
            } else {
                open.insert(h.edge());
                cost.open += 1;
                cost.worst = cost.worst.max(cost.open);
            }
        }
        cost
    }

    /// Whether every pass through a vertex enters and leaves along edges that
    /// are neighbours in the vertex's topological rotation.
    pub fn is_non_crossing(&self, graph: &Graph) -> GraphResult<bool> {
        let rot = graph.topo_rotations()?;
        Ok(passes_are_adjacent(graph, &rot, &self.trail))
    }
}

pub(crate) fn passes_are_adjacent(graph: &Graph, rot: &[Vec<EdgeId>], trail: &[HalfEdgeId]) -> bool {
    let n = trail.len();
    (0..n).all(|i| {
        let (a, b) = (trail[i], trail[(i + 1) % n]);
        let v = graph.dest(a);
        let r = &rot[v.0];
        let d = r.len();
        match (
            r.iter().position(|&e| e == a.edge()),
            r.iter().position(|&e| e == b.edge()),
        ) {
            (Some(x), Some(y)) => {
                let diff = (x + d - y) % d;
                diff == 1 || diff == d - 1
            }
            _ => false,
        }
    })
}
