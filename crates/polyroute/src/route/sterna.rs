//! Spanning-tree double cover with kissing-loop minimization ("Sterna").
//!
//! Purpose
//! - Walk around a spanning tree so every tree edge is traversed down and back,
//!   and every co-tree edge is visited by two hairpins, one from each end.
//!   Each co-tree hairpin is a kissing loop: it opens at the first hairpin and
//!   closes at the second.
//!
//! Why this design
//! - The walk only depends on the tree, the root and the rotation system, so
//!   a persisted tree is enough to re-derive the route.
//! - Minimization is a branch and bound over DFS trees on an explicit stack of
//!   partial walks. A partial walk is abandoned as soon as its worst number of
//!   open loops reaches the incumbent's; the stack is shuffled periodically and
//!   the search stops at its iteration budget with the best route found.
//!
//! Code cross-refs: `route::spanning`, `Route::kissing_loop_cost`.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RouteResult;
use crate::graph::{EdgeId, Graph, HalfEdgeId, VertexId};

use super::spanning::{dfs_tree, spanning_tree, SpanningTree, TreeKind};
use super::{Route, Routed};

/// Where co-tree hairpins go relative to tree edges at each vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoTreeOrder {
    /// Interleaved in rotation order.
    Rotation,
    /// All hairpins before descending into children.
    Pre,
    /// All hairpins after returning from children.
    Post,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SternaCfg {
    pub tree: TreeKind,
    pub cotree_order: CoTreeOrder,
    /// Search DFS trees for a low worst kissing-loop count instead of using `tree`.
    pub minimize_kissing_loops: bool,
    pub max_iterations: usize,
    /// Shuffle the search stack every this many steps (0 disables).
    pub shuffle_interval: usize,
    pub seed: u64,
}

impl Default for SternaCfg {
    fn default() -> Self {
        Self {
            tree: TreeKind::Prim,
            cotree_order: CoTreeOrder::Rotation,
            minimize_kissing_loops: false,
            max_iterations: 20_000,
            shuffle_interval: 5_000,
            seed: 0,
        }
    }
}

pub struct SternaRouter {
    cfg: SternaCfg,
    rng: StdRng,
}

impl SternaRouter {
    pub fn new(cfg: SternaCfg) -> Self {
        let rng = StdRng::seed_from_u64(cfg.seed);
        Self { cfg, rng }
    }

    pub fn route(&mut self, graph: &Graph) -> RouteResult<Routed> {
        if graph.edges.is_empty() {
            return Ok(Routed {
                graph: graph.clone(),
                route: Route::default(),
            });
        }
        if self.cfg.minimize_kissing_loops {
            return self.min_kl_dfst_route(graph);
        }
        let rot = graph.rotations();
        let tree = spanning_tree(graph, self.cfg.tree, &rot, VertexId(0), &mut self.rng)?;
        let route = walk_tree(graph, &rot, &tree, self.cfg.cotree_order);
        let cost = route.kissing_loop_cost();
        info!(tree = ?self.cfg.tree, worst = cost.worst, "sterna route");
        Ok(Routed {
            graph: graph.clone(),
            route,
        })
    }

    /// Walk a given spanning tree.
    pub fn route_with_tree(&self, graph: &Graph, tree: &SpanningTree) -> Routed {
        let rot = graph.rotations();
        Routed {
            graph: graph.clone(),
            route: walk_tree(graph, &rot, tree, self.cfg.cotree_order),
        }
    }

    /// Rebuild a route from its persisted tree; the root is the origin of the
    /// first trail entry. Minimized routes always interleave hairpins in
    /// rotation order, whatever `cotree_order` says.
    pub fn rederive(&self, graph: &Graph, route: &Route) -> Routed {
        let root = route
            .trail
            .first()
            .map_or(VertexId(0), |&h| graph.origin(h));
        let tree = SpanningTree {
            root,
            edges: route.tree_edges.clone(),
        };
        let order = if self.cfg.minimize_kissing_loops {
            CoTreeOrder::Rotation
        } else {
            self.cfg.cotree_order
        };
        let rot = graph.rotations();
        Routed {
            graph: graph.clone(),
            route: walk_tree(graph, &rot, &tree, order),
        }
    }

    /// Branch and bound over DFS trees from every root for the smallest worst
    /// number of simultaneously open kissing loops.
    pub fn min_kl_dfst_route(&mut self, graph: &Graph) -> RouteResult<Routed> {
        let rot = graph.rotations();
        let n = graph.vertices.len();
        let tree = dfs_tree(graph, &rot, VertexId(0))?;
        let mut best = walk_tree(graph, &rot, &tree, CoTreeOrder::Rotation);
        let mut best_worst = best.kissing_loop_cost().worst;
        let lower_bound = i64::from(graph.edges.len() + 1 > n);

        let mut stack: Vec<Partial> = (0..n)
            .rev()
            .map(|r| Partial::new(graph, VertexId(r)))
            .collect();
        let mut iterations = 0usize;
        while best_worst > lower_bound {
            let Some(mut p) = stack.pop() else { break };
            iterations += 1;
            if iterations > self.cfg.max_iterations {
                warn!(iterations = self.cfg.max_iterations, best_worst, "search budget spent");
                break;
            }
            if self.cfg.shuffle_interval > 0 && iterations % self.cfg.shuffle_interval == 0 {
                stack.shuffle(&mut self.rng);
            }
            match p.advance(graph, &rot, best_worst) {
                Advance::Pruned => {}
                Advance::Complete => {
                    if p.visited_count == n && p.worst < best_worst {
                        best_worst = p.worst;
                        best = p.into_route();
                        debug!(iterations, best_worst, "improved kissing-loop route");
                    }
                }
                Advance::Branch(e, u) => {
                    let mut defer = p.clone();
                    defer.hairpin(graph, e, u);
                    if defer.worst < best_worst {
                        stack.push(defer);
                    }
                    p.descend(graph, &rot, e, u);
                    stack.push(p);
                }
            }
        }
        info!(worst = best_worst, iterations, "sterna minimized route");
        Ok(Routed {
            graph: graph.clone(),
            route: best,
        })
    }
}

/// Rotation of `v` starting after `parent`, without it.
fn rotation_after(rot: &[Vec<EdgeId>], v: VertexId, parent: Option<EdgeId>) -> Vec<EdgeId> {
    let order = &rot[v.0];
    let start = parent
        .and_then(|p| order.iter().position(|&e| e == p))
        .map_or(0, |i| i + 1);
    (0..order.len())
        .map(|k| order[(start + k) % order.len()])
        .filter(|&e| Some(e) != parent)
        .collect()
}

struct WalkFrame {
    vertex: VertexId,
    parent: Option<EdgeId>,
    items: Vec<EdgeId>,
    next: usize,
}

/// Double-cover walk around `tree` from its root.
pub fn walk_tree(graph: &Graph, rot: &[Vec<EdgeId>], tree: &SpanningTree, order: CoTreeOrder) -> Route {
    let frame = |v: VertexId, parent: Option<EdgeId>| {
        let mut items = rotation_after(rot, v, parent);
        match order {
            CoTreeOrder::Rotation => {}
            CoTreeOrder::Pre => items.sort_by_key(|&e| tree.contains(e)),
            CoTreeOrder::Post => items.sort_by_key(|&e| !tree.contains(e)),
        }
        WalkFrame {
            vertex: v,
            parent,
            items,
            next: 0,
        }
    };
    let mut trail = Vec::with_capacity(2 * graph.edges.len());
    let mut kissing = BTreeSet::new();
    let mut frames = vec![frame(tree.root, None)];
    while let Some(top) = frames.last_mut() {
        let u = top.vertex;
        let Some(&e) = top.items.get(top.next) else {
            let parent = top.parent;
            frames.pop();
            if let Some(p) = parent {
                trail.push(graph.half_edge_from(p, u));
            }
            continue;
        };
        top.next += 1;
        let h = graph.half_edge_from(e, u);
        trail.push(h);
        if tree.contains(e) {
            frames.push(frame(graph.other_vertex(e, u), Some(e)));
        } else {
            kissing.insert(h);
        }
    }
    Route {
        trail,
        kissing_loops: kissing,
        tree_edges: tree.edges.clone(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeState {
    Unseen,
    Tree,
    CoTree,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    vertex: VertexId,
    parent: Option<EdgeId>,
    start: usize,
    step: usize,
}

enum Advance {
    Complete,
    Pruned,
    /// Edge from the top vertex to an unvisited vertex: descend or defer.
    Branch(EdgeId, VertexId),
}

/// A partially built DFS-tree walk.
#[derive(Clone)]
struct Partial {
    trail: Vec<HalfEdgeId>,
    kissing: BTreeSet<HalfEdgeId>,
    state: Vec<EdgeState>,
    hairpins: Vec<u8>,
    visited: Vec<bool>,
    visited_count: usize,
    frames: Vec<Frame>,
    cost: i64,
    worst: i64,
}

impl Partial {
    fn new(graph: &Graph, root: VertexId) -> Self {
        let mut visited = vec![false; graph.vertices.len()];
        visited[root.0] = true;
        Self {
            trail: Vec::with_capacity(2 * graph.edges.len()),
            kissing: BTreeSet::new(),
            state: vec![EdgeState::Unseen; graph.edges.len()],
            hairpins: vec![0; graph.edges.len()],
            visited,
            visited_count: 1,
            frames: vec![Frame {
                vertex: root,
                parent: None,
                start: 0,
                step: 0,
            }],
            cost: 0,
            worst: 0,
        }
    }

    /// Run forced steps until the walk completes, branches or reaches `bound`.
    fn advance(&mut self, graph: &Graph, rot: &[Vec<EdgeId>], bound: i64) -> Advance {
        while let Some(top) = self.frames.last_mut() {
            let Frame {
                vertex: u,
                parent,
                start,
                step,
            } = *top;
            let order = &rot[u.0];
            if step == order.len() {
                self.frames.pop();
                if let Some(p) = parent {
                    self.trail.push(graph.half_edge_from(p, u));
                }
                continue;
            }
            top.step += 1;
            let e = order[(start + step) % order.len()];
            if Some(e) == parent {
                continue;
            }
            match self.state[e.0] {
                EdgeState::Tree => continue,
                EdgeState::CoTree => self.hairpin(graph, e, u),
                EdgeState::Unseen => {
                    if !self.visited[graph.other_vertex(e, u).0] {
                        return Advance::Branch(e, u);
                    }
                    self.hairpin(graph, e, u);
                }
            }
            if self.worst >= bound {
                return Advance::Pruned;
            }
        }
        Advance::Complete
    }

    /// Visit `e` from `u` as a co-tree hairpin.
    fn hairpin(&mut self, graph: &Graph, e: EdgeId, u: VertexId) {
        self.state[e.0] = EdgeState::CoTree;
        let h = graph.half_edge_from(e, u);
        self.trail.push(h);
        self.kissing.insert(h);
        self.hairpins[e.0] += 1;
        if self.hairpins[e.0] == 1 {
            self.cost += 1;
            self.worst = self.worst.max(self.cost);
        } else {
            self.cost -= 1;
        }
    }

    /// Take `e` from `u` into the tree and continue at its far end.
    fn descend(&mut self, graph: &Graph, rot: &[Vec<EdgeId>], e: EdgeId, u: VertexId) {
        self.state[e.0] = EdgeState::Tree;
        self.trail.push(graph.half_edge_from(e, u));
        let w = graph.other_vertex(e, u);
        self.visited[w.0] = true;
        self.visited_count += 1;
        let back = rot[w.0].iter().position(|&x| x == e).unwrap_or(0);
        self.frames.push(Frame {
            vertex: w,
            parent: Some(e),
            start: back + 1,
            step: 0,
        });
    }

    fn into_route(self) -> Route {
        let tree_edges = self
            .state
            .iter()
            .enumerate()
            .filter(|(_, &s)| s == EdgeState::Tree)
            .map(|(i, _)| EdgeId(i))
            .collect();
        Route {
            trail: self.trail,
            kissing_loops: self.kissing,
            tree_edges,
        }
    }
}
