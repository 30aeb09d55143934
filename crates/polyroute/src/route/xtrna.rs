//! Rotation-system double cover ("Xtrna").
//!
//! Purpose
//! - Build a cyclic rotation of outgoing half-edges at every vertex such that
//!   face tracing yields one closed walk over all half-edges.
//!
//! Why this design
//! - A tree under any rotation has a single face. Co-tree edges are added in
//!   pairs sharing a vertex: the first edge splits the face in two, the second
//!   is placed to join both sides again. Each pair therefore keeps the single
//!   face while staying close to the mesh's own rotation.
//! - Co-tree edges left without a partner become kissing loops: both of their
//!   half-edges are hairpins appended at the end of their origin's rotation,
//!   which never changes the face count.
//! - The spanning tree is drawn uniformly at random and redrawn up to
//!   `max_resamples` times, keeping the embedding with the fewest kissing-loop
//!   half-edges. No optimal (matroid parity) tree is computed.
//!
//! Walk: after a regular half-edge `h`, continue with the successor of
//! `twin(h)` in the rotation at `h`'s destination; after a kissing-loop
//! half-edge, continue with its own successor at its origin.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{RouteError, RouteResult};
use crate::graph::{EdgeId, Graph, HalfEdgeId, VertexId};

use super::spanning::{random_tree, SpanningTree};
use super::{Route, Routed};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XtrnaCfg {
    pub max_resamples: usize,
    pub seed: u64,
}

impl Default for XtrnaCfg {
    fn default() -> Self {
        Self {
            max_resamples: 2_000,
            seed: 0,
        }
    }
}

pub struct XtrnaRouter {
    cfg: XtrnaCfg,
    rng: StdRng,
}

impl XtrnaRouter {
    pub fn new(cfg: XtrnaCfg) -> Self {
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
        let mesh = MeshOrder::new(graph);
        let mut best: Option<Embedding> = None;
        let mut attempts = 0usize;
        for _ in 0..self.cfg.max_resamples.max(1) {
            attempts += 1;
            let tree = random_tree(graph, VertexId(0), &mut self.rng)?;
            let emb = Embedding::build(graph, &mesh, tree);
            let count = emb.kissing.len();
            if best.as_ref().map_or(true, |b| count < b.kissing.len()) {
                debug!(attempts, kissing = count, "fewer kissing loops");
                best = Some(emb);
            }
            if count <= 2 {
                break;
            }
        }
        if attempts == self.cfg.max_resamples.max(1) {
            if let Some(b) = best.as_ref().filter(|b| b.kissing.len() > 2) {
                warn!(attempts, kissing = b.kissing.len(), "resample budget spent");
            }
        }
        let Some(emb) = best else {
            return Err(RouteError::IncompleteCover {
                covered: 0,
                expected: 2 * graph.edges.len(),
            });
        };
        let route = emb.walk(graph)?;
        info!(attempts, kissing = route.kissing_loops.len(), "xtrna route");
        Ok(Routed {
            graph: graph.clone(),
            route,
        })
    }
}

/// The mesh's own rotation at every vertex, with each edge's slot at both ends.
struct MeshOrder {
    rot: Vec<Vec<EdgeId>>,
    slot: Vec<[usize; 2]>,
}

impl MeshOrder {
    fn new(graph: &Graph) -> Self {
        let rot = graph.rotations();
        let mut slot = vec![[0usize; 2]; graph.edges.len()];
        for (v, order) in rot.iter().enumerate() {
            for (i, &e) in order.iter().enumerate() {
                let side = usize::from(graph.edges[e.0].vertices[0] != VertexId(v));
                slot[e.0][side] = i;
            }
        }
        Self { rot, slot }
    }
}

/// Pair co-tree edges that share a vertex, component by component, with a
/// post-order DFS. Returns the pairs (with their shared vertex) and the edges
/// left over, at most one per component.
pub fn pair_cotree(graph: &Graph, tree: &SpanningTree) -> (Vec<(EdgeId, EdgeId, VertexId)>, Vec<EdgeId>) {
    let n = graph.vertices.len();
    let adj: Vec<Vec<EdgeId>> = graph
        .vertices
        .iter()
        .map(|v| v.edges.iter().copied().filter(|&e| !tree.contains(e)).collect())
        .collect();
    let mut visited = vec![false; n];
    let mut parent: Vec<Option<EdgeId>> = vec![None; n];
    let mut paired = vec![false; graph.edges.len()];
    let mut pairs = Vec::new();
    let mut unpaired = Vec::new();

    for root in (0..n).map(VertexId) {
        if visited[root.0] || adj[root.0].is_empty() {
            continue;
        }
        visited[root.0] = true;
        let mut post = Vec::new();
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let (u, i) = *top;
            let Some(&e) = adj[u.0].get(i) else {
                post.push(u);
                stack.pop();
                continue;
            };
            top.1 += 1;
            let w = graph.other_vertex(e, u);
            if !visited[w.0] {
                visited[w.0] = true;
                parent[w.0] = Some(e);
                stack.push((w, 0));
            }
        }

        for u in post {
            let mut pending: Vec<EdgeId> = adj[u.0]
                .iter()
                .copied()
                .filter(|&e| !paired[e.0] && Some(e) != parent[u.0])
                .collect();
            while pending.len() >= 2 {
                let (Some(b), Some(a)) = (pending.pop(), pending.pop()) else {
                    break;
                };
                paired[a.0] = true;
                paired[b.0] = true;
                pairs.push((a, b, u));
            }
            if let Some(last) = pending.pop() {
                paired[last.0] = true;
                match parent[u.0] {
                    Some(p) => {
                        paired[p.0] = true;
                        pairs.push((last, p, u));
                    }
                    None => unpaired.push(last),
                }
            }
        }
    }
    (pairs, unpaired)
}

struct Embedding {
    rot: Vec<Vec<HalfEdgeId>>,
    kissing: BTreeSet<HalfEdgeId>,
    tree: SpanningTree,
}

impl Embedding {
    fn build(graph: &Graph, mesh: &MeshOrder, tree: SpanningTree) -> Self {
        let rot = (0..graph.vertices.len())
            .map(|v| {
                let v = VertexId(v);
                mesh.rot[v.0]
                    .iter()
                    .filter(|&&e| tree.contains(e))
                    .map(|&e| graph.half_edge_from(e, v))
                    .collect()
            })
            .collect();
        let (pairs, unpaired) = pair_cotree(graph, &tree);
        let mut emb = Self {
            rot,
            kissing: BTreeSet::new(),
            tree,
        };
        let mut loose: Vec<EdgeId> = unpaired;
        for (a, b, v) in pairs {
            if !emb.insert_pair(graph, mesh, a, b, v) {
                loose.push(a);
                loose.push(b);
            }
        }
        loose.sort_unstable();
        for e in loose {
            for h in graph.edges[e.0].half_edges {
                emb.rot[graph.origin(h).0].push(h);
                emb.kissing.insert(h);
            }
        }
        emb
    }

    /// Index in `rot[u]` where `h` (leaving `u`) goes to respect mesh order:
    /// right after the closest placed predecessor in the mesh rotation.
    fn mesh_index(&self, graph: &Graph, mesh: &MeshOrder, u: VertexId, h: HalfEdgeId) -> usize {
        let order = &mesh.rot[u.0];
        let d = order.len();
        let m = mesh.slot[h.edge().0][h.side()];
        for k in 1..d {
            let prev = graph.half_edge_from(order[(m + d - k) % d], u);
            if let Some(j) = self.rot[u.0].iter().position(|&x| x == prev) {
                return j + 1;
            }
        }
        0
    }

    fn insert_at_mesh(&mut self, graph: &Graph, mesh: &MeshOrder, h: HalfEdgeId) {
        let u = graph.origin(h);
        let i = self.mesh_index(graph, mesh, u, h);
        self.rot[u.0].insert(i, h);
    }

    fn remove(&mut self, graph: &Graph, h: HalfEdgeId) {
        self.rot[graph.origin(h).0].retain(|&x| x != h);
    }

    /// Face label of every placed half-edge (`usize::MAX` when unplaced).
    fn face_labels(&self, graph: &Graph) -> Vec<usize> {
        let pos = self.positions(graph);
        let mut label = vec![usize::MAX; graph.half_edges.len()];
        let mut next_label = 0;
        for order in &self.rot {
            for &start in order {
                if label[start.0] != usize::MAX {
                    continue;
                }
                let mut h = start;
                while label[h.0] == usize::MAX {
                    label[h.0] = next_label;
                    h = self.successor(graph, &pos, h);
                }
                next_label += 1;
            }
        }
        label
    }

    fn positions(&self, graph: &Graph) -> Vec<usize> {
        let mut pos = vec![usize::MAX; graph.half_edges.len()];
        for order in &self.rot {
            for (i, h) in order.iter().enumerate() {
                pos[h.0] = i;
            }
        }
        pos
    }

    /// Face-tracing successor of a placed half-edge.
    fn successor(&self, graph: &Graph, pos: &[usize], h: HalfEdgeId) -> HalfEdgeId {
        let pivot = if self.kissing.contains(&h) { h } else { h.twin() };
        let order = &self.rot[graph.origin(pivot).0];
        order[(pos[pivot.0] + 1) % order.len()]
    }

    /// Place the co-tree pair `a`, `b` sharing vertex `v`; false if no corner
    /// at `v` joins the two faces that `a` creates.
    fn insert_pair(&mut self, graph: &Graph, mesh: &MeshOrder, a: EdgeId, b: EdgeId, v: VertexId) -> bool {
        let a_v = graph.half_edge_from(a, v);
        self.insert_at_mesh(graph, mesh, a_v);
        self.insert_at_mesh(graph, mesh, a_v.twin());

        let label = self.face_labels(graph);
        let b_v = graph.half_edge_from(b, v);
        let b_y = b_v.twin();
        let y = graph.origin(b_y);
        let at_y = self.mesh_index(graph, mesh, y, b_y);
        let rot_y = &self.rot[y.0];
        let face_y = label[rot_y[at_y % rot_y.len()].0];

        let rot_v = &self.rot[v.0];
        let d = rot_v.len();
        let start = self.mesh_index(graph, mesh, v, b_v);
        let corner = (0..d)
            .map(|k| (start + k) % d)
            .find(|&i| label[rot_v[i].0] != face_y);
        match corner {
            Some(i) => {
                self.rot[v.0].insert(i, b_v);
                self.rot[y.0].insert(at_y, b_y);
                true
            }
            None => {
                self.remove(graph, a_v);
                self.remove(graph, a_v.twin());
                false
            }
        }
    }

    /// Trace the single face starting at the first half-edge around vertex 0.
    fn walk(self, graph: &Graph) -> RouteResult<Route> {
        let expected = graph.half_edges.len();
        let pos = self.positions(graph);
        let start = self
            .rot
            .iter()
            .find_map(|order| order.first().copied())
            .ok_or(RouteError::IncompleteCover {
                covered: 0,
                expected,
            })?;
        let mut trail = Vec::with_capacity(expected);
        let mut h = start;
        loop {
            trail.push(h);
            h = self.successor(graph, &pos, h);
            if h == start || trail.len() > expected {
                break;
            }
        }
        if trail.len() != expected {
            return Err(RouteError::IncompleteCover {
                covered: trail.len(),
                expected,
            });
        }
        Ok(Route {
            trail,
            kissing_loops: self.kissing,
            tree_edges: self.tree.edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::special::{quad_grid, tetrahedron};
    use crate::route::spanning::prim_tree;

    fn check_pairing(graph: &Graph, tree: &SpanningTree) {
        let (pairs, unpaired) = pair_cotree(graph, tree);
        let mut seen = BTreeSet::new();
        for &(a, b, v) in &pairs {
            assert!(graph.edges[a.0].vertices.contains(&v));
            assert!(graph.edges[b.0].vertices.contains(&v));
            assert!(seen.insert(a) && seen.insert(b));
        }
        for &e in &unpaired {
            assert!(seen.insert(e));
        }
        let cotree = graph.edges.len() - tree.edges.len();
        assert_eq!(seen.len(), cotree);
        assert_eq!(unpaired.len(), cotree % 2);
    }

    #[test]
    fn pairs_cover_the_cotree() {
        let t = tetrahedron();
        check_pairing(&t, &prim_tree(&t, VertexId(0)).unwrap());
        let q = quad_grid(4, 4);
        check_pairing(&q, &prim_tree(&q, VertexId(0)).unwrap());
    }
}
