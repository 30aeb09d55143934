//! Spanning trees for the double-cover routers.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use petgraph::unionfind::UnionFind;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::{EdgeId, Graph, VertexId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    /// Minimum tree by edge length.
    Prim,
    /// Kruskal over a shuffled edge list.
    Random,
    /// Depth-first tree following the rotation order.
    Dfs,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanningTree {
    pub root: VertexId,
    pub edges: BTreeSet<EdgeId>,
}

impl SpanningTree {
    #[inline]
    pub fn contains(&self, e: EdgeId) -> bool {
        self.edges.contains(&e)
    }

    /// Fail with the first vertex the tree does not reach.
    fn ensure_spanning(self, graph: &Graph) -> GraphResult<Self> {
        let n = graph.vertices.len();
        if n == 0 || self.edges.len() + 1 == n {
            return Ok(self);
        }
        let mut seen = vec![false; n];
        seen[self.root.0] = true;
        let mut stack = vec![self.root];
        while let Some(v) = stack.pop() {
            for &e in &graph.vertices[v.0].edges {
                let w = graph.other_vertex(e, v);
                if self.contains(e) && !seen[w.0] {
                    seen[w.0] = true;
                    stack.push(w);
                }
            }
        }
        let to = seen.iter().position(|s| !s).unwrap_or(0);
        Err(GraphError::Disconnected {
            from: self.root,
            to: VertexId(to),
        })
    }
}

#[derive(Debug)]
struct Candidate {
    length: f64,
    edge: EdgeId,
    to: VertexId,
}

// Min-heap on length, ties by edge id.
impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .length
            .partial_cmp(&self.length)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

/// Prim's minimum spanning tree over edge lengths.
pub fn prim_tree(graph: &Graph, root: VertexId) -> GraphResult<SpanningTree> {
    graph.check_vertex(root)?;
    let mut inside = vec![false; graph.vertices.len()];
    let mut edges = BTreeSet::new();
    let mut heap = BinaryHeap::new();
    let push_from = |v: VertexId, heap: &mut BinaryHeap<Candidate>| {
        for &e in &graph.vertices[v.0].edges {
            heap.push(Candidate {
                length: graph.edge_length(e),
                edge: e,
                to: graph.other_vertex(e, v),
            });
        }
    };
    inside[root.0] = true;
    push_from(root, &mut heap);
    while let Some(Candidate { edge, to, .. }) = heap.pop() {
        if inside[to.0] {
            continue;
        }
        inside[to.0] = true;
        edges.insert(edge);
        push_from(to, &mut heap);
    }
    SpanningTree { root, edges }.ensure_spanning(graph)
}

/// Uniformly shuffled Kruskal tree.
pub fn random_tree(graph: &Graph, root: VertexId, rng: &mut StdRng) -> GraphResult<SpanningTree> {
    graph.check_vertex(root)?;
    let mut order: Vec<EdgeId> = graph.edges.iter().map(|e| e.id).collect();
    order.shuffle(rng);
    let mut uf = UnionFind::<usize>::new(graph.vertices.len());
    let mut edges = BTreeSet::new();
    for e in order {
        let [a, b] = graph.edges[e.0].vertices;
        if uf.union(a.0, b.0) {
            edges.insert(e);
        }
    }
    SpanningTree { root, edges }.ensure_spanning(graph)
}

/// Depth-first tree: at each vertex, neighbours are tried in rotation order
/// starting after the edge used to arrive.
pub fn dfs_tree(graph: &Graph, rot: &[Vec<EdgeId>], root: VertexId) -> GraphResult<SpanningTree> {
    graph.check_vertex(root)?;
    let mut visited = vec![false; graph.vertices.len()];
    let mut edges = BTreeSet::new();
    // (vertex, first rotation slot, slots consumed)
    let mut stack: Vec<(VertexId, usize, usize)> = vec![(root, 0, 0)];
    visited[root.0] = true;
    while let Some(top) = stack.last_mut() {
        let (v, start, step) = *top;
        let order = &rot[v.0];
        if step == order.len() {
            stack.pop();
            continue;
        }
        top.2 += 1;
        let e = order[(start + step) % order.len()];
        let w = graph.other_vertex(e, v);
        if visited[w.0] {
            continue;
        }
        visited[w.0] = true;
        edges.insert(e);
        let back = rot[w.0].iter().position(|&x| x == e).unwrap_or(0);
        stack.push((w, back + 1, 0));
    }
    SpanningTree { root, edges }.ensure_spanning(graph)
}

/// Build a tree of the given kind.
pub fn spanning_tree(
    graph: &Graph,
    kind: TreeKind,
    rot: &[Vec<EdgeId>],
    root: VertexId,
    rng: &mut StdRng,
) -> GraphResult<SpanningTree> {
    match kind {
        TreeKind::Prim => prim_tree(graph, root),
        TreeKind::Random => random_tree(graph, root, rng),
        TreeKind::Dfs => dfs_tree(graph, rot, root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::special::{grid, quad_grid, tetrahedron};
    use rand::SeedableRng;

    #[test]
    fn every_kind_spans() {
        let g = quad_grid(4, 4);
        let rot = g.rotations();
        let mut rng = StdRng::seed_from_u64(3);
        for kind in [TreeKind::Prim, TreeKind::Random, TreeKind::Dfs] {
            let t = spanning_tree(&g, kind, &rot, VertexId(0), &mut rng).unwrap();
            assert_eq!(t.edges.len(), g.vertices.len() - 1, "{kind:?}");
        }
    }

    #[test]
    fn prim_prefers_short_edges() {
        let g = tetrahedron();
        let t = prim_tree(&g, VertexId(0)).unwrap();
        // edge 2 joins 0-1 with length 1, the shortest in the mesh
        assert!(t.contains(EdgeId(2)));
        let total: f64 = t.edges.iter().map(|&e| g.edge_length(e)).sum();
        assert!(total < 1.0 + 2.0 * 1.2);
    }

    #[test]
    fn disconnected_graph_has_no_tree() {
        let mut g = grid(2, 2);
        g.add_vertex(nalgebra::Vector3::new(9.0, 9.0, 0.0));
        assert!(matches!(
            prim_tree(&g, VertexId(0)),
            Err(GraphError::Disconnected { to: VertexId(4), .. })
        ));
    }
}
