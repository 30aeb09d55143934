//! Single-source shortest paths over edge lengths.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::{EdgeId, Graph, VertexId};

/// Distances from `source` and the edge used to reach each vertex.
#[derive(Clone, Debug)]
pub struct ShortestPaths {
    pub source: VertexId,
    pub distance: Vec<f64>, // f64::INFINITY when unreachable
    pub via: Vec<Option<EdgeId>>,
}

impl ShortestPaths {
    /// Edges from `source` to `target` in walking order, `None` if unreachable.
    pub fn path_to(&self, graph: &Graph, target: VertexId) -> Option<Vec<EdgeId>> {
        if !self.distance.get(target.0)?.is_finite() {
            return None;
        }
        let mut path = Vec::new();
        let mut v = target;
        while v != self.source {
            let e = self.via[v.0]?;
            path.push(e);
            v = graph.other_vertex(e, v);
        }
        path.reverse();
        Some(path)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    vertex: usize,
    distance: f64,
}

// Reverse ordering turns BinaryHeap into a min-heap on distance.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Dijkstra from `source` with Euclidean edge lengths as weights.
pub fn dijkstra(graph: &Graph, source: VertexId) -> ShortestPaths {
    let n = graph.vertices.len();
    let mut distance = vec![f64::INFINITY; n];
    let mut via = vec![None; n];
    let mut done = vec![false; n];
    let mut heap = BinaryHeap::new();
    if source.0 < n {
        distance[source.0] = 0.0;
        heap.push(Entry {
            vertex: source.0,
            distance: 0.0,
        });
    }
    while let Some(Entry { vertex, distance: d }) = heap.pop() {
        if done[vertex] {
            continue;
        }
        done[vertex] = true;
        for &e in &graph.vertices[vertex].edges {
            let w = graph.other_vertex(e, VertexId(vertex));
            let nd = d + graph.edge_length(e);
            if nd < distance[w.0] {
                distance[w.0] = nd;
                via[w.0] = Some(e);
                heap.push(Entry {
                    vertex: w.0,
                    distance: nd,
                });
            }
        }
    }
    ShortestPaths {
        source,
        distance,
        via,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::special;

    #[test]
    fn grid_corner_to_corner() {
        let g = special::grid(3, 3);
        let sp = dijkstra(&g, VertexId(0));
        assert!((sp.distance[8] - 4.0).abs() < 1e-12);
        let path = sp.path_to(&g, VertexId(8)).unwrap();
        assert_eq!(path.len(), 4);
        let mut v = VertexId(0);
        for e in path {
            v = g.other_vertex(e, v);
        }
        assert_eq!(v, VertexId(8));
    }

    #[test]
    fn unreachable_vertex_has_no_path() {
        let mut g = special::grid(2, 2);
        let lonely = g.add_vertex(nalgebra::Vector3::new(5.0, 5.0, 0.0));
        let sp = dijkstra(&g, VertexId(0));
        assert!(sp.distance[lonely.0].is_infinite());
        assert!(sp.path_to(&g, lonely).is_none());
        assert_eq!(sp.path_to(&g, VertexId(0)), Some(Vec::new()));
    }
}
