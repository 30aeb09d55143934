//! Edge splitting, Eulerization and checkerboard augmentation.
//!
//! Purpose
//! - Turn a mesh graph into a multigraph suitable for a single Euler circuit
//!   (all degrees even) or for a face-boundary double cover (faces 2-colored).
//!
//! Why this design
//! - Augmentation only ever duplicates edges via [`Graph::split_edge`], so face
//!   bookkeeping stays consistent and original ids are never disturbed.
//! - Eulerization is the classic T-join: shortest paths between odd vertices
//!   plus a perfect matching on their pairwise distances.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::matching::max_weight_perfect_matching;
use crate::shortest::dijkstra;

use super::types::{EdgeId, Face, FaceId, Graph, VertexId};

impl Graph {
    /// Duplicate `e` into a parallel edge.
    ///
    /// The last face listed on `e` moves to the new edge, and a two-edge split
    /// face over both records the duplication. Returns the new edge and the
    /// split face.
    pub fn split_edge(&mut self, e: EdgeId) -> GraphResult<(EdgeId, FaceId)> {
        self.check_edge(e)?;
        let [a, b] = self.edges[e.0].vertices;
        let new = self.add_edge(a, b)?;
        if let Some(moved) = self.edges[e.0].faces.pop() {
            for slot in self.faces[moved.0].edges.iter_mut() {
                if *slot == e {
                    *slot = new;
                    break;
                }
            }
            self.edges[new.0].faces.push(moved);
        }
        let normal = self.edges[e.0].normal;
        self.edges[new.0].normal = normal;
        let split = FaceId(self.faces.len());
        self.faces.push(Face {
            id: split,
            edges: vec![e, new],
            normal,
        });
        self.edges[e.0].faces.push(split);
        self.edges[new.0].faces.push(split);
        Ok((new, split))
    }

    /// Make every vertex degree even by splitting edges along shortest paths
    /// between matched odd vertices. Returns the number of edges split.
    ///
    /// `seed` drives the tie-break noise added to matching weights.
    pub fn make_eulerian(&mut self, seed: u64) -> GraphResult<usize> {
        let odd: Vec<VertexId> = (0..self.vertices.len())
            .map(VertexId)
            .filter(|&v| self.degree(v) % 2 == 1)
            .collect();
        if odd.is_empty() {
            return Ok(0);
        }
        let paths: Vec<_> = odd.iter().map(|&v| dijkstra(self, v)).collect();
        let k = odd.len();
        let mut dist = vec![vec![0.0; k]; k];
        let mut max_d: f64 = 0.0;
        for i in 0..k {
            for j in 0..k {
                let d = paths[i].distance[odd[j].0];
                if !d.is_finite() {
                    return Err(GraphError::Disconnected {
                        from: odd[i],
                        to: odd[j],
                    });
                }
                dist[i][j] = d;
                max_d = max_d.max(d);
            }
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let scale = 1e-9 * (1.0 + max_d);
        let mut weights = vec![vec![0.0; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let w = max_d - dist[i][j] + rng.gen::<f64>() * scale;
                weights[i][j] = w;
                weights[j][i] = w;
            }
        }
        let matching = max_weight_perfect_matching(&weights)?;

        let mut to_split = Vec::new();
        for (i, j) in matching {
            let path = paths[i]
                .path_to(self, odd[j])
                .ok_or(GraphError::Disconnected {
                    from: odd[i],
                    to: odd[j],
                })?;
            to_split.extend(path);
        }
        for &e in &to_split {
            self.split_edge(e)?;
        }
        debug!(odd = k, split = to_split.len(), "eulerized");
        Ok(to_split.len())
    }

    /// 2-color faces by BFS depth parity; each connected face component is
    /// rooted at its lowest face id, which gets color 0.
    pub fn face_coloring(&self) -> Vec<u8> {
        let n = self.faces.len();
        let mut color: Vec<Option<u8>> = vec![None; n];
        let mut queue = VecDeque::new();
        for root in 0..n {
            if color[root].is_some() {
                continue;
            }
            color[root] = Some(0);
            queue.push_back(FaceId(root));
            while let Some(f) = queue.pop_front() {
                let c = color[f.0].unwrap_or(0);
                for &e in &self.faces[f.0].edges {
                    for &g in &self.edges[e.0].faces {
                        if color[g.0].is_none() {
                            color[g.0] = Some(1 - c);
                            queue.push_back(g);
                        }
                    }
                }
            }
        }
        color.into_iter().map(|c| c.unwrap_or(0)).collect()
    }

    /// Split every edge whose two faces share a color, and every boundary
    /// edge whose only face has color 1. Afterwards the face adjacency graph
    /// is bipartite and each edge borders exactly one face of the class
    /// containing face 0: a split face takes the color opposite to the pair it
    /// separates. Returns the number of edges split.
    pub fn make_checkerboard(&mut self) -> GraphResult<usize> {
        if let Some(edge) = self.edges.iter().find(|e| e.faces.len() > 2) {
            return Err(GraphError::NonManifoldEdge {
                edge: edge.id,
                faces: edge.faces.len(),
            });
        }
        let color = self.face_coloring();
        let to_split: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|e| match e.faces.as_slice() {
                [f] => color[f.0] == 1,
                [f, g] => color[f.0] == color[g.0],
                _ => false,
            })
            .map(|e| e.id)
            .collect();
        for &e in &to_split {
            self.split_edge(e)?;
        }
        debug!(split = to_split.len(), "checkerboarded");
        Ok(to_split.len())
    }
}
