//! Rotational ordering of incident edges and global structure queries.
//!
//! The topological order walks across faces that share a corner at the
//! vertex; it is exact but needs at least `degree - 1` faces. The geometric
//! order chains nearest edge directions and is only an approximation used when
//! face data is incomplete.

use nalgebra::Vector3;
use tracing::debug;

use crate::error::{GraphError, GraphResult};

use super::types::{EdgeId, Graph, VertexId};

impl Graph {
    /// Incident edges of `v` in cyclic order recovered from face corners.
    ///
    /// Starts at a boundary edge when one exists. The direction is chosen so
    /// that consecutive edge directions turn counterclockwise about the
    /// accumulated face normal.
    pub fn topo_adjacent_edges(&self, v: VertexId) -> GraphResult<Vec<EdgeId>> {
        self.check_vertex(v)?;
        let incident = &self.vertices[v.0].edges;
        let degree = incident.len();
        let faces = self.vertex_faces(v);
        if faces.len() + 1 < degree {
            return Err(GraphError::InsufficientFaces {
                vertex: v,
                faces: faces.len(),
                degree,
            });
        }
        if degree == 0 {
            return Ok(Vec::new());
        }

        // neighbours[i]: incident edges sharing a face corner at v with incident[i]
        let slot = |e: EdgeId| incident.iter().position(|&x| x == e);
        let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); degree];
        for &f in &faces {
            let edges = &self.faces[f.0].edges;
            let verts = self.face_vertices(f);
            let k = edges.len();
            for i in 0..k {
                if verts[i] != v {
                    continue;
                }
                let (a, b) = (edges[(i + k - 1) % k], edges[i]);
                if let (Some(sa), Some(sb)) = (slot(a), slot(b)) {
                    neighbours[sa].push(sb);
                    neighbours[sb].push(sa);
                }
            }
        }

        let boundary_start = neighbours.iter().position(|n| n.len() < 2);
        let start = boundary_start.unwrap_or(0);
        let mut visited = vec![false; degree];
        let mut order = vec![start];
        visited[start] = true;
        let mut cur = start;
        while let Some(&next) = neighbours[cur].iter().find(|&&n| !visited[n]) {
            visited[next] = true;
            order.push(next);
            cur = next;
        }
        if order.len() != degree {
            return Err(GraphError::InsufficientFaces {
                vertex: v,
                faces: faces.len(),
                degree,
            });
        }

        let mut reference = faces
            .iter()
            .filter(|f| !self.faces[f.0].is_split())
            .fold(Vector3::zeros(), |acc, f| acc + self.faces[f.0].normal);
        if reference.norm() < 1e-12 {
            reference = self.vertices[v.0].normal;
        }
        let dirs: Vec<Vector3<f64>> = order
            .iter()
            .map(|&i| self.edge_direction(incident[i], v))
            .collect();
        let pairs = if boundary_start.is_some() {
            degree - 1
        } else {
            degree
        };
        let turn = (0..pairs).fold(Vector3::zeros(), |acc, i| {
            acc + dirs[i].cross(&dirs[(i + 1) % degree])
        });
        if turn.dot(&reference) < 0.0 {
            order.reverse();
        }
        Ok(order.into_iter().map(|i| incident[i]).collect())
    }

    /// Incident edges of `v` chained by nearest unit direction.
    pub fn geometric_adjacent_edges(&self, v: VertexId) -> Vec<EdgeId> {
        let incident = &self.vertices[v.0].edges;
        let degree = incident.len();
        if degree == 0 {
            return Vec::new();
        }
        let dirs: Vec<Vector3<f64>> = incident
            .iter()
            .map(|&e| self.edge_direction(e, v))
            .collect();
        let mut used = vec![false; degree];
        let mut order = vec![0usize];
        used[0] = true;
        while order.len() < degree {
            let cur = dirs[order[order.len() - 1]];
            let mut best: Option<(usize, f64)> = None;
            for j in (0..degree).filter(|&j| !used[j]) {
                let d = cur.dot(&dirs[j]);
                if best.map_or(true, |(_, bd)| d > bd) {
                    best = Some((j, d));
                }
            }
            let Some((j, _)) = best else { break };
            used[j] = true;
            order.push(j);
        }
        let normal = self.vertices[v.0].normal;
        if normal.norm() > 1e-12 {
            let turn = (0..degree).fold(Vector3::zeros(), |acc, i| {
                acc + dirs[order[i]].cross(&dirs[order[(i + 1) % degree]])
            });
            if turn.dot(&normal) < 0.0 {
                order.reverse();
            }
        }
        order.into_iter().map(|i| incident[i]).collect()
    }

    /// Topological order when faces allow it, otherwise the geometric one.
    pub fn ordered_adjacent_edges(&self, v: VertexId) -> Vec<EdgeId> {
        match self.topo_adjacent_edges(v) {
            Ok(order) => order,
            Err(err) => {
                debug!(vertex = v.0, %err, "falling back to geometric ordering");
                self.geometric_adjacent_edges(v)
            }
        }
    }

    /// Strict topological rotation for every vertex.
    pub fn topo_rotations(&self) -> GraphResult<Vec<Vec<EdgeId>>> {
        (0..self.vertices.len())
            .map(|v| self.topo_adjacent_edges(VertexId(v)))
            .collect()
    }

    /// Best-effort rotation for every vertex.
    pub fn rotations(&self) -> Vec<Vec<EdgeId>> {
        (0..self.vertices.len())
            .map(|v| self.ordered_adjacent_edges(VertexId(v)))
            .collect()
    }

    /// True iff every vertex lies on at least one face.
    pub fn has_face_information(&self) -> bool {
        !self.vertices.is_empty()
            && self
                .vertices
                .iter()
                .all(|v| v.edges.iter().any(|e| !self.edges[e.0].faces.is_empty()))
    }

    pub fn is_eulerian(&self) -> bool {
        self.vertices.iter().all(|v| v.edges.len() % 2 == 0)
    }

    /// `(-V + E - F) / 2 + 1`; meaningful for closed orientable surfaces only.
    pub fn genus(&self) -> i64 {
        let (v, e, f) = (
            self.vertices.len() as i64,
            self.edges.len() as i64,
            self.faces.len() as i64,
        );
        (-v + e - f) / 2 + 1
    }

    /// Whether every vertex is reachable from vertex 0 along edges.
    pub fn is_connected(&self) -> bool {
        let n = self.vertices.len();
        if n == 0 {
            return true;
        }
        let mut seen = vec![false; n];
        let mut stack = vec![VertexId(0)];
        seen[0] = true;
        let mut count = 1;
        while let Some(v) = stack.pop() {
            for &e in &self.vertices[v.0].edges {
                let w = self.other_vertex(e, v);
                if !seen[w.0] {
                    seen[w.0] = true;
                    count += 1;
                    stack.push(w);
                }
            }
        }
        count == n
    }
}
