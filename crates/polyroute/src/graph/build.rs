//! Graph builders from raw mesh data and normal propagation.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::error::{GraphError, GraphResult};

use super::types::{EdgeId, FaceId, Graph, VertexId};

impl Graph {
    /// Build a graph from vertex positions and polygons given as vertex index
    /// cycles. Edges shared by neighbouring polygons are created once.
    /// Normals are recomputed afterwards.
    pub fn from_polygons(positions: &[Vector3<f64>], polygons: &[Vec<usize>]) -> GraphResult<Self> {
        let mut g = Graph::new();
        for &p in positions {
            g.add_vertex(p);
        }
        let mut lookup: HashMap<(usize, usize), EdgeId> = HashMap::new();
        for poly in polygons {
            if poly.len() < 3 {
                return Err(GraphError::open_face(format!(
                    "polygon with {} vertices",
                    poly.len()
                )));
            }
            let mut cycle = Vec::with_capacity(poly.len());
            for i in 0..poly.len() {
                let (a, b) = (poly[i], poly[(i + 1) % poly.len()]);
                let key = (a.min(b), a.max(b));
                let e = match lookup.get(&key) {
                    Some(&e) => e,
                    None => {
                        let e = g.add_edge(VertexId(a), VertexId(b))?;
                        lookup.insert(key, e);
                        e
                    }
                };
                cycle.push(e);
            }
            g.add_face(cycle)?;
        }
        g.recompute_normals();
        Ok(g)
    }

    /// Build a face-less graph from vertex positions and index pairs.
    pub fn from_edges(positions: &[Vector3<f64>], pairs: &[(usize, usize)]) -> GraphResult<Self> {
        let mut g = Graph::new();
        for &p in positions {
            g.add_vertex(p);
        }
        for &(a, b) in pairs {
            g.add_edge(VertexId(a), VertexId(b))?;
        }
        Ok(g)
    }

    /// Newell normal of a face's boundary polygon, normalized (zero if degenerate).
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let verts = self.face_vertices(f);
        let mut n = Vector3::zeros();
        for i in 0..verts.len() {
            let p = self.vertices[verts[i].0].position;
            let q = self.vertices[verts[(i + 1) % verts.len()].0].position;
            n.x += (p.y - q.y) * (p.z + q.z);
            n.y += (p.z - q.z) * (p.x + q.x);
            n.z += (p.x - q.x) * (p.y + q.y);
        }
        normalize_or_zero(n)
    }

    /// Recompute face, edge and vertex normals from positions.
    ///
    /// Split marker faces take their edge's normal; they do not contribute to
    /// vertex normals.
    pub fn recompute_normals(&mut self) {
        for f in 0..self.faces.len() {
            if !self.faces[f].is_split() {
                self.faces[f].normal = self.face_normal(FaceId(f));
            }
        }
        for e in 0..self.edges.len() {
            let sum = self.edges[e]
                .faces
                .iter()
                .filter(|f| !self.faces[f.0].is_split())
                .fold(Vector3::zeros(), |acc, f| acc + self.faces[f.0].normal);
            self.edges[e].normal = normalize_or_zero(sum);
        }
        for f in 0..self.faces.len() {
            if self.faces[f].is_split() {
                let e = self.faces[f].edges[0];
                self.faces[f].normal = self.edges[e.0].normal;
            }
        }
        for v in 0..self.vertices.len() {
            let sum = self
                .vertex_faces(VertexId(v))
                .into_iter()
                .filter(|f| !self.faces[f.0].is_split())
                .fold(Vector3::zeros(), |acc, f| acc + self.faces[f.0].normal);
            self.vertices[v].normal = normalize_or_zero(sum);
        }
    }
}

pub(crate) fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let n = v.norm();
    if n > 1e-12 {
        v / n
    } else {
        Vector3::zeros()
    }
}
