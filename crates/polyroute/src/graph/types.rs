//! Arena storage for vertices, edges, half-edges and faces.
//!
//! All cross references are ids into the owning [`Graph`]'s vectors. Ids are
//! dense and append-only: a new element always gets the current length of its
//! arena, so `clone()` is a plain value copy that keeps every id intact.

use nalgebra::Vector3;

use crate::error::{GraphError, GraphResult};

/// Identifier types for clarity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub usize);
/// Half-edge `2e` starts at `edges[e].vertices[0]`, `2e + 1` at `vertices[1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId(pub usize);

impl HalfEdgeId {
    #[inline]
    pub fn twin(self) -> HalfEdgeId {
        HalfEdgeId(self.0 ^ 1)
    }

    #[inline]
    pub fn edge(self) -> EdgeId {
        EdgeId(self.0 / 2)
    }

    /// Which of the two traversals of its edge this is (0 or 1).
    #[inline]
    pub fn side(self) -> usize {
        self.0 & 1
    }
}

#[derive(Clone, Debug)]
pub struct Vertex {
    pub id: VertexId,
    pub position: Vector3<f64>,
    pub normal: Vector3<f64>,
    pub edges: Vec<EdgeId>, // incident edges, insertion order
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub id: EdgeId,
    pub vertices: [VertexId; 2],
    pub half_edges: [HalfEdgeId; 2],
    pub faces: Vec<FaceId>,
    pub normal: Vector3<f64>,
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    pub id: HalfEdgeId,
    pub edge: EdgeId,
    pub origin: VertexId,
    pub twin: HalfEdgeId,
}

/// Closed boundary cycle. Consecutive edges share a vertex; a face with two
/// parallel edges marks a split edge.
#[derive(Clone, Debug)]
pub struct Face {
    pub id: FaceId,
    pub edges: Vec<EdgeId>,
    pub normal: Vector3<f64>,
}

impl Face {
    #[inline]
    pub fn is_split(&self) -> bool {
        self.edges.len() == 2
    }
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
    pub half_edges: Vec<HalfEdge>,
    pub faces: Vec<Face>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, position: Vector3<f64>) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex {
            id,
            position,
            normal: Vector3::zeros(),
            edges: Vec::new(),
        });
        id
    }

    /// Insert an edge and its two half-edges. Parallel edges are allowed, loops are not.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId) -> GraphResult<EdgeId> {
        self.check_vertex(a)?;
        self.check_vertex(b)?;
        if a == b {
            return Err(GraphError::DegenerateEdge { vertex: a });
        }
        let id = EdgeId(self.edges.len());
        let h0 = HalfEdgeId(2 * id.0);
        let h1 = h0.twin();
        self.half_edges.push(HalfEdge {
            id: h0,
            edge: id,
            origin: a,
            twin: h1,
        });
        self.half_edges.push(HalfEdge {
            id: h1,
            edge: id,
            origin: b,
            twin: h0,
        });
        self.edges.push(Edge {
            id,
            vertices: [a, b],
            half_edges: [h0, h1],
            faces: Vec::new(),
            normal: Vector3::zeros(),
        });
        self.vertices[a.0].edges.push(id);
        self.vertices[b.0].edges.push(id);
        Ok(id)
    }

    /// Insert a face over an existing closed edge cycle.
    pub fn add_face(&mut self, edges: Vec<EdgeId>) -> GraphResult<FaceId> {
        for &e in &edges {
            self.check_edge(e)?;
        }
        if edges.len() < 2 {
            return Err(GraphError::open_face(format!(
                "{} edge(s) cannot bound a face",
                edges.len()
            )));
        }
        for (i, &e) in edges.iter().enumerate() {
            let next = edges[(i + 1) % edges.len()];
            if self.shared_vertex(e, next).is_none() {
                return Err(GraphError::open_face(format!(
                    "edges {e:?} and {next:?} share no vertex"
                )));
            }
        }
        let id = FaceId(self.faces.len());
        for &e in &edges {
            self.edges[e.0].faces.push(id);
        }
        self.faces.push(Face {
            id,
            edges,
            normal: Vector3::zeros(),
        });
        Ok(id)
    }

    pub fn check_vertex(&self, v: VertexId) -> GraphResult<()> {
        if v.0 < self.vertices.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownVertex(v))
        }
    }

    pub fn check_edge(&self, e: EdgeId) -> GraphResult<()> {
        if e.0 < self.edges.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownEdge(e))
        }
    }

    #[inline]
    pub fn degree(&self, v: VertexId) -> usize {
        self.vertices[v.0].edges.len()
    }

    /// Endpoint of `e` opposite to `v`.
    #[inline]
    pub fn other_vertex(&self, e: EdgeId, v: VertexId) -> VertexId {
        let [a, b] = self.edges[e.0].vertices;
        if a == v {
            b
        } else {
            a
        }
    }

    /// The half-edge of `e` that starts at `v`.
    #[inline]
    pub fn half_edge_from(&self, e: EdgeId, v: VertexId) -> HalfEdgeId {
        let edge = &self.edges[e.0];
        if edge.vertices[0] == v {
            edge.half_edges[0]
        } else {
            edge.half_edges[1]
        }
    }

    #[inline]
    pub fn origin(&self, h: HalfEdgeId) -> VertexId {
        self.half_edges[h.0].origin
    }

    #[inline]
    pub fn dest(&self, h: HalfEdgeId) -> VertexId {
        self.half_edges[h.twin().0].origin
    }

    /// Some vertex common to both edges (prefers `b`'s first endpoint).
    pub fn shared_vertex(&self, a: EdgeId, b: EdgeId) -> Option<VertexId> {
        let ea = &self.edges[a.0].vertices;
        self.edges[b.0]
            .vertices
            .iter()
            .copied()
            .find(|v| ea.contains(v))
    }

    /// Boundary vertices `w_0..w_k` of a face such that edge `i` runs from
    /// `w_i` to `w_{i+1}` (indices mod k).
    pub fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        let edges = &self.faces[f.0].edges;
        let k = edges.len();
        let mut out = Vec::with_capacity(k);
        if k == 0 {
            return out;
        }
        let [a, b] = self.edges[edges[0].0].vertices;
        let next = &self.edges[edges[1 % k].0].vertices;
        let mut w = if !next.contains(&a) {
            a
        } else if !next.contains(&b) {
            b
        } else {
            a
        };
        for &e in edges {
            out.push(w);
            w = self.other_vertex(e, w);
        }
        out
    }

    /// Boundary of a face as consecutive half-edges, starting at `w_0`.
    pub fn face_half_edges(&self, f: FaceId) -> Vec<HalfEdgeId> {
        let verts = self.face_vertices(f);
        self.faces[f.0]
            .edges
            .iter()
            .zip(verts)
            .map(|(&e, w)| self.half_edge_from(e, w))
            .collect()
    }

    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edges[e.0].vertices;
        (self.vertices[b.0].position - self.vertices[a.0].position).norm()
    }

    /// Unit direction of `e` leaving `v` (zero for coincident endpoints).
    pub fn edge_direction(&self, e: EdgeId, v: VertexId) -> Vector3<f64> {
        let w = self.other_vertex(e, v);
        let d = self.vertices[w.0].position - self.vertices[v.0].position;
        let n = d.norm();
        if n > 0.0 {
            d / n
        } else {
            d
        }
    }

    /// Faces touching `v`, deduplicated, in order of first appearance.
    pub fn vertex_faces(&self, v: VertexId) -> Vec<FaceId> {
        let mut out: Vec<FaceId> = Vec::new();
        for &e in &self.vertices[v.0].edges {
            for &f in &self.edges[e.0].faces {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }
}
