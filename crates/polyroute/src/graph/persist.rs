//! Lossless JSON document for a graph.
//!
//! Ids are stored explicitly and must be dense (`id == index`); half-edges are
//! implied by the edge order and are rebuilt on load.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

use super::types::{Edge, EdgeId, Face, FaceId, Graph, HalfEdge, HalfEdgeId, Vertex, VertexId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexDoc {
    pub id: usize,
    pub position: [f64; 3],
    pub normal: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDoc {
    pub id: usize,
    pub vertices: [usize; 2],
    pub faces: Vec<usize>,
    pub normal: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceDoc {
    pub id: usize,
    pub edges: Vec<usize>,
    pub normal: [f64; 3],
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDoc {
    pub vertices: Vec<VertexDoc>,
    pub edges: Vec<EdgeDoc>,
    pub faces: Vec<FaceDoc>,
}

fn arr(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

fn vec3(a: [f64; 3]) -> Vector3<f64> {
    Vector3::new(a[0], a[1], a[2])
}

impl Graph {
    pub fn to_doc(&self) -> GraphDoc {
        GraphDoc {
            vertices: self
                .vertices
                .iter()
                .map(|v| VertexDoc {
                    id: v.id.0,
                    position: arr(&v.position),
                    normal: arr(&v.normal),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| EdgeDoc {
                    id: e.id.0,
                    vertices: [e.vertices[0].0, e.vertices[1].0],
                    faces: e.faces.iter().map(|f| f.0).collect(),
                    normal: arr(&e.normal),
                })
                .collect(),
            faces: self
                .faces
                .iter()
                .map(|f| FaceDoc {
                    id: f.id.0,
                    edges: f.edges.iter().map(|e| e.0).collect(),
                    normal: arr(&f.normal),
                })
                .collect(),
        }
    }

    /// Rebuild a graph from its document, keeping every id and normal.
    pub fn from_doc(doc: &GraphDoc) -> GraphResult<Self> {
        let (nv, ne, nf) = (doc.vertices.len(), doc.edges.len(), doc.faces.len());
        let mut g = Graph::new();
        for (i, v) in doc.vertices.iter().enumerate() {
            if v.id != i {
                return Err(GraphError::invalid_document(format!(
                    "vertex at index {i} has id {}",
                    v.id
                )));
            }
            g.vertices.push(Vertex {
                id: VertexId(i),
                position: vec3(v.position),
                normal: vec3(v.normal),
                edges: Vec::new(),
            });
        }
        for (i, e) in doc.edges.iter().enumerate() {
            if e.id != i {
                return Err(GraphError::invalid_document(format!(
                    "edge at index {i} has id {}",
                    e.id
                )));
            }
            let [a, b] = e.vertices;
            if a >= nv || b >= nv {
                return Err(GraphError::invalid_document(format!(
                    "edge {i} references a missing vertex"
                )));
            }
            if a == b {
                return Err(GraphError::DegenerateEdge { vertex: VertexId(a) });
            }
            if let Some(&f) = e.faces.iter().find(|&&f| f >= nf) {
                return Err(GraphError::invalid_document(format!(
                    "edge {i} references missing face {f}"
                )));
            }
            let (h0, h1) = (HalfEdgeId(2 * i), HalfEdgeId(2 * i + 1));
            g.half_edges.push(HalfEdge {
                id: h0,
                edge: EdgeId(i),
                origin: VertexId(a),
                twin: h1,
            });
            g.half_edges.push(HalfEdge {
                id: h1,
                edge: EdgeId(i),
                origin: VertexId(b),
                twin: h0,
            });
            g.edges.push(Edge {
                id: EdgeId(i),
                vertices: [VertexId(a), VertexId(b)],
                half_edges: [h0, h1],
                faces: e.faces.iter().map(|&f| FaceId(f)).collect(),
                normal: vec3(e.normal),
            });
            g.vertices[a].edges.push(EdgeId(i));
            g.vertices[b].edges.push(EdgeId(i));
        }
        for (i, f) in doc.faces.iter().enumerate() {
            if f.id != i {
                return Err(GraphError::invalid_document(format!(
                    "face at index {i} has id {}",
                    f.id
                )));
            }
            if f.edges.len() < 2 || f.edges.iter().any(|&e| e >= ne) {
                return Err(GraphError::invalid_document(format!(
                    "face {i} has an invalid edge list"
                )));
            }
            g.faces.push(Face {
                id: FaceId(i),
                edges: f.edges.iter().map(|&e| EdgeId(e)).collect(),
                normal: vec3(f.normal),
            });
        }
        Ok(g)
    }

    pub fn to_json(&self) -> GraphResult<String> {
        Ok(serde_json::to_string(&self.to_doc())?)
    }

    pub fn from_json(json: &str) -> GraphResult<Self> {
        let doc: GraphDoc = serde_json::from_str(json)?;
        Self::from_doc(&doc)
    }
}
