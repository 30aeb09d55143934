//! Half-edge mesh graph: storage, ordering, augmentation.
//!
//! Purpose
//! - Hold the vertices, edges, half-edges and faces of a polyhedral mesh and
//!   provide the structural utilities the routers build on: rotational order of
//!   incident edges, edge splitting, Eulerization, checkerboard augmentation,
//!   genus, and a lossless JSON document.
//!
//! Why this design
//! - Dense arenas with `usize` newtype ids instead of cyclic references; every
//!   link is an index lookup, so cloning and serialization are value copies.
//! - Half-edges are allocated in twin pairs (`2e`, `2e + 1`), which makes
//!   `twin` and `edge` arithmetic and keeps the half-edge arena implicit in the
//!   persisted form.
//! - No `next` pointers: face boundaries are recovered on demand from each
//!   face's edge cycle ([`Graph::face_vertices`]).
//!
//! Code cross-refs: `shortest::dijkstra`, `matching::max_weight_perfect_matching`
//! (Eulerization), `route::*` (consumers).

mod augment;
mod build;
mod persist;
pub mod special;
mod topology;
mod types;

pub use persist::{EdgeDoc, FaceDoc, GraphDoc, VertexDoc};
pub use types::{Edge, EdgeId, Face, FaceId, Graph, HalfEdge, HalfEdgeId, Vertex, VertexId};

#[cfg(test)]
mod tests;
