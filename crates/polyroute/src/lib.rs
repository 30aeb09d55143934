//! Closed edge-traversal routes over polyhedral mesh graphs.
//!
//! A mesh is held as a half-edge [`graph::Graph`]; the [`route`] module turns
//! it into a closed walk over its edges with one of four strategies:
//! - A-trail: every edge once, never crossing itself at a vertex.
//! - Euler: every edge of the checkerboarded graph once, by stitching faces.
//! - Sterna: every edge twice, walking around a spanning tree.
//! - Xtrna: every edge twice, tracing the single face of a rotation system.
//!
//! API Policy
//! - The crate is consumed by the `polyroute` CLI in this workspace. There is
//!   no stable public API; prefer [`api`] or [`prelude`] for imports.

pub mod api;
pub mod error;
pub mod graph;
pub mod matching;
pub mod route;
pub mod shortest;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::error::{GraphError, GraphResult, RouteError, RouteResult};
    pub use crate::graph::{EdgeId, FaceId, Graph, HalfEdgeId, VertexId};
    pub use crate::route::{route, Route, Routed, RouterCfg, Strategy};
    pub use nalgebra::Vector3 as Vec3;
}
