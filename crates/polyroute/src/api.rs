//! Curated surface for the CLI and benches (unstable).
//!
//! Breaking changes are allowed; prefer these re-exports over deep paths.

// Mesh graph
pub use crate::graph::special::{grid, octahedron, plane, quad_grid, tetrahedron};
pub use crate::graph::{
    EdgeDoc, EdgeId, FaceDoc, FaceId, Graph, GraphDoc, HalfEdgeId, VertexDoc, VertexId,
};
// Helpers
pub use crate::matching::{max_weight_perfect_matching, min_weight_perfect_matching};
pub use crate::shortest::{dijkstra, ShortestPaths};
// Routing
pub use crate::route::atrail::atrail_route;
pub use crate::route::euler::euler_route;
pub use crate::route::spanning::{dfs_tree, prim_tree, random_tree, spanning_tree};
pub use crate::route::sterna::walk_tree;
pub use crate::route::{
    route, ATrailCfg, CoTreeOrder, KissingLoopCost, Route, RouteDoc, Routed, RouterCfg,
    SpanningTree, SternaCfg, SternaRouter, Strategy, TreeKind, XtrnaCfg, XtrnaRouter,
};
