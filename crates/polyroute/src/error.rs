//! Error types for mesh-graph utilities and routers.
//!
//! Hard failures surface as these values; budget exhaustion in the heuristic
//! routers is not an error (they return their best result instead).

use thiserror::Error;

use crate::graph::{EdgeId, FaceId, VertexId};
use crate::matching::MatchingError;

/// Errors raised by [`crate::graph::Graph`] construction and augmentation.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexId),

    #[error("unknown edge {0:?}")]
    UnknownEdge(EdgeId),

    #[error("unknown face {0:?}")]
    UnknownFace(FaceId),

    /// Both endpoints of an edge are the same vertex.
    #[error("degenerate edge at vertex {vertex:?}")]
    DegenerateEdge { vertex: VertexId },

    /// Face edges do not form a closed cycle.
    #[error("face boundary is not a closed cycle: {0}")]
    OpenFace(String),

    /// Topological ordering needs at least `degree - 1` faces around the vertex.
    #[error("insufficient face information at vertex {vertex:?}: {faces} faces for degree {degree}")]
    InsufficientFaces {
        vertex: VertexId,
        faces: usize,
        degree: usize,
    },

    /// An edge has more than two incident faces.
    #[error("edge {edge:?} has {faces} incident faces")]
    NonManifoldEdge { edge: EdgeId, faces: usize },

    #[error("no path between {from:?} and {to:?}")]
    Disconnected { from: VertexId, to: VertexId },

    #[error("matching failed: {0}")]
    Matching(#[from] MatchingError),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    pub fn open_face(details: impl Into<String>) -> Self {
        Self::OpenFace(details.into())
    }

    pub fn invalid_document(details: impl Into<String>) -> Self {
        Self::InvalidDocument(details.into())
    }
}

/// Errors raised by the routing strategies.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The router needs every vertex to lie on a face.
    #[error("graph has no face information")]
    MissingFaces,

    /// The transition search exhausted every assignment.
    #[error("could not find an A-trail")]
    NoATrail,

    #[error("could not find an A-trail within {iterations} iterations")]
    ATrailBudget { iterations: usize },

    /// Some face cycle never shares a vertex with the growing trail.
    #[error("face cycles cannot be stitched into a single trail")]
    DisconnectedFaces,

    #[error("trail covers {covered} of {expected} half-edge slots")]
    IncompleteCover { covered: usize, expected: usize },
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
pub type RouteResult<T> = std::result::Result<T, RouteError>;
