//! JSON document for a routed graph.
//!
//! Half-edges are written as `(edge id, side)` where side 0 leaves
//! `edge.vertices[0]`.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::{EdgeId, Graph, GraphDoc, HalfEdgeId};

use super::{Route, Strategy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDoc {
    pub strategy: Strategy,
    pub graph: GraphDoc,
    pub trail: Vec<(usize, u8)>,
    #[serde(default)]
    pub kissing_loops: Vec<(usize, u8)>,
    #[serde(default)]
    pub tree_edges: Vec<usize>,
}

fn encode(h: HalfEdgeId) -> (usize, u8) {
    (h.edge().0, h.side() as u8)
}

fn decode(edges: usize, (e, side): (usize, u8)) -> GraphResult<HalfEdgeId> {
    if e >= edges || side > 1 {
        return Err(GraphError::invalid_document(format!(
            "half-edge ({e}, {side}) out of range"
        )));
    }
    Ok(HalfEdgeId(2 * e + usize::from(side)))
}

impl Route {
    pub fn to_doc(&self, graph: &Graph, strategy: Strategy) -> RouteDoc {
        RouteDoc {
            strategy,
            graph: graph.to_doc(),
            trail: self.trail.iter().map(|&h| encode(h)).collect(),
            kissing_loops: self.kissing_loops.iter().map(|&h| encode(h)).collect(),
            tree_edges: self.tree_edges.iter().map(|e| e.0).collect(),
        }
    }

    pub fn from_doc(doc: &RouteDoc) -> GraphResult<(Strategy, Graph, Route)> {
        let graph = Graph::from_doc(&doc.graph)?;
        let m = graph.edges.len();
        let trail = doc
            .trail
            .iter()
            .map(|&p| decode(m, p))
            .collect::<GraphResult<Vec<_>>>()?;
        let kissing_loops = doc
            .kissing_loops
            .iter()
            .map(|&p| decode(m, p))
            .collect::<GraphResult<_>>()?;
        let tree_edges = doc
            .tree_edges
            .iter()
            .map(|&e| graph.check_edge(EdgeId(e)).map(|()| EdgeId(e)))
            .collect::<GraphResult<_>>()?;
        let route = Route {
            trail,
            kissing_loops,
            tree_edges,
        };
        Ok((doc.strategy, graph, route))
    }

    pub fn to_json(&self, graph: &Graph, strategy: Strategy) -> GraphResult<String> {
        Ok(serde_json::to_string(&self.to_doc(graph, strategy))?)
    }

    pub fn from_json(json: &str) -> GraphResult<(Strategy, Graph, Route)> {
        let doc: RouteDoc = serde_json::from_str(json)?;
        Self::from_doc(&doc)
    }
}
