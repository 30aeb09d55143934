//! Single-cover, non-crossing Euler circuit ("A-trail").
//!
//! Purpose
//! - Visit every edge of the Eulerized graph exactly once such that each pass
//!   through a vertex uses two edges adjacent in its topological rotation.
//!
//! Why this design
//! - Vertices of degree greater than four get a fixed [`Transition`] that pairs
//!   rotation neighbours; a backtracking search over these assignments keeps
//!   the continuation relation connected, so one circuit covers all edges.
//! - Degree-four vertices stay free during the search and traversal; any
//!   crossing pass through them is undone afterwards by reversing the trail
//!   segment between the two passes.
//! - Search and traversal run on explicit stacks with a caller budget.
//!
//! Code cross-refs: `Graph::make_eulerian`, `Graph::topo_adjacent_edges`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RouteError, RouteResult};
use crate::graph::{EdgeId, Graph, HalfEdgeId, VertexId};

use super::{passes_are_adjacent, Route, Routed};

/// How a vertex of degree > 4 pairs its rotation slots.
///
/// With rotation `r[0..d)`: `Left` pairs `2k` with `2k + 1`, `Right` pairs
/// `2k + 1` with `2k + 2` (mod d). `None` is an unassigned vertex, which
/// offers both rotation neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Left,
    Right,
    None,
}

impl Transition {
    /// Search order: `None -> Left -> Right -> None` (exhausted).
    fn advance(self) -> Self {
        match self {
            Transition::None => Transition::Left,
            Transition::Left => Transition::Right,
            Transition::Right => Transition::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ATrailCfg {
    /// Budget for transition changes in the assignment search.
    pub max_iterations: usize,
    /// Seed for Eulerization tie-breaking.
    pub seed: u64,
}

impl Default for ATrailCfg {
    fn default() -> Self {
        Self {
            max_iterations: 1_000_000,
            seed: 0,
        }
    }
}

/// Eulerize a clone of `graph` and find a non-crossing circuit on it.
pub fn atrail_route(graph: &Graph, cfg: &ATrailCfg) -> RouteResult<Routed> {
    if !graph.has_face_information() {
        return Err(RouteError::MissingFaces);
    }
    let mut g = graph.clone();
    g.make_eulerian(cfg.seed)?;
    let rot = g.topo_rotations()?;
    let trail = {
        let mut runner = ATrailRunner::new(&g, rot, cfg);
        runner.assign()?;
        let mut trail = runner.traverse()?;
        runner.fix_quads(&mut trail);
        debug_assert!(passes_are_adjacent(&g, &runner.rot, &trail));
        trail
    };
    info!(edges = g.edges.len(), "a-trail found");
    Ok(Routed {
        graph: g,
        route: Route::new(trail),
    })
}

struct ATrailRunner<'a> {
    g: &'a Graph,
    cfg: &'a ATrailCfg,
    rot: Vec<Vec<EdgeId>>,
    slot: Vec<[usize; 2]>, // rotation index of edge e at vertices[0] / vertices[1]
    transition: Vec<Transition>,
}

impl<'a> ATrailRunner<'a> {
    fn new(g: &'a Graph, rot: Vec<Vec<EdgeId>>, cfg: &'a ATrailCfg) -> Self {
        let mut slot = vec![[0usize; 2]; g.edges.len()];
        for (v, order) in rot.iter().enumerate() {
            for (i, &e) in order.iter().enumerate() {
                let side = usize::from(g.edges[e.0].vertices[0] != VertexId(v));
                slot[e.0][side] = i;
            }
        }
        Self {
            g,
            cfg,
            rot,
            slot,
            transition: vec![Transition::None; g.vertices.len()],
        }
    }

    fn rotation_index(&self, e: EdgeId, v: VertexId) -> usize {
        let side = usize::from(self.g.edges[e.0].vertices[0] != v);
        self.slot[e.0][side]
    }

    #[inline]
    fn is_free(&self, v: VertexId) -> bool {
        self.rot[v.0].len() == 4
    }

    /// Rotation slots that may follow slot `i` at `v`.
    fn partners(&self, v: VertexId, i: usize) -> Vec<usize> {
        let d = self.rot[v.0].len();
        match d {
            0 | 1 => Vec::new(),
            2 => vec![1 - i],
            4 => (0..4).filter(|&j| j != i).collect(),
            _ => match self.transition[v.0] {
                Transition::Left => vec![i ^ 1],
                Transition::Right if i % 2 == 1 => vec![(i + 1) % d],
                Transition::Right => vec![(i + d - 1) % d],
                Transition::None => vec![(i + 1) % d, (i + d - 1) % d],
            },
        }
    }

    /// Whether the continuation relation links every edge to edge 0.
    fn connected(&self) -> bool {
        let m = self.g.edges.len();
        if m == 0 {
            return true;
        }
        let mut seen = vec![false; m];
        let mut stack = vec![EdgeId(0)];
        seen[0] = true;
        let mut count = 1;
        while let Some(e) = stack.pop() {
            for side in 0..2 {
                let v = self.g.edges[e.0].vertices[side];
                for j in self.partners(v, self.slot[e.0][side]) {
                    let f = self.rot[v.0][j];
                    if !seen[f.0] {
                        seen[f.0] = true;
                        count += 1;
                        stack.push(f);
                    }
                }
            }
        }
        count == m
    }

    /// Backtracking search over transitions of high-degree vertices, hardest
    /// (most high-degree neighbours) first.
    fn assign(&mut self) -> RouteResult<()> {
        let high: Vec<VertexId> = {
            let is_high = |v: VertexId| self.rot[v.0].len() > 4;
            let mut high: Vec<(usize, VertexId)> = (0..self.g.vertices.len())
                .map(VertexId)
                .filter(|&v| is_high(v))
                .map(|v| {
                    let n = self.g.vertices[v.0]
                        .edges
                        .iter()
                        .filter(|&&e| is_high(self.g.other_vertex(e, v)))
                        .count();
                    (n, v)
                })
                .collect();
            high.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            high.into_iter().map(|(_, v)| v).collect()
        };
        if high.is_empty() {
            return if self.connected() {
                Ok(())
            } else {
                Err(RouteError::NoATrail)
            };
        }

        let mut stack = vec![0usize];
        let mut iterations = 0usize;
        while let Some(&k) = stack.last() {
            iterations += 1;
            if iterations > self.cfg.max_iterations {
                return Err(RouteError::ATrailBudget {
                    iterations: self.cfg.max_iterations,
                });
            }
            let v = high[k];
            let t = self.transition[v.0].advance();
            self.transition[v.0] = t;
            if t == Transition::None {
                stack.pop();
                continue;
            }
            if self.connected() {
                if k + 1 == high.len() {
                    debug!(high = high.len(), iterations, "transitions assigned");
                    return Ok(());
                }
                stack.push(k + 1);
            }
        }
        Err(RouteError::NoATrail)
    }

    /// Unused half-edge leaving `v` that may follow `inc`.
    fn next_unused(&self, v: VertexId, inc: Option<HalfEdgeId>, used: &[bool]) -> Option<HalfEdgeId> {
        let order = &self.rot[v.0];
        if self.is_free(v) {
            return order
                .iter()
                .find(|e| !used[e.0])
                .map(|&e| self.g.half_edge_from(e, v));
        }
        let i = self.rotation_index(inc?.edge(), v);
        self.partners(v, i)
            .into_iter()
            .map(|j| order[j])
            .find(|e| !used[e.0])
            .map(|e| self.g.half_edge_from(e, v))
    }

    /// Hierholzer over the fixed continuations, splicing only at free vertices.
    fn traverse(&self) -> RouteResult<Vec<HalfEdgeId>> {
        let m = self.g.edges.len();
        let n = self.g.vertices.len();
        let root = (0..n)
            .map(VertexId)
            .find(|&v| self.is_free(v))
            .or_else(|| (0..n).map(VertexId).find(|&v| !self.rot[v.0].is_empty()));
        let Some(root) = root else {
            return Ok(Vec::new());
        };
        let mut used = vec![false; m];
        let first = self.g.half_edge_from(self.rot[root.0][0], root);
        used[first.edge().0] = true;
        let mut stack: Vec<(VertexId, Option<HalfEdgeId>)> =
            vec![(root, None), (self.g.dest(first), Some(first))];
        let mut circuit = Vec::with_capacity(m);
        while let Some(&(v, inc)) = stack.last() {
            match self.next_unused(v, inc, &used) {
                Some(h) => {
                    used[h.edge().0] = true;
                    stack.push((self.g.dest(h), Some(h)));
                }
                None => {
                    stack.pop();
                    if let Some(h) = inc {
                        circuit.push(h);
                    }
                }
            }
        }
        circuit.reverse();
        if circuit.len() != m {
            return Err(RouteError::IncompleteCover {
                covered: circuit.len(),
                expected: m,
            });
        }
        Ok(circuit)
    }

    /// Uncross degree-4 vertices whose passes use opposite rotation slots.
    fn fix_quads(&self, trail: &mut [HalfEdgeId]) {
        let n = trail.len();
        for v in (0..self.g.vertices.len()).map(VertexId) {
            if !self.is_free(v) {
                continue;
            }
            let passes: Vec<usize> = (0..n).filter(|&p| self.g.dest(trail[p]) == v).collect();
            let &[p, q] = passes.as_slice() else {
                continue;
            };
            let a = self.rotation_index(trail[p].edge(), v);
            let b = self.rotation_index(trail[(p + 1) % n].edge(), v);
            if (a + 4 - b) % 4 == 2 {
                let segment = &mut trail[p + 1..=q];
                segment.reverse();
                for h in segment.iter_mut() {
                    *h = h.twin();
                }
            }
        }
    }
}
