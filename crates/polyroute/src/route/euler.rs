//! Single cover of the checkerboarded graph by stitched face cycles.
//!
//! After checkerboarding every edge borders exactly one face of the class
//! containing face 0 ("white"). Concatenating the boundary cycles of all white
//! faces at shared vertices therefore visits each edge once, which covers each
//! split original edge twice through its two copies.

use std::collections::VecDeque;

use tracing::info;

use crate::error::{RouteError, RouteResult};
use crate::graph::{FaceId, Graph, HalfEdgeId};

use super::{Route, Routed};

/// Checkerboard a clone of `graph` and stitch its white face cycles.
pub fn euler_route(graph: &Graph) -> RouteResult<Routed> {
    if !graph.has_face_information() {
        return Err(RouteError::MissingFaces);
    }
    let mut g = graph.clone();
    g.make_checkerboard()?;
    let white = white_faces(&g);
    let expected = g.edges.len();
    let Some((&seed, rest)) = white.split_first() else {
        return Err(RouteError::IncompleteCover {
            covered: 0,
            expected,
        });
    };

    let mut trail = g.face_half_edges(seed);
    let mut on_trail = vec![false; g.vertices.len()];
    for &h in &trail {
        on_trail[g.origin(h).0] = true;
    }
    let mut pending = rest.to_vec();
    while !pending.is_empty() {
        let before = pending.len();
        pending.retain(|&f| !stitch(&g, &mut trail, &mut on_trail, f));
        if pending.len() == before {
            return Err(RouteError::DisconnectedFaces);
        }
    }
    if trail.len() != expected {
        return Err(RouteError::IncompleteCover {
            covered: trail.len(),
            expected,
        });
    }
    info!(faces = white.len(), edges = expected, "checkerboard trail found");
    Ok(Routed {
        graph: g,
        route: Route::new(trail),
    })
}

/// Faces reached from each component's lowest face by hops of two across
/// shared edges.
pub fn white_faces(g: &Graph) -> Vec<FaceId> {
    let n = g.faces.len();
    let mut seen = vec![false; n];
    let mut white = Vec::new();
    let mut queue = VecDeque::new();
    for root in (0..n).map(FaceId) {
        if seen[root.0] {
            continue;
        }
        seen[root.0] = true;
        queue.push_back(root);
        while let Some(f) = queue.pop_front() {
            white.push(f);
            for black in face_neighbours(g, f) {
                seen[black.0] = true;
                for next in face_neighbours(g, black) {
                    if !seen[next.0] {
                        seen[next.0] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
    }
    white
}

fn face_neighbours(g: &Graph, f: FaceId) -> impl Iterator<Item = FaceId> + '_ {
    g.faces[f.0]
        .edges
        .iter()
        .flat_map(move |e| g.edges[e.0].faces.iter().copied())
        .filter(move |&h| h != f)
}

/// Splice the boundary cycle of `f` into `trail` before the first half-edge
/// leaving a vertex the face shares with the trail.
fn stitch(g: &Graph, trail: &mut Vec<HalfEdgeId>, on_trail: &mut [bool], f: FaceId) -> bool {
    let verts = g.face_vertices(f);
    let Some(k) = verts.iter().position(|v| on_trail[v.0]) else {
        return false;
    };
    let v = verts[k];
    let Some(pos) = trail.iter().position(|&h| g.origin(h) == v) else {
        return false;
    };
    let mut cycle = g.face_half_edges(f);
    cycle.rotate_left(k);
    for &h in &cycle {
        on_trail[g.origin(h).0] = true;
    }
    trail.splice(pos..pos, cycle);
    true
}
