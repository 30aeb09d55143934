//! Structural tests for the mesh graph and its augmentations.

use super::special::{grid, octahedron, plane, quad_grid, tetrahedron};
use super::*;
use crate::error::GraphError;
use nalgebra::Vector3;

fn counts(g: &Graph) -> (usize, usize, usize) {
    (g.vertices.len(), g.edges.len(), g.faces.len())
}

/// After checkerboarding, every edge must border faces of distinct colors
/// (or a single color-0 face).
fn assert_checkerboarded(g: &Graph) {
    let color = g.face_coloring();
    for e in &g.edges {
        match e.faces.as_slice() {
            [f] => assert_eq!(color[f.0], 0, "edge {:?}", e.id),
            [f, h] => assert_ne!(color[f.0], color[h.0], "edge {:?}", e.id),
            other => panic!("edge {:?} has {} faces", e.id, other.len()),
        }
    }
}

#[test]
fn smoke_fixture_counts() {
    assert_eq!(counts(&tetrahedron()), (4, 6, 4));
    assert_eq!(counts(&octahedron()), (6, 12, 8));
    assert_eq!(counts(&grid(3, 3)), (9, 12, 0));
    assert_eq!(counts(&quad_grid(4, 4)), (16, 24, 9));
    assert_eq!(counts(&plane(3, 3)), (9, 16, 8));
}

#[test]
fn closed_meshes_have_genus_zero() {
    assert_eq!(tetrahedron().genus(), 0);
    assert_eq!(octahedron().genus(), 0);
}

#[test]
fn face_information_and_parity() {
    assert!(tetrahedron().has_face_information());
    assert!(plane(3, 3).has_face_information());
    assert!(!grid(3, 3).has_face_information());
    assert!(octahedron().is_eulerian());
    assert!(!tetrahedron().is_eulerian());
}

#[test]
fn half_edges_are_twinned_pairs() {
    let g = tetrahedron();
    assert_eq!(g.half_edges.len(), 2 * g.edges.len());
    for e in &g.edges {
        let [h0, h1] = e.half_edges;
        assert_eq!(h0.twin(), h1);
        assert_eq!(g.half_edges[h0.0].twin, h1);
        assert_eq!(g.origin(h0), e.vertices[0]);
        assert_eq!(g.dest(h0), e.vertices[1]);
        assert_eq!(h1.edge(), e.id);
    }
}

#[test]
fn face_vertices_follow_the_polygon() {
    let g = tetrahedron();
    assert_eq!(
        g.face_vertices(FaceId(0)),
        vec![VertexId(0), VertexId(2), VertexId(1)]
    );
    let hs = g.face_half_edges(FaceId(1));
    for i in 0..hs.len() {
        assert_eq!(g.dest(hs[i]), g.origin(hs[(i + 1) % hs.len()]));
    }
}

#[test]
fn rejects_loops_and_open_faces() {
    let mut g = grid(2, 2);
    assert!(matches!(
        g.add_edge(VertexId(1), VertexId(1)),
        Err(GraphError::DegenerateEdge { .. })
    ));
    // edges 0 = (0,1) and 3 = (2,3) share no vertex
    assert!(matches!(
        g.add_face(vec![EdgeId(0), EdgeId(3)]),
        Err(GraphError::OpenFace(_))
    ));
    assert!(matches!(
        g.add_edge(VertexId(0), VertexId(99)),
        Err(GraphError::UnknownVertex(VertexId(99)))
    ));
}

#[test]
fn split_edge_moves_one_face() {
    let mut g = tetrahedron();
    let before = g.edges[0].faces.clone();
    let (new, split) = g.split_edge(EdgeId(0)).unwrap();
    assert_eq!(g.edges[new.0].vertices, g.edges[0].vertices);
    assert_eq!(g.edges[0].faces, vec![before[0], split]);
    assert_eq!(g.edges[new.0].faces, vec![before[1], split]);
    assert!(g.faces[before[1].0].edges.contains(&new));
    assert!(!g.faces[before[1].0].edges.contains(&EdgeId(0)));
    assert_eq!(g.faces[split.0].edges, vec![EdgeId(0), new]);
}

#[test]
fn splitting_every_edge_doubles_edges() {
    for g0 in [tetrahedron(), grid(3, 3), plane(3, 3)] {
        let (v, e, f) = counts(&g0);
        let mut g = g0.clone();
        for i in 0..e {
            g.split_edge(EdgeId(i)).unwrap();
        }
        assert_eq!(counts(&g), (v, 2 * e, f + e));
        // the source graph is untouched
        assert_eq!(counts(&g0), (v, e, f));
    }
}

#[test]
fn eulerize_tetrahedron_splits_a_matching() {
    let mut g = tetrahedron();
    let split = g.make_eulerian(7).unwrap();
    assert_eq!(split, 2);
    assert!(g.is_eulerian());
    assert_eq!(counts(&g), (4, 8, 6));
    // shortest matching pairs 0-1 and 2-3, both joined by a single edge
    assert_eq!(g.edges[6].vertices, [VertexId(1), VertexId(0)]);
    assert_eq!(g.edges[7].vertices, [VertexId(2), VertexId(3)]);
}

#[test]
fn eulerize_is_noop_on_even_graphs() {
    let mut g = octahedron();
    assert_eq!(g.make_eulerian(0).unwrap(), 0);
    assert_eq!(counts(&g), (6, 12, 8));
}

#[test]
fn eulerize_grids_and_planes() {
    let mut q = quad_grid(4, 4);
    assert_eq!(q.make_eulerian(1).unwrap(), 4);
    assert!(q.is_eulerian());

    let mut p = plane(3, 3);
    p.make_eulerian(1).unwrap();
    assert!(p.is_eulerian());
    // both odd corners route through the center
    assert_eq!(p.degree(VertexId(4)), 8);
}

#[test]
fn eulerize_is_seed_deterministic() {
    let mut a = grid(4, 3);
    let mut b = grid(4, 3);
    a.make_eulerian(42).unwrap();
    b.make_eulerian(42).unwrap();
    assert_eq!(a.to_doc(), b.to_doc());
}

#[test]
fn eulerize_disconnected_fails() {
    let positions = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(5.0, 0.0, 0.0),
        Vector3::new(6.0, 0.0, 0.0),
    ];
    let mut g = Graph::from_edges(&positions, &[(0, 1), (2, 3)]).unwrap();
    assert!(matches!(
        g.make_eulerian(0),
        Err(GraphError::Disconnected { .. })
    ));
}

#[test]
fn checkerboard_splits_odd_face_cycles() {
    let mut t = tetrahedron();
    assert_eq!(t.make_checkerboard().unwrap(), 3);
    assert_checkerboarded(&t);

    let mut q = quad_grid(4, 4);
    assert_eq!(q.make_checkerboard().unwrap(), 4);
    assert_checkerboarded(&q);

    let mut o = octahedron();
    assert_eq!(o.make_checkerboard().unwrap(), 0);
    assert_checkerboarded(&o);

    let mut p = plane(3, 3);
    p.make_checkerboard().unwrap();
    assert_checkerboarded(&p);
}

#[test]
fn checkerboard_rejects_non_manifold_edges() {
    let positions = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.5, 1.0, 0.0),
        Vector3::new(0.5, -1.0, 0.0),
        Vector3::new(0.5, 0.0, 1.0),
    ];
    let polys = vec![vec![0, 1, 2], vec![1, 0, 3], vec![0, 1, 4]];
    let mut g = Graph::from_polygons(&positions, &polys).unwrap();
    assert!(matches!(
        g.make_checkerboard(),
        Err(GraphError::NonManifoldEdge { faces: 3, .. })
    ));
}

/// Other endpoints of the rotation at `v`.
fn ring(g: &Graph, v: VertexId, order: &[EdgeId]) -> Vec<usize> {
    order.iter().map(|&e| g.other_vertex(e, v).0).collect()
}

#[test]
fn topo_order_follows_faces_counterclockwise() {
    let g = octahedron();
    let order = g.topo_adjacent_edges(VertexId(4)).unwrap();
    let r = ring(&g, VertexId(4), &order);
    assert_eq!(r.len(), 4);
    let k = r.iter().position(|&w| w == 0).unwrap();
    assert_eq!(r[(k + 1) % 4], 2);
    assert_eq!(r[(k + 2) % 4], 1);
    assert_eq!(r[(k + 3) % 4], 3);
}

#[test]
fn topo_order_on_open_meshes() {
    let g = quad_grid(3, 3);
    let r = ring(&g, VertexId(4), &g.topo_adjacent_edges(VertexId(4)).unwrap());
    let k = r.iter().position(|&w| w == 1).unwrap();
    assert_eq!(r[(k + 2) % 4], 7);

    // boundary vertex: walk starts at a boundary edge
    let b = ring(&g, VertexId(1), &g.topo_adjacent_edges(VertexId(1)).unwrap());
    assert_eq!(b.len(), 3);
    assert_eq!(b[1], 4);
}

#[test]
fn topo_order_keeps_split_edges_adjacent() {
    let mut g = plane(3, 3);
    g.make_eulerian(3).unwrap();
    let order = g.topo_adjacent_edges(VertexId(4)).unwrap();
    assert_eq!(order.len(), 8);
    let r = ring(&g, VertexId(4), &order);
    let first = r.iter().position(|&w| w == 0).unwrap();
    assert!(r[(first + 1) % 8] == 0 || r[(first + 7) % 8] == 0);
}

#[test]
fn topo_order_needs_faces_and_falls_back() {
    let g = grid(3, 3);
    assert!(matches!(
        g.topo_adjacent_edges(VertexId(4)),
        Err(GraphError::InsufficientFaces {
            faces: 0,
            degree: 4,
            ..
        })
    ));
    let order = g.ordered_adjacent_edges(VertexId(4));
    assert_eq!(order, g.geometric_adjacent_edges(VertexId(4)));
    let d0 = g.edge_direction(order[0], VertexId(4));
    let d2 = g.edge_direction(order[2], VertexId(4));
    assert!((d0.dot(&d2) + 1.0).abs() < 1e-12);
}

#[test]
fn recompute_normals_points_out_of_the_plane() {
    let g = quad_grid(3, 3);
    for f in &g.faces {
        assert!((f.normal - Vector3::z()).norm() < 1e-12);
    }
    for v in &g.vertices {
        assert!((v.normal - Vector3::z()).norm() < 1e-12);
    }
}

#[test]
fn json_roundtrip_keeps_ids_and_normals() {
    let mut g = tetrahedron();
    g.make_checkerboard().unwrap();
    let json = g.to_json().unwrap();
    let back = Graph::from_json(&json).unwrap();
    assert_eq!(back.to_doc(), g.to_doc());
    assert_eq!(back.half_edges.len(), g.half_edges.len());
    for v in 0..g.vertices.len() {
        assert_eq!(back.vertices[v].edges, g.vertices[v].edges);
    }
}

#[test]
fn json_rejects_sparse_ids() {
    let mut doc = tetrahedron().to_doc();
    doc.edges[2].id = 9;
    assert!(matches!(
        Graph::from_doc(&doc),
        Err(GraphError::InvalidDocument(_))
    ));
}
