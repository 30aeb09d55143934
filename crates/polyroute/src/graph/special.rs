//! Small reference meshes for tests, benches and the CLI.
//!
//! Grid-like fixtures take vertex counts per side; vertex `(i, j)` has id
//! `j * nx + i` and sits at `(i, j, 0)`.

use nalgebra::Vector3;

use super::types::Graph;

fn grid_positions(nx: usize, ny: usize) -> Vec<Vector3<f64>> {
    let mut out = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            out.push(Vector3::new(i as f64, j as f64, 0.0));
        }
    }
    out
}

/// Closed tetrahedron: V=4, E=6, F=4, faces oriented outwards.
pub fn tetrahedron() -> Graph {
    let positions = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.5, 1.0, 0.0),
        Vector3::new(0.5, 0.5, 1.0),
    ];
    let faces = vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]];
    Graph::from_polygons(&positions, &faces).expect("fixture mesh is well formed")
}

/// Closed octahedron: V=6, E=12, F=8, every vertex of degree 4.
pub fn octahedron() -> Graph {
    let positions = [
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0),
    ];
    let faces = vec![
        vec![0, 2, 4],
        vec![2, 1, 4],
        vec![1, 3, 4],
        vec![3, 0, 4],
        vec![2, 0, 5],
        vec![1, 2, 5],
        vec![3, 1, 5],
        vec![0, 3, 5],
    ];
    Graph::from_polygons(&positions, &faces).expect("fixture mesh is well formed")
}

/// Lattice edges only, no faces.
pub fn grid(nx: usize, ny: usize) -> Graph {
    let mut pairs = Vec::new();
    for j in 0..ny {
        for i in 0..nx {
            let v = j * nx + i;
            if i + 1 < nx {
                pairs.push((v, v + 1));
            }
            if j + 1 < ny {
                pairs.push((v, v + nx));
            }
        }
    }
    Graph::from_edges(&grid_positions(nx, ny), &pairs).expect("fixture mesh is well formed")
}

/// Open lattice of quads.
pub fn quad_grid(nx: usize, ny: usize) -> Graph {
    let mut faces = Vec::new();
    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let v = j * nx + i;
            faces.push(vec![v, v + 1, v + nx + 1, v + nx]);
        }
    }
    Graph::from_polygons(&grid_positions(nx, ny), &faces).expect("fixture mesh is well formed")
}

/// Open triangulated plane; each cell is cut along its `(i, j)-(i+1, j+1)`
/// diagonal, lower triangle first.
pub fn plane(nx: usize, ny: usize) -> Graph {
    let mut faces = Vec::new();
    for j in 0..ny.saturating_sub(1) {
        for i in 0..nx.saturating_sub(1) {
            let v = j * nx + i;
            faces.push(vec![v, v + 1, v + nx + 1]);
            faces.push(vec![v, v + nx + 1, v + nx]);
        }
    }
    Graph::from_polygons(&grid_positions(nx, ny), &faces).expect("fixture mesh is well formed")
}
