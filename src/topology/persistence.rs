/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Vietoris–Rips persistent homology of small point clouds
//!
//! Dimension 0 comes from Kruskal's algorithm over the sorted edge lengths.
//! Dimension 1 comes from the standard Z/2 column reduction of the triangle
//! boundary matrix. Both run on the full clique complex up to `threshold`,
//! which is fine for the few hundred points of one atomic environment.

use crate::structure::Vector3D;
use std::collections::HashMap;

/// Pairs shorter than this (in Å) are rounding noise and dropped
const ZERO_PERSISTENCE: f64 = 1e-9;

/// One birth–death pair of a persistence diagram
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersistencePair {
    pub birth: f64,
    /// `f64::INFINITY` for classes still alive at the threshold
    pub death: f64,
}

impl PersistencePair {
    /// Lifetime of the class
    pub fn persistence(&self) -> f64 {
        self.death - self.birth
    }

    /// Whether the class never dies within the filtration
    pub fn is_essential(&self) -> bool {
        self.death.is_infinite()
    }
}

pub type PersistenceDiagram = Vec<PersistencePair>;

/// Diagrams of a filtration, by homology dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistenceResult {
    /// Connected components; every point is born at zero
    pub dim0: PersistenceDiagram,
    /// Loops
    pub dim1: PersistenceDiagram,
}

/// Disjoint sets with path halving and union by size
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
    components: usize,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            components: n,
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`; false if they were already one set
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        self.components -= 1;
        true
    }
}

/// Symmetric difference of two ascending index lists
fn add_columns(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Persistence diagrams of the Rips filtration of `points` up to `threshold`
///
/// Zero-length pairs are dropped. Classes alive at `threshold` get an
/// infinite death, so a single point yields one essential component.
pub fn compute_persistence(points: &[Vector3D], threshold: f64) -> PersistenceResult {
    let n = points.len();

    let mut edges: Vec<(f64, usize, usize)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let d = points[i].distance(&points[j]);
            if d <= threshold {
                edges.push((d, i, j));
            }
        }
    }
    edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut edge_id: Vec<Option<usize>> = vec![None; n * n];
    for (k, &(_, i, j)) in edges.iter().enumerate() {
        edge_id[i * n + j] = Some(k);
        edge_id[j * n + i] = Some(k);
    }

    let mut components = UnionFind::new(n);
    let mut merges = vec![false; edges.len()];
    let mut dim0 = Vec::new();
    for (k, &(d, i, j)) in edges.iter().enumerate() {
        if components.union(i, j) {
            merges[k] = true;
            if d > ZERO_PERSISTENCE {
                dim0.push(PersistencePair { birth: 0.0, death: d });
            }
        }
    }
    dim0.extend((0..components.components).map(|_| PersistencePair {
        birth: 0.0,
        death: f64::INFINITY,
    }));

    // A triangle enters with its longest edge, which has the largest edge id
    let mut triangles: Vec<[usize; 3]> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let Some(ij) = edge_id[i * n + j] else {
                continue;
            };
            for k in (j + 1)..n {
                if let (Some(ik), Some(jk)) = (edge_id[i * n + k], edge_id[j * n + k]) {
                    let mut faces = [ij, ik, jk];
                    faces.sort_unstable();
                    triangles.push(faces);
                }
            }
        }
    }
    triangles.sort_unstable_by(|a, b| a[2].cmp(&b[2]).then(a[1].cmp(&b[1])).then(a[0].cmp(&b[0])));

    let mut reduced: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut killed = vec![false; edges.len()];
    let mut dim1 = Vec::new();
    for faces in &triangles {
        let death = edges[faces[2]].0;
        let mut column = faces.to_vec();
        while let Some(&low) = column.last() {
            match reduced.get(&low) {
                Some(other) => column = add_columns(&column, other),
                None => break,
            }
        }
        if let Some(&low) = column.last() {
            killed[low] = true;
            let birth = edges[low].0;
            if death - birth > ZERO_PERSISTENCE {
                dim1.push(PersistencePair { birth, death });
            }
            reduced.insert(low, column);
        }
    }
    for (k, &(d, _, _)) in edges.iter().enumerate() {
        if !merges[k] && !killed[k] {
            dim1.push(PersistencePair {
                birth: d,
                death: f64::INFINITY,
            });
        }
    }

    PersistenceResult { dim0, dim1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn finite_deaths(diagram: &[PersistencePair]) -> Vec<f64> {
        let mut deaths: Vec<f64> = diagram
            .iter()
            .filter(|p| !p.is_essential())
            .map(|p| p.death)
            .collect();
        deaths.sort_by(f64::total_cmp);
        deaths
    }

    #[test]
    fn test_single_point() {
        let result = compute_persistence(&[Vector3D::origin()], 5.0);
        assert_eq!(result.dim0.len(), 1);
        assert!(result.dim0[0].is_essential());
        assert!(result.dim1.is_empty());
    }

    #[test]
    fn test_collinear_components() {
        let points = [
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(1.0, 0.0, 0.0),
            Vector3D::new(3.0, 0.0, 0.0),
        ];
        let result = compute_persistence(&points, 10.0);
        assert_eq!(finite_deaths(&result.dim0), vec![1.0, 2.0]);
        assert_eq!(result.dim0.iter().filter(|p| p.is_essential()).count(), 1);
        assert!(result.dim0.iter().all(|p| p.birth == 0.0));
        assert!(result.dim1.is_empty());
    }

    #[test]
    fn test_threshold_splits_components() {
        let points = [Vector3D::new(0.0, 0.0, 0.0), Vector3D::new(4.0, 0.0, 0.0)];
        let result = compute_persistence(&points, 3.0);
        assert_eq!(result.dim0.len(), 2);
        assert!(result.dim0.iter().all(|p| p.is_essential()));
    }

    #[test]
    fn test_coincident_points_have_no_zero_pairs() {
        let points = [Vector3D::origin(), Vector3D::origin()];
        let result = compute_persistence(&points, 1.0);
        assert_eq!(result.dim0.len(), 1);
        assert!(result.dim0[0].is_essential());
    }

    #[test]
    fn test_square_loop() {
        let square = [
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(1.0, 0.0, 0.0),
            Vector3D::new(1.0, 1.0, 0.0),
            Vector3D::new(0.0, 1.0, 0.0),
        ];

        let result = compute_persistence(&square, 1.5);
        assert_eq!(finite_deaths(&result.dim0), vec![1.0, 1.0, 1.0]);
        assert_eq!(result.dim1.len(), 1);
        assert_relative_eq!(result.dim1[0].birth, 1.0);
        assert_relative_eq!(result.dim1[0].death, 2f64.sqrt(), epsilon = 1e-12);

        // Without the diagonals the loop never fills
        let open = compute_persistence(&square, 1.2);
        assert_eq!(open.dim1.len(), 1);
        assert!(open.dim1[0].is_essential());
        assert_relative_eq!(open.dim1[0].birth, 1.0);
    }

    #[test]
    fn test_triangle_has_no_loop() {
        let points = [
            Vector3D::new(0.0, 0.0, 0.0),
            Vector3D::new(1.0, 0.0, 0.0),
            Vector3D::new(0.5, 3f64.sqrt() / 2.0, 0.0),
        ];
        let result = compute_persistence(&points, 2.0);
        assert!(result.dim1.is_empty());
    }

    #[test]
    fn test_octahedron_loops_fill_at_once() {
        // Edges and faces of the octahedron appear together at √2
        let points = [
            Vector3D::new(1.0, 0.0, 0.0),
            Vector3D::new(-1.0, 0.0, 0.0),
            Vector3D::new(0.0, 1.0, 0.0),
            Vector3D::new(0.0, -1.0, 0.0),
            Vector3D::new(0.0, 0.0, 1.0),
            Vector3D::new(0.0, 0.0, -1.0),
        ];
        let result = compute_persistence(&points, 3.0);
        assert_eq!(result.dim0.iter().filter(|p| p.is_essential()).count(), 1);
        assert!(result.dim1.is_empty());
    }
}
