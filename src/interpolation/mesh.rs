//! Delaunay triangulation of a scattered point cloud with point location.

use delaunator::{triangulate, Point};

/// Barycentric slack that still counts as inside a triangle.
const INSIDE_EPSILON: f64 = 1e-10;

/// Doubled triangle area, relative to its squared longest edge, below which
/// the triangle is treated as a sliver.
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Containing triangle of a query point and its barycentric weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub triangle: usize,
    pub weights: [f64; 3],
}

/// A triangulated sample cloud.
#[derive(Debug, Clone)]
pub struct Mesh {
    points: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    locator: TriangleLocator,
}

impl Mesh {
    /// Triangulate `points`. Returns None if no triangle can be formed
    /// (fewer than three distinct points, or all of them collinear).
    pub fn new(points: Vec<[f64; 2]>) -> Option<Self> {
        let input: Vec<Point> = points.iter().map(|p| Point { x: p[0], y: p[1] }).collect();
        let triangulation = triangulate(&input);

        let triangles: Vec<[usize; 3]> = triangulation
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .filter(|t| !is_degenerate(&points, t))
            .collect();

        if triangles.is_empty() {
            return None;
        }

        let locator = TriangleLocator::new(&points, &triangles);
        Some(Self {
            points,
            triangles,
            locator,
        })
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Number of distinct input points that ended up as triangle vertices.
    /// Coincident points collapse to one vertex.
    pub fn vertex_count(&self) -> usize {
        let mut used = vec![false; self.points.len()];
        for t in &self.triangles {
            for &v in t {
                used[v] = true;
            }
        }
        used.into_iter().filter(|&u| u).count()
    }

    /// Find the triangle containing `(x, y)`; None outside the convex hull.
    pub fn locate(&self, x: f64, y: f64) -> Option<Location> {
        self.locator.candidates(x, y)?.iter().find_map(|&index| {
            let weights = barycentric(&self.points, &self.triangles[index], x, y);
            if weights.iter().all(|&w| w >= -INSIDE_EPSILON) {
                Some(Location {
                    triangle: index,
                    weights,
                })
            } else {
                None
            }
        })
    }

    /// Sorted, de-duplicated neighbour lists for every vertex.
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.points.len()];
        for t in &self.triangles {
            for k in 0..3 {
                let a = t[k];
                let b = t[(k + 1) % 3];
                neighbors[a].push(b);
                neighbors[b].push(a);
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
            list.dedup();
        }
        neighbors
    }
}

fn signed_area2(points: &[[f64; 2]], t: &[usize; 3]) -> f64 {
    let [a, b, c] = [points[t[0]], points[t[1]], points[t[2]]];
    (b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])
}

fn is_degenerate(points: &[[f64; 2]], t: &[usize; 3]) -> bool {
    let longest = (0..3)
        .map(|k| {
            let [a, b] = [points[t[k]], points[t[(k + 1) % 3]]];
            (b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)
        })
        .fold(0.0, f64::max);
    signed_area2(points, t).abs() <= DEGENERATE_EPSILON * longest
}

fn barycentric(points: &[[f64; 2]], t: &[usize; 3], x: f64, y: f64) -> [f64; 3] {
    let [a, b, c] = [points[t[0]], points[t[1]], points[t[2]]];
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    let l1 = ((b[1] - c[1]) * (x - c[0]) + (c[0] - b[0]) * (y - c[1])) / det;
    let l2 = ((c[1] - a[1]) * (x - c[0]) + (a[0] - c[0]) * (y - c[1])) / det;
    [l1, l2, 1.0 - l1 - l2]
}

/// Uniform buckets over the mesh extent, each listing the triangles whose
/// bounding box overlaps it. Candidate lists stay in ascending triangle order
/// so lookups are deterministic.
#[derive(Debug, Clone)]
struct TriangleLocator {
    min: [f64; 2],
    cell: [f64; 2],
    dims: [usize; 2],
    buckets: Vec<Vec<usize>>,
}

impl TriangleLocator {
    fn new(points: &[[f64; 2]], triangles: &[[usize; 3]]) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for t in triangles {
            for &v in t {
                for axis in 0..2 {
                    min[axis] = min[axis].min(points[v][axis]);
                    max[axis] = max[axis].max(points[v][axis]);
                }
            }
        }

        let side = ((triangles.len() as f64).sqrt().ceil() as usize).clamp(1, 512);
        let dims = [side, side];
        let cell = [
            ((max[0] - min[0]) / side as f64).max(f64::MIN_POSITIVE),
            ((max[1] - min[1]) / side as f64).max(f64::MIN_POSITIVE),
        ];

        let mut locator = Self {
            min,
            cell,
            dims,
            buckets: vec![Vec::new(); side * side],
        };

        for (index, t) in triangles.iter().enumerate() {
            let xs = t.map(|v| points[v][0]);
            let ys = t.map(|v| points[v][1]);
            let lo = locator.cell_of(fold_min(&xs), fold_min(&ys));
            let hi = locator.cell_of(fold_max(&xs), fold_max(&ys));
            for row in lo[1]..=hi[1] {
                for col in lo[0]..=hi[0] {
                    locator.buckets[row * dims[0] + col].push(index);
                }
            }
        }

        locator
    }

    fn cell_of(&self, x: f64, y: f64) -> [usize; 2] {
        let col = ((x - self.min[0]) / self.cell[0]).floor().max(0.0) as usize;
        let row = ((y - self.min[1]) / self.cell[1]).floor().max(0.0) as usize;
        [col.min(self.dims[0] - 1), row.min(self.dims[1] - 1)]
    }

    fn candidates(&self, x: f64, y: f64) -> Option<&[usize]> {
        let max_x = self.min[0] + self.cell[0] * self.dims[0] as f64;
        let max_y = self.min[1] + self.cell[1] * self.dims[1] as f64;
        let slack_x = self.cell[0] * INSIDE_EPSILON;
        let slack_y = self.cell[1] * INSIDE_EPSILON;
        if x < self.min[0] - slack_x
            || y < self.min[1] - slack_y
            || x > max_x + slack_x
            || y > max_y + slack_y
            || !x.is_finite()
            || !y.is_finite()
        {
            return None;
        }
        let [col, row] = self.cell_of(x, y);
        Some(&self.buckets[row * self.dims[0] + col])
    }
}

fn fold_min(values: &[f64; 3]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn fold_max(values: &[f64; 3]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
