use std::collections::{HashMap, VecDeque};

/// Classification of one point after density clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLabel {
    Unclassified,
    Noise,
    Cluster(usize),
}

/// DBSCAN over 3-D points.
///
/// `epsilon` is a linear distance. It is squared once and every
/// neighbourhood test compares squared distances against it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    epsilon: f32,
    min_points: usize,
}

/// Result of [`Dbscan::cluster`].
#[derive(Debug, Clone, PartialEq)]
pub struct DensityClustering {
    /// Final label of every point, in input order
    pub labels: Vec<PointLabel>,
    /// Member indices per cluster id, ascending
    pub clusters: Vec<Vec<usize>>,
    /// Indices of points that belong to no cluster
    pub noise: Vec<usize>,
}

impl Dbscan {
    pub fn new(epsilon: f32, min_points: usize) -> Self {
        Self {
            epsilon,
            min_points,
        }
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    /// Partition `points` into dense clusters and noise.
    ///
    /// A point is a core point when at least `min_points` points (itself
    /// included) lie within `epsilon`. Clusters grow from core points; points
    /// first marked as noise join a cluster when a core point reaches them
    /// but never extend it.
    pub fn cluster(&self, points: &[[f32; 3]]) -> DensityClustering {
        let grid = Grid::new(points, self.epsilon);
        let epsilon_sq = self.epsilon * self.epsilon;
        let mut labels = vec![PointLabel::Unclassified; points.len()];
        let mut next_id = 0;

        for p in 0..points.len() {
            if labels[p] != PointLabel::Unclassified {
                continue;
            }
            let neighbours = grid.neighbours(points, p, epsilon_sq);
            if neighbours.len() < self.min_points {
                labels[p] = PointLabel::Noise;
                continue;
            }

            let id = next_id;
            next_id += 1;
            labels[p] = PointLabel::Cluster(id);

            let mut seeds = VecDeque::new();
            absorb(&neighbours, id, &mut labels, &mut seeds);
            while let Some(q) = seeds.pop_front() {
                let reach = grid.neighbours(points, q, epsilon_sq);
                if reach.len() >= self.min_points {
                    absorb(&reach, id, &mut labels, &mut seeds);
                }
            }
        }

        let mut clusters = vec![Vec::new(); next_id];
        let mut noise = Vec::new();
        for (i, label) in labels.iter().enumerate() {
            match label {
                PointLabel::Cluster(id) => clusters[*id].push(i),
                _ => noise.push(i),
            }
        }

        tracing::debug!(
            points = points.len(),
            clusters = clusters.len(),
            noise = noise.len(),
            "Density clustering done"
        );

        DensityClustering {
            labels,
            clusters,
            noise,
        }
    }
}

/// Label reachable points. Unclassified ones are queued for expansion,
/// noise points become border points.
fn absorb(
    neighbours: &[usize],
    id: usize,
    labels: &mut [PointLabel],
    seeds: &mut VecDeque<usize>,
) {
    for &n in neighbours {
        match labels[n] {
            PointLabel::Unclassified => {
                labels[n] = PointLabel::Cluster(id);
                seeds.push_back(n);
            }
            PointLabel::Noise => labels[n] = PointLabel::Cluster(id),
            PointLabel::Cluster(_) => {}
        }
    }
}

impl DensityClustering {
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    /// The member of `cluster` nearest to the cluster centroid. Ties go to
    /// the lowest point index, so the choice is reproducible.
    pub fn representative(&self, points: &[[f32; 3]], cluster: usize) -> Option<usize> {
        let members = self.clusters.get(cluster)?;
        if members.is_empty() {
            return None;
        }

        let mut sum = [0.0f64; 3];
        for &m in members {
            for (s, v) in sum.iter_mut().zip(points[m]) {
                *s += v as f64;
            }
        }
        let n = members.len() as f64;
        let centroid = sum.map(|s| s / n);

        let mut best: Option<(usize, f64)> = None;
        for &m in members {
            let d: f64 = points[m]
                .iter()
                .zip(centroid)
                .map(|(&v, c)| (v as f64 - c).powi(2))
                .sum();
            if best.map_or(true, |(_, b)| d < b) {
                best = Some((m, d));
            }
        }
        best.map(|(m, _)| m)
    }

    /// Representatives of all clusters, in cluster order.
    pub fn representatives(&self, points: &[[f32; 3]]) -> Vec<usize> {
        (0..self.clusters.len())
            .filter_map(|c| self.representative(points, c))
            .collect()
    }
}

type Cell = (i32, i32, i32);

/// Uniform grid with cells as wide as epsilon, so a neighbourhood never
/// reaches beyond the 27 cells around a point.
struct Grid {
    cell_size: f32,
    cells: HashMap<Cell, Vec<usize>>,
}

impl Grid {
    fn new(points: &[[f32; 3]], epsilon: f32) -> Self {
        let mut grid = Self {
            cell_size: epsilon,
            cells: HashMap::new(),
        };
        for (i, p) in points.iter().enumerate() {
            let cell = grid.cell_of(p);
            grid.cells.entry(cell).or_default().push(i);
        }
        grid
    }

    fn cell_of(&self, p: &[f32; 3]) -> Cell {
        let c = |v: f32| (v / self.cell_size).floor() as i32;
        (c(p[0]), c(p[1]), c(p[2]))
    }

    /// Indices within `epsilon_sq` of point `p`, `p` included.
    fn neighbours(&self, points: &[[f32; 3]], p: usize, epsilon_sq: f32) -> Vec<usize> {
        let origin = points[p];
        let (cx, cy, cz) = self.cell_of(&origin);
        let mut found = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = (
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    );
                    let Some(members) = self.cells.get(&cell) else {
                        continue;
                    };
                    found.extend(
                        members
                            .iter()
                            .copied()
                            .filter(|&i| distance_squared(origin, points[i]) <= epsilon_sq),
                    );
                }
            }
        }
        found.sort_unstable();
        found
    }
}

fn distance_squared(a: [f32; 3], b: [f32; 3]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
