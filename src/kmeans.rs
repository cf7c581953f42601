//! Deterministic k-means over embedding vectors.
//!
//! Lloyd's algorithm with two changes that make results exactly reproducible
//! and always `k`-sized:
//!
//! 1. **Farthest-first initialization.** The first centroid is point 0. Each
//!    further centroid is the point farthest from every centroid chosen so
//!    far. No random numbers are involved.
//! 2. **Empty-cluster repair.** After each assignment step, an empty cluster
//!    takes the point farthest from its own centroid out of some cluster that
//!    has members to spare.
//!
//! Every tie (equal distances) goes to the lowest index, except that a point
//! already sitting in one of its nearest clusters stays put.
//!
//! ```text
//! points:  p0 p1 p2 p3 p4        k = 2
//! init:    c0 = p0, c1 = argmax_i d(p_i, c0)
//! repeat:  assign -> repair empties -> recompute means
//! until:   no assignment changes, or max_iterations
//! ```

use serde::{Deserialize, Serialize};

/// Distance between two embeddings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// `1 - cos(a, b)`; a zero vector has similarity 0 to everything.
    #[default]
    Cosine,
    /// Squared Euclidean distance.
    Euclidean,
}

impl Distance {
    /// Distance between `a` and `b`. Vectors are expected to share a length.
    pub fn between(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => 1.0 - cosine_similarity(a, b),
            Self::Euclidean => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index of each input point.
    pub assignments: Vec<usize>,
    /// Final centroid of each cluster.
    pub centroids: Vec<Vec<f32>>,
    /// Lloyd iterations performed.
    pub iterations: usize,
}

impl Clustering {
    /// Point indices of each cluster, ascending within a cluster.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.centroids.len()];
        for (point, &cluster) in self.assignments.iter().enumerate() {
            members[cluster].push(point);
        }
        members
    }
}

/// Cluster `points` into `k` groups.
///
/// `k` is clamped to the number of points; when `points` is empty the result
/// is empty. Whenever `k <= points.len()`, every returned cluster has at
/// least one member.
///
/// ```rust
/// use morsels::{kmeans, Distance};
///
/// let points = vec![vec![0.0, 0.0], vec![10.0, 10.0], vec![0.5, 0.0], vec![10.0, 9.5]];
/// let result = kmeans(&points, 2, Distance::Euclidean, 100);
/// assert_eq!(result.assignments, vec![0, 1, 0, 1]);
/// ```
pub fn kmeans(
    points: &[Vec<f32>],
    k: usize,
    distance: Distance,
    max_iterations: usize,
) -> Clustering {
    let k = k.min(points.len());
    if k == 0 {
        return Clustering {
            assignments: Vec::new(),
            centroids: Vec::new(),
            iterations: 0,
        };
    }

    let mut centroids = farthest_first(points, k, distance);
    let mut assignments = vec![0usize; points.len()];
    let mut iterations = 0;

    for iteration in 1..=max_iterations.max(1) {
        iterations = iteration;

        let mut changed = iteration == 1;
        for (i, point) in points.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids, assignments[i], distance);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }
        changed |= repair_empty_clusters(points, &mut assignments, &mut centroids, distance);

        if !changed {
            break;
        }

        centroids = recompute_centroids(points, &assignments, &centroids);
    }

    Clustering {
        assignments,
        centroids,
        iterations,
    }
}

/// Initial centroids by farthest-first traversal from point 0.
fn farthest_first(points: &[Vec<f32>], k: usize, distance: Distance) -> Vec<Vec<f32>> {
    let mut chosen = vec![0usize];
    let mut nearest: Vec<f32> = points
        .iter()
        .map(|p| distance.between(p, &points[0]))
        .collect();

    while chosen.len() < k {
        let mut best: Option<(usize, f32)> = None;
        for (i, &d) in nearest.iter().enumerate() {
            if chosen.contains(&i) {
                continue;
            }
            if best.map_or(true, |(_, best_d)| d > best_d) {
                best = Some((i, d));
            }
        }
        let Some((next, _)) = best else { break };

        chosen.push(next);
        for (i, point) in points.iter().enumerate() {
            let d = distance.between(point, &points[next]);
            if d < nearest[i] {
                nearest[i] = d;
            }
        }
    }

    chosen.into_iter().map(|i| points[i].clone()).collect()
}

fn nearest_centroid(
    point: &[f32],
    centroids: &[Vec<f32>],
    current: usize,
    distance: Distance,
) -> usize {
    let mut best = current;
    let mut best_d = distance.between(point, &centroids[current]);
    for (c, centroid) in centroids.iter().enumerate() {
        let d = distance.between(point, centroid);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

/// Refill empty clusters from clusters with more than one member. Returns
/// whether any point moved.
fn repair_empty_clusters(
    points: &[Vec<f32>],
    assignments: &mut [usize],
    centroids: &mut [Vec<f32>],
    distance: Distance,
) -> bool {
    let mut repaired = false;
    loop {
        let mut sizes = vec![0usize; centroids.len()];
        for &cluster in assignments.iter() {
            sizes[cluster] += 1;
        }
        let Some(empty) = sizes.iter().position(|&size| size == 0) else {
            break;
        };

        let mut donor: Option<(usize, f32)> = None;
        for (i, point) in points.iter().enumerate() {
            let cluster = assignments[i];
            if sizes[cluster] < 2 {
                continue;
            }
            let d = distance.between(point, &centroids[cluster]);
            if donor.map_or(true, |(_, best_d)| d > best_d) {
                donor = Some((i, d));
            }
        }
        let Some((moved, _)) = donor else { break };

        assignments[moved] = empty;
        centroids[empty].clone_from(&points[moved]);
        repaired = true;
    }
    repaired
}

fn recompute_centroids(
    points: &[Vec<f32>],
    assignments: &[usize],
    previous: &[Vec<f32>],
) -> Vec<Vec<f32>> {
    let dim = previous.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0f32; dim]; previous.len()];
    let mut counts = vec![0usize; previous.len()];

    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), prev)| {
            if count == 0 {
                // Empty cluster: keep previous centroid.
                return prev.clone();
            }
            let n = count as f32;
            for value in &mut sum {
                *value /= n;
            }
            sum
        })
        .collect()
}
