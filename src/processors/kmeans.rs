//! Lloyd's k-means over 3-vectors.

use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::core::point::Point;

/// Squared centre displacement below which a centre counts as settled.
pub const CONVERGENCE_DIST_SQ: f32 = 0.001;

#[derive(Error, Debug, PartialEq)]
pub enum KmeansError {
    #[error("k-means needs at least {k} objects, got {objects}")]
    TooFewObjects { k: usize, objects: usize },

    #[error("k-means needs at least one group")]
    NoGroups,
}

pub type Result<T> = std::result::Result<T, KmeansError>;

/// Outcome of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct KmeansResult {
    /// Group index of every input object, in input order.
    pub assignments: Vec<usize>,
    pub centroids: Vec<Point>,
    pub iterations: usize,
    pub converged: bool,
}

impl KmeansResult {
    /// Number of members of every group.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &a in &self.assignments {
            sizes[a] += 1;
        }
        sizes
    }
}

/// Index of the nearest centre, the first one on ties.
fn nearest(value: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut min_dist = f32::INFINITY;
    for (j, c) in centroids.iter().enumerate() {
        let dist = value.dist_3d_sq(c);
        if dist < min_dist {
            min_dist = dist;
            best = j;
        }
    }
    best
}

/// Assignment step: the nearest centre of every value.
pub fn assign(values: &[Point], centroids: &[Point]) -> Vec<usize> {
    values.iter().map(|v| nearest(v, centroids)).collect()
}

/// Mean of every group; empty groups keep their previous centre.
fn update(values: &[Point], assignments: &[usize], previous: &[Point]) -> Vec<Point> {
    let mut sums = vec![[0.0f64; 3]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (v, &a) in values.iter().zip(assignments) {
        sums[a][0] += v.x as f64;
        sums[a][1] += v.y as f64;
        sums[a][2] += v.z as f64;
        counts[a] += 1;
    }
    previous
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(old, (sum, &count))| {
            if count == 0 {
                return *old;
            }
            let n = count as f64;
            Point::new((sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32)
        })
        .collect()
}

/// `k` distinct indices in `0..n`, drawn uniformly with rejection.
fn initial_indices<R: Rng + ?Sized>(k: usize, n: usize, rng: &mut R) -> Vec<usize> {
    let mut used = Vec::with_capacity(k);
    while used.len() < k {
        let i = rng.random_range(0..n);
        if !used.contains(&i) {
            used.push(i);
        }
    }
    used
}

/// Partition `values` into `k` groups.
///
/// Initial centres are `k` distinct input values picked at random. The
/// assign and update steps alternate until no centre moves by more than
/// [`CONVERGENCE_DIST_SQ`] or `max_iterations` is reached. The returned
/// assignment is taken against the final centres, so one more assignment
/// step would not change it.
///
/// # Errors
///
/// [`KmeansError::TooFewObjects`] when there are fewer values than groups.
pub fn kmeans<R: Rng + ?Sized>(
    values: &[Point],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Result<KmeansResult> {
    if k == 0 {
        return Err(KmeansError::NoGroups);
    }
    if values.len() < k {
        return Err(KmeansError::TooFewObjects {
            k,
            objects: values.len(),
        });
    }

    let mut centroids: Vec<Point> = initial_indices(k, values.len(), rng)
        .into_iter()
        .map(|i| values[i])
        .collect();

    let mut converged = false;
    let mut iterations = 0;
    while !converged && iterations < max_iterations {
        let assignments = assign(values, &centroids);
        let next = update(values, &assignments, &centroids);
        converged = next
            .iter()
            .zip(&centroids)
            .all(|(new, old)| new.dist_3d_sq(old) <= CONVERGENCE_DIST_SQ);
        centroids = next;
        iterations += 1;
        debug!("k-means iteration {}: centres {:?}", iterations, centroids);
    }

    Ok(KmeansResult {
        assignments: assign(values, &centroids),
        centroids,
        iterations,
        converged,
    })
}
