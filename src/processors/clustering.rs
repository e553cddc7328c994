//! Density-peak clustering of point clouds into player candidates.
//!
//! The chain runs four stages over a [`DataSet`]:
//! 1. **Pre-clustering**: greedy grouping of points into small planar boxes
//! 2. **Density estimation**: point counts in a box window around each pre-cluster
//! 3. **Seeded clustering**: local density maxima become seeds, everything else
//!    joins the nearest seed
//! 4. **Cleanup**: a pooled Mahalanobis cut keeps the core of every cluster
//!
//! Box-window neighbour lookups use a `kiddo` KD-tree over the planar centres
//! and are evaluated in parallel with `rayon`. Results are collected in index
//! order, so the outcome matches a sequential scan exactly.
//!
//! # Example
//!
//! ```no_run
//! use cloud_teams::config::ClusteringConfig;
//! use cloud_teams::core::DataSet;
//! use cloud_teams::processors::clustering::run_clustering;
//!
//! let mut ds = DataSet::new();
//! run_clustering(&mut ds, &ClusteringConfig::default()).unwrap();
//! ```

use std::time::Instant;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::config::ClusteringConfig;
use crate::core::cluster::Cluster;
use crate::core::dataset::DataSet;
use crate::core::point::CloudPoint;

/// Errors that can occur during clustering.
#[derive(Error, Debug, PartialEq)]
pub enum ClusteringError {
    #[error("no seed passed the density threshold, {leftovers} pre-clusters cannot be assigned")]
    NoSeeds { leftovers: usize },

    #[error("pooled cluster covariance is degenerate (determinant {determinant})")]
    DegenerateCovariance { determinant: f64 },
}

/// Result type for clustering operations.
pub type Result<T> = std::result::Result<T, ClusteringError>;

/// Chebyshev box test in the (x, z) plane.
#[inline]
fn in_box(a: &[f32; 2], b: &[f32; 2], half_width: f32) -> bool {
    (a[0] - b[0]).abs() <= half_width && (a[1] - b[1]).abs() <= half_width
}

/// Planar box-window neighbourhoods over a fixed set of centres.
///
/// The KD-tree is queried with the disc circumscribing the box, then the
/// exact box test is applied. A centre is its own neighbour.
struct BoxNeighbours {
    centres: Vec<[f32; 2]>,
    tree: Option<ImmutableKdTree<f32, 2>>,
    half_width: f32,
}

impl BoxNeighbours {
    fn new(centres: Vec<[f32; 2]>, half_width: f32) -> Self {
        let tree = if centres.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&centres))
        };
        Self {
            centres,
            tree,
            half_width,
        }
    }

    fn of(&self, i: usize) -> Vec<usize> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        let centre = &self.centres[i];
        // slack keeps corner points that round just outside the disc
        let radius_sq = 2.0 * self.half_width * self.half_width * 1.001;
        let mut neighbours: Vec<usize> = tree
            .within::<SquaredEuclidean>(centre, radius_sq)
            .iter()
            .map(|nn| nn.item as usize)
            .filter(|&j| in_box(centre, &self.centres[j], self.half_width))
            .collect();
        neighbours.sort_unstable();
        neighbours
    }
}

fn planar_centres(clusters: &[Cluster]) -> Vec<[f32; 2]> {
    clusters.iter().map(|cl| cl.com().planar()).collect()
}

/// Greedy box pre-clustering of `points`, in input order.
///
/// Each point joins the first existing pre-cluster (in creation order) whose
/// centre of mass lies within `size` of it on both the x and z axes,
/// otherwise it starts a new one. With `skip` every point is a singleton.
pub fn pre_cluster(points: &[CloudPoint], size: f32, skip: bool) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    for point in points {
        let target = if skip {
            None
        } else {
            let planar = point.position.planar();
            clusters
                .iter()
                .position(|cl| in_box(&cl.com().planar(), &planar, size))
        };
        match target {
            Some(i) => clusters[i].add_point(point),
            None => clusters.push(Cluster::from_point(point)),
        }
    }
    clusters
}

/// Normalized box-window densities of a set of pre-clusters.
///
/// The raw density of a pre-cluster is the number of points in all
/// pre-clusters (itself included) whose centre lies in its window; values
/// are divided by the largest one.
pub fn box_densities(clusters: &[Cluster], window: f32) -> Vec<f32> {
    let neighbours = BoxNeighbours::new(planar_centres(clusters), window);
    let raw: Vec<usize> = (0..clusters.len())
        .into_par_iter()
        .map(|i| neighbours.of(i).iter().map(|&j| clusters[j].len()).sum())
        .collect();

    let max = raw.iter().copied().max().unwrap_or(0);
    raw.iter().map(|&d| d as f32 / max as f32).collect()
}

/// Flags the pre-clusters that are local density maxima.
///
/// `i` is a maximum when no neighbour has a strictly greater density and
/// every neighbour of equal density has a higher index.
pub fn local_maxima(clusters: &[Cluster], window: f32) -> Vec<bool> {
    let neighbours = BoxNeighbours::new(planar_centres(clusters), window);
    (0..clusters.len())
        .into_par_iter()
        .map(|i| {
            let density = clusters[i].density();
            neighbours.of(i).into_iter().filter(|&j| j != i).all(|j| {
                let other = clusters[j].density();
                other < density || (other == density && i < j)
            })
        })
        .collect()
}

/// Stage 1: fills `ds.pre_clusters()` from the raw points.
pub fn run_pre_clustering(ds: &mut DataSet, config: &ClusteringConfig) {
    let (points, pre_clusters, _) = ds.split_mut();
    *pre_clusters = pre_cluster(
        points,
        config.pre_clustering_size,
        config.skip_pre_clustering,
    );
}

/// Stage 2: annotates every pre-cluster with its normalized density.
///
/// Without pre-clusters there is nothing to normalize and the stage is a
/// no-op.
pub fn compute_densities(ds: &mut DataSet, config: &ClusteringConfig) {
    let densities = box_densities(ds.pre_clusters(), config.density_window);
    for (cl, density) in ds.pre_clusters_mut().iter_mut().zip(densities) {
        cl.set_density(density);
    }
}

/// Stage 3: builds the final clusters around density peaks.
///
/// Local maxima whose density reaches `seed_density_threshold` become
/// clusters seeded at their centre of mass. Every other pre-cluster, demoted
/// maxima last, is merged into the accepted seed nearest to its centre of
/// mass in the plane; the earliest seed wins exact ties.
///
/// # Errors
///
/// [`ClusteringError::NoSeeds`] if pre-clusters remain but no seed was
/// accepted.
pub fn run_seeded_clustering(ds: &mut DataSet, config: &ClusteringConfig) -> Result<()> {
    let (_, pre_clusters, clusters) = ds.split_mut();
    let is_max = local_maxima(pre_clusters, config.density_window);

    let mut seeds: Vec<Cluster> = Vec::new();
    let mut leftovers: Vec<usize> = Vec::new();
    let mut demoted: Vec<usize> = Vec::new();

    for (i, pre) in pre_clusters.iter().enumerate() {
        if !is_max[i] {
            leftovers.push(i);
        } else if pre.density() < config.seed_density_threshold {
            demoted.push(i);
        } else {
            let mut seed = Cluster::new();
            seed.add_points(pre);
            seed.set_density(pre.density());
            seed.set_seed(pre.com());
            seeds.push(seed);
        }
    }
    leftovers.extend(demoted);

    if seeds.is_empty() && !leftovers.is_empty() {
        return Err(ClusteringError::NoSeeds {
            leftovers: leftovers.len(),
        });
    }
    debug!(
        "{} seeds accepted, {} pre-clusters left over",
        seeds.len(),
        leftovers.len()
    );

    for &i in &leftovers {
        let pre = &pre_clusters[i];
        let com = pre.com();
        let mut nearest = 0;
        let mut min_dist = seeds[0].seed().dist_2d_sq(&com);
        for (j, seed) in seeds.iter().enumerate().skip(1) {
            let dist = seed.seed().dist_2d_sq(&com);
            if dist < min_dist {
                min_dist = dist;
                nearest = j;
            }
        }
        seeds[nearest].add_points(pre);
    }

    *clusters = seeds;
    Ok(())
}

/// Pooled second moments of the planar offsets of every point to its cluster seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PooledCovariance {
    pub sxx: f64,
    pub szz: f64,
    pub sxz: f64,
}

impl PooledCovariance {
    /// Covariance over all points of all clusters, `None` without points.
    pub fn from_clusters(clusters: &[Cluster]) -> Option<Self> {
        let mut n = 0usize;
        let (mut sx, mut sz, mut sxx, mut szz, mut sxz) = (0.0f64, 0.0, 0.0, 0.0, 0.0);
        for cl in clusters {
            let seed = cl.seed();
            for p in cl.points() {
                let dx = (seed.x - p.x()) as f64;
                let dz = (seed.z - p.z()) as f64;
                sx += dx;
                sz += dz;
                sxx += dx * dx;
                szz += dz * dz;
                sxz += dx * dz;
                n += 1;
            }
        }
        if n == 0 {
            return None;
        }
        let n = n as f64;
        let (mx, mz) = (sx / n, sz / n);
        Some(Self {
            sxx: sxx / n - mx * mx,
            szz: szz / n - mz * mz,
            sxz: sxz / n - mx * mz,
        })
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sxx * self.szz - self.sxz * self.sxz
    }

    /// Normalized squared deviation of a planar offset.
    #[inline]
    pub fn deviation_sq(&self, dx: f64, dz: f64) -> f64 {
        (dx * dx * self.szz + dz * dz * self.sxx - 2.0 * dx * dz * self.sxz) / self.determinant()
    }
}

/// Stage 4: attaches to every cluster the core of points within
/// `cluster_core_size` standard deviations of its seed.
///
/// # Errors
///
/// [`ClusteringError::DegenerateCovariance`] when the pooled covariance
/// cannot be inverted.
pub fn cleanup_clusters(ds: &mut DataSet, config: &ClusteringConfig) -> Result<()> {
    let clusters = ds.clusters_mut();
    let Some(cov) = PooledCovariance::from_clusters(clusters) else {
        return Ok(());
    };

    let determinant = cov.determinant();
    if !(determinant > 0.0 && determinant.is_finite()) {
        return Err(ClusteringError::DegenerateCovariance { determinant });
    }

    let s_max = (config.cluster_core_size as f64).powi(2);
    for cl in clusters.iter_mut() {
        let seed = cl.seed();
        let mut core = Cluster::new();
        core.set_seed(seed);
        for p in cl.points() {
            let dx = (seed.x - p.x()) as f64;
            let dz = (seed.z - p.z()) as f64;
            if cov.deviation_sq(dx, dz) <= s_max {
                core.add_point(p);
            }
        }
        cl.set_core(core);
    }
    Ok(())
}

/// Run the full clustering chain on a data set.
///
/// # Errors
///
/// Propagates the errors of [`run_seeded_clustering`] and
/// [`cleanup_clusters`].
pub fn run_clustering(ds: &mut DataSet, config: &ClusteringConfig) -> Result<()> {
    let start = Instant::now();
    run_pre_clustering(ds, config);
    info!(
        "Pre-clustering done: {} points grouped into {} pre-clusters ({:.2?})",
        ds.points().len(),
        ds.pre_clusters().len(),
        start.elapsed()
    );

    let start = Instant::now();
    compute_densities(ds, config);
    info!("Densities computed ({:.2?})", start.elapsed());

    let start = Instant::now();
    run_seeded_clustering(ds, config)?;
    info!(
        "Seeded clustering done: {} clusters ({:.2?})",
        ds.clusters().len(),
        start.elapsed()
    );

    let start = Instant::now();
    cleanup_clusters(ds, config)?;
    let core_points: usize = ds
        .clusters()
        .iter()
        .filter_map(Cluster::core)
        .map(Cluster::len)
        .sum();
    info!(
        "Cleanup done: {} of {} points kept in cluster cores ({:.2?})",
        core_points,
        ds.points().len(),
        start.elapsed()
    );
    Ok(())
}
