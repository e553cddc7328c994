//! Clusters of cloud points and their derived properties.
//!
//! A [`Cluster`] keeps its points in insertion order together with a running
//! centre of mass. Properties filled in by later pipeline stages (density,
//! seed, core, PCA colour, class id) live on the same type. Two derived views
//! are memoized: the vertical layer profile and the bootstrap sub-clusters.
//! Both are dropped whenever a point is added.

use log::warn;
use rand::Rng;

use super::point::{CloudPoint, Point};

/// One horizontal band of a cluster's layer profile.
///
/// `position.x`/`position.z` are the cluster seed, `position.y` and `color`
/// are averages over the points of the band.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Layer {
    pub position: Point,
    pub color: [f32; 3],
    pub count: usize,
}

impl Layer {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Debug, Clone)]
struct LayerCache {
    n_layers: usize,
    layers: Vec<Layer>,
}

#[derive(Debug, Clone)]
struct SplitCache {
    count: usize,
    fraction: f32,
    clusters: Vec<Cluster>,
}

/// An ordered collection of cloud points with derived statistics.
#[derive(Debug, Clone)]
pub struct Cluster {
    points: Vec<CloudPoint>,
    com: Point,
    seed: Point,
    pca_color: Point,
    density: f32,
    class_id: Option<usize>,
    core: Option<Box<Cluster>>,
    layer_cache: Option<LayerCache>,
    split_cache: Option<SplitCache>,
}

impl Default for Cluster {
    fn default() -> Self {
        Self::new()
    }
}

impl Cluster {
    /// Creates an empty cluster.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            com: Point::default(),
            seed: Point::default(),
            pca_color: Point::default(),
            density: 0.0,
            class_id: None,
            core: None,
            layer_cache: None,
            split_cache: None,
        }
    }

    /// Creates a cluster holding a single point.
    pub fn from_point(point: &CloudPoint) -> Self {
        let mut cluster = Self::new();
        cluster.add_point(point);
        cluster
    }

    /// Appends a point and updates the running centre of mass.
    pub fn add_point(&mut self, point: &CloudPoint) {
        let n = self.points.len() as f64;
        let update = |mean: f32, value: f32| ((mean as f64 * n + value as f64) / (n + 1.0)) as f32;
        self.com = Point::new(
            update(self.com.x, point.x()),
            update(self.com.y, point.y()),
            update(self.com.z, point.z()),
        );
        self.points.push(*point);
        self.invalidate_caches();
    }

    /// Appends every point of `other`, in order.
    pub fn add_points(&mut self, other: &Cluster) {
        for point in &other.points {
            self.add_point(point);
        }
    }

    /// Drops the memoized layer profile and bootstrap sub-clusters.
    pub fn invalidate_caches(&mut self) {
        self.layer_cache = None;
        self.split_cache = None;
    }

    #[inline]
    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Centre of mass of all points added so far.
    #[inline]
    pub fn com(&self) -> Point {
        self.com
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    #[inline]
    pub fn set_density(&mut self, density: f32) {
        self.density = density;
    }

    /// Representative planar position assigned by seeded clustering.
    #[inline]
    pub fn seed(&self) -> Point {
        self.seed
    }

    #[inline]
    pub fn set_seed(&mut self, seed: Point) {
        self.seed = seed;
    }

    /// Leading three PCA components of the colour profile.
    #[inline]
    pub fn pca_color(&self) -> Point {
        self.pca_color
    }

    #[inline]
    pub fn set_pca_color(&mut self, pca_color: Point) {
        self.pca_color = pca_color;
    }

    #[inline]
    pub fn class_id(&self) -> Option<usize> {
        self.class_id
    }

    #[inline]
    pub fn set_class_id(&mut self, class_id: Option<usize>) {
        self.class_id = class_id;
    }

    /// Inlier sub-cluster produced by outlier removal.
    #[inline]
    pub fn core(&self) -> Option<&Cluster> {
        self.core.as_deref()
    }

    #[inline]
    pub fn core_mut(&mut self) -> Option<&mut Cluster> {
        self.core.as_deref_mut()
    }

    /// Replaces the core, dropping the previous one.
    pub fn set_core(&mut self, core: Cluster) {
        self.core = Some(Box::new(core));
    }

    /// Vertical layer profile with `n_layers` bands.
    ///
    /// Points are binned by `floor(n_layers * y / y_max)` clamped to
    /// `[0, n_layers - 1]`, where `y_max` is the highest point of the
    /// cluster. Empty bands are reported and left zeroed.
    pub fn layers(&mut self, n_layers: usize) -> &[Layer] {
        let cached = matches!(&self.layer_cache, Some(c) if c.n_layers == n_layers);
        if !cached {
            let layers = self.compute_layers(n_layers);
            self.layer_cache = Some(LayerCache { n_layers, layers });
        }
        match &self.layer_cache {
            Some(cache) => cache.layers.as_slice(),
            None => &[],
        }
    }

    fn compute_layers(&self, n_layers: usize) -> Vec<Layer> {
        let mut layers = vec![Layer::default(); n_layers];
        if n_layers == 0 {
            return layers;
        }

        let y_max = self
            .points
            .iter()
            .map(|p| p.y())
            .fold(f32::NEG_INFINITY, f32::max);

        let mut sums = vec![[0.0f64; 4]; n_layers];
        for p in &self.points {
            // `as usize` saturates: negative and NaN go to 0
            let index = ((n_layers as f32 * p.y() / y_max).floor() as usize).min(n_layers - 1);
            let sum = &mut sums[index];
            sum[0] += p.y() as f64;
            sum[1] += p.color.r as f64;
            sum[2] += p.color.g as f64;
            sum[3] += p.color.b as f64;
            layers[index].count += 1;
        }

        for (layer, sum) in layers.iter_mut().zip(&sums) {
            if layer.count == 0 {
                warn!("Layer with no points found ({} points, {} layers)", self.len(), n_layers);
                continue;
            }
            let n = layer.count as f64;
            layer.position = Point::new(self.seed.x, (sum[0] / n) as f32, self.seed.z);
            layer.color = [(sum[1] / n) as f32, (sum[2] / n) as f32, (sum[3] / n) as f32];
        }
        layers
    }

    /// `count` bootstrap sub-clusters, each point included with probability `fraction`.
    ///
    /// Draws are independent per point and per sub-cluster, so a point can
    /// appear in any number of outputs. The result is memoized for the
    /// `(count, fraction)` pair.
    pub fn random_split<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        fraction: f32,
        rng: &mut R,
    ) -> &mut [Cluster] {
        let cached =
            matches!(&self.split_cache, Some(c) if c.count == count && c.fraction == fraction);
        if !cached {
            let mut clusters = Vec::with_capacity(count);
            for _ in 0..count {
                let mut sub = Cluster::new();
                sub.seed = self.seed;
                for point in &self.points {
                    if rng.random::<f64>() < fraction as f64 {
                        sub.add_point(point);
                    }
                }
                clusters.push(sub);
            }
            self.split_cache = Some(SplitCache {
                count,
                fraction,
                clusters,
            });
        }
        match &mut self.split_cache {
            Some(cache) => cache.clusters.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Memoized bootstrap sub-clusters, empty if none were drawn.
    pub fn splits(&self) -> &[Cluster] {
        self.split_cache
            .as_ref()
            .map_or(&[], |cache| cache.clusters.as_slice())
    }

    pub fn splits_mut(&mut self) -> &mut [Cluster] {
        match &mut self.split_cache {
            Some(cache) => cache.clusters.as_mut_slice(),
            None => &mut [],
        }
    }
}
