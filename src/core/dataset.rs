//! Containers for the points and clusters of one data sample.

use super::cluster::Cluster;
use super::point::CloudPoint;

/// Index into the six per-point dimensions tracked by [`Bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    X = 0,
    Y = 1,
    Z = 2,
    R = 3,
    G = 4,
    B = 5,
}

impl Coordinate {
    pub const ALL: [Coordinate; 6] = [
        Coordinate::X,
        Coordinate::Y,
        Coordinate::Z,
        Coordinate::R,
        Coordinate::G,
        Coordinate::B,
    ];
}

/// Per-coordinate minimum and maximum over (x, y, z, r, g, b).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min: [f32; 6],
    max: [f32; 6],
}

impl Bounds {
    /// Bounds of a set of points, all zero when `points` is empty.
    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a CloudPoint>,
    {
        points
            .into_iter()
            .map(Self::values)
            .fold(None, |acc: Option<Bounds>, values| match acc {
                None => Some(Bounds {
                    min: values,
                    max: values,
                }),
                Some(mut b) => {
                    b.include_values(&values);
                    Some(b)
                }
            })
            .unwrap_or_default()
    }

    fn values(p: &CloudPoint) -> [f32; 6] {
        [
            p.x(),
            p.y(),
            p.z(),
            p.color.r as f32,
            p.color.g as f32,
            p.color.b as f32,
        ]
    }

    fn include_values(&mut self, values: &[f32; 6]) {
        for (i, &v) in values.iter().enumerate() {
            self.min[i] = self.min[i].min(v);
            self.max[i] = self.max[i].max(v);
        }
    }

    #[inline]
    pub fn min(&self, coordinate: Coordinate) -> f32 {
        self.min[coordinate as usize]
    }

    #[inline]
    pub fn max(&self, coordinate: Coordinate) -> f32 {
        self.max[coordinate as usize]
    }
}

/// Raw points plus the pre-clusters and final clusters built from them.
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    points: Vec<CloudPoint>,
    pre_clusters: Vec<Cluster>,
    clusters: Vec<Cluster>,
    bounds: Bounds,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Data set over `points` with bounds computed from those points alone.
    pub fn from_points(points: Vec<CloudPoint>) -> Self {
        let bounds = Bounds::from_points(&points);
        Self {
            points,
            bounds,
            ..Self::default()
        }
    }

    /// Data set over `points` carrying externally computed bounds.
    pub fn with_bounds(points: Vec<CloudPoint>, bounds: Bounds) -> Self {
        Self {
            points,
            bounds,
            ..Self::default()
        }
    }

    #[inline]
    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    #[inline]
    pub fn pre_clusters(&self) -> &[Cluster] {
        &self.pre_clusters
    }

    #[inline]
    pub fn pre_clusters_mut(&mut self) -> &mut Vec<Cluster> {
        &mut self.pre_clusters
    }

    #[inline]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    #[inline]
    pub fn clusters_mut(&mut self) -> &mut Vec<Cluster> {
        &mut self.clusters
    }

    /// Points and pre-clusters borrowed together with the final clusters.
    pub(crate) fn split_mut(&mut self) -> (&[CloudPoint], &mut Vec<Cluster>, &mut Vec<Cluster>) {
        (&self.points, &mut self.pre_clusters, &mut self.clusters)
    }

    #[inline]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[inline]
    pub fn coordinate_min(&self, coordinate: Coordinate) -> f32 {
        self.bounds.min(coordinate)
    }

    #[inline]
    pub fn coordinate_max(&self, coordinate: Coordinate) -> f32 {
        self.bounds.max(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::point::PointIdAllocator;

    #[test]
    fn test_bounds_cover_all_dimensions() {
        let mut ids = PointIdAllocator::default();
        let points = vec![
            CloudPoint::from_parts(1.0, -2.0, 3.0, 10, 200, 30, &mut ids),
            CloudPoint::from_parts(-1.0, 5.0, 0.5, 255, 0, 31, &mut ids),
        ];
        let ds = DataSet::from_points(points);

        assert_eq!(ds.coordinate_min(Coordinate::X), -1.0);
        assert_eq!(ds.coordinate_max(Coordinate::X), 1.0);
        assert_eq!(ds.coordinate_min(Coordinate::Y), -2.0);
        assert_eq!(ds.coordinate_max(Coordinate::Y), 5.0);
        assert_eq!(ds.coordinate_min(Coordinate::Z), 0.5);
        assert_eq!(ds.coordinate_max(Coordinate::R), 255.0);
        assert_eq!(ds.coordinate_min(Coordinate::G), 0.0);
        assert_eq!(ds.coordinate_max(Coordinate::B), 31.0);
    }

    #[test]
    fn test_empty_data_set() {
        let ds = DataSet::new();
        assert!(ds.points().is_empty());
        assert!(ds.pre_clusters().is_empty());
        assert!(ds.clusters().is_empty());
        for c in Coordinate::ALL {
            assert_eq!(ds.coordinate_min(c), 0.0);
            assert_eq!(ds.coordinate_max(c), 0.0);
        }
    }
}
