//! Visualization of classified clusters.
//!
//! Core points are drawn as a top view of the field (x horizontal, z
//! vertical) with one colour per class, using the plotters library.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::core::dataset::DataSet;
use crate::core::writers::class_color;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("No cluster points to plot")]
    NothingToPlot,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Default plot width in pixels.
const DEFAULT_WIDTH: u32 = 1920;

/// Default plot height in pixels.
const DEFAULT_HEIGHT: u32 = 1080;

/// Colour of the seed markers.
const SEED_COLOR: RGBColor = RGBColor(0, 0, 0);

/// Plot the core points of every cluster in the field plane and save as PNG.
///
/// Points take the colour of their cluster's class, and every cluster seed
/// is marked with a cross. At most `max_points` points are drawn.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `ds` - Data set whose final clusters are drawn
/// * `max_points` - Maximum number of points to plot (subsamples if exceeded)
pub fn plot_classified_clusters(output_path: &Path, ds: &DataSet, max_points: usize) -> Result<()> {
    let mut points: Vec<(f32, f32, RGBColor)> = Vec::new();
    for cluster in ds.clusters() {
        let [r, g, b] = class_color(cluster.class_id());
        let color = RGBColor(r, g, b);
        let core = cluster.core().unwrap_or(cluster);
        points.extend(core.points().iter().map(|p| (p.x(), p.z(), color)));
    }
    if points.is_empty() {
        return Err(VisualizationError::NothingToPlot);
    }

    let n = points.len();
    let step = if n > max_points.max(1) { n / max_points.max(1) } else { 1 };
    let points: Vec<(f32, f32, RGBColor)> = points.into_iter().step_by(step).collect();
    let seeds: Vec<(f32, f32)> = ds
        .clusters()
        .iter()
        .map(|cl| (cl.seed().x, cl.seed().z))
        .collect();

    let (x_min, x_max, z_min, z_max) = compute_bounds(points.iter().map(|(x, z, _)| (*x, *z)));
    let x_padding = (x_max - x_min) * 0.05;
    let z_padding = (z_max - z_min) * 0.05;

    let root =
        BitMapBackend::new(output_path, (DEFAULT_WIDTH, DEFAULT_HEIGHT)).into_drawing_area();

    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // No axis labels: the bitmap backend is built without font support.
    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(
            (x_min - x_padding)..(x_max + x_padding),
            (z_min - z_padding)..(z_max + z_padding),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, z, color)| Circle::new((*x, *z), 2, color.filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(
            seeds
                .iter()
                .map(|&(x, z)| Cross::new((x, z), 6, SEED_COLOR.stroke_width(2))),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Compute the bounds (min/max) of planar coordinates.
fn compute_bounds<I>(points: I) -> (f32, f32, f32, f32)
where
    I: IntoIterator<Item = (f32, f32)>,
{
    let mut x_min = f32::MAX;
    let mut x_max = f32::MIN;
    let mut z_min = f32::MAX;
    let mut z_max = f32::MIN;

    for (x, z) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        z_min = z_min.min(z);
        z_max = z_max.max(z);
    }

    if (x_max - x_min).abs() < f32::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (z_max - z_min).abs() < f32::EPSILON {
        z_min -= 1.0;
        z_max += 1.0;
    }

    (x_min, x_max, z_min, z_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cluster::Cluster;
    use crate::core::point::{CloudPoint, Point, PointIdAllocator, Rgb};
    use tempfile::tempdir;

    #[test]
    fn test_compute_bounds_pads_flat_axis() {
        let (x_min, x_max, z_min, z_max) = compute_bounds(vec![(1.0, 3.0), (2.0, 3.0)]);
        assert_eq!((x_min, x_max), (1.0, 2.0));
        assert_eq!((z_min, z_max), (2.0, 4.0));
    }

    #[test]
    fn test_plot_empty_data_set() {
        let dir = tempdir().unwrap();
        let result = plot_classified_clusters(&dir.path().join("plot.png"), &DataSet::new(), 100);
        assert!(matches!(result, Err(VisualizationError::NothingToPlot)));
    }

    #[test]
    fn test_plot_writes_png() {
        let mut ids = PointIdAllocator::default();
        let mut ds = DataSet::new();
        for (class_id, x) in [(0usize, 0.0f32), (2, 5.0)] {
            let mut cl = Cluster::new();
            for k in 0..10 {
                let p = Point::new(x + k as f32 * 0.1, 1.0, k as f32 * 0.05);
                cl.add_point(&CloudPoint::new(p, Rgb::new(0, 0, 0), &mut ids));
            }
            cl.set_seed(cl.com());
            cl.set_class_id(Some(class_id));
            ds.clusters_mut().push(cl);
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.png");
        plot_classified_clusters(&path, &ds, 1000).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
