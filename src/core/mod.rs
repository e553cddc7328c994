//! Core data types and I/O operations.

pub mod cluster;
pub mod context;
pub mod dataset;
pub mod loaders;
pub mod point;
pub mod writers;

pub use cluster::{Cluster, Layer};
pub use context::RunContext;
pub use dataset::{Bounds, Coordinate, DataSet};
pub use loaders::{read_point_file, read_true_positions, LoaderError};
pub use point::{CloudPoint, Point, PointIdAllocator, Rgb};
pub use writers::{write_classified_ply, write_clusters_csv, WriteError};
