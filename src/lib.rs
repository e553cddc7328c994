//! Player detection and team classification in coloured point clouds.
//!
//! This crate provides tools for:
//! - Loading `X Y Z R G B` point files into training and evaluation sets
//! - Density-peak clustering of points into player candidates with
//!   outlier-trimmed cores
//! - Vertical colour profiles of clusters, reduced with PCA and partitioned
//!   with k-means into two teams and the referees
//! - Supervised classification through a pluggable [`processors::mva::MvaEngine`]
//!
//! # Example
//!
//! ```no_run
//! use cloud_teams::core::{context::RunContext, loaders::read_point_file};
//! use cloud_teams::processors::clustering::run_clustering;
//! use cloud_teams::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let mut ctx = RunContext::from_config(&config.input);
//! let (mut training, _) = read_point_file(&config.input.input_file, 0.2, &mut ctx).unwrap();
//! run_clustering(&mut training, &config.clustering).unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{
    ClassificationConfig, ClusteringConfig, InputConfig, OutputConfig, PipelineConfig,
};
pub use crate::core::{CloudPoint, Cluster, DataSet, Point};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
