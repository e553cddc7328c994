//! Configuration types for the point cloud analysis.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by [`PipelineConfig::validate`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must lie in [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f32 },

    #[error("{name} must be strictly positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),
}

/// Configuration for data ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Text file with one `X Y Z R G B` point per line
    #[serde(default = "default_input_file")]
    pub input_file: PathBuf,

    /// Fraction of points routed to the evaluation data set
    #[serde(default = "default_evaluation_fraction")]
    pub evaluation_fraction: f32,

    /// Seed of the run's random generator
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,

    /// Identifier given to the first point read
    #[serde(default = "default_first_point_id")]
    pub first_point_id: u64,
}

fn default_input_file() -> PathBuf {
    PathBuf::from("./share/point_cloud_data.txt")
}

fn default_evaluation_fraction() -> f32 {
    0.2
}

fn default_random_seed() -> u64 {
    123
}

fn default_first_point_id() -> u64 {
    2001
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            input_file: default_input_file(),
            evaluation_fraction: default_evaluation_fraction(),
            random_seed: default_random_seed(),
            first_point_id: default_first_point_id(),
        }
    }
}

/// Configuration for the density-based clustering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Put every point in its own pre-cluster
    #[serde(default)]
    pub skip_pre_clustering: bool,

    /// Half-width of the pre-clustering box, in unit length
    #[serde(default = "default_pre_clustering_size")]
    pub pre_clustering_size: f32,

    /// Half-width of the box used for densities and local maxima
    #[serde(default = "default_density_window")]
    pub density_window: f32,

    /// Minimum normalized density of an accepted seed
    #[serde(default = "default_seed_density_threshold")]
    pub seed_density_threshold: f32,

    /// Outlier cut in units of standard deviations
    #[serde(default = "default_cluster_core_size")]
    pub cluster_core_size: f32,
}

fn default_pre_clustering_size() -> f32 {
    0.2
}

fn default_density_window() -> f32 {
    0.5
}

fn default_seed_density_threshold() -> f32 {
    0.5
}

fn default_cluster_core_size() -> f32 {
    2.0
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            skip_pre_clustering: false,
            pre_clustering_size: default_pre_clustering_size(),
            density_window: default_density_window(),
            seed_density_threshold: default_seed_density_threshold(),
            cluster_core_size: default_cluster_core_size(),
        }
    }
}

/// Configuration for the colour classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// PCA + k-means when true, trained engine otherwise
    #[serde(default = "default_unsupervised")]
    pub unsupervised: bool,

    /// Number of vertical layers per cluster in the colour profile
    #[serde(default = "default_n_layers_per_cluster")]
    pub n_layers_per_cluster: usize,

    /// Train the supervised engine before classifying
    #[serde(default)]
    pub run_training: bool,

    /// Where the supervised engine model is saved to and loaded from
    #[serde(default = "default_engine_model_file")]
    pub engine_model_file: PathBuf,

    /// Ground-truth `X Z Class` file used for supervised training
    #[serde(default = "default_true_positions_file")]
    pub true_positions_file: PathBuf,

    /// Bootstrap sub-clusters drawn per training cluster
    #[serde(default = "default_training_clusters_split_n")]
    pub training_clusters_split_n: usize,

    /// Inclusion probability of a point in a bootstrap sub-cluster
    #[serde(default = "default_training_clusters_split_f")]
    pub training_clusters_split_f: f32,

    /// Iteration cap of the k-means step
    #[serde(default = "default_max_kmeans_iterations")]
    pub max_kmeans_iterations: usize,
}

fn default_unsupervised() -> bool {
    true
}

fn default_n_layers_per_cluster() -> usize {
    5
}

fn default_engine_model_file() -> PathBuf {
    PathBuf::from("./outputs/engine_model.yaml")
}

fn default_true_positions_file() -> PathBuf {
    PathBuf::from("./share/point_cloud_true_positions.txt")
}

fn default_training_clusters_split_n() -> usize {
    300
}

fn default_training_clusters_split_f() -> f32 {
    0.25
}

fn default_max_kmeans_iterations() -> usize {
    1000
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            unsupervised: default_unsupervised(),
            n_layers_per_cluster: default_n_layers_per_cluster(),
            run_training: false,
            engine_model_file: default_engine_model_file(),
            true_positions_file: default_true_positions_file(),
            training_clusters_split_n: default_training_clusters_split_n(),
            training_clusters_split_f: default_training_clusters_split_f(),
            max_kmeans_iterations: default_max_kmeans_iterations(),
        }
    }
}

/// Optional result exports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV summary of the evaluation clusters
    #[serde(default)]
    pub clusters_csv: Option<PathBuf>,

    /// PLY file of core points coloured by class
    #[serde(default)]
    pub classified_ply: Option<PathBuf>,

    /// PNG scatter plot of core points in the field plane
    #[serde(default)]
    pub plot: Option<PathBuf>,
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub classification: ClassificationConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rejects parameter values the algorithms cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("evaluation_fraction", self.input.evaluation_fraction)?;
        check_fraction(
            "training_clusters_split_f",
            self.classification.training_clusters_split_f,
        )?;
        check_positive("pre_clustering_size", self.clustering.pre_clustering_size)?;
        check_positive("density_window", self.clustering.density_window)?;
        if !(self.clustering.cluster_core_size >= 0.0) {
            return Err(ConfigError::NotPositive {
                name: "cluster_core_size",
                value: self.clustering.cluster_core_size,
            });
        }
        if self.classification.n_layers_per_cluster == 0 {
            return Err(ConfigError::ZeroCount("n_layers_per_cluster"));
        }
        if self.classification.training_clusters_split_n == 0 {
            return Err(ConfigError::ZeroCount("training_clusters_split_n"));
        }
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { name, value })
    }
}

fn check_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}
