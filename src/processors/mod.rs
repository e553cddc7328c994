//! Data processing modules.

pub mod classification;
pub mod clustering;
pub mod kmeans;
pub mod mva;
pub mod pca;

// Re-export key types for convenience
pub use classification::{ClassificationAlg, ClassificationError};
pub use clustering::{
    cleanup_clusters, compute_densities, run_clustering, run_pre_clustering,
    run_seeded_clustering, ClusteringError,
};
pub use kmeans::{kmeans, KmeansError, KmeansResult};
pub use mva::{MvaEngine, NearestCentroidEngine, TruthPositions};
pub use pca::{Pca, PcaError};
