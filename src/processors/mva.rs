//! Supervised multivariate classification of colour profiles.
//!
//! [`MvaEngine`] is the seam between the classification driver and a
//! concrete learner. The crate ships [`NearestCentroidEngine`], a
//! per-class mean classifier whose state is stored as YAML.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::point::Point;

/// Errors raised when persisting an engine.
#[derive(Error, Debug)]
pub enum MvaError {
    #[error("Failed to access engine model {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid engine model {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Engine was not trained on any sample")]
    Untrained,

    #[error("Feature vector has {found} entries, engine expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, MvaError>;

/// A trainable classifier over fixed-length feature vectors.
pub trait MvaEngine {
    /// Feed one labelled training sample.
    fn train(&mut self, features: &[f64], label: &str) -> Result<()>;

    /// Called once after the last training sample.
    fn finish_training(&mut self) {}

    /// One score per entry of [`MvaEngine::classes`], higher is more likely.
    fn evaluate(&self, features: &[f64]) -> Result<Vec<f64>>;

    /// Class names in score order.
    fn classes(&self) -> &[String];
}

/// Known player positions grouped by class name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TruthPositions {
    by_class: BTreeMap<String, Vec<Point>>,
}

impl TruthPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: &str, position: Point) {
        self.by_class
            .entry(class_name.to_string())
            .or_default()
            .push(position);
    }

    pub fn is_empty(&self) -> bool {
        self.by_class.is_empty()
    }

    /// Class names in lexical order.
    pub fn class_names(&self) -> Vec<String> {
        self.by_class.keys().cloned().collect()
    }

    pub fn positions(&self, class_name: &str) -> Option<&[Point]> {
        self.by_class.get(class_name).map(Vec::as_slice)
    }

    /// Class of the truth position nearest to `position` in the (x, z) plane.
    pub fn nearest_class(&self, position: &Point) -> Option<&str> {
        let mut best: Option<(&str, f32)> = None;
        for (name, positions) in &self.by_class {
            for p in positions {
                let dist = p.dist_2d_sq(position);
                if best.is_none_or(|(_, d)| dist < d) {
                    best = Some((name.as_str(), dist));
                }
            }
        }
        best.map(|(name, _)| name)
    }
}

/// Classifies a sample by its distance to the per-class mean of the
/// training samples.
///
/// The score of a class is the negated squared Euclidean distance to its
/// centroid; classes without samples score negative infinity. The feature
/// length is fixed by the first training sample and stored with the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearestCentroidEngine {
    classes: Vec<String>,
    #[serde(default)]
    dimension: Option<usize>,
    centroids: Vec<Vec<f64>>,
    #[serde(skip)]
    sums: Vec<Vec<f64>>,
    #[serde(skip)]
    counts: Vec<usize>,
}

impl NearestCentroidEngine {
    /// Engine with a fixed initial class order; unseen labels are appended.
    pub fn new(classes: Vec<String>) -> Self {
        let n = classes.len();
        Self {
            classes,
            dimension: None,
            centroids: vec![Vec::new(); n],
            sums: vec![Vec::new(); n],
            counts: vec![0; n],
        }
    }

    fn class_index(&mut self, label: &str) -> usize {
        if let Some(i) = self.classes.iter().position(|c| c == label) {
            return i;
        }
        self.classes.push(label.to_string());
        self.centroids.push(Vec::new());
        self.sums.push(Vec::new());
        self.counts.push(0);
        self.classes.len() - 1
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Feature length the engine was trained on, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    fn check_dimension(&self, features: &[f64]) -> Result<()> {
        match self.dimension {
            Some(expected) if expected != features.len() => Err(MvaError::DimensionMismatch {
                expected,
                found: features.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Write the trained centroids to a YAML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if self.centroids.iter().all(Vec::is_empty) {
            return Err(MvaError::Untrained);
        }
        let io_err = |source| MvaError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let writer = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_yaml::to_writer(writer, self).map_err(|source| MvaError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read centroids written by [`NearestCentroidEngine::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| MvaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut engine: Self =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| MvaError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        let n = engine.classes.len();
        engine.centroids.resize(n, Vec::new());
        if engine.dimension.is_none() {
            engine.dimension = engine.centroids.iter().find(|c| !c.is_empty()).map(Vec::len);
        }
        if let Some(centroid) = engine
            .centroids
            .iter()
            .find(|c| !c.is_empty() && Some(c.len()) != engine.dimension)
        {
            return Err(MvaError::DimensionMismatch {
                expected: engine.dimension.unwrap_or_default(),
                found: centroid.len(),
            });
        }
        engine.sums = vec![Vec::new(); n];
        engine.counts = vec![0; n];
        debug!("Loaded engine with classes {:?}", engine.classes);
        Ok(engine)
    }
}

impl MvaEngine for NearestCentroidEngine {
    fn train(&mut self, features: &[f64], label: &str) -> Result<()> {
        self.check_dimension(features)?;
        self.dimension = Some(features.len());
        let i = self.class_index(label);
        let sum = &mut self.sums[i];
        if sum.is_empty() {
            sum.resize(features.len(), 0.0);
        }
        for (s, f) in sum.iter_mut().zip(features) {
            *s += f;
        }
        self.counts[i] += 1;
        Ok(())
    }

    fn finish_training(&mut self) {
        for ((centroid, sum), &count) in self.centroids.iter_mut().zip(&self.sums).zip(&self.counts)
        {
            if count > 0 {
                *centroid = sum.iter().map(|s| s / count as f64).collect();
            }
        }
    }

    fn evaluate(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.check_dimension(features)?;
        Ok(self
            .centroids
            .iter()
            .map(|centroid| {
                if centroid.is_empty() {
                    return f64::NEG_INFINITY;
                }
                -centroid
                    .iter()
                    .zip(features)
                    .map(|(c, f)| (c - f) * (c - f))
                    .sum::<f64>()
            })
            .collect())
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }
}
