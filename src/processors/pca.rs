//! Principal component analysis over fixed-length feature vectors.
//!
//! Features are standardized (mean-centred and divided by their standard
//! deviation) before the covariance matrix is diagonalized, so the
//! components are those of the correlation matrix.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use thiserror::Error;

/// Errors raised while fitting or applying a PCA.
#[derive(Error, Debug, PartialEq)]
pub enum PcaError {
    #[error("PCA needs at least one sample")]
    NoSamples,

    #[error("Feature vector has {found} values, PCA expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Result type for PCA operations.
pub type Result<T> = std::result::Result<T, PcaError>;

/// A fitted principal component transform.
#[derive(Debug, Clone)]
pub struct Pca {
    mean: DVector<f64>,
    scale: DVector<f64>,
    /// Eigenvectors as columns, ordered by descending eigenvalue.
    components: DMatrix<f64>,
    eigenvalues: Vec<f64>,
}

impl Pca {
    /// Fit the transform to a set of samples of equal length.
    ///
    /// # Errors
    ///
    /// [`PcaError::NoSamples`] for an empty or zero-width sample set,
    /// [`PcaError::DimensionMismatch`] when sample lengths differ.
    pub fn fit(samples: &[Vec<f64>]) -> Result<Self> {
        let dim = samples.first().map_or(0, Vec::len);
        if dim == 0 {
            return Err(PcaError::NoSamples);
        }
        if let Some(bad) = samples.iter().find(|s| s.len() != dim) {
            return Err(PcaError::DimensionMismatch {
                expected: dim,
                found: bad.len(),
            });
        }

        let n = samples.len() as f64;
        let mut mean = DVector::<f64>::zeros(dim);
        for s in samples {
            mean += DVector::from_column_slice(s);
        }
        mean /= n;

        let mut variance = DVector::<f64>::zeros(dim);
        for s in samples {
            let d = DVector::from_column_slice(s) - &mean;
            variance += d.component_mul(&d);
        }
        variance /= n;
        let scale = variance.map(|v| {
            let sd = v.sqrt();
            if sd > 0.0 {
                sd
            } else {
                1.0
            }
        });

        let mut covariance = DMatrix::<f64>::zeros(dim, dim);
        for s in samples {
            let z = (DVector::from_column_slice(s) - &mean).component_div(&scale);
            covariance += &z * z.transpose();
        }
        covariance /= n;

        let eigen = SymmetricEigen::new(covariance);
        let mut order: Vec<usize> = (0..dim).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let columns: Vec<DVector<f64>> = order
            .iter()
            .map(|&i| eigen.eigenvectors.column(i).into_owned())
            .collect();
        let components = DMatrix::from_columns(&columns);
        let eigenvalues = order.iter().map(|&i| eigen.eigenvalues[i]).collect();

        Ok(Self {
            mean,
            scale,
            components,
            eigenvalues,
        })
    }

    /// Number of input features.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Variances along the components, largest first.
    #[inline]
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Coordinates of `features` along every component.
    pub fn project(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.dimension() {
            return Err(PcaError::DimensionMismatch {
                expected: self.dimension(),
                found: features.len(),
            });
        }
        let z = (DVector::from_column_slice(features) - &self.mean).component_div(&self.scale);
        Ok((self.components.transpose() * z).iter().copied().collect())
    }

    /// Coordinates along the `n` leading components, zero-padded when the
    /// transform has fewer.
    pub fn project_leading(&self, features: &[f64], n: usize) -> Result<Vec<f64>> {
        let mut projected = self.project(features)?;
        projected.resize(n, 0.0);
        Ok(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_samples() -> Vec<Vec<f64>> {
        (0..20)
            .map(|i| {
                let t = i as f64;
                let wobble = if i % 2 == 0 { 0.05 } else { -0.05 };
                vec![t, 2.0 * t + wobble, 7.0]
            })
            .collect()
    }

    #[test]
    fn test_eigenvalues_descending() {
        let pca = Pca::fit(&line_samples()).unwrap();
        let ev = pca.eigenvalues();
        assert_eq!(ev.len(), 3);
        assert!(ev[0] >= ev[1] && ev[1] >= ev[2]);
        // two perfectly correlated standardized features
        assert!(ev[0] > 1.9);
    }

    #[test]
    fn test_constant_feature_does_not_produce_nan() {
        let pca = Pca::fit(&line_samples()).unwrap();
        let projected = pca.project(&[3.0, 6.0, 7.0]).unwrap();
        assert!(projected.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_mean_projects_to_origin() {
        let samples = line_samples();
        let pca = Pca::fit(&samples).unwrap();
        let n = samples.len() as f64;
        let mean: Vec<f64> = (0..3)
            .map(|k| samples.iter().map(|s| s[k]).sum::<f64>() / n)
            .collect();
        for v in pca.project(&mean).unwrap() {
            assert_relative_eq!(v, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_leading_component_separates_groups() {
        let mut samples = Vec::new();
        for i in 0..10 {
            let e = i as f64 * 0.01;
            samples.push(vec![200.0 + e, 10.0 - e, 10.0]);
            samples.push(vec![10.0 - e, 200.0 + e, 12.0]);
        }
        let pca = Pca::fit(&samples).unwrap();
        let a = pca.project_leading(&samples[0], 3).unwrap();
        let b = pca.project_leading(&samples[1], 3).unwrap();
        assert_eq!(a.len(), 3);
        assert!((a[0] - b[0]).abs() > 1.0);
    }

    #[test]
    fn test_project_leading_pads() {
        let pca = Pca::fit(&[vec![1.0], vec![3.0]]).unwrap();
        let projected = pca.project_leading(&[2.0], 3).unwrap();
        assert_eq!(projected.len(), 3);
        assert_relative_eq!(projected[0], 0.0, epsilon = 1e-12);
        assert_eq!(&projected[1..], &[0.0, 0.0]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(Pca::fit(&[]).unwrap_err(), PcaError::NoSamples);
        assert_eq!(
            Pca::fit(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err(),
            PcaError::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
        let pca = Pca::fit(&line_samples()).unwrap();
        assert!(matches!(
            pca.project(&[1.0]),
            Err(PcaError::DimensionMismatch { .. })
        ));
    }
}
