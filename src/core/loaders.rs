//! Data loaders for point cloud and ground-truth text files.
//!
//! This module provides parsers for:
//! - Point files with one `X Y Z R G B` point per line
//! - Ground-truth files with one `X Z ClassName` player position per line

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;
use rand::Rng;
use thiserror::Error;

use super::context::RunContext;
use super::dataset::{Bounds, DataSet};
use super::point::{CloudPoint, Point, Rgb};
use crate::processors::mva::TruthPositions;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Parse error at {path}:{line}: {message}")]
    ParseError {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid colour at {path}:{line}: {point}")]
    InvalidColor {
        path: PathBuf,
        line: usize,
        point: String,
    },

    #[error("Ground-truth file not found: {0}")]
    MissingTruthFile(PathBuf),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| LoaderError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufReader::new(file))
}

fn parse_field<T: std::str::FromStr>(
    value: &str,
    name: &str,
    path: &Path,
    line: usize,
) -> Result<T> {
    value.parse().map_err(|_| LoaderError::ParseError {
        path: path.to_path_buf(),
        line,
        message: format!("invalid {} value: {}", name, value),
    })
}

/// Parse one `X Y Z R G B` line into a cloud point.
fn parse_point_line(
    text: &str,
    path: &Path,
    line: usize,
    ctx: &mut RunContext,
) -> Result<CloudPoint> {
    let values: Vec<&str> = text.split_whitespace().collect();
    if values.len() != 6 {
        return Err(LoaderError::ParseError {
            path: path.to_path_buf(),
            line,
            message: format!("expected 6 columns (X Y Z R G B), found {}", values.len()),
        });
    }

    let x: f32 = parse_field(values[0], "x", path, line)?;
    let y: f32 = parse_field(values[1], "y", path, line)?;
    let z: f32 = parse_field(values[2], "z", path, line)?;
    let r: i32 = parse_field(values[3], "r", path, line)?;
    let g: i32 = parse_field(values[4], "g", path, line)?;
    let b: i32 = parse_field(values[5], "b", path, line)?;

    Ok(CloudPoint::new(
        Point::new(x, y, z),
        Rgb::new(r, g, b),
        &mut ctx.ids,
    ))
}

/// Load a point file and split it into training and evaluation data sets.
///
/// Each valid point goes to the evaluation set when a uniform draw falls
/// below `evaluation_fraction`, to the training set otherwise. Both sets
/// carry the bounds of the whole file.
///
/// # Errors
///
/// Any unreadable, malformed or out-of-range row aborts the whole load, as
/// does a file without points. No partial data set is returned.
pub fn read_point_file<P: AsRef<Path>>(
    path: P,
    evaluation_fraction: f32,
    ctx: &mut RunContext,
) -> Result<(DataSet, DataSet)> {
    let path = path.as_ref();
    let reader = open(path)?;

    let mut training = Vec::new();
    let mut evaluation = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let text = line.map_err(|e| LoaderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if text.trim().is_empty() {
            continue;
        }

        let point = parse_point_line(&text, path, line_no, ctx)?;
        if !point.is_valid() {
            return Err(LoaderError::InvalidColor {
                path: path.to_path_buf(),
                line: line_no,
                point: point.to_string(),
            });
        }

        if ctx.rng.random::<f32>() < evaluation_fraction {
            evaluation.push(point);
        } else {
            training.push(point);
        }
    }

    if training.is_empty() && evaluation.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    let bounds = Bounds::from_points(training.iter().chain(evaluation.iter()));
    info!(
        "{}: {} training and {} evaluation points",
        path.display(),
        training.len(),
        evaluation.len()
    );

    Ok((
        DataSet::with_bounds(training, bounds),
        DataSet::with_bounds(evaluation, bounds),
    ))
}

/// Load ground-truth player positions from an `X Z ClassName` file.
///
/// # Errors
///
/// A missing file is reported as [`LoaderError::MissingTruthFile`]; a line
/// that does not hold two numbers and a name is a parse error.
pub fn read_true_positions<P: AsRef<Path>>(path: P) -> Result<TruthPositions> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoaderError::MissingTruthFile(path.to_path_buf()));
    }
    let reader = open(path)?;

    let mut truth = TruthPositions::new();
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let text = line.map_err(|e| LoaderError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let values: Vec<&str> = text.split_whitespace().collect();
        if values.is_empty() {
            continue;
        }
        if values.len() != 3 {
            return Err(LoaderError::ParseError {
                path: path.to_path_buf(),
                line: line_no,
                message: format!("expected 3 columns (X Z Class), found {}", values.len()),
            });
        }

        let x: f32 = parse_field(values[0], "x", path, line_no)?;
        let z: f32 = parse_field(values[1], "z", path, line_no)?;
        truth.insert(values[2], Point::new(x, 0.0, z));
    }

    Ok(truth)
}
