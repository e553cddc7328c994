//! Writers for classified cluster results.
//!
//! This module exports the clusters of a [`DataSet`] to:
//! - CSV with one summary row per cluster
//! - ASCII PLY with the core points of every cluster coloured by class

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::cluster::Cluster;
use super::dataset::DataSet;

/// Class colours, indexed by class id.
pub const CLASS_COLORS: &[[u8; 3]] = &[
    [228, 26, 28],   // Red
    [55, 126, 184],  // Blue
    [77, 175, 74],   // Green
    [152, 78, 163],  // Purple
    [255, 127, 0],   // Orange
    [166, 86, 40],   // Brown
];

/// Colour of unclassified clusters.
pub const UNCLASSIFIED_COLOR: [u8; 3] = [128, 128, 128];

/// Palette colour of a class id.
pub fn class_color(class_id: Option<usize>) -> [u8; 3] {
    match class_id {
        Some(id) => CLASS_COLORS[id % CLASS_COLORS.len()],
        None => UNCLASSIFIED_COLOR,
    }
}

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Creates a buffered writer for the given path.
fn create_buffered_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Name of a class id, `unclassified` when unset or out of range.
fn class_label(class_id: Option<usize>, class_names: &[String]) -> &str {
    class_id
        .and_then(|id| class_names.get(id))
        .map_or("unclassified", String::as_str)
}

/// The core when present, the cluster itself otherwise.
fn core_or_self(cluster: &Cluster) -> &Cluster {
    cluster.core().unwrap_or(cluster)
}

/// Write one summary row per cluster to CSV.
///
/// Columns are `cluster,class,x,z,points,core_points,density`, where
/// `x`/`z` are the planar centre of mass of the cluster core.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `ds` - Data set whose final clusters are written
/// * `class_names` - Names indexed by class id
///
/// # Errors
///
/// Returns an error if:
/// - Parent directories cannot be created
/// - File cannot be created or written to
pub fn write_clusters_csv(path: &Path, ds: &DataSet, class_names: &[String]) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut csv_writer = csv::Writer::from_writer(create_buffered_writer(path)?);
    let path_str = path.display().to_string();
    let csv_err = |e| WriteError::CsvError {
        path: path_str.clone(),
        source: e,
    };

    csv_writer
        .write_record(["cluster", "class", "x", "z", "points", "core_points", "density"])
        .map_err(csv_err)?;

    for (i, cluster) in ds.clusters().iter().enumerate() {
        let core = core_or_self(cluster);
        let com = core.com();
        csv_writer
            .write_record(&[
                i.to_string(),
                class_label(cluster.class_id(), class_names).to_string(),
                format!("{:.6}", com.x),
                format!("{:.6}", com.z),
                cluster.len().to_string(),
                core.len().to_string(),
                format!("{:.6}", cluster.density()),
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    })?;

    Ok(())
}

/// Write the core points of every cluster to an ASCII PLY file, coloured
/// by the class of their cluster.
///
/// # Errors
///
/// Returns an error if the file or its parent directories cannot be
/// created or written to.
pub fn write_classified_ply(path: &Path, ds: &DataSet) -> Result<()> {
    ensure_parent_dirs(path)?;
    let mut writer = create_buffered_writer(path)?;
    let path_str = path.display().to_string();
    let write_err = |e| WriteError::WriteFile {
        path: path_str.clone(),
        source: e,
    };

    let num_points: usize = ds.clusters().iter().map(|cl| core_or_self(cl).len()).sum();

    writeln!(writer, "ply").map_err(write_err)?;
    writeln!(writer, "format ascii 1.0").map_err(write_err)?;
    writeln!(writer, "element vertex {}", num_points).map_err(write_err)?;
    for property in [
        "float x",
        "float y",
        "float z",
        "uchar red",
        "uchar green",
        "uchar blue",
    ] {
        writeln!(writer, "property {}", property).map_err(write_err)?;
    }
    writeln!(writer, "end_header").map_err(write_err)?;

    for cluster in ds.clusters() {
        let [r, g, b] = class_color(cluster.class_id());
        for p in core_or_self(cluster).points() {
            writeln!(
                writer,
                "{:.6} {:.6} {:.6} {} {} {}",
                p.x(),
                p.y(),
                p.z(),
                r,
                g,
                b
            )
            .map_err(write_err)?;
        }
    }

    writer.flush().map_err(write_err)?;

    Ok(())
}
