//! CSV output of the seal layout and the cluster summary.
//!
//! Both files are written in one pass and replace any previous content.
//! Numbers use fixed-point notation with six decimals.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::summary::ClusterSummary;
use crate::utils::ensure_parent_directory;
use crate::{ClusterLabel, Coordinate, SealId};

/// Header of the per-seal file.
pub const SEALS_HEADER: &str = "id,cluster,x,y";

/// Header of the cluster summary file.
pub const CLUSTERS_HEADER: &str = "cluster,min_x,min_y,max_x,max_y";

/// Failure to write one of the output files.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct OutputError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// One row of the per-seal output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedSeal {
    pub id: SealId,
    pub cluster: ClusterLabel,
    pub position: Coordinate,
}

/// Writes the per-seal rows in the given order, header first.
pub fn write_seals<W: Write>(mut out: W, seals: &[PlacedSeal]) -> io::Result<()> {
    writeln!(out, "{SEALS_HEADER}")?;
    for seal in seals {
        writeln!(
            out,
            "{},{},{:.6},{:.6}",
            seal.id, seal.cluster, seal.position.x, seal.position.y
        )?;
    }
    out.flush()
}

/// Writes one summary row per cluster label, header first.
pub fn write_clusters<W: Write>(mut out: W, summary: &ClusterSummary) -> io::Result<()> {
    writeln!(out, "{CLUSTERS_HEADER}")?;
    for (label, extent) in summary.iter() {
        writeln!(
            out,
            "{},{:.6},{:.6},{:.6},{:.6}",
            label, extent.min_x, extent.min_y, extent.max_x, extent.max_y
        )?;
    }
    out.flush()
}

/// Creates (or truncates) `path` and writes it through a buffered writer.
///
/// The file handle is released when this returns, on success or failure.
fn write_file<F>(path: &Path, write: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let wrap = |source| OutputError {
        path: path.to_path_buf(),
        source,
    };

    ensure_parent_directory(path).map_err(wrap)?;
    let file = File::create(path).map_err(wrap)?;
    let mut out = BufWriter::new(file);
    write(&mut out).map_err(wrap)?;

    debug!(path = %path.display(), "wrote output file");
    Ok(())
}

/// Writes the per-seal file at `path`.
pub fn write_seals_file(path: &Path, seals: &[PlacedSeal]) -> Result<(), OutputError> {
    write_file(path, |out| write_seals(out, seals))
}

/// Writes the cluster summary file at `path`.
pub fn write_clusters_file(path: &Path, summary: &ClusterSummary) -> Result<(), OutputError> {
    write_file(path, |out| write_clusters(out, summary))
}
