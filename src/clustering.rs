//! Cluster assignment over reduced 2-D coordinates.
//!
//! # Supported Algorithms
//!
//! - **kmeans**: centroid-based partitioning, every point gets a cluster
//! - **dbscan**: density-based clustering, sparse points are labelled noise

mod dbscan;
mod kmeans;

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::ClusterLabel;
use crate::error::ConfigError;
use crate::reduction::OUTPUT_DIMENSIONS;

pub use dbscan::DbscanClusterer;
pub use kmeans::KMeansClusterer;

/// Errors raised by a clustering strategy.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Input rows are not 2-D coordinates.
    #[error("expected {expected}-column coordinates, got {found} columns")]
    DimensionMismatch { expected: usize, found: usize },

    /// The strategy returned a label count that does not match the input.
    #[error("produced {labels} labels for {points} points")]
    LabelCountMismatch { points: usize, labels: usize },

    /// The underlying algorithm rejected the input or its parameters.
    #[error("{0}")]
    Algorithm(String),
}

/// Common interface for clustering strategies (one label per point).
///
/// Callers guarantee a non-empty N x 2 matrix.
pub trait Clusterer {
    fn assign(&self, coords: &Array2<f64>) -> Result<Vec<ClusterLabel>, ClusterError>;
}

/// Named clustering strategies selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMethod {
    #[default]
    KMeans,
    Dbscan,
}

impl ClusterMethod {
    /// Every method, in the order they are listed to users.
    pub const ALL: [ClusterMethod; 2] = [Self::KMeans, Self::Dbscan];

    /// Name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::KMeans => "kmeans",
            Self::Dbscan => "dbscan",
        }
    }

    /// Returns the implementation bound to this method.
    pub fn clusterer(self) -> Box<dyn Clusterer> {
        match self {
            Self::KMeans => Box::new(KMeansClusterer::default()),
            Self::Dbscan => Box::new(DbscanClusterer::default()),
        }
    }

    /// Returns true if this method can leave points unassigned.
    pub fn has_noise(self) -> bool {
        matches!(self, Self::Dbscan)
    }

    /// Assigns a cluster label to every coordinate, aligned with the rows.
    ///
    /// No coordinates means no labels.
    pub fn assign(self, coords: &Array2<f64>) -> Result<Vec<ClusterLabel>, ClusterError> {
        let (points, columns) = coords.dim();
        if columns != OUTPUT_DIMENSIONS {
            return Err(ClusterError::DimensionMismatch {
                expected: OUTPUT_DIMENSIONS,
                found: columns,
            });
        }
        if points == 0 {
            return Ok(Vec::new());
        }

        debug!(method = self.name(), points, "clustering coordinates");
        let labels = self.clusterer().assign(coords)?;

        if labels.len() != points {
            return Err(ClusterError::LabelCountMismatch {
                points,
                labels: labels.len(),
            });
        }
        Ok(labels)
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClusterMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| ConfigError::UnknownClustering(s.to_string()))
    }
}
