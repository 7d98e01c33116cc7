//! Top-level error taxonomy of a layout run.

use std::path::PathBuf;

use thiserror::Error;

use crate::clustering::{ClusterError, ClusterMethod};
use crate::db::StoreError;
use crate::reduction::{ReductionError, ReductionMethod};
use crate::summary::SummaryError;
use crate::writer::OutputError;

/// Invalid run configuration, detected before the store is opened.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown reduction method `{0}` (expected one of: pca, tsne, tsvd, isomap)")]
    UnknownReduction(String),

    #[error("unknown clustering method `{0}` (expected one of: kmeans, dbscan)")]
    UnknownClustering(String),

    #[error("per-seal and cluster outputs both point at {}", .0.display())]
    OutputCollision(PathBuf),
}

/// Any failure that aborts a run.
///
/// There is no partial success: when this is returned, neither output
/// file should be treated as valid.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read seal store: {0}")]
    Store(#[from] StoreError),

    #[error("{method} reduction failed: {source}")]
    Reduction {
        method: ReductionMethod,
        #[source]
        source: ReductionError,
    },

    #[error("{method} clustering failed: {source}")]
    Clustering {
        method: ClusterMethod,
        #[source]
        source: ClusterError,
    },

    #[error("failed to summarize clusters: {0}")]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl PipelineError {
    /// Returns true for configuration errors (bad method names or paths).
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
