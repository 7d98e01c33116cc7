//! Dimensionality reduction from feature vectors to 2-D coordinates.
//!
//! Each [`ReductionMethod`] is bound to one [`Reducer`] implementation.
//! Method names only exist as strings at the configuration boundary
//! ([`std::str::FromStr`]); everything past that dispatches on the enum.
//!
//! # Supported Methods
//!
//! - **pca**: centered principal components
//! - **tsne**: Barnes-Hut t-SNE (stochastic)
//! - **tsvd**: uncentered truncated SVD
//! - **isomap**: geodesic distances on a k-NN graph, embedded with classical MDS

mod isomap;
mod pca;
mod tsne;
mod tsvd;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use linfa_linalg::eigh::Eigh;
use ndarray::{Array2, Axis, s};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::ConfigError;

pub use isomap::IsomapReducer;
pub use pca::PcaReducer;
pub use tsne::TsneReducer;
pub use tsvd::TsvdReducer;

/// Number of output dimensions every reducer produces.
pub const OUTPUT_DIMENSIONS: usize = 2;

/// Errors raised by a reduction strategy.
#[derive(Debug, Error)]
pub enum ReductionError {
    /// The vocabulary was empty, so every vector has length 0.
    #[error("feature vectors have zero width (no tags in the store)")]
    ZeroWidth,

    /// Fewer input dimensions than the method can project from.
    #[error("needs at least {required} tag dimensions, got {found}")]
    InsufficientDimensions { required: usize, found: usize },

    /// Fewer seals than the method can work with.
    #[error("needs at least {required} seals, got {found}")]
    InsufficientSamples { required: usize, found: usize },

    /// The underlying algorithm produced NaN or infinite coordinates.
    #[error("produced non-finite coordinates")]
    NonFinite,

    /// The underlying algorithm returned the wrong number of rows or columns.
    #[error("produced a {rows}x{cols} result, expected {expected_rows}x2")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
    },

    #[error(transparent)]
    Pca(#[from] linfa_reduction::ReductionError),

    #[error(transparent)]
    Tsne(#[from] linfa_tsne::TSneError),

    #[error("linear algebra failure: {0}")]
    Linalg(#[from] linfa_linalg::LinalgError),
}

/// Common interface for reduction strategies.
///
/// `features` is an N x V matrix with one row per seal; implementations
/// return an N x 2 matrix whose rows are aligned with the input rows.
/// Callers guarantee N >= 1 and V >= 1.
pub trait Reducer {
    fn reduce(&self, features: &Array2<f64>) -> Result<Array2<f64>, ReductionError>;
}

/// Named reduction strategies selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReductionMethod {
    #[default]
    Pca,
    Tsne,
    Tsvd,
    Isomap,
}

impl ReductionMethod {
    /// Every method, in the order they are listed to users.
    pub const ALL: [ReductionMethod; 4] = [Self::Pca, Self::Tsne, Self::Tsvd, Self::Isomap];

    /// Name used on the command line and in reports.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pca => "pca",
            Self::Tsne => "tsne",
            Self::Tsvd => "tsvd",
            Self::Isomap => "isomap",
        }
    }

    /// Returns the implementation bound to this method.
    pub fn reducer(self) -> Box<dyn Reducer> {
        match self {
            Self::Pca => Box::new(PcaReducer),
            Self::Tsne => Box::new(TsneReducer),
            Self::Tsvd => Box::new(TsvdReducer),
            Self::Isomap => Box::new(IsomapReducer),
        }
    }

    /// Reduces `features` to one 2-D coordinate per row.
    ///
    /// An empty input yields an empty 0x2 output for every method. A
    /// zero-width input (no vocabulary) is rejected rather than embedded.
    /// The result is checked for shape and finiteness before it is returned.
    pub fn reduce(self, features: &Array2<f64>) -> Result<Array2<f64>, ReductionError> {
        let (rows, width) = features.dim();
        if rows == 0 {
            return Ok(Array2::zeros((0, OUTPUT_DIMENSIONS)));
        }
        if width == 0 {
            return Err(ReductionError::ZeroWidth);
        }

        debug!(method = self.name(), rows, width, "reducing feature matrix");
        let coords = self.reducer().reduce(features)?;

        if coords.dim() != (rows, OUTPUT_DIMENSIONS) {
            return Err(ReductionError::ShapeMismatch {
                rows: coords.nrows(),
                cols: coords.ncols(),
                expected_rows: rows,
            });
        }
        if coords.iter().any(|value| !value.is_finite()) {
            return Err(ReductionError::NonFinite);
        }
        Ok(coords)
    }
}

impl fmt::Display for ReductionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReductionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| ConfigError::UnknownReduction(s.to_string()))
    }
}

/// Rejects matrices a linear projection onto two components cannot handle.
fn require_linear_rank(features: &Array2<f64>) -> Result<(), ReductionError> {
    let (rows, width) = features.dim();
    if width < OUTPUT_DIMENSIONS {
        return Err(ReductionError::InsufficientDimensions {
            required: OUTPUT_DIMENSIONS,
            found: width,
        });
    }
    if rows < OUTPUT_DIMENSIONS {
        return Err(ReductionError::InsufficientSamples {
            required: OUTPUT_DIMENSIONS,
            found: rows,
        });
    }
    Ok(())
}

/// Counts the distinct rows of `features`, comparing values bit for bit.
fn distinct_rows(features: &Array2<f64>) -> usize {
    features
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| v.to_bits()).collect::<Vec<u64>>())
        .collect::<HashSet<_>>()
        .len()
}

/// Appends zero columns until `coords` has [`OUTPUT_DIMENSIONS`] columns.
///
/// Used when the input spans fewer directions than there are outputs.
fn pad_to_output(coords: Array2<f64>) -> Array2<f64> {
    let missing = OUTPUT_DIMENSIONS.saturating_sub(coords.ncols());
    if missing == 0 {
        return coords;
    }
    let mut padded = Array2::zeros((coords.nrows(), OUTPUT_DIMENSIONS));
    padded.slice_mut(s![.., ..coords.ncols()]).assign(&coords);
    padded
}

/// Returns the `count` largest eigenpairs of a symmetric matrix.
///
/// Eigenvalues come back in descending order with their eigenvectors as
/// columns. Each eigenvector's sign is fixed so that its largest-magnitude
/// entry is positive, which keeps repeated runs on the same data identical.
fn top_eigenpairs(
    symmetric: &Array2<f64>,
    count: usize,
) -> Result<(Vec<f64>, Array2<f64>), ReductionError> {
    let (values, vectors) = symmetric.eigh()?;

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order.truncate(count);

    let mut top = vectors.select(Axis(1), &order);
    for mut column in top.columns_mut() {
        let pivot = column
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            column.mapv_inplace(|v| -v);
        }
    }

    Ok((order.iter().map(|&i| values[i]).collect(), top))
}
