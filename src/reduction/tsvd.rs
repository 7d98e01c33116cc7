use ndarray::Array2;

use super::{OUTPUT_DIMENSIONS, ReductionError, Reducer, require_linear_rank, top_eigenpairs};

/// Truncated SVD without centering.
///
/// Projects each row onto the two leading right singular vectors of the
/// feature matrix, i.e. the top eigenvectors of `XᵀX`. Working on the
/// V x V Gram matrix keeps the cost tied to vocabulary size, not seal count.
pub struct TsvdReducer;

impl Reducer for TsvdReducer {
    fn reduce(&self, features: &Array2<f64>) -> Result<Array2<f64>, ReductionError> {
        require_linear_rank(features)?;

        let gram = features.t().dot(features);
        let (_, components) = top_eigenpairs(&gram, OUTPUT_DIMENSIONS)?;
        Ok(features.dot(&components))
    }
}
