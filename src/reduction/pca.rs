use linfa::DatasetBase;
use linfa::prelude::*;
use linfa_reduction::Pca;
use ndarray::Array2;

use super::{
    OUTPUT_DIMENSIONS, ReductionError, Reducer, distinct_rows, pad_to_output, require_linear_rank,
};

/// Principal component analysis on mean-centered feature vectors.
///
/// When the centered data spans fewer than two directions (for example two
/// groups of identical seals), the missing components are zero, so every
/// point gets a `0.0` in that column.
pub struct PcaReducer;

impl Reducer for PcaReducer {
    fn reduce(&self, features: &Array2<f64>) -> Result<Array2<f64>, ReductionError> {
        require_linear_rank(features)?;
        if distinct_rows(features) < 2 {
            return Ok(Array2::zeros((features.nrows(), OUTPUT_DIMENSIONS)));
        }

        let dataset = DatasetBase::from(features.clone());
        let model = Pca::params(OUTPUT_DIMENSIONS).fit(&dataset)?;
        let coords: Array2<f64> = model.predict(features);
        Ok(pad_to_output(coords))
    }
}
