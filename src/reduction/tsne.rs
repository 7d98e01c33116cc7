use linfa::ParamGuard;
use linfa::traits::Transformer;
use linfa_tsne::TSneParams;
use ndarray::Array2;

use super::{OUTPUT_DIMENSIONS, ReductionError, Reducer, distinct_rows};

const MAX_PERPLEXITY: usize = 30;
const APPROX_THRESHOLD: f64 = 0.5;
const MAX_ITERATIONS: usize = 1000;

/// Perplexity needs `3 * perplexity <= N - 1` with perplexity >= 1.
const MIN_SAMPLES: usize = 4;

/// Barnes-Hut t-SNE embedding.
///
/// Stochastic: two runs on the same data may place points differently.
/// Input whose rows are all identical has no neighbourhood structure to
/// embed and collapses to the origin.
pub struct TsneReducer;

impl TsneReducer {
    /// Perplexity used for `samples` points, capped so small inputs stay valid.
    pub fn perplexity_for(samples: usize) -> f64 {
        (samples.saturating_sub(1) / 3).clamp(1, MAX_PERPLEXITY) as f64
    }
}

impl Reducer for TsneReducer {
    fn reduce(&self, features: &Array2<f64>) -> Result<Array2<f64>, ReductionError> {
        let samples = features.nrows();
        if samples < MIN_SAMPLES {
            return Err(ReductionError::InsufficientSamples {
                required: MIN_SAMPLES,
                found: samples,
            });
        }

        if distinct_rows(features) < 2 {
            return Ok(Array2::zeros((samples, OUTPUT_DIMENSIONS)));
        }

        let params = TSneParams::embedding_size(OUTPUT_DIMENSIONS)
            .perplexity(Self::perplexity_for(samples))
            .approx_threshold(APPROX_THRESHOLD)
            .max_iter(MAX_ITERATIONS)
            .check()?;

        Ok(params.transform(features.clone())?)
    }
}
