use std::collections::HashSet;

use linfa::DatasetBase;
use linfa::prelude::*;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};

use super::{ClusterError, Clusterer};
use crate::ClusterLabel;

const DEFAULT_CLUSTERS: usize = 8;
const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;

/// K-Means partitioning; every point is assigned to a cluster.
///
/// The cluster count is capped by the number of distinct points so that
/// seeding never has to pick two centroids at the same location.
#[derive(Debug, Clone)]
pub struct KMeansClusterer {
    n_clusters: usize,
}

impl KMeansClusterer {
    /// Creates a clusterer that aims for `n_clusters` groups.
    pub fn new(n_clusters: usize) -> Self {
        Self { n_clusters }
    }

    fn effective_clusters(&self, coords: &Array2<f64>) -> usize {
        let distinct: HashSet<(u64, u64)> = coords
            .rows()
            .into_iter()
            .map(|row| (row[0].to_bits(), row[1].to_bits()))
            .collect();
        self.n_clusters.min(distinct.len()).max(1)
    }
}

impl Default for KMeansClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTERS)
    }
}

impl Clusterer for KMeansClusterer {
    fn assign(&self, coords: &Array2<f64>) -> Result<Vec<ClusterLabel>, ClusterError> {
        let n_clusters = self.effective_clusters(coords);
        if n_clusters == 1 {
            return Ok(vec![ClusterLabel::new(0); coords.nrows()]);
        }

        let dataset = DatasetBase::from(coords.clone());
        let model = KMeans::params(n_clusters)
            .max_n_iterations(MAX_ITERATIONS)
            .tolerance(TOLERANCE)
            .fit(&dataset)
            .map_err(|e| {
                ClusterError::Algorithm(format!(
                    "failed to split {} points into {} clusters: {}",
                    coords.nrows(),
                    n_clusters,
                    e
                ))
            })?;

        let mut assignments = Array1::<usize>::zeros(coords.nrows());
        model.predict_inplace(coords, &mut assignments);

        Ok(assignments.iter().map(|&label| ClusterLabel::from(label)).collect())
    }
}
