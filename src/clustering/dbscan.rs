use linfa::prelude::*;
use linfa_clustering::Dbscan;
use ndarray::Array2;

use super::{ClusterError, Clusterer};
use crate::ClusterLabel;

/// Neighbourhood radius.
const EPSILON: f64 = 0.5;

/// Points (including the point itself) needed inside the radius to form a core.
const MIN_POINTS: usize = 5;

/// Density-based clustering; points outside any dense region are labelled
/// [`ClusterLabel::NOISE`].
#[derive(Debug, Clone)]
pub struct DbscanClusterer {
    min_points: usize,
    tolerance: f64,
}

impl DbscanClusterer {
    pub fn new(min_points: usize, tolerance: f64) -> Self {
        Self {
            min_points,
            tolerance,
        }
    }
}

impl Default for DbscanClusterer {
    fn default() -> Self {
        Self::new(MIN_POINTS, EPSILON)
    }
}

impl Clusterer for DbscanClusterer {
    fn assign(&self, coords: &Array2<f64>) -> Result<Vec<ClusterLabel>, ClusterError> {
        let assignments = Dbscan::params(self.min_points)
            .tolerance(self.tolerance)
            .transform(coords)
            .map_err(|e| ClusterError::Algorithm(format!("invalid DBSCAN parameters: {e}")))?;

        Ok(assignments.iter().map(|&id| ClusterLabel::from(id)).collect())
    }
}
