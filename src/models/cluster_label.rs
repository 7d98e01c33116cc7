use serde::{Deserialize, Serialize};
use std::fmt;

/// Cluster assignment for one coordinate.
///
/// Equal labels mean "same cluster"; the numeric value carries no other
/// meaning and may change between runs. [`ClusterLabel::NOISE`] marks points
/// a density-based method left unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabel(i64);

impl ClusterLabel {
    /// Sentinel label for points that belong to no cluster.
    pub const NOISE: ClusterLabel = ClusterLabel(-1);

    /// Creates a new cluster label.
    pub fn new(label: i64) -> Self {
        Self(label)
    }

    /// Returns the underlying label value.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Returns true for the noise sentinel.
    pub fn is_noise(self) -> bool {
        self == Self::NOISE
    }
}

impl From<usize> for ClusterLabel {
    fn from(index: usize) -> Self {
        Self(index as i64)
    }
}

impl From<Option<usize>> for ClusterLabel {
    fn from(index: Option<usize>) -> Self {
        index.map_or(Self::NOISE, Self::from)
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assignment_becomes_noise() {
        assert_eq!(ClusterLabel::from(None), ClusterLabel::NOISE);
        assert!(ClusterLabel::from(None).is_noise());
    }

    #[test]
    fn assigned_index_keeps_value() {
        let label = ClusterLabel::from(Some(3));
        assert_eq!(label.get(), 3);
        assert!(!label.is_noise());
    }

    #[test]
    fn noise_displays_as_minus_one() {
        assert_eq!(ClusterLabel::NOISE.to_string(), "-1");
    }
}
