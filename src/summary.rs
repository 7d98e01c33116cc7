//! Per-cluster grouping and bounding boxes.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{ClusterLabel, Coordinate};

/// Errors raised while summarizing clusters.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("got {coordinates} coordinates but {labels} labels")]
    LengthMismatch { coordinates: usize, labels: usize },
}

/// Axis-aligned bounding box of one cluster's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterExtent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// Number of coordinates carrying the label.
    pub members: usize,
}

impl ClusterExtent {
    /// Extent of a single point: min and max coincide.
    pub fn from_point(point: Coordinate) -> Self {
        Self {
            min_x: point.x,
            min_y: point.y,
            max_x: point.x,
            max_y: point.y,
            members: 1,
        }
    }

    /// Grows the box to cover `point`.
    pub fn include(&mut self, point: Coordinate) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
        self.members += 1;
    }

    /// Returns true if `point` lies inside the box (edges included).
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_y..=self.max_y).contains(&point.y)
    }
}

/// Extent of every observed cluster label, ordered by label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSummary {
    extents: BTreeMap<ClusterLabel, ClusterExtent>,
}

impl ClusterSummary {
    /// Iterates (label, extent) pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (ClusterLabel, &ClusterExtent)> {
        self.extents.iter().map(|(label, extent)| (*label, extent))
    }

    pub fn get(&self, label: ClusterLabel) -> Option<&ClusterExtent> {
        self.extents.get(&label)
    }

    /// Number of distinct labels, noise included.
    pub fn len(&self) -> usize {
        self.extents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extents.is_empty()
    }

    /// Number of clusters, not counting the noise label.
    pub fn cluster_count(&self) -> usize {
        self.extents.keys().filter(|label| !label.is_noise()).count()
    }

    /// Number of points labelled as noise.
    pub fn noise_points(&self) -> usize {
        self.get(ClusterLabel::NOISE).map_or(0, |extent| extent.members)
    }
}

fn check_aligned(coords: &[Coordinate], labels: &[ClusterLabel]) -> Result<(), SummaryError> {
    if coords.len() != labels.len() {
        return Err(SummaryError::LengthMismatch {
            coordinates: coords.len(),
            labels: labels.len(),
        });
    }
    Ok(())
}

/// Groups coordinates by their label, keeping input order inside a group.
pub fn group_by_label(
    coords: &[Coordinate],
    labels: &[ClusterLabel],
) -> Result<BTreeMap<ClusterLabel, Vec<Coordinate>>, SummaryError> {
    check_aligned(coords, labels)?;

    let mut groups: BTreeMap<ClusterLabel, Vec<Coordinate>> = BTreeMap::new();
    for (&point, &label) in coords.iter().zip(labels) {
        groups.entry(label).or_default().push(point);
    }
    Ok(groups)
}

/// Computes the bounding box of every cluster label.
///
/// The result holds exactly one extent per distinct label and does not
/// depend on the order of the (coordinate, label) pairs.
///
/// # Examples
///
/// ```
/// use sealmap::{ClusterLabel, Coordinate, summary::summarize};
///
/// let coords = [Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 10.0)];
/// let labels = [ClusterLabel::new(0), ClusterLabel::new(0)];
///
/// let summary = summarize(&coords, &labels)?;
/// let extent = summary.get(ClusterLabel::new(0)).unwrap();
/// assert_eq!((extent.min_x, extent.min_y, extent.max_x, extent.max_y), (0.0, 0.0, 10.0, 10.0));
/// # Ok::<(), sealmap::summary::SummaryError>(())
/// ```
pub fn summarize(
    coords: &[Coordinate],
    labels: &[ClusterLabel],
) -> Result<ClusterSummary, SummaryError> {
    let extents = group_by_label(coords, labels)?
        .into_iter()
        .filter_map(|(label, points)| {
            let (&first, rest) = points.split_first()?;
            let mut extent = ClusterExtent::from_point(first);
            rest.iter().for_each(|&point| extent.include(point));
            Some((label, extent))
        })
        .collect();
    Ok(ClusterSummary { extents })
}
