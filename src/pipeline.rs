//! Orchestration of one layout run: store -> vectors -> 2-D -> clusters -> CSV.
//!
//! Stages run strictly one after another. Everything is computed before any
//! output file is opened, so store, reduction and clustering failures never
//! leave output files behind.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::clustering::ClusterMethod;
use crate::db::{Database, UntaggedPolicy};
use crate::encoder::{encode_all, feature_matrix};
use crate::error::{ConfigError, PipelineError};
use crate::reduction::ReductionMethod;
use crate::summary::{ClusterSummary, summarize};
use crate::utils::{clusters_path_for, resolve_output_path};
use crate::writer::{OutputError, PlacedSeal, write_clusters_file, write_seals_file};
use crate::{Coordinate, Vocabulary};

/// Options controlling how a layout is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    pub reduction: ReductionMethod,
    pub clustering: ClusterMethod,
    pub untagged: UntaggedPolicy,
}

/// Result of the computation stages, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Number of tag dimensions the seals were encoded against.
    pub vocabulary_size: usize,
    /// One entry per seal, in store enumeration order.
    pub seals: Vec<PlacedSeal>,
    pub summary: ClusterSummary,
}

impl Layout {
    /// Writes the per-seal file, then the cluster summary file.
    pub fn write(&self, seals_path: &Path, clusters_path: &Path) -> Result<(), OutputError> {
        write_seals_file(seals_path, &self.seals)?;
        write_clusters_file(clusters_path, &self.summary)?;
        Ok(())
    }
}

/// Service computing seal layouts from a store.
///
/// LayoutService owns the Database and runs the computation stages against
/// it. It does no file output of its own; see [`Layout::write`] and [`run`].
///
/// # Examples
///
/// ```
/// use sealmap::{Database, LayoutOptions, LayoutService, SealId};
///
/// # fn main() -> anyhow::Result<()> {
/// let db = Database::in_memory()?;
/// db.add_seal(SealId::new(1), &["lion", "crown"])?;
/// db.add_seal(SealId::new(2), &["eagle"])?;
/// db.add_seal(SealId::new(3), &["lion"])?;
///
/// let service = LayoutService::new(db);
/// let options = LayoutOptions {
///     reduction: "tsvd".parse()?,
///     ..Default::default()
/// };
/// let layout = service.compute_layout(&options)?;
/// assert_eq!(layout.seals.len(), 3);
/// # Ok(())
/// # }
/// ```
pub struct LayoutService {
    db: Database,
}

impl LayoutService {
    /// Creates a new LayoutService with the given database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Runs vocabulary, encoding, reduction, clustering and summary stages.
    ///
    /// Coordinates and labels stay aligned with the seals as enumerated by
    /// the store under `options.untagged`.
    pub fn compute_layout(&self, options: &LayoutOptions) -> Result<Layout, PipelineError> {
        info!("Creating feature vectors...");
        let vocabulary = Vocabulary::load(&self.db)?;
        let seals = self.db.tagged_seals(options.untagged)?;
        let encoded = encode_all(&vocabulary, &seals);
        let features = feature_matrix(&encoded, vocabulary.len());
        info!(
            seals = encoded.len(),
            dimensions = vocabulary.len(),
            "encoded feature vectors"
        );

        info!(method = %options.reduction, "Reducing dimensions...");
        let coords = options
            .reduction
            .reduce(&features)
            .map_err(|source| PipelineError::Reduction {
                method: options.reduction,
                source,
            })?;

        info!(method = %options.clustering, "Clustering...");
        let labels = options
            .clustering
            .assign(&coords)
            .map_err(|source| PipelineError::Clustering {
                method: options.clustering,
                source,
            })?;

        let positions: Vec<Coordinate> = coords
            .rows()
            .into_iter()
            .map(|row| Coordinate::new(row[0], row[1]))
            .collect();
        let summary = summarize(&positions, &labels)?;
        info!(
            clusters = summary.cluster_count(),
            noise = summary.noise_points(),
            "summarized clusters"
        );

        let seals = encoded
            .iter()
            .zip(positions)
            .zip(labels)
            .map(|((seal, position), cluster)| PlacedSeal {
                id: seal.id,
                cluster,
                position,
            })
            .collect();

        Ok(Layout {
            vocabulary_size: vocabulary.len(),
            seals,
            summary,
        })
    }
}

/// Everything a run needs: store location, output paths and strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub store: PathBuf,
    pub seals_out: PathBuf,
    pub clusters_out: PathBuf,
    pub options: LayoutOptions,
}

impl PipelineConfig {
    /// Creates a config with default strategies.
    ///
    /// The cluster summary goes next to `seals_out` with a `cluster_` prefix.
    pub fn new(store: impl Into<PathBuf>, seals_out: impl Into<PathBuf>) -> Self {
        let seals_out = seals_out.into();
        Self {
            store: store.into(),
            clusters_out: clusters_path_for(&seals_out),
            seals_out,
            options: LayoutOptions::default(),
        }
    }

    /// Creates a config from strategy names as given on the command line.
    ///
    /// Unknown names are rejected here, before anything touches the store.
    pub fn from_names(
        store: impl Into<PathBuf>,
        seals_out: impl Into<PathBuf>,
        reduction: &str,
        clustering: &str,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::new(store, seals_out);
        config.options.reduction = reduction.parse()?;
        config.options.clustering = clustering.parse()?;
        Ok(config)
    }

    pub fn with_clusters_out(mut self, path: impl Into<PathBuf>) -> Self {
        self.clusters_out = path.into();
        self
    }

    pub fn with_untagged(mut self, policy: UntaggedPolicy) -> Self {
        self.options.untagged = policy;
        self
    }

    /// Checks the parts of the config that do not need the store.
    ///
    /// Output paths are compared after resolution, so `out.csv` and
    /// `./out.csv` count as the same file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if resolve_output_path(&self.seals_out) == resolve_output_path(&self.clusters_out) {
            return Err(ConfigError::OutputCollision(self.seals_out.clone()));
        }
        Ok(())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub seals: usize,
    pub vocabulary_size: usize,
    pub clusters: usize,
    pub noise_points: usize,
    pub reduction: ReductionMethod,
    pub clustering: ClusterMethod,
    pub untagged: UntaggedPolicy,
    pub seals_path: PathBuf,
    pub clusters_path: PathBuf,
}

/// Runs the whole pipeline described by `config`.
///
/// Either both output files are fully written or an error is returned.
pub fn run(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    config.validate()?;

    let service = LayoutService::new(Database::open(&config.store)?);
    let layout = service.compute_layout(&config.options)?;

    info!("Writing results...");
    layout.write(&config.seals_out, &config.clusters_out)?;

    Ok(PipelineReport {
        seals: layout.seals.len(),
        vocabulary_size: layout.vocabulary_size,
        clusters: layout.summary.cluster_count(),
        noise_points: layout.summary.noise_points(),
        reduction: config.options.reduction,
        clustering: config.options.clustering,
        untagged: config.options.untagged,
        seals_path: config.seals_out.clone(),
        clusters_path: config.clusters_out.clone(),
    })
}

#[cfg(test)]
mod tests;
