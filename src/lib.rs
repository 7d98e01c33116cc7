pub mod clustering;
pub mod db;
pub mod encoder;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod reduction;
pub mod summary;
pub mod utils;
pub mod vocabulary;
pub mod writer;

pub use clustering::ClusterMethod;
pub use db::{Database, StoreError, UntaggedPolicy};
pub use error::{ConfigError, PipelineError};
pub use models::{ClusterLabel, Coordinate, SealId, TaggedSeal};
pub use pipeline::{Layout, LayoutOptions, LayoutService, PipelineConfig, PipelineReport, run};
pub use reduction::ReductionMethod;
pub use vocabulary::Vocabulary;
