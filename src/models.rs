mod cluster_label;
mod coordinate;
mod ids;
mod seal;

pub use cluster_label::ClusterLabel;
pub use coordinate::Coordinate;
pub use ids::SealId;
pub use seal::TaggedSeal;
