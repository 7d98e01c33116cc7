use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a seal.
///
/// Wraps the `seal.id` column to keep seal ids from being mixed up with
/// row positions or cluster labels, which are also plain integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealId(i64);

impl SealId {
    /// Creates a new seal ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
