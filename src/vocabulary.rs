//! Fixed, ordered set of tag names used as feature dimensions.
//!
//! Storage order of tag rows is not guaranteed, so names are sorted once
//! when the vocabulary is built. Every feature vector of a run is indexed
//! against that single ordering.

use std::collections::HashMap;

use crate::db::{Database, StoreError};

/// Ordered, duplicate-free list of tag names plus a name to index lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Builds a vocabulary from arbitrary tag names.
    ///
    /// Names are sorted lexicographically and duplicates collapse to one
    /// entry, so the result does not depend on input order.
    ///
    /// # Examples
    ///
    /// ```
    /// use sealmap::Vocabulary;
    ///
    /// let vocab = Vocabulary::from_names(["c", "a", "b", "a"]);
    /// assert_eq!(vocab.names(), &["a", "b", "c"]);
    /// assert_eq!(vocab.index_of("b"), Some(1));
    /// ```
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Self { names, index }
    }

    /// Reads every tag name from the store.
    ///
    /// An empty `tag` relation yields an empty vocabulary.
    pub fn load(db: &Database) -> Result<Self, StoreError> {
        Ok(Self::from_names(db.tag_names()?))
    }

    /// Returns the position of `name`, if it is part of the vocabulary.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the tag names in dimension order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
