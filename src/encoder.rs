//! Binary tag-membership encoding of seals.

use ndarray::Array2;

use crate::{SealId, TaggedSeal, Vocabulary};

/// Dense 0/1 vector with one element per vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureVector(Vec<u8>);

impl FeatureVector {
    /// Returns the raw 0/1 elements.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if dimension `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.0.get(index).is_some_and(|&bit| bit == 1)
    }
}

/// A seal id paired with its feature vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSeal {
    pub id: SealId,
    pub vector: FeatureVector,
}

/// Encodes one seal against the vocabulary.
///
/// Element `i` is 1 iff the seal carries `vocabulary.names()[i]`. Tags the
/// vocabulary does not know are ignored.
///
/// # Examples
///
/// ```
/// use sealmap::{SealId, TaggedSeal, Vocabulary, encoder::encode};
///
/// let vocab = Vocabulary::from_names(["a", "b", "c"]);
/// let seal = TaggedSeal::new(SealId::new(1), ["a", "c", "zzz"]);
/// assert_eq!(encode(&vocab, &seal).as_slice(), &[1, 0, 1]);
/// ```
pub fn encode(vocabulary: &Vocabulary, seal: &TaggedSeal) -> FeatureVector {
    let mut bits = vec![0u8; vocabulary.len()];
    for index in seal.tags().filter_map(|name| vocabulary.index_of(name)) {
        bits[index] = 1;
    }
    FeatureVector(bits)
}

/// Encodes every seal, keeping input order and ids.
pub fn encode_all(vocabulary: &Vocabulary, seals: &[TaggedSeal]) -> Vec<EncodedSeal> {
    seals
        .iter()
        .map(|seal| EncodedSeal {
            id: seal.id(),
            vector: encode(vocabulary, seal),
        })
        .collect()
}

/// Stacks encoded seals into an N x V matrix, one row per seal.
///
/// `width` is the vocabulary size; it fixes the column count even when
/// there are no rows.
pub fn feature_matrix(encoded: &[EncodedSeal], width: usize) -> Array2<f64> {
    Array2::from_shape_fn((encoded.len(), width), |(row, col)| {
        if encoded[row].vector.is_set(col) {
            1.0
        } else {
            0.0
        }
    })
}
