//! Eager Vector Store
//!
//! All vectors decoded into one contiguous arena, indexed by vocabulary position.

use std::borrow::Cow;

use crate::error::{Error, Result};
use crate::format::Header;
use crate::similarity::magnitude;

use super::vocab::Vocabulary;
use super::VectorSource;

/// Upper bounds on what a header count may reserve before records arrive
const PREALLOC_WORDS: usize = 1 << 16;
const PREALLOC_FLOATS: usize = 1 << 22;

/// Fully materialized word-vector model
#[derive(Debug, Clone)]
pub struct VectorStore {
    header: Header,
    vocab: Vocabulary,
    /// `vocab.len() * dimensions` values, row-major
    data: Vec<f32>,
    /// Euclidean norm of each row
    norms: Vec<f32>,
}

impl VectorStore {
    /// Build a store from caller-supplied words and vectors.
    ///
    /// Words must be non-empty, free of whitespace and unique; every vector
    /// must have the length of the first one.
    pub fn from_parts(words: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if words.len() != vectors.len() {
            return Err(Error::invalid(format!(
                "{} words but {} vectors",
                words.len(),
                vectors.len()
            )));
        }
        let dimensions = vectors.first().map(Vec::len).unwrap_or(1);
        if dimensions == 0 {
            return Err(Error::invalid("vectors must not be empty"));
        }

        let mut vocab = Vocabulary::with_capacity(words.len());
        let mut data = Vec::with_capacity(words.len() * dimensions);
        for (word, vector) in words.into_iter().zip(vectors) {
            if word.is_empty() || word.chars().any(char::is_whitespace) {
                return Err(Error::invalid(format!("word '{}' is empty or contains whitespace", word)));
            }
            if vector.len() != dimensions {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                });
            }
            vocab
                .push(word)
                .map_err(|dup| Error::invalid(format!("duplicate word '{}'", dup)))?;
            data.extend_from_slice(&vector);
        }

        let header = Header::new(vocab.len(), dimensions);
        Ok(Self::from_raw(header, vocab, data))
    }

    pub(crate) fn from_raw(header: Header, vocab: Vocabulary, data: Vec<f32>) -> Self {
        debug_assert_eq!(header.vocab_size, vocab.len());
        debug_assert_eq!(data.len(), vocab.len() * header.dimensions);

        let norms = data.chunks_exact(header.dimensions).map(magnitude).collect();
        Self {
            header,
            vocab,
            data,
            norms,
        }
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn dimensions(&self) -> usize {
        self.header.dimensions
    }

    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Vector at `index`
    #[inline]
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        let dims = self.header.dimensions;
        let start = index.checked_mul(dims)?;
        self.data.get(start..start + dims)
    }

    /// Vector of `word`
    pub fn vector_for(&self, word: &str) -> Result<&[f32]> {
        self.vocab
            .get(word)
            .and_then(|idx| self.vector(idx))
            .ok_or_else(|| Error::WordNotFound(word.to_string()))
    }

    /// All vectors in vocabulary order
    pub fn vectors(&self) -> impl ExactSizeIterator<Item = &[f32]> {
        self.data.chunks_exact(self.header.dimensions)
    }

    /// The raw row-major arena
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

impl VectorSource for VectorStore {
    fn header(&self) -> Header {
        self.header
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn vector_at(&self, index: usize) -> Option<Cow<'_, [f32]>> {
        self.vector(index).map(Cow::Borrowed)
    }

    fn precomputed_norm(&self, index: usize) -> Option<f32> {
        self.norms.get(index).copied()
    }
}

/// Accumulates parsed records and checks them against the header
pub(crate) struct StoreBuilder {
    header: Header,
    vocab: Vocabulary,
    data: Vec<f32>,
}

impl StoreBuilder {
    pub(crate) fn new(header: Header) -> Self {
        let words = header.vocab_size.min(PREALLOC_WORDS);
        let floats = words.saturating_mul(header.dimensions).min(PREALLOC_FLOATS);
        Self {
            header,
            vocab: Vocabulary::with_capacity(words),
            data: Vec::with_capacity(floats),
        }
    }

    /// Add a record whose vector was parsed into `vector`
    pub(crate) fn push(&mut self, word: String, vector: &[f32]) -> Result<()> {
        if vector.len() != self.header.dimensions {
            return Err(Error::corrupt(format!(
                "record '{}' has {} values, expected {}",
                word,
                vector.len(),
                self.header.dimensions
            )));
        }
        self.push_word(word)?;
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// Add a record whose vector is still packed little-endian float32
    pub(crate) fn push_packed(&mut self, word: String, payload: &[u8]) -> Result<()> {
        debug_assert_eq!(payload.len(), self.header.vector_bytes());
        self.push_word(word)?;
        crate::format::binary::decode_into(payload, &mut self.data);
        Ok(())
    }

    fn push_word(&mut self, word: String) -> Result<()> {
        self.vocab
            .push(word)
            .map(|_| ())
            .map_err(|dup| Error::corrupt(format!("duplicate word '{}'", dup)))
    }

    pub(crate) fn finish(self) -> Result<VectorStore> {
        if self.vocab.len() != self.header.vocab_size {
            return Err(Error::corrupt(format!(
                "header declares {} records, found {}",
                self.header.vocab_size,
                self.vocab.len()
            )));
        }
        Ok(VectorStore::from_raw(self.header, self.vocab, self.data))
    }
}
