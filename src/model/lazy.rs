//! Lazy Vector Store
//!
//! Memory-mapped binary model: the vocabulary and one payload offset per
//! record are indexed at load time; vectors are decoded on access.

use std::borrow::Cow;
use std::sync::OnceLock;

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::binary::decode_into;
use crate::format::Header;

use super::store::VectorStore;
use super::vocab::Vocabulary;
use super::VectorSource;

/// File-backed word-vector model
///
/// Decoding is idempotent and needs only shared access to the mapping, so
/// concurrent readers never block each other. Vectors are recomputed on
/// every access unless the store was opened with the decode cache, in which
/// case each vector is decoded at most once and kept until the store drops.
pub struct LazyVectorStore {
    header: Header,
    vocab: Vocabulary,
    /// Start of each record's float payload within `mmap`
    offsets: Vec<usize>,
    cache: Option<Box<[OnceLock<Box<[f32]>>]>>,
    mmap: Mmap,
}

impl LazyVectorStore {
    /// Every offset must leave `header.vector_bytes()` bytes in `mmap`.
    pub(crate) fn new(
        header: Header,
        vocab: Vocabulary,
        offsets: Vec<usize>,
        mmap: Mmap,
        cache_vectors: bool,
    ) -> Self {
        debug_assert_eq!(vocab.len(), offsets.len());
        debug_assert!(offsets
            .iter()
            .all(|&off| off + header.vector_bytes() <= mmap.len()));

        let cache = cache_vectors.then(|| (0..offsets.len()).map(|_| OnceLock::new()).collect());
        Self {
            header,
            vocab,
            offsets,
            cache,
            mmap,
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

    /// Whether decoded vectors are retained
    pub fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Number of vectors currently held by the decode cache
    pub fn cached_len(&self) -> usize {
        self.cache
            .as_ref()
            .map(|c| c.iter().filter(|slot| slot.get().is_some()).count())
            .unwrap_or(0)
    }

    /// Byte offset of the float payload of record `index`
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Decode the vector at `index`
    pub fn vector(&self, index: usize) -> Option<Cow<'_, [f32]>> {
        let offset = *self.offsets.get(index)?;
        match &self.cache {
            Some(cache) => {
                let slot = cache[index].get_or_init(|| self.decode(offset).into_boxed_slice());
                Some(Cow::Borrowed(&slot[..]))
            }
            None => Some(Cow::Owned(self.decode(offset))),
        }
    }

    /// Decode the vector of `word`
    pub fn vector_for(&self, word: &str) -> Result<Cow<'_, [f32]>> {
        self.vocab
            .get(word)
            .and_then(|idx| self.vector(idx))
            .ok_or_else(|| Error::WordNotFound(word.to_string()))
    }

    /// Decode every vector into an eager store
    pub fn to_eager(&self) -> VectorStore {
        let mut data = Vec::with_capacity(self.len() * self.header.dimensions);
        for &offset in &self.offsets {
            decode_into(self.payload(offset), &mut data);
        }
        VectorStore::from_raw(self.header, self.vocab.clone(), data)
    }

    fn decode(&self, offset: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.header.dimensions);
        decode_into(self.payload(offset), &mut out);
        out
    }

    #[inline]
    fn payload(&self, offset: usize) -> &[u8] {
        &self.mmap[offset..offset + self.header.vector_bytes()]
    }
}

impl VectorSource for LazyVectorStore {
    fn header(&self) -> Header {
        self.header
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    fn vector_at(&self, index: usize) -> Option<Cow<'_, [f32]>> {
        self.vector(index)
    }
}

impl std::fmt::Debug for LazyVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyVectorStore")
            .field("header", &self.header)
            .field("mapped_bytes", &self.mmap.len())
            .field("caching", &self.cache.is_some())
            .finish()
    }
}

impl Drop for LazyVectorStore {
    fn drop(&mut self) {
        debug!(
            mapped_bytes = self.mmap.len(),
            cached = self.cached_len(),
            "Releasing memory-mapped model"
        );
    }
}
