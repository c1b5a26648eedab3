//! Model Module
//!
//! Loaded word-vector models: the ordered vocabulary, the eager and
//! memory-mapped stores, and the `Model` handle returned by the loader.

mod lazy;
mod store;
mod vocab;

pub use lazy::LazyVectorStore;
pub use store::VectorStore;
pub(crate) use store::StoreBuilder;
pub use vocab::Vocabulary;

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::format::{binary, text, Format, Header};
use crate::similarity::{Neighbor, SimilarityEngine};

/// Read access shared by eager and lazy stores
///
/// The similarity engine is generic over this trait.
pub trait VectorSource: Send + Sync {
    fn header(&self) -> Header;

    fn vocabulary(&self) -> &Vocabulary;

    /// Vector at `index`, borrowed when the store holds it decoded
    fn vector_at(&self, index: usize) -> Option<Cow<'_, [f32]>>;

    /// Norm of the vector at `index` if the store keeps one
    fn precomputed_norm(&self, _index: usize) -> Option<f32> {
        None
    }

    fn vector_for(&self, word: &str) -> Result<Cow<'_, [f32]>> {
        self.vocabulary()
            .get(word)
            .and_then(|idx| self.vector_at(idx))
            .ok_or_else(|| Error::WordNotFound(word.to_string()))
    }

    fn len(&self) -> usize {
        self.vocabulary().len()
    }

    fn is_empty(&self) -> bool {
        self.vocabulary().is_empty()
    }

    fn dimensions(&self) -> usize {
        self.header().dimensions
    }
}

/// Iterator over the vectors of a source in vocabulary order
pub struct Vectors<'a, S: VectorSource + ?Sized> {
    source: &'a S,
    next: usize,
    end: usize,
}

impl<'a, S: VectorSource + ?Sized> Vectors<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            next: 0,
            end: source.len(),
        }
    }
}

impl<'a, S: VectorSource + ?Sized> Iterator for Vectors<'a, S> {
    type Item = Cow<'a, [f32]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let source = self.source;
        let item = source.vector_at(self.next);
        self.next += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<S: VectorSource + ?Sized> ExactSizeIterator for Vectors<'_, S> {}

/// A loaded model, eager or memory mapped
#[derive(Debug)]
pub enum Model {
    Eager(VectorStore),
    Lazy(LazyVectorStore),
}

impl Model {
    fn source(&self) -> &dyn VectorSource {
        match self {
            Model::Eager(store) => store,
            Model::Lazy(store) => store,
        }
    }

    pub fn header(&self) -> Header {
        self.source().header()
    }

    /// Words in file order
    pub fn vocab(&self) -> &[String] {
        self.source().vocabulary().words()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.source().vocabulary()
    }

    /// Vectors parallel to `vocab()`; a lazy model decodes while iterating
    pub fn vectors(&self) -> Vectors<'_, Self> {
        Vectors::new(self)
    }

    pub fn vector_for(&self, word: &str) -> Result<Cow<'_, [f32]>> {
        match self {
            Model::Eager(store) => store.vector_for(word).map(Cow::Borrowed),
            Model::Lazy(store) => store.vector_for(word),
        }
    }

    pub fn len(&self) -> usize {
        self.source().len()
    }

    pub fn is_empty(&self) -> bool {
        self.source().is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.header().dimensions
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Model::Lazy(_))
    }

    /// Convert into an eager store, decoding every vector of a lazy model
    pub fn to_eager(self) -> VectorStore {
        match self {
            Model::Eager(store) => store,
            Model::Lazy(store) => store.to_eager(),
        }
    }

    /// Closest words to `query` by cosine similarity, skipping `exclude`
    pub fn nearest(&self, query: &[f32], k: usize, exclude: &[&str]) -> Result<Vec<Neighbor>> {
        SimilarityEngine::default().nearest(self, query, k, exclude)
    }

    /// Closest words to `word`, never including `word` itself
    pub fn nearest_to_word(&self, word: &str, k: usize) -> Result<Vec<Neighbor>> {
        SimilarityEngine::default().nearest_to_word(self, word, k)
    }

    /// Closest words to `sum(positive) - sum(negative)`, excluding the inputs
    pub fn analogy(&self, positive: &[&str], negative: &[&str], k: usize) -> Result<Vec<Neighbor>> {
        SimilarityEngine::default().analogy(self, positive, negative, k)
    }

    /// Write the model to `path` in `format`.
    ///
    /// `MemoryMapped` writes the binary layout, which is what it maps.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: Format) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, format)?;
        writer.flush()?;
        info!(path = %path.display(), %format, words = self.len(), "Saved model");
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W, format: Format) -> Result<()> {
        match format {
            Format::Binary | Format::MemoryMapped => binary::write(self, writer),
            Format::Text => text::write(self, writer),
        }
    }
}

impl VectorSource for Model {
    fn header(&self) -> Header {
        self.source().header()
    }

    fn vocabulary(&self) -> &Vocabulary {
        self.source().vocabulary()
    }

    fn vector_at(&self, index: usize) -> Option<Cow<'_, [f32]>> {
        self.source().vector_at(index)
    }

    fn precomputed_norm(&self, index: usize) -> Option<f32> {
        self.source().precomputed_norm(index)
    }
}

impl From<VectorStore> for Model {
    fn from(store: VectorStore) -> Self {
        Model::Eager(store)
    }
}

impl From<LazyVectorStore> for Model {
    fn from(store: LazyVectorStore) -> Self {
        Model::Lazy(store)
    }
}
