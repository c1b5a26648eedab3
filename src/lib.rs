//! WORDVEC - Word-Vector Model Loader and Similarity Engine
//!
//! Loads pre-trained word2vec-style vector files (packed binary or
//! whitespace-delimited text, optionally memory mapped) and answers
//! vector lookups, nearest-neighbor and analogy queries over them.

pub mod config;
pub mod error;
pub mod format;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod similarity;

pub use config::{LoadOptions, SearchConfig};
pub use error::{Error, Result};
pub use format::{detect, Format, Header, LoadKind};
pub use loader::{load, load_document_vectors, load_with};
pub use metrics::Metrics;
pub use model::{LazyVectorStore, Model, VectorSource, VectorStore, Vocabulary};
pub use similarity::{cosine_similarity, Neighbor, SimilarityEngine};
