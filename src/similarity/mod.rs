//! Similarity Module
//!
//! Cosine-similarity math and the nearest-neighbor engine.

mod engine;
mod math;
mod topk;

pub use engine::{Neighbor, SimilarityEngine};
pub use math::{add_assign, cosine_similarity, cosine_with_norms, dot_product, magnitude, sub_assign};
