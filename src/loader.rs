//! Model Loading
//!
//! Entry points that resolve a kind, run the matching parser and hand back a
//! [`Model`]. Failures are reported once; nothing is retried.

use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::LoadOptions;
use crate::error::{Error, Result};
use crate::format::{binary, mmap, text, Format, LoadKind};
use crate::model::Model;

/// Load a vector file.
///
/// `kind` is one of `"auto"`, `"bin"`, `"txt"` or `"mmap"`; `"auto"` picks the
/// parser from the extension (`.bin`, `.txt`).
pub fn load<P: AsRef<Path>>(path: P, kind: &str) -> Result<Model> {
    let kind = kind.parse::<LoadKind>()?;
    load_with(path, &LoadOptions::default().with_kind(kind))
}

/// Load a vector file with explicit options
pub fn load_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Model> {
    let path = path.as_ref();
    let format = options.kind.resolve(path)?;
    let start = Instant::now();

    let result = match format {
        Format::Binary => binary::load(path).map(Model::Eager),
        Format::Text => text::load(path).map(Model::Eager),
        Format::MemoryMapped => mmap::open(path, options.cache_vectors).map(Model::Lazy),
    };

    match &result {
        Ok(model) => info!(
            path = %path.display(),
            %format,
            words = model.len(),
            dimensions = model.dimensions(),
            elapsed = ?start.elapsed(),
            "Loaded model"
        ),
        Err(e) => warn!(path = %path.display(), %format, error = %e, "Failed to load model"),
    }
    result
}

/// Document-vector models are not supported; always fails without touching `path`.
pub fn load_document_vectors<P: AsRef<Path>>(_path: P) -> Result<Model> {
    Err(Error::NotImplemented("document vectors"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Header;
    use crate::model::{VectorSource, VectorStore};
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    /// Deterministic 10-dimensional model with more than 3000 words and a
    /// planted king/queen/man/woman structure.
    fn trained_store(words: usize) -> VectorStore {
        let mut state: u32 = 0x9E37_79B9;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32) * 2.0 - 1.0
        };

        let mut names: Vec<String> = vec!["king".into(), "queen".into(), "man".into(), "woman".into()];
        let mut vectors: Vec<Vec<f32>> = vec![
            vec![5.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![5.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        for i in names.len()..words {
            names.push(format!("word{}", i));
            vectors.push((0..10).map(|_| next()).collect());
        }
        VectorStore::from_parts(names, vectors).unwrap()
    }

    fn fixtures() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let model = Model::from(trained_store(3_200));
        let bin = dir.path().join("vectors.bin");
        let txt = dir.path().join("vectors.txt");
        model.save(&bin, Format::Binary).unwrap();
        model.save(&txt, Format::Text).unwrap();
        (dir, bin, txt)
    }

    #[test]
    fn test_load_auto_known_extension() {
        let (_dir, bin, txt) = fixtures();
        for path in [bin, txt] {
            let model = load(&path, "auto").unwrap();
            assert_eq!(model.vectors().len(), model.vocab().len());
            assert!(model.vectors().len() > 3000);
            assert_eq!(model.vectors().next().unwrap().len(), 10);
        }
    }

    #[test]
    fn test_load_explicit_kinds() {
        let (_dir, bin, txt) = fixtures();
        for (path, kind) in [(&bin, "bin"), (&txt, "txt"), (&bin, "mmap")] {
            let model = load(path, kind).unwrap();
            assert_eq!(model.vectors().len(), model.vocab().len());
            assert!(model.len() > 3000);
            assert_eq!(model.header(), Header::new(3_200, 10));
            assert!(model.vectors().all(|v| v.len() == 10));
            assert_eq!(model.is_lazy(), kind == "mmap");
        }
    }

    #[test]
    fn test_unknown_kind() {
        let (_dir, bin, _) = fixtures();
        let err = load(&bin, "unknown").unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().starts_with("Unknown kind"));
    }

    #[test]
    fn test_unknown_extension() {
        let err = load("vectors.unknown", "auto").unwrap_err();
        assert!(matches!(err, Error::FormatUnknown { .. }));
        assert!(err.to_string().starts_with("Could not identify kind"));
    }

    #[test]
    fn test_missing_file_is_io() {
        let dir = tempdir().unwrap();
        let err = load(dir.path().join("absent.bin"), "auto").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_mmap_only_when_requested() {
        let (_dir, bin, _) = fixtures();
        assert!(!load(&bin, "auto").unwrap().is_lazy());
        assert!(load(&bin, "mmap").unwrap().is_lazy());
    }

    #[test]
    fn test_binary_round_trip_bit_identical() {
        let (dir, bin, _) = fixtures();
        let first = load(&bin, "bin").unwrap();
        let copy = dir.path().join("copy.bin");
        first.save(&copy, Format::Binary).unwrap();
        let second = load(&copy, "bin").unwrap();

        assert_eq!(first.vocab(), second.vocab());
        for (a, b) in first.vectors().zip(second.vectors()) {
            let a: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
            let b: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
            assert_eq!(a, b);
        }
        assert_eq!(std::fs::read(&bin).unwrap(), std::fs::read(&copy).unwrap());
    }

    #[test]
    fn test_text_export_matches_binary() {
        let (_dir, bin, txt) = fixtures();
        let from_bin = load(&bin, "bin").unwrap();
        let from_txt = load(&txt, "txt").unwrap();

        assert_eq!(from_bin.vocab(), from_txt.vocab());
        assert!(from_bin.vectors().eq(from_txt.vectors()));
    }

    #[test]
    fn test_lazy_matches_eager_per_index() {
        let (_dir, bin, _) = fixtures();
        let eager = load(&bin, "bin").unwrap();
        let options = LoadOptions::default()
            .with_kind(LoadKind::MemoryMapped)
            .with_cache(true);
        let lazy = load_with(&bin, &options).unwrap();

        for i in 0..eager.len() {
            assert_eq!(eager.vector_at(i), lazy.vector_at(i));
        }
        for word in ["king", "word3100"] {
            assert_eq!(eager.vector_for(word).unwrap(), lazy.vector_for(word).unwrap());
        }
    }

    #[test]
    fn test_analogy_scenario() {
        let (_dir, bin, _) = fixtures();
        for kind in ["bin", "mmap"] {
            let model = load(&bin, kind).unwrap();
            let result = model.analogy(&["king", "woman"], &["man"], 1).unwrap();
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].word, "queen");
        }
    }

    #[test]
    fn test_nearest_properties() {
        let (_dir, bin, _) = fixtures();
        let model = load(&bin, "bin").unwrap();

        let result = model.nearest_to_word("word42", 15).unwrap();
        assert_eq!(result.len(), 15);
        assert!(result.iter().all(|n| n.word != "word42"));
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));

        let query = model.vector_for("word42").unwrap().into_owned();
        let all = model.nearest(&query, usize::MAX, &["word42", "king"]).unwrap();
        assert_eq!(all.len(), model.len() - 2);
    }

    #[test]
    fn test_corrupt_files() {
        let dir = tempdir().unwrap();
        let bin = dir.path().join("bad.bin");
        std::fs::write(&bin, b"2 4\nabc \x00\x00").unwrap();
        assert!(matches!(load(&bin, "auto"), Err(Error::CorruptFile { .. })));
        assert!(matches!(load(&bin, "mmap"), Err(Error::CorruptFile { .. })));

        let txt = dir.path().join("bad.txt");
        std::fs::write(&txt, "1 2\nabc 1.0\n").unwrap();
        assert!(matches!(load(&txt, "auto"), Err(Error::CorruptFile { .. })));
    }

    #[test]
    fn test_document_vectors_not_implemented() {
        for path in ["vectors.bin", "vectors.txt"] {
            assert!(matches!(
                load_document_vectors(path),
                Err(Error::NotImplemented(_))
            ));
        }
    }

    #[test]
    fn test_concurrent_queries() {
        let (_dir, bin, _) = fixtures();
        let model = std::sync::Arc::new(load(&bin, "mmap").unwrap());
        let expected = model.nearest_to_word("king", 5).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let model = std::sync::Arc::clone(&model);
                std::thread::spawn(move || model.nearest_to_word("king", 5).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
