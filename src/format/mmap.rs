//! Memory-Mapped Binary Reader
//!
//! Indexes a binary vector file in one pass without decoding any float:
//! per record it keeps the word and the offset of its payload, then jumps
//! `dimensions * 4` bytes ahead to the next record.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{Error, Result};
use crate::model::{LazyVectorStore, Vocabulary};

use super::binary::decode_word;
use super::header::{read_token, Header};

/// Record locations found by scanning a mapped binary file
#[derive(Debug)]
pub struct RecordIndex {
    pub header: Header,
    pub vocab: Vocabulary,
    /// Payload start of each record, parallel to `vocab`
    pub offsets: Vec<usize>,
}

/// Map `path` and index its records.
///
/// The file must not be modified or truncated while the store is alive.
pub fn open(path: &Path, cache_vectors: bool) -> Result<LazyVectorStore> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(Error::corrupt("empty file"));
    }

    // SAFETY: the mapping is read-only and owned by the returned store; the
    // caller keeps the file unmodified for the store's lifetime.
    let mmap = unsafe { Mmap::map(&file)? };

    // on failure `mmap` drops here and the mapping is released
    let RecordIndex {
        header,
        vocab,
        offsets,
    } = index(&mmap)?;

    Ok(LazyVectorStore::new(
        header,
        vocab,
        offsets,
        mmap,
        cache_vectors,
    ))
}

/// Scan the records of a binary vector file held in memory
pub fn index(data: &[u8]) -> Result<RecordIndex> {
    let mut cursor = data;
    let header = Header::read(&mut cursor)?;
    let stride = header.vector_bytes();

    // a record needs at least a word byte, the separator and the payload
    let needed = header.vocab_size.checked_mul(stride.saturating_add(2));
    if needed.map_or(true, |needed| needed > cursor.len()) {
        return Err(Error::corrupt(format!(
            "header declares {} records of {} dimensions, file holds {} bytes",
            header.vocab_size,
            header.dimensions,
            data.len()
        )));
    }
    let mut vocab = Vocabulary::with_capacity(header.vocab_size);
    let mut offsets = Vec::with_capacity(header.vocab_size);
    let mut word = Vec::with_capacity(64);

    for i in 0..header.vocab_size {
        if !read_token(&mut cursor, &mut word)? {
            return Err(Error::corrupt(format!(
                "header declares {} records, found {}",
                header.vocab_size, i
            )));
        }

        let offset = data.len() - cursor.len();
        if cursor.len() < stride {
            return Err(Error::corrupt(format!(
                "unexpected end of file while reading vector of record {} ('{}')",
                i,
                String::from_utf8_lossy(&word)
            )));
        }
        cursor = &cursor[stride..];

        vocab
            .push(decode_word(&word))
            .map_err(|dup| Error::corrupt(format!("duplicate word '{}'", dup)))?;
        offsets.push(offset);
    }

    Ok(RecordIndex {
        header,
        vocab,
        offsets,
    })
}
