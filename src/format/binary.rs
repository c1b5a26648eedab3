//! Binary Vector Format
//!
//! ```text
//! "<vocab_size> <dimensions>\n"
//! repeated vocab_size times:
//!   <word> ' ' <dimensions x f32 little-endian> '\n'
//! ```
//!
//! Leading whitespace before a word is skipped, so records without the
//! trailing newline are read as well.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};
use crate::model::{StoreBuilder, VectorSource, VectorStore};

use super::header::{read_token, Header};

/// Read buffer used when loading from a path
pub(crate) const READ_BUFFER_SIZE: usize = 1 << 20;

/// Load a binary vector file
pub fn load(path: &Path) -> Result<VectorStore> {
    let file = File::open(path)?;
    read(&mut BufReader::with_capacity(READ_BUFFER_SIZE, file))
}

/// Parse a binary vector stream positioned at its header
pub fn read<R: BufRead + ?Sized>(reader: &mut R) -> Result<VectorStore> {
    let header = Header::read(reader)?;
    let mut builder = StoreBuilder::new(header);
    let mut word = Vec::with_capacity(64);
    let mut payload = Vec::new();

    for i in 0..header.vocab_size {
        if !read_token(reader, &mut word)? {
            return Err(Error::corrupt(format!(
                "header declares {} records, found {}",
                header.vocab_size, i
            )));
        }
        read_payload(reader, header.vector_bytes(), &mut payload).map_err(|e| {
            Error::from_read(e, || {
                format!("vector of record {} ('{}')", i, String::from_utf8_lossy(&word))
            })
        })?;
        builder.push_packed(decode_word(&word), &payload)?;
    }

    builder.finish()
}

/// Read exactly `len` bytes into `buf`.
///
/// `buf` only grows by what the stream delivers, so a header declaring huge
/// vectors fails at the end of the data instead of allocating up front.
fn read_payload<R: BufRead + ?Sized>(reader: &mut R, len: usize, buf: &mut Vec<u8>) -> io::Result<()> {
    buf.clear();
    let read = Read::take(&mut *reader, len as u64).read_to_end(buf)?;
    if read < len {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(())
}

/// Write `source` in the binary layout
pub fn write<S, W>(source: &S, writer: &mut W) -> Result<()>
where
    S: VectorSource + ?Sized,
    W: Write + ?Sized,
{
    let header = source.header();
    writer.write_all(format!("{} {}\n", source.len(), header.dimensions).as_bytes())?;

    let mut record = BytesMut::with_capacity(64 + header.vector_bytes());
    for (idx, word) in source.vocabulary().iter().enumerate() {
        let vector = source
            .vector_at(idx)
            .ok_or_else(|| Error::corrupt(format!("no vector for record {}", idx)))?;

        record.clear();
        record.put_slice(word.as_bytes());
        record.put_u8(b' ');
        for &value in vector.iter() {
            record.put_f32_le(value);
        }
        record.put_u8(b'\n');
        writer.write_all(&record)?;
    }

    Ok(())
}

/// Append the little-endian float32 values packed in `payload` to `out`
#[inline]
pub(crate) fn decode_into(mut payload: &[u8], out: &mut Vec<f32>) {
    out.reserve(payload.len() / 4);
    while payload.remaining() >= 4 {
        out.push(payload.get_f32_le());
    }
}

/// Words are UTF-8; trainers may cut a multi-byte character at their length limit.
///
/// Invalid sequences become U+FFFD, so two words differing only in their
/// invalid bytes decode to the same string and the file is rejected as
/// holding a duplicate.
pub(crate) fn decode_word(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
