//! Text Vector Format
//!
//! Header line followed by one `"<word> <f1> ... <f_dims>\n"` line per record.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{StoreBuilder, VectorSource, VectorStore};

use super::binary::READ_BUFFER_SIZE;
use super::header::Header;

/// Load a text vector file
pub fn load(path: &Path) -> Result<VectorStore> {
    let file = File::open(path)?;
    read(&mut BufReader::with_capacity(READ_BUFFER_SIZE, file))
}

/// Parse a text vector stream.
///
/// Lines after the declared number of records are not read.
pub fn read<R: BufRead + ?Sized>(reader: &mut R) -> Result<VectorStore> {
    let mut line = Vec::with_capacity(4096);
    if reader.read_until(b'\n', &mut line)? == 0 {
        return Err(Error::corrupt("missing header"));
    }
    let header = Header::parse_line(&String::from_utf8_lossy(&line))?;

    let mut builder = StoreBuilder::new(header);
    let mut values = Vec::new();

    for i in 0..header.vocab_size {
        // header is line 1
        let line_no = i + 2;
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Err(Error::corrupt(format!(
                "header declares {} records, found {}",
                header.vocab_size, i
            )));
        }

        let text = String::from_utf8_lossy(&line);
        let mut tokens = text.split_whitespace();
        let word = tokens
            .next()
            .ok_or_else(|| Error::corrupt(format!("line {} is empty", line_no)))?;

        values.clear();
        for token in tokens {
            if values.len() == header.dimensions {
                return Err(Error::corrupt(format!(
                    "line {}: more than {} values",
                    line_no, header.dimensions
                )));
            }
            let value = token.parse::<f32>().map_err(|_| {
                Error::corrupt(format!("line {}: invalid number '{}'", line_no, token))
            })?;
            values.push(value);
        }
        if values.len() != header.dimensions {
            return Err(Error::corrupt(format!(
                "line {}: expected {} values, found {}",
                line_no,
                header.dimensions,
                values.len()
            )));
        }

        builder.push(word.to_string(), &values)?;
    }

    builder.finish()
}

/// Write `source` in the text layout.
///
/// Floats use the shortest representation that parses back to the same bits.
pub fn write<S, W>(source: &S, writer: &mut W) -> Result<()>
where
    S: VectorSource + ?Sized,
    W: Write + ?Sized,
{
    let header = source.header();
    writeln!(writer, "{} {}", source.len(), header.dimensions)?;

    for (idx, word) in source.vocabulary().iter().enumerate() {
        let vector = source
            .vector_at(idx)
            .ok_or_else(|| Error::corrupt(format!("no vector for record {}", idx)))?;

        writer.write_all(word.as_bytes())?;
        for value in vector.iter() {
            write!(writer, " {}", value)?;
        }
        writer.write_all(b"\n")?;
    }

    Ok(())
}
