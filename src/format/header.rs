//! Vector File Header
//!
//! `"<vocab_size> <dimensions>\n"`, shared by every supported format.

use std::io::{self, BufRead};

use crate::error::{Error, Result};

/// Header of a vector file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of records that follow
    pub vocab_size: usize,
    /// Length of every vector in the file
    pub dimensions: usize,
}

impl Header {
    pub fn new(vocab_size: usize, dimensions: usize) -> Self {
        Self {
            vocab_size,
            dimensions,
        }
    }

    /// Read the two whitespace-separated header integers from a stream.
    ///
    /// The whitespace byte ending the second integer is consumed.
    pub fn read<R: BufRead + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut token = Vec::with_capacity(16);

        let vocab_size = match read_token(reader, &mut token)? {
            true => parse_count(&token, "vocabulary size")?,
            false => return Err(Error::corrupt("missing header")),
        };
        let dimensions = match read_token(reader, &mut token)? {
            true => parse_count(&token, "dimensions")?,
            false => return Err(Error::corrupt("header is missing the dimensions")),
        };

        Self::checked(vocab_size, dimensions)
    }

    /// Parse a text-format header line; exactly two integers are allowed.
    pub fn parse_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let (Some(vocab), Some(dims), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::corrupt(format!(
                "header line must hold two integers, got '{}'",
                line.trim_end()
            )));
        };

        Self::checked(
            parse_count(vocab.as_bytes(), "vocabulary size")?,
            parse_count(dims.as_bytes(), "dimensions")?,
        )
    }

    /// Size in bytes of one packed float32 vector
    pub fn vector_bytes(&self) -> usize {
        self.dimensions.saturating_mul(std::mem::size_of::<f32>())
    }

    /// Headers read from a file must describe a payload that fits in memory.
    fn checked(vocab_size: usize, dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::corrupt("header declares zero dimensions"));
        }
        let fits = dimensions
            .checked_mul(std::mem::size_of::<f32>())
            .and_then(|bytes| bytes.checked_mul(vocab_size));
        if fits.is_none() {
            return Err(Error::corrupt(format!(
                "header declares {} x {} values, more than can be addressed",
                vocab_size, dimensions
            )));
        }
        Ok(Self::new(vocab_size, dimensions))
    }
}

fn parse_count(token: &[u8], what: &str) -> Result<usize> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .ok_or_else(|| {
            Error::corrupt(format!(
                "invalid {} in header: '{}'",
                what,
                String::from_utf8_lossy(token)
            ))
        })
}

/// Read one whitespace-delimited token into `buf`.
///
/// Leading whitespace is skipped and the single whitespace byte ending the
/// token is consumed. Returns `false` when the stream ends before a token starts.
pub(crate) fn read_token<R: BufRead + ?Sized>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();

    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(false);
        }
        let len = available.len();
        let skip = available
            .iter()
            .take_while(|b| b.is_ascii_whitespace())
            .count();
        reader.consume(skip);
        if skip < len {
            break;
        }
    }

    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(true);
        }
        match available.iter().position(|b| b.is_ascii_whitespace()) {
            Some(pos) => {
                buf.extend_from_slice(&available[..pos]);
                reader.consume(pos + 1);
                return Ok(true);
            }
            None => {
                let len = available.len();
                buf.extend_from_slice(available);
                reader.consume(len);
            }
        }
    }
}
