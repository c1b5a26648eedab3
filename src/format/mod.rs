//! Format Module
//!
//! Kind detection, header parsing and the readers/writers for the binary,
//! text and memory-mapped representations of a vector file.

pub mod binary;
mod header;
pub mod mmap;
pub mod text;

pub use header::Header;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Kind requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadKind {
    /// Infer from the file extension
    #[default]
    Auto,
    Binary,
    Text,
    MemoryMapped,
}

/// Resolved parser variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Binary,
    Text,
    MemoryMapped,
}

/// Extension table used by automatic detection
const EXTENSIONS: &[(&str, Format)] = &[("bin", Format::Binary), ("txt", Format::Text)];

impl FromStr for LoadKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(LoadKind::Auto),
            "bin" => Ok(LoadKind::Binary),
            "txt" => Ok(LoadKind::Text),
            "mmap" => Ok(LoadKind::MemoryMapped),
            other => Err(Error::invalid(format!("Unknown kind: '{}'", other))),
        }
    }
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadKind::Auto => "auto",
            LoadKind::Binary => "bin",
            LoadKind::Text => "txt",
            LoadKind::MemoryMapped => "mmap",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Binary => "bin",
            Format::Text => "txt",
            Format::MemoryMapped => "mmap",
        };
        f.write_str(name)
    }
}

impl LoadKind {
    /// Resolve to a concrete format, consulting the extension for `Auto`.
    ///
    /// Memory-mapped loading is never inferred.
    pub fn resolve(self, path: &Path) -> Result<Format> {
        match self {
            LoadKind::Binary => Ok(Format::Binary),
            LoadKind::Text => Ok(Format::Text),
            LoadKind::MemoryMapped => Ok(Format::MemoryMapped),
            LoadKind::Auto => Format::from_extension(path).ok_or_else(|| Error::FormatUnknown {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl Format {
    /// Look the path's extension up in the fixed table (ASCII case-insensitive)
    pub fn from_extension(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?;
        EXTENSIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(ext))
            .map(|(_, format)| *format)
    }
}

/// Decide which parser handles `path`.
///
/// `hint` may be any of `"auto"`, `"bin"`, `"txt"`, `"mmap"`; `None` means auto.
pub fn detect(path: &Path, hint: Option<&str>) -> Result<Format> {
    let kind = match hint {
        Some(h) => h.parse::<LoadKind>()?,
        None => LoadKind::Auto,
    };
    kind.resolve(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect(Path::new("vectors.bin"), None).unwrap(), Format::Binary);
        assert_eq!(detect(Path::new("vectors.txt"), Some("auto")).unwrap(), Format::Text);
        assert_eq!(detect(Path::new("VECTORS.BIN"), None).unwrap(), Format::Binary);
    }

    #[test]
    fn test_explicit_hint_wins() {
        assert_eq!(detect(Path::new("vectors.txt"), Some("bin")).unwrap(), Format::Binary);
        assert_eq!(detect(Path::new("model"), Some("txt")).unwrap(), Format::Text);
        assert_eq!(
            detect(Path::new("vectors.bin"), Some("mmap")).unwrap(),
            Format::MemoryMapped
        );
    }

    #[test]
    fn test_unknown_hint() {
        let err = detect(Path::new("vectors.bin"), Some("unknown")).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().starts_with("Unknown kind"));
    }

    #[test]
    fn test_unknown_extension() {
        let err = detect(Path::new("vectors.unknown"), None).unwrap_err();
        assert!(matches!(err, Error::FormatUnknown { .. }));
        assert!(err.to_string().starts_with("Could not identify kind"));

        let err = detect(Path::new("vectors"), Some("auto")).unwrap_err();
        assert!(matches!(err, Error::FormatUnknown { .. }));
    }

    #[test]
    fn test_mmap_never_inferred() {
        for name in ["a.bin", "a.txt", "a.mmap"] {
            assert_ne!(
                LoadKind::Auto.resolve(Path::new(name)).ok(),
                Some(Format::MemoryMapped)
            );
        }
    }

    #[test]
    fn test_kind_display_parses_back() {
        for kind in [
            LoadKind::Auto,
            LoadKind::Binary,
            LoadKind::Text,
            LoadKind::MemoryMapped,
        ] {
            assert_eq!(kind.to_string().parse::<LoadKind>().unwrap(), kind);
        }
    }
}
