//! WORDVEC Converter
//!
//! Rewrites a vector file between the binary and text formats.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wordvec::{Format, LoadKind, LoadOptions};

/// WORDVEC Converter - Binary <-> text vector files
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input vector file
    input: PathBuf,

    /// Output vector file
    output: PathBuf,

    /// Input kind: auto, bin, txt or mmap
    #[arg(short, long, default_value = "auto")]
    from: String,

    /// Output format: bin or txt (default: from the output extension)
    #[arg(short, long)]
    to: Option<String>,
}

fn output_format(requested: Option<&str>, path: &Path) -> anyhow::Result<Format> {
    let kind = match requested {
        Some(kind) => kind.parse::<LoadKind>()?,
        None => LoadKind::Auto,
    };
    match kind.resolve(path)? {
        Format::MemoryMapped => anyhow::bail!("mmap is a load mode, write 'bin' instead"),
        format => Ok(format),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordvec=info".parse()?))
        .init();

    let args = Args::parse();
    let format = output_format(args.to.as_deref(), &args.output)?;

    let options = LoadOptions::default().with_kind(args.from.parse::<LoadKind>()?);
    let model = wordvec::load_with(&args.input, &options)?;

    info!(
        "Converting {} ({} words x {}) to {} as {}",
        args.input.display(),
        model.len(),
        model.dimensions(),
        args.output.display(),
        format
    );
    model.save(&args.output, format)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format() {
        assert_eq!(output_format(None, Path::new("out.txt")).unwrap(), Format::Text);
        assert_eq!(output_format(Some("bin"), Path::new("out.txt")).unwrap(), Format::Binary);
        assert!(output_format(None, Path::new("out.vec")).is_err());
        assert!(output_format(Some("mmap"), Path::new("out.bin")).is_err());
        assert!(output_format(Some("csv"), Path::new("out.bin")).is_err());
    }
}
