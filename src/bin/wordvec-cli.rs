//! WORDVEC CLI
//!
//! Interactive nearest-neighbor and analogy queries over a vector file.

use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use wordvec::{LoadKind, LoadOptions, Metrics, Model, SearchConfig, SimilarityEngine};

/// WORDVEC CLI - Query a word-vector model
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Vector file to load
    model: std::path::PathBuf,

    /// File kind: auto, bin, txt or mmap
    #[arg(short, long, default_value = "auto")]
    kind: String,

    /// Default number of results
    #[arg(short = 'n', long, default_value_t = 10)]
    top_k: usize,

    /// Scan threads (0 = auto-detect)
    #[arg(short, long, default_value_t = 0)]
    threads: usize,

    /// Keep decoded vectors of a memory-mapped model
    #[arg(long, default_value_t = false)]
    cache: bool,

    /// Run a single command and exit
    #[arg(short, long)]
    command: Option<String>,
}

/// A parsed prompt command
#[derive(Debug, PartialEq)]
enum Query {
    Nearest { word: String, k: Option<usize> },
    Analogy { positive: Vec<String>, negative: Vec<String>, k: Option<usize> },
    Vector { word: String },
    Info,
    Stats,
    Help,
    Quit,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordvec=info".parse()?))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = LoadOptions::default()
        .with_kind(args.kind.parse::<LoadKind>()?)
        .with_cache(args.cache);
    let model = wordvec::load_with(&args.model, &options)?;

    let metrics = Arc::new(Metrics::new());
    let engine = SimilarityEngine::new(SearchConfig::default().with_threads(args.threads))
        .with_metrics(Arc::clone(&metrics));
    let session = Session {
        model,
        engine,
        metrics,
        top_k: args.top_k,
    };

    if let Some(command) = args.command {
        let query = parse_query(&command)?;
        session.execute(query)?;
        return Ok(());
    }

    println!(
        "Loaded {} words x {} dimensions. Type 'help' for available commands, 'quit' to exit.\n",
        session.model.len(),
        session.model.dimensions()
    );

    loop {
        print!("wordvec> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match parse_query(input) {
            Ok(Query::Quit) => {
                println!("Goodbye!");
                break;
            }
            Ok(query) => {
                if let Err(e) = session.execute(query) {
                    eprintln!("Error: {}", e);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

struct Session {
    model: Model,
    engine: SimilarityEngine,
    metrics: Arc<Metrics>,
    top_k: usize,
}

impl Session {
    fn execute(&self, query: Query) -> anyhow::Result<()> {
        match query {
            Query::Nearest { word, k } => {
                let result = self
                    .engine
                    .nearest_to_word(&self.model, &word, k.unwrap_or(self.top_k))?;
                print_neighbors(&result);
            }
            Query::Analogy { positive, negative, k } => {
                let positive: Vec<&str> = positive.iter().map(String::as_str).collect();
                let negative: Vec<&str> = negative.iter().map(String::as_str).collect();
                let result =
                    self.engine
                        .analogy(&self.model, &positive, &negative, k.unwrap_or(self.top_k))?;
                print_neighbors(&result);
            }
            Query::Vector { word } => {
                let vector = self.model.vector_for(&word)?;
                let values: Vec<String> = vector.iter().map(|v| v.to_string()).collect();
                println!("{}", values.join(" "));
            }
            Query::Info => {
                let header = self.model.header();
                println!(
                    "words: {}  dimensions: {}  storage: {}",
                    header.vocab_size,
                    header.dimensions,
                    if self.model.is_lazy() { "memory-mapped" } else { "in-memory" }
                );
            }
            Query::Stats => println!("{}", self.metrics.summary()),
            Query::Help => print_help(),
            Query::Quit => {}
        }
        Ok(())
    }
}

fn print_neighbors(result: &[wordvec::Neighbor]) {
    if result.is_empty() {
        println!("(no results)");
        return;
    }
    for (rank, neighbor) in result.iter().enumerate() {
        println!("{:>4}. {:<30} {:.6}", rank + 1, neighbor.word, neighbor.score);
    }
}

fn parse_query(input: &str) -> anyhow::Result<Query> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        anyhow::bail!("Empty command");
    }

    let cmd = parts[0].to_lowercase();

    match cmd.as_str() {
        "nearest" | "n" => {
            if parts.len() < 2 {
                anyhow::bail!("nearest requires a word: nearest <word> [k]");
            }
            let k = parts.get(2).map(|k| k.parse::<usize>()).transpose()?;
            Ok(Query::Nearest {
                word: parts[1].to_string(),
                k,
            })
        }

        "analogy" | "a" => {
            let mut positive = Vec::new();
            let mut negative = Vec::new();
            let mut k = None;
            for &part in &parts[1..] {
                if let Some(n) = part.strip_prefix("k=") {
                    k = Some(n.parse::<usize>()?);
                    continue;
                }
                let (list, word) = match part.strip_prefix('-') {
                    Some(word) => (&mut negative, word),
                    None => (&mut positive, part.strip_prefix('+').unwrap_or(part)),
                };
                if word.is_empty() {
                    anyhow::bail!("'{}' is missing a word", part);
                }
                list.push(word.to_string());
            }
            if positive.is_empty() && negative.is_empty() {
                anyhow::bail!("analogy requires words: analogy <word>... [-<word>...] [k=<n>]");
            }
            Ok(Query::Analogy {
                positive,
                negative,
                k,
            })
        }

        "vector" | "v" => {
            if parts.len() < 2 {
                anyhow::bail!("vector requires a word: vector <word>");
            }
            Ok(Query::Vector {
                word: parts[1].to_string(),
            })
        }

        "info" => Ok(Query::Info),
        "stats" => Ok(Query::Stats),
        "help" => Ok(Query::Help),
        "quit" | "exit" => Ok(Query::Quit),

        _ => anyhow::bail!("Unknown command: {}. Type 'help' for available commands.", cmd),
    }
}

fn print_help() {
    println!(
        r#"
Available commands:

  nearest <word> [k]                      - Words closest to <word>
  analogy <word>... [-<word>...] [k=<n>]  - Words closest to sum(words) - sum(-words)
  vector <word>                           - Print the vector of <word>
  info                                    - Model size and storage
  stats                                   - Query counts and latency

  help                                    - Show this help
  quit / exit                             - Exit the CLI

Examples:
  nearest paris 5
  analogy king woman -man k=3
  vector france
"#
    );
}
