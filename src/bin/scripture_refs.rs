use clap::{Parser, Subcommand};
use serde::Serialize;
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use scripture_lm::config::{BiblicalTransformerConfig, OverlapPolicy, ReferenceConfig};
use scripture_lm::tokenizer::{normalize_text, TokenizedText};
use scripture_lm::{Canon, ReferenceEngine, ReferenceMatch};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Find and canonicalize Bible references", long_about = None)]
struct CliArgs {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve every reference in a text and print the matches as JSON.
    Resolve {
        /// Text to scan. Reads --file, or stdin when neither is given.
        #[clap(long, value_parser, conflicts_with = "file")]
        text: Option<String>,
        #[clap(long, value_parser)]
        file: Option<PathBuf>,
        /// Clean quotes, footnote markers and editorial brackets first (offsets then refer to the cleaned text).
        #[clap(long)]
        normalize: bool,
        /// Resolve bare book names to their first verse.
        #[clap(long)]
        book_level: bool,
        /// Resolve candidates nested inside another candidate as well.
        #[clap(long)]
        keep_overlaps: bool,
        /// Accept lowercase book names.
        #[clap(long)]
        any_case: bool,
        #[clap(long)]
        pretty: bool,
    },
    /// Print the book table, or one book's verse counts per chapter.
    Canon {
        #[clap(long, value_parser)]
        book: Option<String>,
    },
    /// Load and validate a model config file.
    CheckConfig {
        #[clap(value_parser)]
        path: PathBuf,
    },
}

#[derive(Serialize)]
struct ResolvedOutput<'a> {
    #[serde(flatten)]
    matched: &'a ReferenceMatch,
    citation: Option<String>,
}

#[derive(Serialize)]
struct ResolveReport<'a> {
    text_len: usize,
    candidates: usize,
    parse_failures: usize,
    matches: Vec<ResolvedOutput<'a>>,
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String, Box<dyn Error>> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return Ok(std::fs::read_to_string(&path)
            .map_err(|e| format!("could not read {}: {}", path.display(), e))?);
    }
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

fn run_resolve(
    input: String,
    normalize: bool,
    config: &ReferenceConfig,
    pretty: bool,
) -> Result<(), Box<dyn Error>> {
    let canon = Canon::standard()?;
    let engine = ReferenceEngine::new(canon, config)?;
    let source = if normalize { normalize_text(&input) } else { input };

    let tokenized = TokenizedText::new(&source);
    let (matches, stats) = engine.resolve_tokenized(&tokenized);
    log::info!(
        "{} candidates, {} resolved, {} malformed",
        stats.candidates,
        matches.iter().filter(|m| m.result.is_resolved()).count(),
        stats.parse_failures
    );

    let report = ResolveReport {
        text_len: source.len(),
        candidates: stats.candidates,
        parse_failures: stats.parse_failures,
        matches: matches
            .iter()
            .map(|matched| ResolvedOutput {
                matched,
                citation: matched.result.as_resolved().map(|r| canon.format(r)),
            })
            .collect(),
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", json);
    Ok(())
}

fn run_canon(book: Option<String>) -> Result<(), Box<dyn Error>> {
    let canon = Canon::standard()?;
    match book {
        None => {
            for (index, record) in canon.books().iter().enumerate() {
                println!(
                    "{:>2}  {:<16} {:<6} {:?}  {} chapters",
                    index,
                    record.name,
                    record.abbreviation,
                    record.testament,
                    record.chapter_count()
                );
            }
            println!("{} books, {} verses", canon.len(), canon.total_verses());
        }
        Some(name) => {
            let matches = canon.book_matches(&name);
            if matches.is_empty() {
                return Err(format!("unknown book: {}", name).into());
            }
            if matches.len() > 1 {
                println!("'{}' is ambiguous:", name);
            }
            for book_match in matches {
                let index = book_match.book_index;
                let record = canon
                    .book(index)
                    .ok_or_else(|| format!("book index {} out of range", index))?;
                println!("{} ({:?} Testament, {} chapters)", record.name, record.testament, record.chapter_count());
                for (chapter, verses) in record.verses.iter().enumerate() {
                    println!("  {:>3}: {} verses", chapter + 1, verses);
                }
            }
        }
    }
    Ok(())
}

fn run_check_config(path: PathBuf) -> Result<(), Box<dyn Error>> {
    let path_str = path
        .to_str()
        .ok_or_else(|| format!("config path is not valid UTF-8: {}", path.display()))?;
    let config = BiblicalTransformerConfig::load(path_str)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scripture_lm=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = CliArgs::parse();
    match args.command {
        Command::Resolve {
            text,
            file,
            normalize,
            book_level,
            keep_overlaps,
            any_case,
            pretty,
        } => {
            let config = ReferenceConfig {
                book_level_granularity: book_level,
                require_capitalized_book: !any_case,
                overlap_policy: if keep_overlaps {
                    OverlapPolicy::KeepAll
                } else {
                    OverlapPolicy::PreferOutermost
                },
                ..ReferenceConfig::default()
            };
            let input = read_input(text, file)?;
            run_resolve(input, normalize, &config, pretty)
        }
        Command::Canon { book } => run_canon(book),
        Command::CheckConfig { path } => run_check_config(path),
    }
}
