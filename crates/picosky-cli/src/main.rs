use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use picosky_feed::{FeedConfig, FeedError, FeedEvent, FeedSync, PostDraft, Record, WireError};
use picosky_richtext::{
    Facet, FacetResolver, GraphemeCounter, render_faceted_html, render_faceted_markdown,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "picosky - offline tools for the picosky feed core", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count user-perceived characters and check them against the post limit
    Count {
        text: String,

        /// Character limit (defaults to PICOSKY_CHAR_LIMIT or 12)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Resolve facets over a piece of text and print the segments
    Resolve {
        #[arg(long)]
        text: String,

        /// JSON array of facets
        #[arg(long, default_value = "[]")]
        facets: String,

        /// Viewer DID for self-mention detection (defaults to PICOSKY_SELF_DID)
        #[arg(long)]
        self_did: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Segments)]
        format: Format,
    },
    /// Seed a feed from a fetch body, merge a recorded stream, and print the result
    Replay {
        /// JSON body of the bulk `/posts` fetch
        #[arg(long)]
        snapshot: PathBuf,

        /// Newline-delimited stream messages, one record per line
        #[arg(long)]
        events: Option<PathBuf>,

        /// Apply the stream before the snapshot instead of after it
        #[arg(long)]
        stream_first: bool,

        /// Feed capacity (defaults to PICOSKY_FEED_CAPACITY or 50)
        #[arg(long)]
        capacity: Option<usize>,

        /// Viewer DID for self-mention detection
        #[arg(long)]
        self_did: Option<String>,

        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Segments,
    Markdown,
    Html,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = FeedConfig::from_env().map_err(FeedError::from)?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Count { text, limit } => {
            let counter = limit
                .map(GraphemeCounter::new)
                .unwrap_or_else(|| config.grapheme_counter());
            count(&text, &counter)
        }
        Commands::Resolve {
            text,
            facets,
            self_did,
            format,
        } => {
            let facets: Vec<Facet> = serde_json::from_str(&facets)
                .map_err(|source| WireError::Decode {
                    what: "facets",
                    source,
                })
                .map_err(FeedError::from)?;
            let self_did = self_did.or_else(|| config.self_did.as_ref().map(|s| s.to_string()));
            let mut resolver = FacetResolver::new();
            if let Some(did) = self_did.as_deref() {
                resolver = resolver.with_self_identity(did);
            }
            println!("{}", render(&text, &facets, &resolver, format)?);
            Ok(())
        }
        Commands::Replay {
            snapshot,
            events,
            stream_first,
            capacity,
            self_did,
            format,
        } => {
            let mut config = config;
            if let Some(capacity) = capacity {
                config.capacity = capacity;
            }
            if let Some(did) = self_did {
                config.self_did = Some(did.into());
            }
            replay(&snapshot, events.as_deref(), stream_first, &config, format)
        }
    }
}

fn init_tracing() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn count(text: &str, counter: &GraphemeCounter) -> Result<()> {
    let graphemes = counter.count(text);
    println!(
        "{graphemes} characters ({} codepoints, {} bytes), {} remaining of {}",
        text.chars().count(),
        text.len(),
        counter.remaining(text),
        counter.limit()
    );
    let draft = PostDraft::new(text, counter).map_err(FeedError::from)?;
    println!("{}", draft.to_json().map_err(FeedError::from)?);
    Ok(())
}

fn render(
    text: &str,
    facets: &[Facet],
    resolver: &FacetResolver<'_>,
    format: Format,
) -> Result<String> {
    match format {
        Format::Segments => {
            let lines: Vec<String> = resolver
                .resolve(text, facets)
                .iter()
                .map(|segment| {
                    let line = format!(
                        "{:?} {:?} {:?}",
                        segment.kind, segment.byte_range, segment.text
                    );
                    if segment.is_plain() {
                        return line;
                    }
                    let marker = if segment.mentions_self { " (you)" } else { "" };
                    match &segment.feature {
                        Some(feature) => format!("{line} {feature:?}{marker}"),
                        None => format!("{line}{marker}"),
                    }
                })
                .collect();
            Ok(lines.join("\n"))
        }
        Format::Markdown => render_faceted_markdown(text, facets, resolver).into_diagnostic(),
        Format::Html => render_faceted_html(text, facets, resolver).into_diagnostic(),
    }
}

fn replay(
    snapshot: &Path,
    events: Option<&Path>,
    stream_first: bool,
    config: &FeedConfig,
    format: Format,
) -> Result<()> {
    let body = std::fs::read_to_string(snapshot)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading snapshot {}", snapshot.display()))?;
    let fetched = picosky_feed::decode_snapshot(&body).map_err(FeedError::from)?;
    let live = match events {
        Some(path) => read_stream(path)?,
        None => Vec::new(),
    };
    info!(
        fetched = fetched.len(),
        live = live.len(),
        capacity = config.capacity,
        "replaying feed"
    );

    let mut sync = FeedSync::from_config(config);
    let live_events = live.into_iter().map(FeedEvent::Live);
    let snapshot_event = std::iter::once(FeedEvent::Snapshot(fetched));
    let ordered: Vec<FeedEvent> = if stream_first {
        live_events.chain(snapshot_event).collect()
    } else {
        snapshot_event.chain(live_events).collect()
    };
    for event in ordered {
        sync.apply(event);
    }

    let mut resolver = FacetResolver::new();
    if let Some(did) = config.self_did.as_deref() {
        resolver = resolver.with_self_identity(did);
    }
    let feed = sync.snapshot();
    let mut previous: Option<&Record> = None;
    for record in &feed {
        if !previous.is_some_and(|p| p.same_author(record)) {
            let author = record.handle().unwrap_or("anonymous");
            match record.nickname() {
                Some(nickname) => println!("{nickname} @{author}"),
                None => println!("@{author}"),
            }
        }
        let highlight = match config.self_did.as_deref() {
            Some(did) if record.mentions(did) => "> ",
            _ => "  ",
        };
        let edited = if record.is_edited() { " (edited)" } else { "" };
        println!(
            "{highlight}{}{edited}",
            render(record.body(), record.facets(), &resolver, format)?
        );
        println!("  {}", record.permalink(&config.profile_did));
        previous = Some(record);
    }
    Ok(())
}

/// Decode a newline-delimited stream recording. Undecodable lines are skipped, as a live
/// subscription would drop a bad message.
fn read_stream(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("opening stream {}", path.display()))?;
    let mut records = Vec::new();
    for (number, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.into_diagnostic()?;
        if line.trim().is_empty() {
            continue;
        }
        match picosky_feed::decode_record(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = number + 1, error = %e, "skipping undecodable stream message"),
        }
    }
    Ok(records)
}
