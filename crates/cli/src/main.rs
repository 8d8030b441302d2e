// ABOUTME: CLI for merging RSS feeds with the rssmerge-feed library.
// ABOUTME: Loads feeds from URLs, files, or stdin, merges and sorts them, and writes RSS 2.0 or JSON.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rssmerge_feed::{
    encode_channel, encode_to_file, merge_with, parse_feed_bytes, Channel, EncodeOptions,
    MergeOptions,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Merge one or more RSS 0.91 / 2.0 feeds into a single RSS 2.0 feed.
#[derive(Parser, Debug)]
#[command(name = "rssmerge")]
#[command(about = "Merge RSS feeds into one RSS 2.0 document", long_about = None)]
struct Args {
    /// Feed URL(s) (http/https) or local file paths. Use "-" to read one feed from stdin.
    #[arg(required = true)]
    targets: Vec<String>,

    /// Write the result to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Keep items in source order instead of newest first.
    #[arg(long, default_value_t = false)]
    no_sort: bool,

    /// Keep at most N items.
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Title of the merged channel.
    #[arg(long)]
    title: Option<String>,

    /// Link of the merged channel.
    #[arg(long)]
    link: Option<String>,

    /// Description of the merged channel.
    #[arg(long)]
    description: Option<String>,

    /// Print the merged channel as JSON instead of RSS.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write compact output without indentation.
    #[arg(long, default_value_t = false)]
    compact: bool,

    /// Log progress to stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.targets.iter().filter(|t| t.as_str() == "-").count() > 1 {
        return Err(anyhow!("stdin (\"-\") can only be given once"));
    }

    let mut channels = Vec::with_capacity(args.targets.len());
    for target in &args.targets {
        let bytes = load_bytes(target)?;
        let channel =
            parse_feed_bytes(&bytes).with_context(|| format!("failed to parse {}", target))?;
        info!(target = %target, items = channel.items.len(), "loaded feed");
        channels.push(channel);
    }

    let mut merged = merge_with(channels, &merge_options(&args))?;
    if !args.no_sort {
        merged.sort_items_newest_first();
    }
    if let Some(limit) = args.limit {
        merged.items.truncate(limit);
    }

    write_output(&merged, &args)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn merge_options(args: &Args) -> MergeOptions {
    let mut builder = MergeOptions::builder();
    if let Some(ref title) = args.title {
        builder = builder.title(title);
    }
    if let Some(ref link) = args.link {
        builder = builder.link(link);
    }
    if let Some(ref description) = args.description {
        builder = builder.description(description);
    }
    builder.build()
}

fn write_output(channel: &Channel, args: &Args) -> Result<()> {
    if args.json {
        let json = if args.compact {
            serde_json::to_string(channel)?
        } else {
            serde_json::to_string_pretty(channel)?
        };
        return match args.output {
            Some(ref path) => write_json_file(path, &json),
            None => {
                println!("{}", json);
                Ok(())
            }
        };
    }

    let options = if args.compact {
        EncodeOptions::compact()
    } else {
        EncodeOptions::default()
    };

    match args.output {
        Some(ref path) => encode_to_file(channel, path, &options)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut out = encode_channel(channel, io::stdout().lock(), &options)?;
            out.flush()?;
            Ok(())
        }
    }
}

/// Writes JSON through a temporary file next to `path`, persisted only on success.
fn write_json_file(path: &Path, json: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    writeln!(temp, "{}", json)?;
    temp.as_file().sync_all()?;
    temp.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "wrote json");
    Ok(())
}

fn load_bytes(target: &str) -> Result<Vec<u8>> {
    if target == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    if let Some(url) = remote_url(target) {
        debug!(url = %url, "fetching feed");
        let resp = reqwest::blocking::get(url.as_str())
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("failed to fetch {}", target))?;
        let bytes = resp.bytes()?;
        return Ok(bytes.to_vec());
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    fs::read(&path).with_context(|| format!("failed to read {}", target))
}

/// Parses http(s) targets; anything else is treated as a path.
fn remote_url(target: &str) -> Option<Url> {
    let url = Url::parse(target).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
