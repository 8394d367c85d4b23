//! Replay a capture of gateway dispatch frames through the router.
//!
//! Input is JSON lines, one frame per line: `{"t": NAME, "shard": N, "d": PAYLOAD}`.
//! Emissions are printed to stdout as JSON lines; logs go to stderr.

mod printer;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shardline_common::Config;
use shardline_engine::{CacheWriter, MemoryAdapter, Router, Session, ShardPipeline, WireEvent};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::printer::Printer;

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay captured gateway events through the dispatch layer")]
#[command(version)]
struct Cli {
    /// Capture file of JSON lines; `-` reads stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Replay every frame on this shard instead of the recorded one
    #[arg(long)]
    shard: Option<u32>,

    /// Print the catch-all `raw` emission too
    #[arg(long)]
    raw: bool,

    /// Do not keep a cache (every update reports no previous state)
    #[arg(long)]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shardline=info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("Shardline replay starting");
    config.log_summary();

    let session = Session::new(config, Arc::new(MemoryAdapter::new()));
    if !cli.no_cache {
        session.on_any(Arc::new(CacheWriter::new(session.cache().clone())));
    }
    let printer = Arc::new(Printer::new(cli.raw));
    session.on_any(printer.clone());

    let pipeline = ShardPipeline::new(Arc::new(Router::with_default_handlers()), session);

    let reader: Box<dyn AsyncBufRead + Unpin> = if cli.input.as_os_str() == "-" {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        let file = tokio::fs::File::open(&cli.input)
            .await
            .with_context(|| format!("opening {}", cli.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let mut submitted = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut frame: WireEvent = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(line = line_no, error = %e, "Skipping unreadable frame");
                continue;
            }
        };
        if let Some(shard) = cli.shard {
            frame.shard_id = shard;
        }

        pipeline.submit(frame)?;
        submitted += 1;
    }

    pipeline.shutdown().await;

    for (name, count) in printer.counts() {
        info!(event = name, count, "Emitted");
    }
    info!(frames = submitted, "Replay complete");
    Ok(())
}
