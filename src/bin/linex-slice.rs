// src/bin/linex-slice.rs

use anyhow::Result;
use clap::Parser;
use linex::chunking::ChunkPolicy;
use linex::slice::{slice_file, SliceRequest};
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// Extract a byte range from a file, reading in chunks sized for the file
/// (override with SLICE_CHUNK_SIZE)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Byte offset to start reading at
    #[arg(long)]
    start: u64,

    /// Number of bytes to read
    #[arg(long)]
    size: u64,

    /// File to read from
    #[arg(long)]
    file: PathBuf,

    /// Drop partial lines at the start and end of the range
    #[arg(long)]
    full_lines_only: bool,

    /// Enable debug logging on stderr
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    linex::logging::init(args.debug)?;

    let request = SliceRequest {
        start: args.start,
        size: args.size,
        full_lines_only: args.full_lines_only,
    };
    let policy = ChunkPolicy::from_env();

    let stdout = io::stdout();
    let summary = slice_file(&args.file, request, &policy, &mut stdout.lock())?;
    debug!(
        bytes_read = summary.bytes_read,
        bytes_written = summary.bytes_written,
        "slice complete"
    );
    Ok(())
}
