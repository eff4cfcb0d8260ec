// src/analyzer.rs

//! Streaming line scanner.
//!
//! A file is read in chunks sized by the [`ChunkPolicy`]; lines never need to
//! fit in a chunk. A line that runs past the end of a chunk is moved into an
//! overflow buffer that grows in powers of two for as long as the line does.

use crate::chunking::{next_power_of_two, ChunkPolicy};
use crate::error::ScanError;
use crate::model::*;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

const LINE_FEED: u8 = b'\n';

/// Initial capacity of the overflow buffer (1 KiB)
const OVERFLOW_INITIAL_CAPACITY: usize = 1024;

/// Scans the file at `path`, sizing reads with `policy`.
pub fn analyze_file(path: &Path, policy: &ChunkPolicy) -> Result<LineStats, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = file.metadata().map_err(|source| ScanError::Metadata {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(ScanError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }

    let file_size = metadata.len();
    let chunk_size = policy.resolve(file_size);
    debug!(path = %path.display(), file_size, chunk_size, "scanning file");

    analyze_reader(file, chunk_size)
}

/// Scans any byte source, reading at most `chunk_size` bytes at a time.
pub fn analyze_reader<R: Read>(mut reader: R, chunk_size: usize) -> Result<LineStats, ScanError> {
    let chunk_size = chunk_size.max(1);
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(chunk_size)
        .map_err(|source| ScanError::Allocation {
            requested: chunk_size,
            source,
        })?;
    buffer.resize(chunk_size, 0);

    let mut scanner = LineScanner::new();
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(ScanError::Read {
                    offset: scanner.consumed,
                    source,
                })
            }
        };
        scanner.feed(&buffer[..read])?;
    }
    scanner.finish()
}

/// Offset within `chunk` where the last line starts: one past the final line
/// feed, or 0 when the chunk holds none.
pub fn partial_line_start(chunk: &[u8]) -> usize {
    chunk
        .iter()
        .rposition(|&byte| byte == LINE_FEED)
        .map_or(0, |idx| idx + 1)
}

/// The line currently being read.
#[derive(Debug)]
enum PendingLine {
    /// Still inside the chunk it started in. Its length is measured from
    /// the line start when the line feed arrives.
    InChunk,
    /// Crossed at least one chunk boundary; holds its bytes so far.
    Buffered(Vec<u8>),
}

impl PendingLine {
    fn len(&self) -> u64 {
        match self {
            PendingLine::InChunk => 0,
            PendingLine::Buffered(bytes) => bytes.len() as u64,
        }
    }

    /// Length of the line once `segment` more bytes complete it.
    fn completed_len(&self, segment: usize) -> Result<u64, ScanError> {
        self.len()
            .checked_add(segment as u64)
            .ok_or(ScanError::Overflow {
                what: "line length",
            })
    }

    /// Carries the unfinished end of `chunk` across the chunk boundary.
    fn carry(&mut self, chunk: &[u8]) -> Result<(), ScanError> {
        match self {
            PendingLine::InChunk => {
                let partial = &chunk[partial_line_start(chunk)..];
                let mut bytes = Vec::new();
                grow_overflow(&mut bytes, partial.len().max(OVERFLOW_INITIAL_CAPACITY))?;
                bytes.extend_from_slice(partial);
                *self = PendingLine::Buffered(bytes);
            }
            PendingLine::Buffered(bytes) => {
                let needed = bytes
                    .len()
                    .checked_add(chunk.len())
                    .ok_or(ScanError::Overflow {
                        what: "overflow buffer size",
                    })?;
                grow_overflow(bytes, needed)?;
                bytes.extend_from_slice(chunk);
            }
        }
        Ok(())
    }
}

/// Grows `buffer` to a power-of-two capacity of at least `needed` bytes.
fn grow_overflow(buffer: &mut Vec<u8>, needed: usize) -> Result<(), ScanError> {
    if buffer.capacity() >= needed {
        return Ok(());
    }
    let target = usize::try_from(next_power_of_two(needed as u64)).unwrap_or(needed);
    buffer
        .try_reserve_exact(target - buffer.len())
        .map_err(|source| ScanError::Allocation {
            requested: target,
            source,
        })
}

/// Incremental line statistics over a sequence of chunks
#[derive(Debug)]
pub struct LineScanner {
    stats: LineStats,
    /// Sum of all completed line lengths
    total_bytes: u64,
    /// Bytes fed before the current chunk
    consumed: u64,
    /// Absolute offset where the pending line starts
    line_start: u64,
    pending: PendingLine,
}

impl Default for LineScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LineScanner {
    pub fn new() -> Self {
        Self {
            stats: LineStats::default(),
            total_bytes: 0,
            consumed: 0,
            line_start: 0,
            pending: PendingLine::InChunk,
        }
    }

    /// Processes the next chunk of input.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), ScanError> {
        let mut segment_start = 0;
        for (idx, _) in chunk.iter().enumerate().filter(|&(_, &byte)| byte == LINE_FEED) {
            let length = self.pending.completed_len(idx - segment_start)?;
            self.record_line(length)?;
            self.pending = PendingLine::InChunk;
            segment_start = idx + 1;
            self.line_start = self.offset_in_chunk(segment_start)?;
        }

        if segment_start < chunk.len() {
            self.pending.carry(chunk)?;
        }

        self.consumed = self
            .consumed
            .checked_add(chunk.len() as u64)
            .ok_or(ScanError::Overflow {
                what: "input offset",
            })?;
        Ok(())
    }

    /// Finalizes the scan, counting an unterminated last line.
    pub fn finish(mut self) -> Result<LineStats, ScanError> {
        let trailing = self.pending.len();
        if trailing > 0 {
            self.record_line(trailing)?;
        }
        if self.stats.total_lines > 0 {
            self.stats.avg_line_length = self.total_bytes as f64 / self.stats.total_lines as f64;
        }
        Ok(self.stats)
    }

    fn offset_in_chunk(&self, idx: usize) -> Result<u64, ScanError> {
        self.consumed
            .checked_add(idx as u64)
            .ok_or(ScanError::Overflow {
                what: "input offset",
            })
    }

    fn record_line(&mut self, length: u64) -> Result<(), ScanError> {
        self.total_bytes = self
            .total_bytes
            .checked_add(length)
            .ok_or(ScanError::Overflow {
                what: "total line length",
            })?;
        let stats = &mut self.stats;
        stats.total_lines += 1;

        if length > KIB {
            stats.lines_over_1k += 1;
        }
        if length > 10 * KIB {
            stats.lines_over_10k += 1;
        }
        if length > 100 * KIB {
            stats.lines_over_100k += 1;
        }
        if length > MIB {
            stats.lines_over_1m += 1;
        }

        stats.histogram[bucket_index(length)] += 1;

        // Strict comparison: the first line reaching a length keeps the record.
        if length > stats.max_line_length {
            stats.max_line_length = length;
            stats.max_line_position = self.line_start;
        }
        Ok(())
    }
}
