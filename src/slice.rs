// src/slice.rs

//! Byte-range extraction.
//!
//! Reads `size` bytes starting at `start`, in chunks sized by the
//! [`ChunkPolicy`]. With `full_lines_only`, partial lines at either end of
//! the range are dropped.

use crate::chunking::ChunkPolicy;
use crate::error::SliceError;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRequest {
    pub start: u64,
    pub size: u64,
    pub full_lines_only: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceSummary {
    pub bytes_read: u64,
    pub bytes_written: u64,
}

/// Trims a range down to the complete lines it contains.
///
/// The first line is dropped when the range does not start at the beginning
/// of the file; the last line is dropped unless it ends with a line feed.
pub fn trim_to_full_lines(data: &[u8], starts_at_file_begin: bool) -> &[u8] {
    let mut out = data;
    if !starts_at_file_begin {
        out = match out.iter().position(|&b| b == b'\n') {
            Some(idx) => &out[idx + 1..],
            None => &[],
        };
    }
    if out.last().is_some_and(|&b| b != b'\n') {
        out = match out.iter().rposition(|&b| b == b'\n') {
            Some(idx) => &out[..=idx],
            None => &[],
        };
    }
    out
}

/// Copies the requested range of `path` into `out`.
pub fn slice_file<W: Write>(path: &Path, request: SliceRequest, policy: &ChunkPolicy, out: &mut W) -> Result<SliceSummary, SliceError> {
    if request.size == 0 {
        return Err(SliceError::EmptySize);
    }
    let end = request
        .start
        .checked_add(request.size)
        .ok_or(SliceError::RangeOverflow)?;

    let mut file = File::open(path).map_err(|source| SliceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = file.metadata().map_err(|source| SliceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(SliceError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }

    let file_size = metadata.len();
    if request.start >= file_size {
        debug!(start = request.start, file_size, "start position is beyond end of file");
        return Ok(SliceSummary::default());
    }
    let to_read = end.min(file_size) - request.start;
    let chunk_size = policy.resolve(file_size);
    debug!(file_size, chunk_size, start = request.start, to_read, "slicing file");

    file.seek(SeekFrom::Start(request.start))
        .map_err(|source| SliceError::Seek {
            offset: request.start,
            source,
        })?;

    let mut buffer = allocate(chunk_size)?;
    buffer.resize(chunk_size, 0);

    let mut collected = if request.full_lines_only {
        allocate(usize::try_from(to_read).unwrap_or(usize::MAX))?
    } else {
        Vec::new()
    };

    let mut summary = SliceSummary::default();
    while summary.bytes_read < to_read {
        let want = (to_read - summary.bytes_read).min(chunk_size as u64) as usize;
        let read = match file.read(&mut buffer[..want]) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SliceError::Read(e)),
        };
        summary.bytes_read += read as u64;

        if request.full_lines_only {
            collected.extend_from_slice(&buffer[..read]);
        } else {
            out.write_all(&buffer[..read]).map_err(SliceError::Write)?;
            summary.bytes_written += read as u64;
        }
    }

    if request.full_lines_only {
        let lines = trim_to_full_lines(&collected, request.start == 0);
        debug!(output = lines.len(), "trimmed to full lines");
        if lines.is_empty() && !collected.is_empty() {
            debug!("all content was trimmed, the range may not contain a complete line");
        }
        out.write_all(lines).map_err(SliceError::Write)?;
        summary.bytes_written = lines.len() as u64;
    }
    out.flush().map_err(SliceError::Write)?;
    Ok(summary)
}

fn allocate(capacity: usize) -> Result<Vec<u8>, SliceError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|source| SliceError::Allocation {
            requested: capacity,
            source,
        })?;
    Ok(buffer)
}
