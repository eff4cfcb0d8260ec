// src/model.rs

use serde::Serialize;
use std::path::PathBuf;

/// Number of buckets in a line-length histogram
pub const HISTOGRAM_BUCKETS: usize = 10;

/// Upper bound of the first histogram bucket; each following bucket doubles it
pub const FIRST_BUCKET_BOUND: u64 = 64;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * 1024;

/// Human-readable label for each histogram bucket
pub const BUCKET_LABELS: [&str; HISTOGRAM_BUCKETS] = [
    "0-64 bytes",
    "65-128 bytes",
    "129-256 bytes",
    "257-512 bytes",
    "513-1KB",
    "1KB-2KB",
    "2KB-4KB",
    "4KB-8KB",
    "8KB-16KB",
    "16KB+",
];

/// Index of the smallest bucket whose upper bound is >= `length`,
/// or the last bucket when `length` exceeds every finite bound.
pub fn bucket_index(length: u64) -> usize {
    let mut bucket = 0;
    let mut bound = FIRST_BUCKET_BOUND;
    while bucket < HISTOGRAM_BUCKETS - 1 && length > bound {
        bucket += 1;
        bound *= 2;
    }
    bucket
}

/// Line statistics for a single file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LineStats {
    pub total_lines: u64,
    /// Length in bytes of the longest line, excluding its line feed
    pub max_line_length: u64,
    /// Byte offset where the longest line starts
    pub max_line_position: u64,
    pub avg_line_length: f64,
    pub lines_over_1k: u64,
    pub lines_over_10k: u64,
    pub lines_over_100k: u64,
    pub lines_over_1m: u64,
    pub histogram: [u64; HISTOGRAM_BUCKETS],
}

impl LineStats {
    pub fn bucket_percentage(&self, bucket: usize) -> f64 {
        if self.total_lines == 0 {
            return 0.0;
        }
        self.histogram[bucket] as f64 * 100.0 / self.total_lines as f64
    }
}

/// Aggregate statistics for a corpus of files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    /// Files successfully analyzed
    pub file_count: u64,
    pub total_lines_analyzed: u64,
    pub max_line_across_corpus: u64,
    /// Index into the input path list of the file owning the longest line
    pub max_line_file_index: Option<usize>,
    pub max_line_file: Option<PathBuf>,
    /// Line-count weighted average of per-file averages
    pub avg_line_length_corpus: f64,
    /// Files containing at least one line over 100KB
    pub files_with_long_lines: u64,
    /// Files containing at least one line over 1MB
    pub files_with_very_long_lines: u64,
}

impl CorpusStats {
    pub fn long_line_file_percentage(&self) -> f64 {
        percentage(self.files_with_long_lines, self.file_count)
    }

    pub fn very_long_line_file_percentage(&self) -> f64 {
        percentage(self.files_with_very_long_lines, self.file_count)
    }
}

/// A corpus file that could not be analyzed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub index: usize,
    pub path: PathBuf,
    pub reason: String,
}

/// The complete results of a corpus run
#[derive(Debug, Clone, Serialize)]
pub struct CorpusAnalysis {
    pub stats: CorpusStats,
    pub skipped: Vec<SkippedFile>,
    /// Number of files selected for analysis (after sampling)
    pub selected: usize,
    pub seed: u64,
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_bounds_are_inclusive() {
        assert_eq!(bucket_index(0), 0);
        assert_eq!(bucket_index(64), 0);
        assert_eq!(bucket_index(65), 1);
        assert_eq!(bucket_index(128), 1);
        assert_eq!(bucket_index(1024), 4);
        assert_eq!(bucket_index(16 * 1024), 8);
        assert_eq!(bucket_index(16 * 1024 + 1), 9);
        assert_eq!(bucket_index(u64::MAX), 9);
    }

    #[test]
    fn percentages_handle_empty_totals() {
        let stats = LineStats::default();
        assert_eq!(stats.bucket_percentage(0), 0.0);

        let corpus = CorpusStats {
            file_count: 4,
            files_with_long_lines: 1,
            ..CorpusStats::default()
        };
        assert_eq!(corpus.long_line_file_percentage(), 25.0);
        assert_eq!(corpus.very_long_line_file_percentage(), 0.0);
    }
}
