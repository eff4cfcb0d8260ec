// src/corpus.rs

//! Corpus aggregation: folds per-file [`LineStats`] into one [`CorpusStats`].
//!
//! Files that fail to scan are skipped with a warning. The run only fails
//! when every selected file failed.

use crate::analyzer::analyze_file;
use crate::chunking::ChunkPolicy;
use crate::error::{CorpusError, ScanError};
use crate::model::*;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Picks `sample_size` distinct indices out of `0..file_count`.
///
/// Returns `None` when every file should be analyzed, either because no
/// sample was requested or because it would cover the whole corpus.
///
/// Indices are drawn uniformly and duplicates rejected. This stays cheap
/// while the sample is a small fraction of the corpus and slows down as
/// `sample_size` approaches `file_count`.
pub fn select_sample(file_count: usize, sample_size: Option<NonZeroUsize>, seed: u64) -> Option<BTreeSet<usize>> {
    let sample_size = sample_size?.get();
    if sample_size >= file_count {
        warn!(
            sample_size,
            file_count, "sample size is not smaller than file count, using all files"
        );
        return None;
    }

    debug!(sample_size, file_count, seed, "sampling corpus");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut selected = BTreeSet::new();
    while selected.len() < sample_size {
        selected.insert(rng.gen_range(0..file_count));
    }
    Some(selected)
}

/// Running totals for a corpus; call [`CorpusAccumulator::finish`] once.
#[derive(Debug, Default)]
pub struct CorpusAccumulator {
    stats: CorpusStats,
    weighted_length_sum: f64,
}

impl CorpusAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in the stats of the file at `index` in the input list.
    pub fn add(&mut self, index: usize, path: &Path, file: &LineStats) {
        let stats = &mut self.stats;
        stats.file_count += 1;
        stats.total_lines_analyzed = stats.total_lines_analyzed.saturating_add(file.total_lines);

        if file.max_line_length > stats.max_line_across_corpus {
            stats.max_line_across_corpus = file.max_line_length;
            stats.max_line_file_index = Some(index);
            stats.max_line_file = Some(path.to_path_buf());
        }

        self.weighted_length_sum += file.avg_line_length * file.total_lines as f64;

        if file.lines_over_100k > 0 {
            stats.files_with_long_lines += 1;
        }
        if file.lines_over_1m > 0 {
            stats.files_with_very_long_lines += 1;
        }
    }

    pub fn file_count(&self) -> u64 {
        self.stats.file_count
    }

    pub fn finish(mut self) -> CorpusStats {
        if self.stats.total_lines_analyzed > 0 {
            self.stats.avg_line_length_corpus =
                self.weighted_length_sum / self.stats.total_lines_analyzed as f64;
        }
        self.stats
    }
}

/// Analyzes a list of files as one corpus
#[derive(Clone)]
pub struct CorpusAnalyzer {
    policy: ChunkPolicy,
    sample_size: Option<NonZeroUsize>,
    seed: u64,
    progress: ProgressBar,
}

impl CorpusAnalyzer {
    pub fn new(policy: ChunkPolicy) -> Self {
        Self {
            policy,
            sample_size: None,
            seed: 0,
            progress: ProgressBar::hidden(),
        }
    }

    /// Restricts the run to a reproducible random sample of files
    pub fn with_sample(mut self, sample_size: Option<NonZeroUsize>, seed: u64) -> Self {
        self.sample_size = sample_size;
        self.seed = seed;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn analyze(&self, paths: &[PathBuf]) -> Result<CorpusAnalysis, CorpusError> {
        self.analyze_with(paths, |path| analyze_file(path, &self.policy))
    }

    /// Runs the aggregation with a caller-supplied per-file scan.
    pub fn analyze_with<F>(&self, paths: &[PathBuf], mut scan: F) -> Result<CorpusAnalysis, CorpusError>
    where
        F: FnMut(&Path) -> Result<LineStats, ScanError>,
    {
        if paths.is_empty() {
            return Err(CorpusError::EmptyCorpus);
        }

        let sample = select_sample(paths.len(), self.sample_size, self.seed);
        let selected = sample.as_ref().map_or(paths.len(), BTreeSet::len);

        self.progress.set_length(selected as u64);
        self.progress.set_message("Analyzing files");

        let mut accumulator = CorpusAccumulator::new();
        let mut skipped = Vec::new();

        for (index, path) in paths.iter().enumerate() {
            if sample.as_ref().is_some_and(|sample| !sample.contains(&index)) {
                continue;
            }

            debug!(
                file = skipped.len() as u64 + accumulator.file_count() + 1,
                of = selected,
                path = %path.display(),
                "analyzing file"
            );

            match scan(path) {
                Ok(stats) => accumulator.add(index, path, &stats),
                Err(e) => {
                    self.progress.suspend(|| {
                        warn!(path = %path.display(), error = %e, "error analyzing file, skipping")
                    });
                    skipped.push(SkippedFile {
                        index,
                        path: path.clone(),
                        reason: e.to_string(),
                    });
                }
            }
            self.progress.inc(1);
        }
        self.progress.finish_with_message("Analysis complete");

        if accumulator.file_count() == 0 {
            return Err(CorpusError::NothingScanned { attempted: selected });
        }
        debug!(analyzed = accumulator.file_count(), "corpus analysis finished");

        Ok(CorpusAnalysis {
            stats: accumulator.finish(),
            skipped,
            selected,
            seed: self.seed,
        })
    }
}
