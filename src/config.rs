// src/config.rs

//! Writes the shell-sourceable chunk-size configuration produced by a corpus run.

use crate::chunking::{recommended_chunk_size, CHUNK_SIZE_ENV};
use crate::error::ConfigError;
use crate::model::CorpusStats;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default location of the generated configuration
pub const DEFAULT_CONFIG_PATH: &str = ".linexrc";

/// Renders the configuration text for `stats`, stamped with `generated_at`.
pub fn render_config(stats: &CorpusStats, generated_at: DateTime<Local>) -> String {
    let chunk_size = recommended_chunk_size(stats.max_line_across_corpus);
    let longest_in = stats
        .max_line_file
        .as_ref()
        .map_or_else(|| "unknown".to_string(), |path| path.display().to_string());

    format!(
        "# linex corpus configuration\n\
         # Generated on {generated}\n\
         # Based on analysis of {files} files\n\
         \n\
         # Recommended chunk size for this corpus\n\
         export {CHUNK_SIZE_ENV}={chunk_size}\n\
         \n\
         # Corpus statistics\n\
         # Longest line: {longest} bytes in file: {longest_in}\n\
         # Average line length: {average:.1} bytes\n\
         # Files with lines >100KB: {long} of {files} ({long_pct:.1}%)\n\
         # Files with lines >1MB: {very_long} of {files} ({very_long_pct:.1}%)\n\
         \n\
         # Sample command with optimal chunk size:\n\
         # linex-slice --start 0 --size 1048576 --file your_file.txt --full-lines-only\n",
        generated = generated_at.format("%Y-%m-%d %H:%M:%S"),
        files = stats.file_count,
        longest = stats.max_line_across_corpus,
        average = stats.avg_line_length_corpus,
        long = stats.files_with_long_lines,
        long_pct = stats.long_line_file_percentage(),
        very_long = stats.files_with_very_long_lines,
        very_long_pct = stats.very_long_line_file_percentage(),
    )
}

/// Overwrites `path` with the configuration for `stats`.
pub fn write_config(path: &Path, stats: &CorpusStats) -> Result<(), ConfigError> {
    let text = render_config(stats, Local::now());
    fs::write(path, text).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "generated configuration file");
    Ok(())
}
