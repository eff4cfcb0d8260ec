// src/error.rs

//! Error types for every stage of an analysis run.
//!
//! Scan errors are fatal to the one file being scanned. The corpus
//! aggregator downgrades them to skipped files and only fails when nothing
//! could be scanned at all.

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

/// Failure while scanning a single file
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("cannot open file '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("cannot read metadata for '{path}': {source}")]
    Metadata { path: PathBuf, source: io::Error },
    #[error("not a regular file: {path}")]
    NotRegularFile { path: PathBuf },
    #[error("read failed after {offset} bytes: {source}")]
    Read { offset: u64, source: io::Error },
    #[error("memory allocation failed for {requested} bytes: {source}")]
    Allocation {
        requested: usize,
        source: TryReserveError,
    },
    #[error("arithmetic overflow in {what}")]
    Overflow { what: &'static str },
}

/// Failure of a whole corpus run
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("corpus contains no files")]
    EmptyCorpus,
    #[error("no files were successfully analyzed ({attempted} attempted)")]
    NothingScanned { attempted: usize },
}

/// Failure to produce the list of files to analyze
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("cannot open directory '{path}': {source}")]
    OpenDirectory { path: PathBuf, source: io::Error },
    #[error("no matching files found in directory '{path}'")]
    NoMatchingFiles { path: PathBuf },
    #[error("cannot open file list {path}: {source}")]
    OpenList { path: PathBuf, source: io::Error },
    #[error("cannot read file list {path}: {source}")]
    ReadList { path: PathBuf, source: io::Error },
    #[error("no files found in file list {path}")]
    EmptyList { path: PathBuf },
}

/// Failure to write the generated configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot create config file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Failure while extracting a byte range
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    #[error("size must be greater than zero")]
    EmptySize,
    #[error("start + size causes overflow")]
    RangeOverflow,
    #[error("cannot open file '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("not a regular file: {path}")]
    NotRegularFile { path: PathBuf },
    #[error("cannot seek to offset {offset}: {source}")]
    Seek { offset: u64, source: io::Error },
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("memory allocation failed for {requested} bytes: {source}")]
    Allocation {
        requested: usize,
        source: TryReserveError,
    },
}

/// Invalid combination of command-line arguments
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("either --file <FILE> or --directory <PATH> is required")]
    MissingSingleInput,
    #[error("either --file-list <FILE> or --directory <PATH> is required for corpus analysis")]
    MissingCorpusInput,
}
