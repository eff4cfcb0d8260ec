// src/cli.rs

use crate::config::DEFAULT_CONFIG_PATH;
use crate::error::CliError;
use crate::renderer::OutputFormat;
use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser, Debug)]
#[command(author, version, about = "Line length analysis for chunked file processing", long_about = None)]
pub struct Args {
    /// File to analyze
    #[arg(short, long, conflicts_with = "directory")]
    pub file: Option<PathBuf>,

    /// Directory of files to analyze
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Aggregate all files into one corpus report and write a config file
    #[arg(short, long)]
    pub corpus_analysis: bool,

    /// File containing one path per line, for corpus analysis
    #[arg(short = 'l', long, conflicts_with = "directory")]
    pub file_list: Option<PathBuf>,

    /// Only consider files whose name ends with this suffix (e.g. ".log")
    #[arg(short, long)]
    pub extension: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Analyze a random sample of this many files
    #[arg(short, long)]
    pub sample: Option<NonZeroUsize>,

    /// Seed for sampling; defaults to the current time
    #[arg(long)]
    pub seed: Option<u64>,

    /// Where to write the generated configuration
    #[arg(short = 'o', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config_output: PathBuf,

    /// Also report markdown structure
    #[arg(short, long)]
    pub markdown: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub debug: bool,
}

/// Where a corpus run gets its file list from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    List(PathBuf),
    Directory {
        path: PathBuf,
        extension: Option<String>,
        recursive: bool,
    },
}

/// What a `linex` invocation does, after flag validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single {
        file: PathBuf,
        markdown: bool,
    },
    DirectoryReport {
        path: PathBuf,
        extension: Option<String>,
        recursive: bool,
        markdown: bool,
    },
    Corpus {
        source: CorpusSource,
        sample: Option<NonZeroUsize>,
        seed: u64,
        config_output: PathBuf,
    },
}

impl Args {
    /// Resolves the run mode. Flags that have no effect in the chosen mode
    /// are reported and ignored.
    pub fn mode(&self) -> Result<Mode, CliError> {
        if self.corpus_analysis {
            return self.corpus_mode();
        }
        if self.file_list.is_some() {
            warn!("--file-list is only used with --corpus-analysis, ignoring");
        }
        if self.sample.is_some() || self.seed.is_some() {
            warn!("--sample and --seed are only used with --corpus-analysis, ignoring");
        }

        if let Some(file) = &self.file {
            if self.extension.is_some() || self.recursive {
                warn!("--extension and --recursive require --directory, ignoring");
            }
            return Ok(Mode::Single {
                file: file.clone(),
                markdown: self.markdown,
            });
        }

        match &self.directory {
            Some(path) => Ok(Mode::DirectoryReport {
                path: path.clone(),
                extension: self.extension.clone(),
                recursive: self.recursive,
                markdown: self.markdown,
            }),
            None => Err(CliError::MissingSingleInput),
        }
    }

    fn corpus_mode(&self) -> Result<Mode, CliError> {
        if self.markdown {
            warn!("markdown analysis is not supported in corpus mode, ignoring");
        }
        if self.file.is_some() {
            warn!("--file is not used in corpus mode, ignoring");
        }

        let source = match (&self.file_list, &self.directory) {
            (Some(list), _) => {
                if self.extension.is_some() || self.recursive {
                    warn!("--extension and --recursive require --directory, ignoring");
                }
                CorpusSource::List(list.clone())
            }
            (None, Some(path)) => CorpusSource::Directory {
                path: path.clone(),
                extension: self.extension.clone(),
                recursive: self.recursive,
            },
            (None, None) => return Err(CliError::MissingCorpusInput),
        };

        let seed = self
            .seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp().unsigned_abs());

        Ok(Mode::Corpus {
            source,
            sample: self.sample,
            seed,
            config_output: self.config_output.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("linex").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn single_file_mode() {
        let mode = parse(&["--file", "a.txt", "--markdown"]).mode().unwrap();
        assert_eq!(
            mode,
            Mode::Single {
                file: PathBuf::from("a.txt"),
                markdown: true
            }
        );
    }

    #[test]
    fn directory_report_mode() {
        let mode = parse(&["-d", "logs", "-e", ".log", "-r"]).mode().unwrap();
        assert_eq!(
            mode,
            Mode::DirectoryReport {
                path: PathBuf::from("logs"),
                extension: Some(".log".to_string()),
                recursive: true,
                markdown: false
            }
        );
    }

    #[test]
    fn corpus_mode_from_list_with_sample() {
        let mode = parse(&["-c", "-l", "files.txt", "-s", "10", "--seed", "7"])
            .mode()
            .unwrap();
        assert_eq!(
            mode,
            Mode::Corpus {
                source: CorpusSource::List(PathBuf::from("files.txt")),
                sample: NonZeroUsize::new(10),
                seed: 7,
                config_output: PathBuf::from(".linexrc"),
            }
        );
    }

    #[test]
    fn corpus_mode_ignores_markdown() {
        let mode = parse(&["-c", "-d", "data", "-m", "-o", "out.rc"]).mode().unwrap();
        match mode {
            Mode::Corpus {
                source,
                config_output,
                ..
            } => {
                assert_eq!(
                    source,
                    CorpusSource::Directory {
                        path: PathBuf::from("data"),
                        extension: None,
                        recursive: false
                    }
                );
                assert_eq!(config_output, PathBuf::from("out.rc"));
            }
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[test]
    fn missing_inputs_are_errors() {
        assert!(matches!(parse(&[]).mode(), Err(CliError::MissingSingleInput)));
        assert!(matches!(
            parse(&["--corpus-analysis"]).mode(),
            Err(CliError::MissingCorpusInput)
        ));
    }

    #[test]
    fn conflicting_and_invalid_flags_are_rejected() {
        assert!(Args::try_parse_from(["linex", "-f", "a", "-d", "b"]).is_err());
        assert!(Args::try_parse_from(["linex", "-c", "-l", "a", "-d", "b"]).is_err());
        assert!(Args::try_parse_from(["linex", "-c", "-d", "b", "--sample", "0"]).is_err());
        assert!(Args::try_parse_from(["linex", "-f", "a", "--format", "xml"]).is_err());
        assert_eq!(parse(&["-f", "a", "--format", "json"]).format, OutputFormat::Json);
    }
}
