// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use linex::analyzer::analyze_file;
use linex::chunking::ChunkPolicy;
use linex::cli::{Args, CorpusSource, Mode};
use linex::config::write_config;
use linex::corpus::CorpusAnalyzer;
use linex::discovery::{read_file_list, scan_directory};
use linex::error::ScanError;
use linex::markdown::{analyze_markdown_file, MarkdownStats};
use linex::renderer::{self, OutputFormat};
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

const SEPARATOR: &str = "========================================";

fn main() -> Result<()> {
    let args = Args::parse();
    linex::logging::init(args.debug)?;
    let start_time = Instant::now();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let policy = ChunkPolicy::computed();

    match args.mode()? {
        Mode::Single { file, markdown } => {
            report_file(&mut out, &file, &policy, markdown, args.format)?;
        }
        Mode::DirectoryReport {
            path,
            extension,
            recursive,
            markdown,
        } => {
            let files = scan_directory(&path, extension.as_deref(), recursive)?;
            for (i, file) in files.iter().enumerate() {
                if i > 0 && args.format == OutputFormat::Text {
                    writeln!(out, "\n{SEPARATOR}\n")?;
                }
                if let Err(e) = report_file(&mut out, file, &policy, markdown, args.format) {
                    warn!(path = %file.display(), error = %e, "error analyzing file, skipping");
                }
            }
        }
        Mode::Corpus {
            source,
            sample,
            seed,
            config_output,
        } => {
            let files = match source {
                CorpusSource::List(list) => read_file_list(&list)?,
                CorpusSource::Directory {
                    path,
                    extension,
                    recursive,
                } => scan_directory(&path, extension.as_deref(), recursive)?,
            };
            debug!(count = files.len(), "collected corpus files");

            let analysis = CorpusAnalyzer::new(policy)
                .with_sample(sample, seed)
                .with_progress(ProgressBar::new(files.len() as u64))
                .analyze(&files)?;

            renderer::write_corpus_report(&mut out, &analysis, args.format)?;
            write_config(&config_output, &analysis.stats)?;
            if args.format == OutputFormat::Text {
                writeln!(out, "\nGenerated configuration file: {}", config_output.display())?;
                writeln!(out, "To use: source {}", config_output.display())?;
            }
        }
    }

    if args.format == OutputFormat::Text {
        writeln!(out, "\nTotal time: {:.2?}", start_time.elapsed())?;
    }
    out.flush()?;
    Ok(())
}

fn report_file<W: Write>(out: &mut W, path: &Path, policy: &ChunkPolicy, markdown: bool, format: OutputFormat) -> Result<()> {
    let stats = analyze_file(path, policy).with_context(|| format!("error analyzing file {}", path.display()))?;
    renderer::write_file_report(out, path, &stats, format)?;

    if markdown {
        write_markdown_section(out, path, analyze_markdown_file(path), format)?;
    }
    Ok(())
}

/// A failed markdown pass only costs the markdown section of the report.
fn write_markdown_section<W: Write>(out: &mut W, path: &Path, structure: Result<MarkdownStats, ScanError>, format: OutputFormat) -> io::Result<()> {
    match structure {
        Ok(structure) => renderer::write_markdown_report(out, path, &structure, format),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "markdown analysis failed");
            Ok(())
        }
    }
}
