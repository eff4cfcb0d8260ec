// src/renderer.rs

use crate::chunking::{next_power_of_two, CHUNK_SIZE_ENV, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
use crate::markdown::{Component, MarkdownStats};
use crate::model::*;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};
use std::path::Path;

const RULE: &str = "----------------------------------------";
const FULL_LINES_EMPTY: &str = "Using '--full-lines-only' may result in empty output for some slices";
const FULL_LINES_FILTER: &str = "Be aware that '--full-lines-only' may filter out content";

/// Output format for reports
#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Caution,
    Warning,
}

/// Chunk-size recommendation derived from a longest-line length
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub optimal_chunk_size: u64,
    pub optimal_chunk_size_kb: f64,
    /// `optimal_chunk_size` limited to what `SLICE_CHUNK_SIZE` accepts
    pub export_chunk_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub suggestion: String,
    pub severity: Severity,
}

impl Recommendation {
    pub fn for_file(stats: &LineStats) -> Self {
        let (severity, warning, suggestion) = if stats.max_line_length > MIB {
            (
                Severity::Warning,
                Some("File contains extremely long lines (>1MB)".to_string()),
                FULL_LINES_EMPTY.to_string(),
            )
        } else if stats.lines_over_100k > 0 {
            (
                Severity::Caution,
                Some("File contains very long lines (>100KB)".to_string()),
                FULL_LINES_FILTER.to_string(),
            )
        } else {
            (Severity::None, None, "No specific warnings for this file".to_string())
        };
        Self::new(stats.max_line_length, severity, warning, suggestion)
    }

    pub fn for_corpus(stats: &CorpusStats) -> Self {
        let (severity, warning, suggestion) = if stats.max_line_across_corpus > MIB {
            (
                Severity::Warning,
                Some("Corpus contains extremely long lines (>1MB)".to_string()),
                FULL_LINES_EMPTY.to_string(),
            )
        } else if stats.files_with_long_lines > 0 {
            (
                Severity::Caution,
                Some(format!(
                    "{:.1}% of files contain very long lines (>100KB)",
                    stats.long_line_file_percentage()
                )),
                FULL_LINES_FILTER.to_string(),
            )
        } else {
            (Severity::None, None, "No specific warnings for this corpus".to_string())
        };
        Self::new(stats.max_line_across_corpus, severity, warning, suggestion)
    }

    fn new(max_line: u64, severity: Severity, warning: Option<String>, suggestion: String) -> Self {
        let optimal_chunk_size = next_power_of_two(max_line);
        Self {
            optimal_chunk_size,
            optimal_chunk_size_kb: optimal_chunk_size as f64 / 1024.0,
            export_chunk_size: optimal_chunk_size.clamp(MIN_CHUNK_SIZE as u64, MAX_CHUNK_SIZE as u64),
            warning,
            suggestion,
            severity,
        }
    }
}

pub fn write_file_report<W: Write>(out: &mut W, path: &Path, stats: &LineStats, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_file_text(out, path, stats),
        OutputFormat::Json => write_file_json(out, path, stats),
    }
}

pub fn write_corpus_report<W: Write>(out: &mut W, analysis: &CorpusAnalysis, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_corpus_text(out, analysis),
        OutputFormat::Json => write_corpus_json(out, analysis),
    }
}

pub fn write_markdown_report<W: Write>(out: &mut W, path: &Path, stats: &MarkdownStats, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => write_markdown_text(out, path, stats),
        OutputFormat::Json => write_markdown_json(out, path, stats),
    }
}

fn write_file_text<W: Write>(out: &mut W, path: &Path, stats: &LineStats) -> io::Result<()> {
    let name = path.display();
    writeln!(out, "LINE LENGTH ANALYSIS FOR: {name}")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Total lines:                 {}", stats.total_lines)?;
    writeln!(out, "Longest line:                {} bytes", stats.max_line_length)?;
    writeln!(out, "Position of longest line:    byte offset {}", stats.max_line_position)?;
    if stats.total_lines > 0 {
        writeln!(out, "Average line length:         {:.1} bytes", stats.avg_line_length)?;
    }

    writeln!(out, "\nLINE LENGTH DISTRIBUTION:\n{RULE}")?;
    writeln!(out, "Lines over 1KB:              {}", stats.lines_over_1k)?;
    writeln!(out, "Lines over 10KB:             {}", stats.lines_over_10k)?;
    writeln!(out, "Lines over 100KB:            {}", stats.lines_over_100k)?;
    writeln!(out, "Lines over 1MB:              {}", stats.lines_over_1m)?;

    writeln!(out, "\nHISTOGRAM OF LINE LENGTHS:\n{RULE}")?;
    for (bucket, label) in BUCKET_LABELS.iter().enumerate() {
        writeln!(
            out,
            "{:<20} {} lines ({:.1}%)",
            label,
            stats.histogram[bucket],
            stats.bucket_percentage(bucket)
        )?;
    }

    if stats.max_line_length == 0 {
        return Ok(());
    }

    let advice = Recommendation::for_file(stats);
    writeln!(out, "\nRECOMMENDATIONS:\n{RULE}")?;
    writeln!(
        out,
        "Optimal minimum chunk size: {} bytes ({:.2} KB)",
        advice.optimal_chunk_size, advice.optimal_chunk_size_kb
    )?;
    match advice.severity {
        Severity::Warning => {
            writeln!(out, "\n! WARNING: File contains extremely long lines (>1MB)")?;
            writeln!(out, "  - {FULL_LINES_EMPTY}")?;
            writeln!(out, "  - Consider processing this file without '--full-lines-only'")?;
        }
        Severity::Caution => {
            writeln!(out, "\n! CAUTION: File contains very long lines (>100KB)")?;
            writeln!(out, "  - {FULL_LINES_FILTER}")?;
        }
        Severity::None => {}
    }

    writeln!(out, "\nSample commands:")?;
    writeln!(out, "  # Extract the longest line:")?;
    writeln!(
        out,
        "  linex-slice --start {} --size {} --file {name}\n",
        stats.max_line_position, stats.max_line_length
    )?;
    writeln!(out, "  # Process with optimal chunk size:")?;
    writeln!(out, "  export {CHUNK_SIZE_ENV}={}", advice.export_chunk_size)?;
    writeln!(out, "  linex-slice --start 0 --size 1048576 --file {name} --full-lines-only")
}

fn write_file_json<W: Write>(out: &mut W, path: &Path, stats: &LineStats) -> io::Result<()> {
    let advice = Recommendation::for_file(stats);
    let histogram: Vec<_> = BUCKET_LABELS
        .iter()
        .enumerate()
        .map(|(bucket, label)| {
            json!({
                "range": label,
                "count": stats.histogram[bucket],
                "percentage": round1(stats.bucket_percentage(bucket)),
            })
        })
        .collect();
    let name = path.display().to_string();
    let report = json!({
        "filename": name,
        "stats": {
            "total_lines": stats.total_lines,
            "max_line_length": stats.max_line_length,
            "max_line_position": stats.max_line_position,
            "avg_line_length": stats.avg_line_length,
            "lines_over_1k": stats.lines_over_1k,
            "lines_over_10k": stats.lines_over_10k,
            "lines_over_100k": stats.lines_over_100k,
            "lines_over_1m": stats.lines_over_1m,
        },
        "histogram": histogram,
        "recommendations": advice,
        "commands": {
            "extract_longest_line": format!(
                "linex-slice --start {} --size {} --file {name}",
                stats.max_line_position, stats.max_line_length
            ),
            "set_optimal_chunk_size": format!("export {CHUNK_SIZE_ENV}={}", advice.export_chunk_size),
        },
    });
    write_json(out, &report)
}

fn write_corpus_text<W: Write>(out: &mut W, analysis: &CorpusAnalysis) -> io::Result<()> {
    let stats = &analysis.stats;
    writeln!(out, "CORPUS LINE LENGTH ANALYSIS\n{RULE}")?;
    writeln!(out, "Files analyzed:             {}", stats.file_count)?;
    if !analysis.skipped.is_empty() {
        writeln!(out, "Files skipped:              {}", analysis.skipped.len())?;
    }
    writeln!(out, "Total lines across corpus:  {}", stats.total_lines_analyzed)?;
    writeln!(out, "Longest line in corpus:     {} bytes", stats.max_line_across_corpus)?;
    writeln!(out, "Found in file:              {}", max_line_file(stats))?;
    if stats.total_lines_analyzed > 0 {
        writeln!(out, "Average line length:        {:.2} bytes", stats.avg_line_length_corpus)?;
    }

    writeln!(out, "\nFILE DISTRIBUTION:\n{RULE}")?;
    writeln!(
        out,
        "Files with lines >100KB:    {} ({:.1}%)",
        stats.files_with_long_lines,
        stats.long_line_file_percentage()
    )?;
    writeln!(
        out,
        "Files with lines >1MB:      {} ({:.1}%)",
        stats.files_with_very_long_lines,
        stats.very_long_line_file_percentage()
    )?;

    let advice = Recommendation::for_corpus(stats);
    writeln!(out, "\nRECOMMENDATIONS:\n{RULE}")?;
    writeln!(
        out,
        "Optimal corpus-wide chunk size: {} bytes ({:.2} KB)",
        advice.optimal_chunk_size, advice.optimal_chunk_size_kb
    )?;
    match advice.severity {
        Severity::Warning => {
            writeln!(out, "\n! WARNING: Corpus contains extremely long lines (>1MB)")?;
            writeln!(out, "  - {FULL_LINES_EMPTY}")?;
            writeln!(
                out,
                "  - Process files with very long lines separately or without '--full-lines-only'"
            )?;
        }
        Severity::Caution => {
            writeln!(
                out,
                "\n! CAUTION: {:.1}% of files contain very long lines (>100KB)",
                stats.long_line_file_percentage()
            )?;
            writeln!(out, "  - {FULL_LINES_FILTER}")?;
        }
        Severity::None => {}
    }

    if !analysis.skipped.is_empty() {
        writeln!(out, "\nSKIPPED FILES:\n{RULE}")?;
        for skipped in &analysis.skipped {
            writeln!(out, "{}: {}", skipped.path.display(), skipped.reason)?;
        }
    }
    Ok(())
}

fn write_corpus_json<W: Write>(out: &mut W, analysis: &CorpusAnalysis) -> io::Result<()> {
    let stats = &analysis.stats;
    let report = json!({
        "corpus_stats": {
            "files_analyzed": stats.file_count,
            "files_selected": analysis.selected,
            "total_lines": stats.total_lines_analyzed,
            "max_line_length": stats.max_line_across_corpus,
            "max_line_file": max_line_file(stats),
            "avg_line_length": stats.avg_line_length_corpus,
            "files_with_long_lines": stats.files_with_long_lines,
            "files_with_very_long_lines": stats.files_with_very_long_lines,
            "pct_files_with_long_lines": round1(stats.long_line_file_percentage()),
            "pct_files_with_very_long_lines": round1(stats.very_long_line_file_percentage()),
            "seed": analysis.seed,
        },
        "skipped": analysis.skipped,
        "recommendations": Recommendation::for_corpus(stats),
    });
    write_json(out, &report)
}

fn write_markdown_text<W: Write>(out: &mut W, path: &Path, stats: &MarkdownStats) -> io::Result<()> {
    writeln!(out, "\nMARKDOWN STRUCTURE ANALYSIS FOR: {}\n{RULE}", path.display())?;
    writeln!(out, "Component counts:")?;
    for component in Component::ALL {
        writeln!(out, "  {:<20} {}", component.name(), stats.count(component))?;
    }

    writeln!(out, "\nHeader level distribution:")?;
    for (level, count) in stats.header_levels.iter().enumerate() {
        writeln!(out, "  H{}: {count}", level + 1)?;
    }

    writeln!(
        out,
        "\nComponent density: {:.1} components per 1000 lines",
        stats.components_per_1000_lines
    )?;

    writeln!(out, "\nMax line lengths by component type:")?;
    for (component, length) in Component::ALL.iter().zip(stats.max_component_length) {
        if length > 0 {
            writeln!(out, "  {:<20} {length} characters", component.name())?;
        }
    }

    writeln!(out, "\nDocument structure summary:")?;
    writeln!(out, "  Total structural components: {}", stats.total_components)?;

    writeln!(out, "\nMARKDOWN INSIGHTS:\n{RULE}")?;
    for insight in stats.insights() {
        writeln!(out, "! {insight}")?;
    }
    Ok(())
}

fn write_markdown_json<W: Write>(out: &mut W, path: &Path, stats: &MarkdownStats) -> io::Result<()> {
    let by_name = |values: &[u64]| -> serde_json::Map<String, serde_json::Value> {
        Component::ALL
            .iter()
            .zip(values)
            .map(|(component, value)| (component.name().to_string(), json!(value)))
            .collect()
    };
    let header_levels: serde_json::Map<String, serde_json::Value> = stats
        .header_levels
        .iter()
        .enumerate()
        .map(|(level, count)| (format!("h{}", level + 1), json!(count)))
        .collect();

    let report = json!({
        "filename": path.display().to_string(),
        "markdown_stats": {
            "component_counts": by_name(&stats.component_counts[..]),
            "header_levels": header_levels,
            "max_line_lengths": by_name(&stats.max_component_length[..]),
            "component_density": round1(stats.components_per_1000_lines),
            "total_components": stats.total_components,
        },
        "insights": stats.insights(),
    });
    write_json(out, &report)
}

fn max_line_file(stats: &CorpusStats) -> String {
    stats
        .max_line_file
        .as_ref()
        .map_or_else(|| "unknown".to_string(), |path| path.display().to_string())
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn write_json<W: Write>(out: &mut W, value: &serde_json::Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn render_file(stats: &LineStats, format: OutputFormat) -> String {
        let mut out = Vec::new();
        write_file_report(&mut out, Path::new("data.txt"), stats, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_report_includes_recommendations() {
        let stats = LineStats {
            total_lines: 3,
            max_line_length: 300,
            max_line_position: 42,
            avg_line_length: 120.0,
            histogram: [1, 1, 0, 1, 0, 0, 0, 0, 0, 0],
            ..LineStats::default()
        };
        let text = render_file(&stats, OutputFormat::Text);
        assert!(text.contains("LINE LENGTH ANALYSIS FOR: data.txt"));
        assert!(text.contains("Optimal minimum chunk size: 512 bytes (0.50 KB)"));
        assert!(text.contains("linex-slice --start 42 --size 300 --file data.txt"));
        assert!(text.contains("export SLICE_CHUNK_SIZE=16384\n"));
        assert!(!text.contains("WARNING"));
    }

    #[test]
    fn exported_chunk_size_is_accepted_by_the_slicer() {
        let stats = LineStats {
            total_lines: 1,
            max_line_length: 20 * MIB,
            lines_over_1m: 1,
            ..LineStats::default()
        };
        let advice = Recommendation::for_file(&stats);
        assert_eq!(advice.optimal_chunk_size, 32 * MIB);
        assert_eq!(advice.export_chunk_size, MAX_CHUNK_SIZE as u64);
        assert_eq!(
            crate::chunking::parse_override(&advice.export_chunk_size.to_string()),
            Some(MAX_CHUNK_SIZE)
        );

        let text = render_file(&stats, OutputFormat::Text);
        assert!(text.contains("Optimal minimum chunk size: 33554432 bytes"));
        assert!(text.contains("export SLICE_CHUNK_SIZE=16777216\n"));

        let value: serde_json::Value = serde_json::from_str(&render_file(&stats, OutputFormat::Json)).unwrap();
        assert_eq!(value["commands"]["set_optimal_chunk_size"], "export SLICE_CHUNK_SIZE=16777216");
        assert_eq!(value["recommendations"]["export_chunk_size"], 16_777_216);
    }

    #[test]
    fn empty_file_has_no_recommendations() {
        let text = render_file(&LineStats::default(), OutputFormat::Text);
        assert!(!text.contains("RECOMMENDATIONS"));
        assert!(!text.contains("Average line length"));
    }

    #[test]
    fn json_report_is_valid() {
        let stats = LineStats {
            total_lines: 1,
            max_line_length: 2 * MIB,
            lines_over_1k: 1,
            lines_over_10k: 1,
            lines_over_100k: 1,
            lines_over_1m: 1,
            histogram: [0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            ..LineStats::default()
        };
        let value: serde_json::Value = serde_json::from_str(&render_file(&stats, OutputFormat::Json)).unwrap();
        assert_eq!(value["stats"]["total_lines"], 1);
        assert_eq!(value["histogram"][9]["percentage"], 100.0);
        assert_eq!(value["recommendations"]["severity"], "warning");
        assert_eq!(value["recommendations"]["optimal_chunk_size"], 2 * MIB);
    }

    #[test]
    fn corpus_report_lists_skipped_files() {
        let analysis = CorpusAnalysis {
            stats: CorpusStats {
                file_count: 2,
                total_lines_analyzed: 10,
                max_line_across_corpus: 200 * KIB,
                max_line_file_index: Some(0),
                max_line_file: Some(PathBuf::from("big.log")),
                avg_line_length_corpus: 12.5,
                files_with_long_lines: 1,
                files_with_very_long_lines: 0,
            },
            skipped: vec![SkippedFile {
                index: 2,
                path: PathBuf::from("locked.log"),
                reason: "permission denied".to_string(),
            }],
            selected: 3,
            seed: 7,
        };

        let mut out = Vec::new();
        write_corpus_report(&mut out, &analysis, OutputFormat::Text).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Found in file:              big.log"));
        assert!(text.contains("CAUTION: 50.0% of files"));
        assert!(text.contains("locked.log: permission denied"));

        let mut out = Vec::new();
        write_corpus_report(&mut out, &analysis, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["corpus_stats"]["files_analyzed"], 2);
        assert_eq!(value["skipped"][0]["index"], 2);
        assert_eq!(value["recommendations"]["severity"], "caution");
    }
}
