// src/markdown.rs

//! Line-based markdown structure classification.
//!
//! Every line is matched against a fixed set of rules; there is no real
//! markdown parsing. Fenced code blocks and runs of list, quote, table or
//! paragraph lines are the only multi-line state.

use crate::error::ScanError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

pub const COMPONENT_KINDS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Component {
    Header,
    List,
    CodeBlock,
    Blockquote,
    Table,
    Link,
    Image,
    HorizontalRule,
    Paragraph,
    Blank,
}

impl Component {
    pub const ALL: [Component; COMPONENT_KINDS] = [
        Component::Header,
        Component::List,
        Component::CodeBlock,
        Component::Blockquote,
        Component::Table,
        Component::Link,
        Component::Image,
        Component::HorizontalRule,
        Component::Paragraph,
        Component::Blank,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Component::Header => "Headers",
            Component::List => "Lists",
            Component::CodeBlock => "Code Blocks",
            Component::Blockquote => "Blockquotes",
            Component::Table => "Tables",
            Component::Link => "Links",
            Component::Image => "Images",
            Component::HorizontalRule => "Horizontal Rules",
            Component::Paragraph => "Paragraphs",
            Component::Blank => "Blank Lines",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-file markdown structure statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkdownStats {
    pub component_counts: [u64; COMPONENT_KINDS],
    pub lines_per_component: [u64; COMPONENT_KINDS],
    pub header_levels: [u64; 6],
    pub max_component_length: [u64; COMPONENT_KINDS],
    pub components_per_1000_lines: f64,
    /// Components excluding blank lines
    pub total_components: u64,
}

impl MarkdownStats {
    pub fn count(&self, component: Component) -> u64 {
        self.component_counts[component.index()]
    }

    /// Observations about the document's structure
    pub fn insights(&self) -> Vec<String> {
        let mut insights = Vec::new();

        if self.count(Component::Header) == 0 {
            insights.push("No headers found - document lacks structured sections".to_string());
        } else if self.header_levels[0] == 0 {
            insights.push("No H1 headers found - document may be missing a main title".to_string());
        }

        if self.count(Component::CodeBlock) > 0 {
            let code_percent = self.lines_per_component[Component::CodeBlock.index()] as f64 * 100.0
                / self.total_components.max(1) as f64;
            if code_percent > 40.0 {
                insights.push(format!(
                    "High code density ({code_percent:.1}%) - document is code-heavy"
                ));
            }
        }

        if self.count(Component::List) > self.count(Component::Paragraph) && self.count(Component::List) > 5 {
            insights.push("List-heavy document - consider more narrative text".to_string());
        }

        let max_line = self.max_component_length.iter().copied().max().unwrap_or(0);
        if max_line > 120 {
            insights.push(format!(
                "Very long lines detected ({max_line} chars) - may affect readability"
            ));
        }
        insights
    }
}

fn skip_indent(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(line.len());
    &line[start..]
}

fn is_space(byte: Option<&u8>) -> bool {
    matches!(byte, Some(b' ') | Some(b'\t'))
}

/// Header level (1-6) when the line is an ATX header
pub fn header_level(line: &[u8]) -> Option<usize> {
    let rest = skip_indent(line);
    let level = rest.iter().take_while(|&&b| b == b'#').count();
    if (1..=6).contains(&level) && is_space(rest.get(level)) {
        Some(level)
    } else {
        None
    }
}

pub fn is_list_item(line: &[u8]) -> bool {
    let rest = skip_indent(line);
    match rest.first() {
        Some(b'-' | b'*' | b'+') => is_space(rest.get(1)),
        Some(b) if b.is_ascii_digit() => {
            let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
            rest.get(digits) == Some(&b'.') && is_space(rest.get(digits + 1))
        }
        _ => false,
    }
}

pub fn is_blockquote(line: &[u8]) -> bool {
    let rest = skip_indent(line);
    rest.first() == Some(&b'>') && (rest.len() == 1 || is_space(rest.get(1)))
}

pub fn is_horizontal_rule(line: &[u8]) -> bool {
    let rest = skip_indent(line);
    let marker = match rest.first() {
        Some(&m @ (b'-' | b'*' | b'=')) => m,
        _ => return false,
    };
    let markers = rest.iter().filter(|&&b| b == marker).count();
    markers >= 3 && rest.iter().all(|&b| b == marker || b == b' ' || b == b'\t')
}

pub fn is_table_row(line: &[u8]) -> bool {
    line.len() >= 3 && line.contains(&b'|')
}

pub fn is_code_fence(line: &[u8]) -> bool {
    let rest = skip_indent(line);
    match rest.first() {
        Some(&marker @ (b'`' | b'~')) => rest.iter().take_while(|&&b| b == marker).count() >= 3,
        _ => false,
    }
}

pub fn contains_link(line: &[u8]) -> bool {
    line.iter()
        .position(|&b| b == b'[')
        .is_some_and(|open| line[open..].windows(2).any(|pair| pair == b"]("))
}

pub fn contains_image(line: &[u8]) -> bool {
    line.windows(2).any(|pair| pair == b"![")
}

pub fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|&b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
}

/// Classifies lines one at a time
#[derive(Debug)]
pub struct MarkdownClassifier {
    stats: MarkdownStats,
    in_code_block: bool,
    /// Open multi-line component, if any
    current: Option<Component>,
    component_lines: u64,
    total_lines: u64,
}

impl Default for MarkdownClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownClassifier {
    pub fn new() -> Self {
        Self {
            stats: MarkdownStats::default(),
            in_code_block: false,
            current: None,
            component_lines: 0,
            total_lines: 0,
        }
    }

    /// Classifies one line, without its line terminator.
    pub fn push_line(&mut self, line: &[u8]) {
        self.total_lines += 1;

        if is_code_fence(line) {
            if self.in_code_block {
                self.in_code_block = false;
                self.stats.component_counts[Component::CodeBlock.index()] += 1;
                self.stats.lines_per_component[Component::CodeBlock.index()] += self.component_lines;
                self.component_lines = 0;
            } else {
                self.end_component();
                self.in_code_block = true;
                self.component_lines = 1;
            }
            return;
        }
        if self.in_code_block {
            self.component_lines += 1;
            return;
        }

        let kind = if is_blank(line) {
            self.single_line(Component::Blank)
        } else if let Some(level) = header_level(line) {
            self.stats.header_levels[level - 1] += 1;
            self.single_line(Component::Header)
        } else if is_list_item(line) {
            self.continue_component(Component::List)
        } else if is_blockquote(line) {
            self.continue_component(Component::Blockquote)
        } else if is_horizontal_rule(line) {
            self.single_line(Component::HorizontalRule)
        } else if is_table_row(line) {
            self.continue_component(Component::Table)
        } else {
            self.continue_component(Component::Paragraph)
        };

        let longest = &mut self.stats.max_component_length[kind.index()];
        *longest = (*longest).max(line.len() as u64);

        if contains_link(line) {
            self.stats.component_counts[Component::Link.index()] += 1;
        }
        if contains_image(line) {
            self.stats.component_counts[Component::Image.index()] += 1;
        }
    }

    fn continue_component(&mut self, kind: Component) -> Component {
        if self.current == Some(kind) {
            self.component_lines += 1;
        } else {
            self.end_component();
            self.stats.component_counts[kind.index()] += 1;
            self.current = Some(kind);
            self.component_lines = 1;
        }
        kind
    }

    /// Counts a line that forms a component on its own and ends any open one.
    fn single_line(&mut self, kind: Component) -> Component {
        self.end_component();
        self.stats.component_counts[kind.index()] += 1;
        kind
    }

    fn end_component(&mut self) {
        if let Some(kind) = self.current.take() {
            self.stats.lines_per_component[kind.index()] += self.component_lines;
        }
        self.component_lines = 0;
    }

    pub fn finish(mut self) -> MarkdownStats {
        if self.in_code_block {
            self.stats.component_counts[Component::CodeBlock.index()] += 1;
            self.stats.lines_per_component[Component::CodeBlock.index()] += self.component_lines;
        } else {
            self.end_component();
        }

        self.stats.total_components = self.stats.component_counts[..Component::Blank.index()]
            .iter()
            .sum();
        if self.total_lines > 0 {
            self.stats.components_per_1000_lines =
                self.stats.total_components as f64 * 1000.0 / self.total_lines as f64;
        }
        self.stats
    }
}

/// Classifies every line of the file at `path`.
pub fn analyze_markdown_file(path: &Path) -> Result<MarkdownStats, ScanError> {
    let file = File::open(path).map_err(|source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "analyzing markdown structure");

    let mut reader = BufReader::new(file);
    let mut classifier = MarkdownClassifier::new();
    let mut line = Vec::new();
    let mut offset = 0u64;
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|source| ScanError::Read { offset, source })?;
        if read == 0 {
            break;
        }
        offset += read as u64;
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        classifier.push_line(&line);
    }

    let stats = classifier.finish();
    debug!(
        components = stats.total_components,
        "markdown analysis complete"
    );
    Ok(stats)
}
