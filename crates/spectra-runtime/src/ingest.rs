//! Edge-list ingestion.
//!
//! Reads whitespace-separated `"<dependent> <dependency>"` lines into a
//! dependency graph. Blank lines and `#` comments are ignored. Lines with any
//! other token count are skipped, recorded in the report and logged; they
//! never abort the load.

use serde::Serialize;
use spectra_core::error::{Result, SpectraError};
use spectra_core::topology::DependencyGraph;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// A line that could not be read as an edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_number: usize,
    pub content: String,
    /// Number of whitespace-separated tokens found.
    pub tokens: usize,
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    /// Lines read, including blanks and comments.
    pub lines: usize,
    /// Edges that were new to the graph.
    pub edges_added: usize,
    /// Well-formed lines naming an edge the graph already had.
    pub duplicates: usize,
    pub skipped: Vec<SkippedLine>,
}

impl IngestReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// True when every non-comment line was a valid edge.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

enum Line<'a> {
    Edge(&'a str, &'a str),
    Ignored,
    Malformed(usize),
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Ignored;
    }
    let mut tokens = trimmed.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(from), Some(to), None) => Line::Edge(from, to),
        _ => Line::Malformed(trimmed.split_whitespace().count()),
    }
}

/// Feeds edge-list lines into a graph, accumulating an [`IngestReport`].
pub struct EdgeListIngester<'g, G: DependencyGraph> {
    graph: &'g mut G,
    report: IngestReport,
}

impl<'g, G: DependencyGraph> EdgeListIngester<'g, G> {
    pub fn new(graph: &'g mut G) -> Self {
        Self {
            graph,
            report: IngestReport::default(),
        }
    }

    /// Process a single line.
    pub fn push_line(&mut self, line: &str) {
        self.report.lines += 1;
        let line_number = self.report.lines;
        match classify(line) {
            Line::Ignored => {}
            Line::Edge(from, to) => {
                if self.graph.add_edge(from, to) {
                    self.report.edges_added += 1;
                } else {
                    self.report.duplicates += 1;
                }
            }
            Line::Malformed(tokens) => {
                warn!(line = line_number, tokens, "Skipping malformed edge line: {:?}", line.trim());
                self.report.skipped.push(SkippedLine {
                    line_number,
                    content: line.trim().to_string(),
                    tokens,
                });
            }
        }
    }

    pub fn finish(self) -> IngestReport {
        debug!(
            lines = self.report.lines,
            edges = self.report.edges_added,
            skipped = self.report.skipped.len(),
            "Edge list ingested"
        );
        self.report
    }
}

/// Ingest an in-memory edge list.
pub fn ingest_str<G: DependencyGraph>(graph: &mut G, input: &str) -> IngestReport {
    let mut ingester = EdgeListIngester::new(graph);
    for line in input.lines() {
        ingester.push_line(line);
    }
    ingester.finish()
}

/// Ingest from any buffered reader. Read failures (including invalid UTF-8)
/// abort with `SpectraError::Ingest`; lines before the failure stay applied.
pub fn ingest_reader<G: DependencyGraph, R: BufRead>(graph: &mut G, reader: R) -> Result<IngestReport> {
    let mut ingester = EdgeListIngester::new(graph);
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| SpectraError::Ingest(format!("line {}: {}", i + 1, e)))?;
        ingester.push_line(&line);
    }
    Ok(ingester.finish())
}

/// Ingest an edge-list file.
pub fn ingest_path<G: DependencyGraph>(graph: &mut G, path: &Path) -> Result<IngestReport> {
    let file = File::open(path)
        .map_err(|e| SpectraError::Io(format!("{}: {}", path.display(), e)))?;
    ingest_reader(graph, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology_impl::PetDependencyGraph;

    #[test]
    fn comments_and_blanks_are_silent() {
        let mut g = PetDependencyGraph::new();
        let report = ingest_str(&mut g, "# header\n\napp serde\n   \n  # indented comment\n");
        assert_eq!(report.lines, 5);
        assert_eq!(report.edges_added, 1);
        assert!(report.is_clean());
    }

    #[test]
    fn malformed_lines_are_counted_with_line_numbers() {
        let mut g = PetDependencyGraph::new();
        let input = "a b\nlonely\nc d e\nb\tc\n";
        let report = ingest_str(&mut g, input);
        assert_eq!(report.edges_added, 2);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.skipped[0].line_number, 2);
        assert_eq!(report.skipped[0].tokens, 1);
        assert_eq!(report.skipped[1].line_number, 3);
        assert_eq!(report.skipped[1].content, "c d e");
        assert_eq!(g.node_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicate_lines_do_not_add_edges() {
        let mut g = PetDependencyGraph::new();
        let report = ingest_str(&mut g, "a b\na b\n");
        assert_eq!(report.edges_added, 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn reader_matches_str() {
        let input = "x y\ny z\nbad\n";
        let mut from_str = PetDependencyGraph::new();
        let mut from_reader = PetDependencyGraph::new();
        let a = ingest_str(&mut from_str, input);
        let b = ingest_reader(&mut from_reader, input.as_bytes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(from_str.edges(), from_reader.edges());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut g = PetDependencyGraph::new();
        let err = ingest_path(&mut g, Path::new("/nonexistent/spectra/edges.txt")).unwrap_err();
        assert!(matches!(err, SpectraError::Io(_)));
    }
}
