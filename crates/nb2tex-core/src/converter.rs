//! Per-cell conversion strategies
//!
//! Each strategy turns one cell into zero or more output lines. Lines do
//! not carry a trailing newline; the notebook converter terminates them.

use crate::convert::{ConversionState, Result};
use crate::heading::{LatexHeadingConverter, split_heading};
use nb_format::{Cell, OutputKind};
use std::fmt::Debug;

/// Default marker for code cells whose output goes into the article
pub const DEFAULT_CODE_MARKER: &str = "# output->LaTeX";

/// Conversion strategy for one kind of cell
///
/// Implementations may read and update the running `state` but never
/// modify the cell.
pub trait CellConverter: Debug {
    fn convert(&self, cell: &Cell, state: &mut ConversionState) -> Result<Vec<String>>;
}

/// Drops the cell
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreConverter;

impl CellConverter for IgnoreConverter {
    fn convert(&self, _cell: &Cell, _state: &mut ConversionState) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Copies the cell source verbatim and ends the cell with a blank line
///
/// Used for markdown and raw cells that already hold LaTeX.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralSourceConverter;

impl CellConverter for LiteralSourceConverter {
    fn convert(&self, cell: &Cell, _state: &mut ConversionState) -> Result<Vec<String>> {
        let source = cell.source();
        // Keeps `\r` so CRLF sources come out byte for byte
        let mut lines: Vec<String> = source
            .split_terminator('\n')
            .map(str::to_string)
            .collect();
        lines.push(String::new());
        Ok(lines)
    }
}

/// Copies the text output of code cells that contain a marker
#[derive(Debug, Clone)]
pub struct MarkedCodeOutputConverter {
    marker: String,
}

impl Default for MarkedCodeOutputConverter {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_MARKER)
    }
}

impl MarkedCodeOutputConverter {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl CellConverter for MarkedCodeOutputConverter {
    fn convert(&self, cell: &Cell, _state: &mut ConversionState) -> Result<Vec<String>> {
        if !cell.source().contains(&self.marker) {
            return Ok(Vec::new());
        }

        let mut lines = Vec::new();
        for output in cell.outputs() {
            if output.kind() == OutputKind::Error || output.is_image() {
                continue;
            }
            if let Some(text) = output.plain_text() {
                lines.extend(text.lines().map(str::to_string));
            }
        }

        if !lines.is_empty() {
            lines.push(String::new());
        }
        Ok(lines)
    }
}

/// Copies markdown verbatim except for heading lines
///
/// Every line starting with a `#` run becomes a sectioning command and a
/// label, exactly as [`LatexHeadingConverter`] renders heading cells.
#[derive(Debug, Clone, Default)]
pub struct MinimalMarkdownConverter {
    headings: LatexHeadingConverter,
}

impl MinimalMarkdownConverter {
    pub fn new(headings: LatexHeadingConverter) -> Self {
        Self { headings }
    }
}

impl CellConverter for MinimalMarkdownConverter {
    fn convert(&self, cell: &Cell, state: &mut ConversionState) -> Result<Vec<String>> {
        let source = cell.source();
        let mut lines = Vec::new();
        for line in source.lines() {
            match split_heading(line) {
                Some((level, title)) => {
                    lines.extend(self.headings.heading_lines(level, title, state));
                }
                None => lines.push(line.to_string()),
            }
        }
        lines.push(String::new());
        Ok(lines)
    }
}
