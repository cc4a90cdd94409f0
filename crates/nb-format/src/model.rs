//! Notebook cell model
//!
//! This module defines the in-memory representation of a Jupyter notebook.
//! Fields that the model does not interpret are kept in `extra` maps so that
//! a notebook can be loaded, edited and saved without losing information.
//! Reference: https://nbformat.readthedocs.io/en/latest/format_description.html

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// A complete notebook document
///
/// nbformat 4 stores cells at the top level; nbformat 3 stores them inside
/// the first worksheet. Both layouts are written back the way they were read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cells: Option<Vec<Cell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    worksheets: Option<Vec<Worksheet>>,
    /// Notebook-level fields (metadata, nbformat version, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An nbformat 3 worksheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Worksheet {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Notebook {
    /// Create an nbformat 4 notebook from cells
    pub fn new(cells: Vec<Cell>) -> Self {
        let mut extra = Map::new();
        extra.insert("metadata".to_string(), Value::Object(Map::new()));
        extra.insert("nbformat".to_string(), Value::from(4));
        extra.insert("nbformat_minor".to_string(), Value::from(5));
        Self {
            cells: Some(cells),
            worksheets: None,
            extra,
        }
    }

    /// Whether the notebook carries a cell list in either layout
    pub(crate) fn has_cells(&self) -> bool {
        self.cells.is_some()
            || self
                .worksheets
                .as_ref()
                .is_some_and(|sheets| !sheets.is_empty())
    }

    /// The cells of the notebook, in document order
    pub fn cells(&self) -> &[Cell] {
        if let Some(cells) = &self.cells {
            return cells;
        }
        match self.worksheets.as_deref() {
            Some([first, ..]) => &first.cells,
            _ => &[],
        }
    }

    /// Mutable access to the cells of the notebook
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        if let Some(cells) = &mut self.cells {
            return cells;
        }
        match self.worksheets.as_deref_mut() {
            Some([first, ..]) => &mut first.cells,
            _ => &mut [],
        }
    }

    /// The `nbformat` major version, if recorded
    pub fn nbformat(&self) -> Option<u64> {
        self.extra.get("nbformat").and_then(Value::as_u64)
    }
}

/// Cell type tag as stored in the notebook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CellType {
    Markdown,
    Raw,
    Code,
    /// nbformat 3 heading cell; also the effective type of a markdown
    /// cell that consists of a single `#` heading line
    Heading,
    /// Unknown cell type (for forward compatibility)
    Other(String),
}

impl CellType {
    /// Parse a cell type from its tag
    pub fn parse(s: &str) -> Self {
        match s {
            "markdown" => Self::Markdown,
            "raw" => Self::Raw,
            "code" => Self::Code,
            "heading" => Self::Heading,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Get the tag as a string
    pub fn as_str(&self) -> &str {
        match self {
            Self::Markdown => "markdown",
            Self::Raw => "raw",
            Self::Code => "code",
            Self::Heading => "heading",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for CellType {
    fn from(s: String) -> Self {
        match Self::parse(&s) {
            Self::Other(_) => Self::Other(s),
            known => known,
        }
    }
}

impl From<CellType> for String {
    fn from(t: CellType) -> Self {
        match t {
            CellType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiline text as stored in notebooks: one string or a list of lines
///
/// In the list form every line except possibly the last ends with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Default for Source {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

impl Source {
    /// Full text of the source
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Lines(lines) if lines.len() == 1 => Cow::Borrowed(&lines[0]),
            Self::Lines(lines) => Cow::Owned(lines.concat()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Lines(lines) => lines.iter().all(String::is_empty),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.text().contains(needle)
    }

    /// The stored segments (lines, or the single string)
    pub fn segments(&self) -> &[String] {
        match self {
            Self::Text(s) => std::slice::from_ref(s),
            Self::Lines(lines) => lines,
        }
    }

    /// Mutable access to the stored segments, keeping the representation
    pub fn segments_mut(&mut self) -> &mut [String] {
        match self {
            Self::Text(s) => std::slice::from_mut(s),
            Self::Lines(lines) => lines,
        }
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A single notebook cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: CellType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
    /// nbformat 3 code cells keep their source under `input`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Source>,
    /// Heading level of nbformat 3 heading cells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Output>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    /// Create a cell with a source string
    pub fn new(cell_type: CellType, source: impl Into<String>) -> Self {
        let outputs = (cell_type == CellType::Code).then(Vec::new);
        Self {
            cell_type,
            source: Some(Source::Text(source.into())),
            input: None,
            level: None,
            outputs,
            extra: Map::new(),
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self::new(CellType::Markdown, source)
    }

    pub fn raw(source: impl Into<String>) -> Self {
        Self::new(CellType::Raw, source)
    }

    pub fn code(source: impl Into<String>) -> Self {
        Self::new(CellType::Code, source)
    }

    /// Create an nbformat 3 heading cell
    pub fn heading(level: u8, title: impl Into<String>) -> Self {
        let mut cell = Self::new(CellType::Heading, title);
        cell.level = Some(level);
        cell
    }

    /// Attach an output (builder style)
    pub fn with_output(mut self, output: Output) -> Self {
        self.outputs.get_or_insert_with(Vec::new).push(output);
        self
    }

    /// The cell source, from `source` or the legacy `input` field
    pub fn source(&self) -> Cow<'_, str> {
        match self.source.as_ref().or(self.input.as_ref()) {
            Some(source) => source.text(),
            None => Cow::Borrowed(""),
        }
    }

    /// Raw access to the stored source
    pub fn source_raw(&self) -> Option<&Source> {
        self.source.as_ref().or(self.input.as_ref())
    }

    /// Mutable access to the stored source
    pub fn source_mut(&mut self) -> Option<&mut Source> {
        match self.source {
            Some(ref mut source) => Some(source),
            None => self.input.as_mut(),
        }
    }

    pub fn outputs(&self) -> &[Output] {
        self.outputs.as_deref().unwrap_or_default()
    }

    /// Effective type used to pick a converter
    ///
    /// A markdown cell whose only non-blank line starts with `#` is treated
    /// as a heading, mirroring the heading cells of older notebooks.
    pub fn kind(&self) -> CellType {
        if self.cell_type == CellType::Markdown && is_heading_text(&self.source()) {
            return CellType::Heading;
        }
        self.cell_type.clone()
    }
}

fn is_heading_text(text: &str) -> bool {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    match (lines.next(), lines.next()) {
        (Some(line), None) => line.trim_start().starts_with('#'),
        _ => false,
    }
}

/// Coarse classification of an output record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stream,
    ExecuteResult,
    DisplayData,
    Error,
    Other,
}

/// A code cell output record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub output_type: String,
    /// Stream text (nbformat 4) or plain text representation (nbformat 3)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Source>,
    /// MIME bundle of rich outputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// MIME types whose payload is copied as text, in order of preference
const TEXT_MIME_TYPES: [&str; 2] = ["text/latex", "text/plain"];

impl Output {
    /// A `stream` output on stdout
    pub fn stream(text: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("name".to_string(), Value::from("stdout"));
        Self {
            output_type: "stream".to_string(),
            text: Some(Source::Text(text.into())),
            data: None,
            extra,
        }
    }

    /// A `display_data` or `execute_result` output with a single MIME entry
    pub fn data(output_type: &str, mime: &str, value: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert(mime.to_string(), Value::from(value.into()));
        let mut extra = Map::new();
        extra.insert("metadata".to_string(), Value::Object(Map::new()));
        Self {
            output_type: output_type.to_string(),
            text: None,
            data: Some(data),
            extra,
        }
    }

    pub fn kind(&self) -> OutputKind {
        match self.output_type.as_str() {
            "stream" => OutputKind::Stream,
            "execute_result" | "pyout" => OutputKind::ExecuteResult,
            "display_data" => OutputKind::DisplayData,
            "error" | "pyerr" => OutputKind::Error,
            _ => OutputKind::Other,
        }
    }

    /// Whether the output carries an image
    ///
    /// nbformat 4 keeps images in the MIME bundle; nbformat 3 stores them as
    /// top-level `png`, `jpeg` or `svg` fields.
    pub fn is_image(&self) -> bool {
        let in_bundle = self
            .data
            .as_ref()
            .is_some_and(|data| data.keys().any(|mime| mime.starts_with("image/")));
        in_bundle || ["png", "jpeg", "svg"].iter().any(|k| self.extra.contains_key(*k))
    }

    /// Text payload of the output, if it has one
    ///
    /// Images and error tracebacks yield `None`.
    pub fn plain_text(&self) -> Option<Cow<'_, str>> {
        if self.kind() == OutputKind::Error {
            return None;
        }
        if let Some(text) = &self.text {
            return Some(text.text());
        }
        let data = self.data.as_ref()?;
        TEXT_MIME_TYPES
            .iter()
            .find_map(|mime| data.get(*mime))
            .and_then(value_text)
    }
}

/// Text of a JSON string or list of strings
fn value_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Array(items) => items
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()
            .map(|parts| Cow::Owned(parts.concat())),
        _ => None,
    }
}
