//! Notebook to LaTeX conversion
//!
//! Walks the cells of a notebook in order, dispatches each one to the
//! converter registered for its type and concatenates the produced lines.

use crate::registry::ConverterRegistry;
use nb_format::{FormatError, Notebook, write_atomic};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Cell {cell} was dispatched as a heading but has no leading '#'")]
    NotAHeading { cell: usize },

    #[error("Start marker not found in notebook: {0:?}")]
    StartMarkerNotFound(String),

    #[error("Stop marker not found in notebook: {0:?}")]
    StopMarkerNotFound(String),

    #[error("Failed to write output: {0}")]
    Write(#[from] FormatError),
}

/// Conversion result type
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Options for notebook conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Number of leading cells to skip unconditionally
    pub skip_cells: usize,
    /// Skip cells up to and including the first one containing this text
    pub start_marker: Option<String>,
    /// Stop before the first cell containing this text
    pub stop_marker: Option<String>,
    /// Index of the first cell that is never converted
    pub stop_cell: Option<usize>,
    /// Text written before the converted cells
    pub prologue: Option<String>,
    /// Text written after the converted cells
    pub epilogue: Option<String>,
}

/// Running state shared by the converters during one conversion
#[derive(Debug, Default)]
pub struct ConversionState {
    skipping: bool,
    cell_index: usize,
    last_heading_level: Option<usize>,
    /// Label -> index of the first cell that emitted it
    labels: HashMap<String, usize>,
    duplicate_labels: Vec<String>,
}

impl ConversionState {
    fn new(skipping: bool) -> Self {
        Self {
            skipping,
            ..Default::default()
        }
    }

    /// Index of the cell being converted
    pub fn cell_index(&self) -> usize {
        self.cell_index
    }

    /// Whether the conversion is still before the start marker
    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    pub fn last_heading_level(&self) -> Option<usize> {
        self.last_heading_level
    }

    /// Index of the first cell that emitted `label`
    pub fn label_origin(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Record an emitted heading
    ///
    /// Labels are not made unique: a repeated label is reported and kept.
    pub fn record_heading(&mut self, level: usize, label: &str) {
        if let Some(last) = self.last_heading_level {
            if level > last + 1 {
                warn!(
                    cell = self.cell_index,
                    from = last,
                    to = level,
                    "heading skips a level"
                );
            }
        }
        self.last_heading_level = Some(level);

        match self.labels.entry(label.to_string()) {
            Entry::Occupied(first) => {
                warn!(
                    cell = self.cell_index,
                    first = *first.get(),
                    label,
                    "duplicate label"
                );
                self.duplicate_labels.push(label.to_string());
            }
            Entry::Vacant(slot) => {
                slot.insert(self.cell_index);
            }
        }
    }
}

/// Result of a conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// The LaTeX document, including prologue and epilogue
    pub document: String,
    /// Number of cells passed to a converter
    pub cells_converted: usize,
    /// Labels emitted more than once, in order of repetition
    pub duplicate_labels: Vec<String>,
}

/// Converts notebooks with a configurable set of cell converters
#[derive(Debug, Default)]
pub struct NotebookConverter {
    pub cellconverters: ConverterRegistry,
    pub options: ConvertOptions,
}

impl NotebookConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            cellconverters: ConverterRegistry::default(),
            options,
        }
    }

    pub fn with_converters(mut self, cellconverters: ConverterRegistry) -> Self {
        self.cellconverters = cellconverters;
        self
    }

    /// Convert a notebook in memory
    pub fn run(&self, notebook: &Notebook) -> Result<Conversion> {
        let options = &self.options;
        let cells = notebook.cells();
        let end = options
            .stop_cell
            .map_or(cells.len(), |stop| stop.min(cells.len()));
        let begin = options.skip_cells.min(end);

        let mut state = ConversionState::new(options.start_marker.is_some());
        let mut body = String::new();
        let mut cells_converted = 0;
        let mut stopped = false;

        for (index, cell) in cells.iter().enumerate().take(end).skip(begin) {
            state.cell_index = index;
            let source = cell.source();

            if state.skipping {
                if contains_marker(&source, options.start_marker.as_deref()) {
                    debug!(cell = index, "start marker found");
                    state.skipping = false;
                }
                continue;
            }

            if contains_marker(&source, options.stop_marker.as_deref()) {
                debug!(cell = index, "stop marker found");
                stopped = true;
                break;
            }

            let kind = cell.kind();
            let Some(converter) = self.cellconverters.get(&kind) else {
                debug!(cell = index, cell_type = %kind, "no converter registered, skipping");
                continue;
            };

            debug!(cell = index, cell_type = %kind, "converting cell");
            for line in converter.convert(cell, &mut state)? {
                body.push_str(&line);
                body.push('\n');
            }
            cells_converted += 1;
        }

        if state.skipping {
            if let Some(marker) = &options.start_marker {
                return Err(ConvertError::StartMarkerNotFound(marker.clone()));
            }
        }
        if let Some(marker) = &options.stop_marker {
            if !stopped {
                return Err(ConvertError::StopMarkerNotFound(marker.clone()));
            }
        }

        let prologue = options.prologue.as_deref().unwrap_or_default();
        let epilogue = options.epilogue.as_deref().unwrap_or_default();
        let mut document = String::with_capacity(prologue.len() + body.len() + epilogue.len());
        document.push_str(prologue);
        document.push_str(&body);
        document.push_str(epilogue);

        Ok(Conversion {
            document,
            cells_converted,
            duplicate_labels: state.duplicate_labels,
        })
    }

    /// Convert a notebook to a LaTeX string
    pub fn convert_to_string(&self, notebook: &Notebook) -> Result<String> {
        self.run(notebook).map(|conversion| conversion.document)
    }

    /// Convert a notebook and write the document to `destination`
    ///
    /// The destination is replaced atomically; nothing is written if the
    /// conversion fails.
    pub fn convert(&self, notebook: &Notebook, destination: &Path) -> Result<Conversion> {
        let conversion = self.run(notebook)?;
        write_atomic(destination, conversion.document.as_bytes())?;
        info!(
            destination = %destination.display(),
            cells = conversion.cells_converted,
            "wrote document"
        );
        Ok(conversion)
    }
}

fn contains_marker(source: &str, marker: Option<&str>) -> bool {
    marker.is_some_and(|marker| source.contains(marker))
}

/// Convert a notebook to a LaTeX string with the default converters
pub fn notebook_to_latex(notebook: &Notebook, options: &ConvertOptions) -> Result<String> {
    NotebookConverter::new(options.clone()).convert_to_string(notebook)
}

/// Convert a notebook with the default converters and write the result
pub fn convert_notebook(
    notebook: &Notebook,
    destination: &Path,
    options: &ConvertOptions,
) -> Result<Conversion> {
    NotebookConverter::new(options.clone()).convert(notebook, destination)
}
