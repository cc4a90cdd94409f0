//! nb-format: Jupyter notebook container model
//!
//! This crate provides:
//! - Notebook, cell and output types (nbformat 3 and 4)
//! - Reading and writing notebooks without losing unknown fields
//! - Atomic file writes shared by the converter and the spell checker
//!
//! # Example
//!
//! ```
//! use nb_format::{parse_notebook, CellType};
//!
//! let nb = parse_notebook(r###"{"cells": [
//!     {"cell_type": "markdown", "metadata": {}, "source": ["## Methods"]}
//! ], "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"###).unwrap();
//!
//! assert_eq!(nb.cells()[0].kind(), CellType::Heading);
//! ```

pub mod io;
pub mod model;

// Re-export main types for convenient access
pub use io::{
    FormatError, Result, notebook_to_string, parse_notebook, read_notebook, write_atomic,
    write_notebook,
};
pub use model::{Cell, CellType, Notebook, Output, OutputKind, Source, Worksheet};
