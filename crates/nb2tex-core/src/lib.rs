//! nb2tex-core: Core library for converting Jupyter notebooks to LaTeX
//!
//! This crate provides:
//! - Per-cell conversion strategies (literal copy, marked code output,
//!   heading to sectioning command, ignore)
//! - A registry mapping cell types to strategies
//! - The notebook converter that applies skip/start/stop rules and writes
//!   the document
//!
//! # Example
//!
//! ```
//! use nb_format::{Cell, Notebook};
//! use nb2tex_core::{ConvertOptions, notebook_to_latex};
//!
//! let nb = Notebook::new(vec![
//!     Cell::markdown("## Methods"),
//!     Cell::raw("We fit a \\emph{model}."),
//! ]);
//! let tex = notebook_to_latex(&nb, &ConvertOptions::default()).unwrap();
//! assert!(tex.starts_with("\\section{Methods}\n\\label{sect:methods}\n"));
//! ```

pub mod convert;
pub mod converter;
pub mod heading;
pub mod registry;

pub use convert::{
    Conversion, ConversionState, ConvertError, ConvertOptions, NotebookConverter, Result,
    convert_notebook, notebook_to_latex,
};
pub use converter::{
    CellConverter, DEFAULT_CODE_MARKER, IgnoreConverter, LiteralSourceConverter,
    MarkedCodeOutputConverter, MinimalMarkdownConverter,
};
pub use heading::{DEFAULT_LEVELS, LatexHeadingConverter, label_id, split_heading};
pub use registry::ConverterRegistry;
