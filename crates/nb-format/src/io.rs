//! Notebook reading and writing
//!
//! Notebooks are written the way Jupyter writes them: keys sorted,
//! one-space indentation and a trailing newline. All writes go through a
//! temporary file in the destination directory that is renamed into place.

use crate::model::Notebook;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors while reading or writing notebooks
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notebook has no cells (expected `cells` or `worksheets[0].cells`)")]
    NoCells,

    #[error("Failed to move output into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for notebook I/O
pub type Result<T> = std::result::Result<T, FormatError>;

/// Parse a notebook from its JSON text
pub fn parse_notebook(json: &str) -> Result<Notebook> {
    let notebook: Notebook = serde_json::from_str(json)?;
    if !notebook.has_cells() {
        return Err(FormatError::NoCells);
    }
    Ok(notebook)
}

/// Read and parse a notebook file
pub fn read_notebook(path: &Path) -> Result<Notebook> {
    debug!(path = %path.display(), "reading notebook");
    let content = fs::read_to_string(path)?;
    parse_notebook(&content)
}

/// Serialize a notebook to JSON text
pub fn notebook_to_string(notebook: &Notebook) -> Result<String> {
    // Going through `Value` sorts every object's keys.
    let value = serde_json::to_value(notebook)?;
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Serialize a notebook and write it atomically
///
/// Serialization completes before the destination is touched, so `path`
/// may be the file the notebook was read from.
pub fn write_notebook(path: &Path, notebook: &Notebook) -> Result<()> {
    let json = notebook_to_string(notebook)?;
    write_atomic(path, json.as_bytes())
}

/// Write `contents` to `path` through a temporary file in the same directory
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = temp_file_in(dir)?;
    temp.write_all(contents)?;
    // A replaced file keeps its mode
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| FormatError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Temporary file created with the mode of a plain new file (0o666 less umask)
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    tempfile::NamedTempFile::new_in(dir)
}
