//! Error types for spell checking

use nb_format::FormatError;
use std::path::PathBuf;
use thiserror::Error;

/// Spell checking errors
#[derive(Debug, Error)]
pub enum SpellError {
    #[error("Failed to read dictionary {path}: {source}")]
    DictionaryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No dictionary found for language {lang:?}; pass one with --dictionary")]
    NoDictionaryFound { lang: String },

    #[error("Dictionary contains no words: {0}")]
    EmptyDictionary(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Result type for spell checking
pub type Result<T> = std::result::Result<T, SpellError>;
