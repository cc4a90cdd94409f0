//! nb2tex-spell: interactive spell checking of notebook prose
//!
//! This crate provides:
//! - A tokenizer that keeps LaTeX commands, identifiers, math and URLs
//!   out of the dictionary lookups
//! - A word-list dictionary with edit-distance suggestions
//! - A checker that applies corrections to markdown, raw and heading
//!   cells in place
//!
//! # Example
//!
//! ```
//! use nb2tex_spell::{Decision, Misspelling, SpellChecker, WordList};
//! use nb_format::{Cell, Notebook};
//!
//! let mut nb = Notebook::new(vec![Cell::markdown("The strr is \\emph{bright}.")]);
//! let mut checker = SpellChecker::new(WordList::from_words(["the", "star", "is", "bright"]));
//! let mut corrector =
//!     |_: &Misspelling| -> std::io::Result<Decision> { Ok(Decision::Accept(0)) };
//!
//! let report = checker.check(&mut nb, &mut corrector).unwrap();
//! assert_eq!(nb.cells()[0].source(), "The star is \\emph{bright}.");
//! assert_eq!(report.replacements, 1);
//! ```

pub mod dictionary;
pub mod error;
pub mod scanner;
pub mod session;
pub mod terminal;
pub mod tokenizer;

pub use dictionary::{DEFAULT_MAX_SUGGESTIONS, Dictionary, WordList};
pub use error::{Result, SpellError};
pub use scanner::{Report, SpellChecker};
pub use session::{Corrector, Decision, Misspelling, Resolution, Session};
pub use terminal::TerminalCorrector;
pub use tokenizer::{Token, TokenKind, Tokenizer, is_checkable, tokenize};
