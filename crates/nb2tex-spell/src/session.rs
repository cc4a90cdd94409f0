//! Correction decisions
//!
//! A [`Corrector`] is asked what to do about each unknown word; the
//! [`Session`] turns its answer into an edit and remembers what was
//! ignored for the rest of the run.

use crate::dictionary::Dictionary;
use std::collections::HashSet;
use std::io;
use tracing::{debug, warn};

/// An unknown word and where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Misspelling {
    pub word: String,
    /// Suggested corrections, best first
    pub suggestions: Vec<String>,
    /// The source line containing the word
    pub context: String,
    /// Byte offset of the word in `context`
    pub offset: usize,
    /// Index of the cell in the notebook
    pub cell: usize,
}

/// What to do about a misspelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Use the suggestion with this index
    Accept(usize),
    /// Replace the word with the given text
    Replace(String),
    /// Add the word to the personal dictionary
    Add,
    /// Leave this occurrence alone
    Ignore,
    /// Leave every occurrence alone for the rest of the session
    IgnoreAll,
    /// Stop checking, keeping the corrections made so far
    Quit,
}

/// The edit that follows from a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Keep,
    Replace(String),
    Stop,
}

/// Source of decisions, usually the user at a terminal
pub trait Corrector {
    fn correct(&mut self, issue: &Misspelling) -> io::Result<Decision>;
}

impl<F> Corrector for F
where
    F: FnMut(&Misspelling) -> io::Result<Decision>,
{
    fn correct(&mut self, issue: &Misspelling) -> io::Result<Decision> {
        self(issue)
    }
}

/// State kept across the misspellings of one run
#[derive(Debug, Default)]
pub struct Session {
    ignored: HashSet<String>,
    words_added: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the word was ignored with [`Decision::IgnoreAll`]
    pub fn is_ignored(&self, word: &str) -> bool {
        self.ignored.contains(word)
    }

    pub fn words_added(&self) -> usize {
        self.words_added
    }

    /// Apply a decision about `issue`
    pub fn resolve<D>(
        &mut self,
        dictionary: &mut D,
        issue: &Misspelling,
        decision: Decision,
    ) -> Resolution
    where
        D: Dictionary + ?Sized,
    {
        match decision {
            Decision::Accept(index) => match issue.suggestions.get(index) {
                Some(suggestion) => replacement(issue, suggestion.clone()),
                None => {
                    warn!(word = %issue.word, index, "no such suggestion, keeping word");
                    Resolution::Keep
                }
            },
            Decision::Replace(text) => replacement(issue, text),
            Decision::Add => {
                debug!(word = %issue.word, "adding to personal dictionary");
                dictionary.add(&issue.word);
                self.words_added += 1;
                Resolution::Keep
            }
            Decision::Ignore => Resolution::Keep,
            Decision::IgnoreAll => {
                self.ignored.insert(issue.word.clone());
                Resolution::Keep
            }
            Decision::Quit => Resolution::Stop,
        }
    }
}

fn replacement(issue: &Misspelling, text: String) -> Resolution {
    if text.is_empty() || text == issue.word {
        Resolution::Keep
    } else {
        Resolution::Replace(text)
    }
}
