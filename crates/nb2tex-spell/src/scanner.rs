//! Notebook spell checking

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::session::{Corrector, Misspelling, Resolution, Session};
use crate::tokenizer::{TokenKind, is_checkable, tokenize};
use nb_format::{CellType, Notebook, read_notebook, write_notebook};
use std::path::Path;
use tracing::{debug, info};

/// Summary of a spell checking run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Prose cells that were scanned
    pub cells_scanned: usize,
    /// Words looked up in the dictionary
    pub tokens_checked: usize,
    /// Words handed to the corrector
    pub misspellings: usize,
    pub replacements: usize,
    pub words_added: usize,
    /// Whether the corrector asked to quit before the end
    pub stopped: bool,
}

/// Checks the prose cells of notebooks against a dictionary
#[derive(Debug)]
pub struct SpellChecker<D> {
    dictionary: D,
    session: Session,
}

/// Replacement of the byte range `start..end` of a cell's full source
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

/// Outcome of checking one cell
struct CellResult {
    edits: Vec<Edit>,
    stopped: bool,
}

impl<D: Dictionary> SpellChecker<D> {
    pub fn new(dictionary: D) -> Self {
        Self {
            dictionary,
            session: Session::new(),
        }
    }

    pub fn dictionary(&self) -> &D {
        &self.dictionary
    }

    pub fn into_dictionary(self) -> D {
        self.dictionary
    }

    /// Check markdown, raw and heading cells, applying corrections in place
    ///
    /// Code cells, outputs and cell types are never modified. Text between
    /// words is copied unchanged. When the corrector quits, corrections made
    /// so far are kept.
    pub fn check(
        &mut self,
        notebook: &mut Notebook,
        corrector: &mut dyn Corrector,
    ) -> Result<Report> {
        let mut report = Report::default();
        let words_added_before = self.session.words_added();

        for (index, cell) in notebook.cells_mut().iter_mut().enumerate() {
            if !matches!(
                cell.kind(),
                CellType::Markdown | CellType::Raw | CellType::Heading
            ) {
                continue;
            }
            let Some(source) = cell.source_mut() else {
                continue;
            };
            debug!(cell = index, "checking cell");
            report.cells_scanned += 1;

            // Math and arguments may span the lines of a line-array source
            let text = source.segments().concat();
            let result = self.check_text(&text, index, corrector, &mut report)?;
            apply_edits(source.segments_mut(), &result.edits);
            if result.stopped {
                report.stopped = true;
                report.words_added = self.session.words_added() - words_added_before;
                info!(cell = index, "spell check stopped");
                return Ok(report);
            }
        }

        report.words_added = self.session.words_added() - words_added_before;
        info!(
            cells = report.cells_scanned,
            misspellings = report.misspellings,
            replacements = report.replacements,
            "spell check finished"
        );
        Ok(report)
    }

    /// Check a notebook file and write the corrected notebook to `output`
    ///
    /// `output` may equal `input`; it is replaced only once the whole
    /// notebook has been serialized.
    pub fn check_file(
        &mut self,
        input: &Path,
        output: &Path,
        corrector: &mut dyn Corrector,
    ) -> Result<Report> {
        let mut notebook = read_notebook(input)?;
        let report = self.check(&mut notebook, corrector)?;
        write_notebook(output, &notebook)?;
        Ok(report)
    }

    fn check_text(
        &mut self,
        text: &str,
        cell: usize,
        corrector: &mut dyn Corrector,
        report: &mut Report,
    ) -> Result<CellResult> {
        let mut edits = Vec::new();
        let mut stopped = false;

        for token in tokenize(text) {
            if token.kind != TokenKind::Word || !is_checkable(token.text) {
                continue;
            }
            report.tokens_checked += 1;
            if self.dictionary.check(token.text) || self.session.is_ignored(token.text) {
                continue;
            }

            let line_start = text[..token.start].rfind('\n').map_or(0, |i| i + 1);
            let line_end = text[token.end..]
                .find('\n')
                .map_or(text.len(), |i| token.end + i);
            let issue = Misspelling {
                word: token.text.to_string(),
                suggestions: self.dictionary.suggest(token.text),
                context: text[line_start..line_end].to_string(),
                offset: token.start - line_start,
                cell,
            };
            report.misspellings += 1;

            let decision = corrector.correct(&issue)?;
            match self.session.resolve(&mut self.dictionary, &issue, decision) {
                Resolution::Keep => {}
                Resolution::Replace(replacement) => {
                    debug!(cell, word = token.text, %replacement, "replacing word");
                    edits.push(Edit {
                        start: token.start,
                        end: token.end,
                        replacement,
                    });
                    report.replacements += 1;
                }
                Resolution::Stop => {
                    stopped = true;
                    break;
                }
            }
        }

        Ok(CellResult { edits, stopped })
    }
}

/// Apply edits given in offsets of the concatenated segments
///
/// Segments without an overlapping edit are left as they are. An edit
/// crossing a segment boundary puts its replacement in the segment where
/// it starts. `edits` must be sorted and non-overlapping.
fn apply_edits(segments: &mut [String], edits: &[Edit]) {
    if edits.is_empty() {
        return;
    }
    let mut lo = 0;
    for segment in segments.iter_mut() {
        let hi = lo + segment.len();
        let overlapping = edits.iter().filter(|e| e.start < hi && e.end > lo);

        let mut out = String::new();
        let mut copied = lo;
        let mut touched = false;
        for edit in overlapping {
            touched = true;
            out.push_str(&segment[copied - lo..edit.start.max(lo) - lo]);
            if edit.start >= lo {
                out.push_str(&edit.replacement);
            }
            copied = edit.end.min(hi);
        }
        if touched {
            out.push_str(&segment[copied - lo..]);
            *segment = out;
        }
        lo = hi;
    }
}
