//! Markdown headings to LaTeX sectioning commands
//!
//! `## Methods` becomes `\section{Methods}` followed by
//! `\label{sect:methods}`. The number of `#` characters selects the
//! sectioning level.

use crate::convert::{ConversionState, ConvertError, Result};
use crate::converter::CellConverter;
use nb_format::Cell;

/// LaTeX equivalents of heading levels 1 to 6
pub const DEFAULT_LEVELS: [&str; 6] = [
    "chapter",
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Split a markdown heading line into its level and title
///
/// Leading whitespace is allowed before the `#` run. A closing `#` run
/// (`## Title ##`) is dropped. Returns `None` if the line is not a heading.
pub fn split_heading(line: &str) -> Option<(usize, &str)> {
    let rest = line.trim_start();
    let level = rest.chars().take_while(|&c| c == '#').count();
    if level == 0 {
        return None;
    }
    let mut title = rest[level..].trim();
    let closing = title.trim_end_matches('#');
    if closing.is_empty() || closing.ends_with(char::is_whitespace) {
        title = closing.trim_end();
    }
    Some((level, title))
}

/// Derive a label identifier from a heading title
///
/// The title is lower-cased and every run of non-alphanumeric characters
/// becomes one `separator`. Identical titles give identical identifiers.
pub fn label_id(title: &str, separator: &str) -> String {
    let mut id = String::with_capacity(title.len());
    let mut pending_separator = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !id.is_empty() {
                id.push_str(separator);
            }
            pending_separator = false;
            id.extend(c.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    id
}

/// Converts heading cells to sectioning commands with labels
#[derive(Debug, Clone)]
pub struct LatexHeadingConverter {
    levels: Vec<String>,
    label_prefix: String,
    label_separator: String,
}

impl Default for LatexHeadingConverter {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect(),
            label_prefix: "sect:".to_string(),
            label_separator: "-".to_string(),
        }
    }
}

impl LatexHeadingConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom sectioning commands; an empty list keeps the current ones
    pub fn with_levels<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        if !levels.is_empty() {
            self.levels = levels;
        }
        self
    }

    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub fn with_label_separator(mut self, separator: impl Into<String>) -> Self {
        self.label_separator = separator.into();
        self
    }

    /// Sectioning command for a heading level, saturating at the deepest one
    pub fn command_for(&self, level: usize) -> &str {
        let index = level.saturating_sub(1).min(self.levels.len() - 1);
        &self.levels[index]
    }

    /// The command and label lines for one heading
    pub fn heading_lines(
        &self,
        level: usize,
        title: &str,
        state: &mut ConversionState,
    ) -> [String; 2] {
        let label = format!(
            "{}{}",
            self.label_prefix,
            label_id(title, &self.label_separator)
        );
        state.record_heading(level, &label);
        [
            format!("\\{}{{{}}}", self.command_for(level), title),
            format!("\\label{{{}}}", label),
        ]
    }
}

impl CellConverter for LatexHeadingConverter {
    fn convert(&self, cell: &Cell, state: &mut ConversionState) -> Result<Vec<String>> {
        let source = cell.source();

        // nbformat 3 heading cells carry the level separately
        let (level, title) = match cell.level {
            Some(level) => (usize::from(level.max(1)), source.trim()),
            None => source
                .lines()
                .find(|line| !line.trim().is_empty())
                .and_then(split_heading)
                .ok_or(ConvertError::NotAHeading {
                    cell: state.cell_index(),
                })?,
        };

        let [command, label] = self.heading_lines(level, title, state);
        Ok(vec![command, label, String::new()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_heading() {
        assert_eq!(split_heading("## Methods"), Some((2, "Methods")));
        assert_eq!(split_heading("  ###   Data reduction  "), Some((3, "Data reduction")));
        assert_eq!(split_heading("# Intro #"), Some((1, "Intro")));
        assert_eq!(split_heading("# C#"), Some((1, "C#")));
        assert_eq!(split_heading("##"), Some((2, "")));
        assert_eq!(split_heading("Methods"), None);
    }

    #[test]
    fn test_label_id() {
        assert_eq!(label_id("Methods", "-"), "methods");
        assert_eq!(label_id("Summary and Outlook", "-"), "summary-and-outlook");
        assert_eq!(label_id("  X-ray data (2019)! ", "-"), "x-ray-data-2019");
        assert_eq!(label_id("Summary and Outlook", ""), "summaryandoutlook");
        assert_eq!(label_id("Ärger", "_"), "ärger");
    }

    #[test]
    fn test_level_saturates() {
        let conv = LatexHeadingConverter::new();
        assert_eq!(conv.command_for(1), "chapter");
        assert_eq!(conv.command_for(2), "section");
        assert_eq!(conv.command_for(6), "subparagraph");
        assert_eq!(conv.command_for(9), "subparagraph");
        assert_eq!(conv.command_for(0), "chapter");
    }

    #[test]
    fn test_custom_levels() {
        let conv = LatexHeadingConverter::new().with_levels(["section", "subsection"]);
        assert_eq!(conv.command_for(1), "section");
        assert_eq!(conv.command_for(3), "subsection");

        let unchanged = LatexHeadingConverter::new().with_levels(Vec::<String>::new());
        assert_eq!(unchanged.command_for(1), "chapter");
    }
}
