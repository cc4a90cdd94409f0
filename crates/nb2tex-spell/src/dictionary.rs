//! Dictionary backends
//!
//! [`WordList`] reads plain word lists (one word per line) and hunspell
//! `.dic` files. Affix rules are not applied, so a `.dic` file only
//! contributes its stem words.

use crate::error::{Result, SpellError};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use strsim::{damerau_levenshtein, jaro_winkler};
use tracing::{debug, info};

/// Maximum edit distance for suggestions
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Default number of suggestions offered for a word
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Spell checking backend
pub trait Dictionary {
    /// Whether `word` is spelled correctly
    fn check(&self, word: &str) -> bool;

    /// Candidate corrections, best first
    fn suggest(&self, word: &str) -> Vec<String>;

    /// Accept `word` from now on (personal dictionary)
    fn add(&mut self, word: &str);
}

/// Word-list dictionary with an optional personal word list
#[derive(Debug, Clone)]
pub struct WordList {
    words: HashSet<String>,
    personal_path: Option<PathBuf>,
    /// Words added during this session, in order
    added: Vec<String>,
    max_suggestions: usize,
}

/// Standard locations of system dictionaries, `{lang}` is replaced
const SEARCH_PATHS: &[&str] = &[
    "/usr/share/hunspell/{lang}.dic",
    "/usr/share/myspell/{lang}.dic",
    "/usr/share/myspell/dicts/{lang}.dic",
    "/usr/local/share/hunspell/{lang}.dic",
    "/Library/Spelling/{lang}.dic",
];

/// Plain word list shipped with most Unix systems (English)
const SYSTEM_WORDS: &str = "/usr/share/dict/words";

impl Default for WordList {
    fn default() -> Self {
        Self {
            words: HashSet::new(),
            personal_path: None,
            added: Vec::new(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

impl WordList {
    /// Create a dictionary from an iterator of words
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        list.extend_from_text(words);
        list
    }

    /// Load a word list or hunspell `.dic` file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|source| SpellError::DictionaryUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        let list = Self::from_words(parse_word_list(&content));
        if list.is_empty() {
            return Err(SpellError::EmptyDictionary(path.to_path_buf()));
        }
        info!(path = %path.display(), words = list.len(), "loaded dictionary");
        Ok(list)
    }

    /// Find and load the system dictionary for a language such as `en_US`
    pub fn find(lang: &str) -> Result<Self> {
        let mut candidates: Vec<PathBuf> = SEARCH_PATHS
            .iter()
            .map(|pattern| PathBuf::from(pattern.replace("{lang}", lang)))
            .collect();
        if lang.starts_with("en") {
            candidates.push(PathBuf::from(SYSTEM_WORDS));
        }

        for candidate in candidates {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "using system dictionary");
                return Self::load(&candidate);
            }
        }
        Err(SpellError::NoDictionaryFound {
            lang: lang.to_string(),
        })
    }

    /// Also accept the words of a personal word list
    ///
    /// A missing file is not an error: it is created by
    /// [`WordList::save_personal`] once a word is added.
    pub fn with_personal(mut self, path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => self.extend_from_text(parse_word_list(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(SpellError::DictionaryUnavailable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        self.personal_path = Some(path.to_path_buf());
        Ok(self)
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Append the words added in this session to the personal word list
    pub fn save_personal(&self) -> Result<()> {
        let Some(path) = &self.personal_path else {
            return Ok(());
        };
        if self.added.is_empty() {
            return Ok(());
        }
        let needs_newline = match fs::read(path) {
            Ok(existing) => existing.last().is_some_and(|&b| b != b'\n'),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        if needs_newline {
            writeln!(file)?;
        }
        for word in &self.added {
            writeln!(file, "{}", word)?;
        }
        debug!(path = %path.display(), words = self.added.len(), "saved personal words");
        Ok(())
    }

    /// Words added in this session
    pub fn added(&self) -> &[String] {
        &self.added
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn extend_from_text<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| normalize(w.as_ref())));
    }

    fn contains_form(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        let lower = word.to_lowercase();
        lower != word && self.words.contains(&lower)
    }
}

impl Dictionary for WordList {
    fn check(&self, word: &str) -> bool {
        let word = normalize(word);
        if self.contains_form(&word) {
            return true;
        }
        // Compounds are accepted when every part is
        word.contains('-')
            && word
                .split('-')
                .all(|part| !part.is_empty() && self.contains_form(part))
    }

    fn suggest(&self, word: &str) -> Vec<String> {
        let word = normalize(word);
        let lower = word.to_lowercase();
        let len = lower.chars().count();

        let mut scored: Vec<(usize, f64, &String)> = self
            .words
            .iter()
            .filter(|candidate| {
                candidate.chars().count().abs_diff(len) <= MAX_SUGGESTION_DISTANCE
            })
            .filter_map(|candidate| {
                let candidate_lower = candidate.to_lowercase();
                let distance = damerau_levenshtein(&lower, &candidate_lower);
                (distance <= MAX_SUGGESTION_DISTANCE)
                    .then(|| (distance, jaro_winkler(&lower, &candidate_lower), candidate))
            })
            .collect();

        scored.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| b.1.total_cmp(&a.1))
                .then_with(|| a.2.cmp(b.2))
        });

        let capitalized = word.chars().next().is_some_and(char::is_uppercase);
        let mut suggestions: Vec<String> = Vec::new();
        for (_, _, candidate) in scored {
            if suggestions.len() >= self.max_suggestions {
                break;
            }
            let suggestion = if capitalized {
                capitalize(candidate)
            } else {
                candidate.clone()
            };
            if suggestion != word && !suggestions.contains(&suggestion) {
                suggestions.push(suggestion);
            }
        }
        suggestions
    }

    fn add(&mut self, word: &str) {
        let word = normalize(word);
        if self.words.insert(word.clone()) {
            self.added.push(word);
        }
    }
}

/// Words of a word list or hunspell `.dic` file
///
/// Skips the leading word count of `.dic` files, `/FLAGS` suffixes,
/// blank lines and `#` comments.
pub fn parse_word_list(content: &str) -> impl Iterator<Item = &str> {
    content.lines().enumerate().filter_map(|(i, line)| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        if i == 0 && line.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let word = line.split('/').next().unwrap_or(line).trim();
        (!word.is_empty()).then_some(word)
    })
}

/// Use straight apostrophes throughout
fn normalize(word: &str) -> String {
    word.replace('\u{2019}', "'")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WordList {
        WordList::from_words([
            "the", "stars", "star", "spelling", "spell", "bright", "ray", "don't", "Chandra",
        ])
    }

    #[test]
    fn test_check_case_forms() {
        let dict = sample();
        assert!(dict.check("stars"));
        assert!(dict.check("Stars"));
        assert!(dict.check("STARS"));
        assert!(dict.check("Chandra"));
        assert!(!dict.check("chandra"));
        assert!(!dict.check("starz"));
    }

    #[test]
    fn test_check_apostrophes_and_compounds() {
        let dict = sample();
        assert!(dict.check("don't"));
        assert!(dict.check("don\u{2019}t"));
        assert!(dict.check("bright-star"));
        assert!(!dict.check("bright-strs"));
    }

    #[test]
    fn test_suggest() {
        let dict = sample();
        let suggestions = dict.suggest("speling");
        assert_eq!(suggestions.first().map(String::as_str), Some("spelling"));
        assert!(dict.suggest("Starz").contains(&"Stars".to_string()));
        assert!(dict.suggest("qqqqqqqq").is_empty());
    }

    #[test]
    fn test_suggest_limit() {
        let dict = sample().with_max_suggestions(1);
        assert_eq!(dict.suggest("sta").len(), 1);
    }

    #[test]
    fn test_add() {
        let mut dict = sample();
        assert!(!dict.check("exoplanet"));
        dict.add("exoplanet");
        dict.add("exoplanet");
        assert!(dict.check("exoplanet"));
        assert_eq!(dict.added(), ["exoplanet"]);
    }

    #[test]
    fn test_parse_hunspell_dic() {
        let words: Vec<_> = parse_word_list("3\nstar/S\nbright/PT\n# comment\n\nray\n").collect();
        assert_eq!(words, ["star", "bright", "ray"]);
    }

    #[test]
    fn test_load_missing_dictionary() {
        let err = WordList::load(Path::new("/nonexistent/en_XX.dic")).unwrap_err();
        assert!(matches!(err, SpellError::DictionaryUnavailable { .. }));
    }

    #[test]
    fn test_load_empty_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dic");
        fs::write(&path, "0\n").unwrap();
        assert!(matches!(
            WordList::load(&path).unwrap_err(),
            SpellError::EmptyDictionary(_)
        ));
    }

    #[test]
    fn test_personal_word_list() {
        let dir = tempfile::tempdir().unwrap();
        let personal = dir.path().join("personal.txt");
        fs::write(&personal, "photometry\n").unwrap();

        let mut dict = sample().with_personal(&personal).unwrap();
        assert!(dict.check("photometry"));

        dict.add("exoplanet");
        dict.save_personal().unwrap();
        assert_eq!(
            fs::read_to_string(&personal).unwrap(),
            "photometry\nexoplanet\n"
        );
    }

    #[test]
    fn test_personal_list_without_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let personal = dir.path().join("personal.txt");
        fs::write(&personal, "photometry").unwrap();

        let mut dict = sample().with_personal(&personal).unwrap();
        dict.add("exoplanet");
        dict.save_personal().unwrap();
        assert_eq!(
            fs::read_to_string(&personal).unwrap(),
            "photometry\nexoplanet\n"
        );

        let reloaded = WordList::default().with_personal(&personal).unwrap();
        assert!(reloaded.check("photometry"));
        assert!(reloaded.check("exoplanet"));
    }

    #[test]
    fn test_missing_personal_list_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let personal = dir.path().join("new.txt");
        let mut dict = sample().with_personal(&personal).unwrap();
        dict.save_personal().unwrap();
        assert!(!personal.exists());

        dict.add("Kepler");
        dict.save_personal().unwrap();
        assert_eq!(fs::read_to_string(&personal).unwrap(), "Kepler\n");
    }
}
