//! Configuration file support for nb2tex CLI
//!
//! Loads settings from `_nb2tex.toml` configuration file.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up next to the input notebook
pub const CONFIG_FILE_NAME: &str = "_nb2tex.toml";

/// Schema URL for the configuration file
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/nb2tex/nb2tex/main/crates/nb2tex-cli/schema/nb2tex.schema.json";

/// Marker options shown in the sample file, disabled
const SAMPLE_MARKERS: &str = "[convert]
# start = \"The paper starts here\"
# stop = \"The paper ends here\"
";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Notebook to LaTeX conversion
    #[serde(skip_serializing_if = "ConvertConfig::is_empty")]
    pub convert: ConvertConfig,
    /// Interactive spell checking
    #[serde(skip_serializing_if = "SpellcheckConfig::is_empty")]
    pub spellcheck: SpellcheckConfig,
}

/// How markdown cells are rendered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownMode {
    /// Copy the source verbatim
    Literal,
    /// Also turn `#` heading lines into sectioning commands
    Minimal,
}

/// Conversion configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct ConvertConfig {
    /// Number of leading cells to skip (default: 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cells: Option<usize>,
    /// Skip cells up to and including the first one containing this text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Stop before the first cell containing this text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    /// Index of the first cell that is never converted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_cell: Option<usize>,
    /// File copied before the converted cells (relative to this file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_before: Option<PathBuf>,
    /// File copied after the converted cells (relative to this file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_after: Option<PathBuf>,
    /// Text marking code cells whose output is included, matched anywhere in the source (default: "# output->LaTeX")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_marker: Option<String>,
    /// Markdown rendering: "literal" or "minimal" (default: "literal")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<MarkdownMode>,
    /// Drop code cells entirely (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_code: Option<bool>,
    /// Sectioning commands by heading level
    /// (default: ["chapter", "section", "subsection", "subsubsection", "paragraph", "subparagraph"])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_levels: Option<Vec<String>>,
    /// Prefix of generated labels (default: "sect:")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_prefix: Option<String>,
    /// Replacement for each run of non-alphanumeric characters in generated labels (default: "-")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_separator: Option<String>,
}

impl ConvertConfig {
    fn is_empty(&self) -> bool {
        self.skip_cells.is_none()
            && self.start.is_none()
            && self.stop.is_none()
            && self.stop_cell.is_none()
            && self.file_before.is_none()
            && self.file_after.is_none()
            && self.code_marker.is_none()
            && self.markdown.is_none()
            && self.ignore_code.is_none()
            && self.heading_levels.is_none()
            && self.label_prefix.is_none()
            && self.label_separator.is_none()
    }
}

/// Spell checking configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct SpellcheckConfig {
    /// Word list or hunspell .dic file (default: system dictionary for `lang`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<PathBuf>,
    /// Personal word list, extended with added words
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal: Option<PathBuf>,
    /// Dictionary language (default: "en_US")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Number of suggestions offered per word (default: 5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_suggestions: Option<usize>,
}

impl SpellcheckConfig {
    fn is_empty(&self) -> bool {
        self.dictionary.is_none()
            && self.personal.is_none()
            && self.lang.is_none()
            && self.max_suggestions.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    ///
    /// Relative paths in the file are resolved against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Try to load configuration from a directory (looks for `_nb2tex.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.convert.file_before,
            &mut self.convert.file_after,
            &mut self.spellcheck.dictionary,
            &mut self.spellcheck.personal,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema {}\n\n{}", SCHEMA_URL, toml_content))
    }

    /// Sample file written by `init`, with the marker options commented out
    pub fn sample_toml() -> Result<String> {
        let content = Self::sample().to_toml_with_schema()?;
        Ok(content.replacen("[convert]\n", SAMPLE_MARKERS, 1))
    }

    /// Create a sample configuration with common defaults for init command
    pub fn sample() -> Self {
        Config {
            convert: ConvertConfig {
                skip_cells: Some(0),
                start: None,
                stop: None,
                stop_cell: None,
                file_before: None,
                file_after: None,
                code_marker: Some(nb2tex_core::DEFAULT_CODE_MARKER.to_string()),
                markdown: Some(MarkdownMode::Literal),
                ignore_code: Some(false),
                heading_levels: None, // built-in chapter..subparagraph
                label_prefix: Some("sect:".to_string()),
                label_separator: Some("-".to_string()),
            },
            spellcheck: SpellcheckConfig {
                dictionary: None, // system dictionary
                personal: None,
                lang: Some("en_US".to_string()),
                max_suggestions: Some(nb2tex_spell::DEFAULT_MAX_SUGGESTIONS),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.convert.start.is_none());
        assert!(config.spellcheck.lang.is_none());
    }

    #[test]
    fn test_parse_convert_section() {
        let config: Config = toml::from_str(
            r##"
            [convert]
            skip_cells = 2
            start = "BEGIN"
            stop = "END"
            stop_cell = 40
            code_marker = "# tex"
            markdown = "minimal"
            ignore_code = true
            heading_levels = ["section", "subsection"]
            label_prefix = "sec:"
            label_separator = "_"
            "##,
        )
        .unwrap();

        let convert = &config.convert;
        assert_eq!(convert.skip_cells, Some(2));
        assert_eq!(convert.start.as_deref(), Some("BEGIN"));
        assert_eq!(convert.stop.as_deref(), Some("END"));
        assert_eq!(convert.stop_cell, Some(40));
        assert_eq!(convert.code_marker.as_deref(), Some("# tex"));
        assert_eq!(convert.markdown, Some(MarkdownMode::Minimal));
        assert_eq!(convert.ignore_code, Some(true));
        assert_eq!(
            convert.heading_levels,
            Some(vec!["section".to_string(), "subsection".to_string()])
        );
        assert_eq!(convert.label_prefix.as_deref(), Some("sec:"));
        assert_eq!(convert.label_separator.as_deref(), Some("_"));
    }

    #[test]
    fn test_parse_spellcheck_section() {
        let config: Config = toml::from_str(
            r#"
            [spellcheck]
            dictionary = "/usr/share/hunspell/en_GB.dic"
            personal = "words.txt"
            lang = "en_GB"
            max_suggestions = 3
            "#,
        )
        .unwrap();

        assert_eq!(
            config.spellcheck.dictionary,
            Some(PathBuf::from("/usr/share/hunspell/en_GB.dic"))
        );
        assert_eq!(config.spellcheck.personal, Some(PathBuf::from("words.txt")));
        assert_eq!(config.spellcheck.lang.as_deref(), Some("en_GB"));
        assert_eq!(config.spellcheck.max_suggestions, Some(3));
    }

    #[test]
    fn test_invalid_markdown_mode() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [convert]
            markdown = "full"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[convert]\nfile_before = \"preamble.tex\"\nfile_after = \"/abs/end.tex\"\n\n[spellcheck]\npersonal = \"words.txt\"\n",
        )
        .unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(
            config.convert.file_before,
            Some(dir.path().join("preamble.tex"))
        );
        assert_eq!(config.convert.file_after, Some(PathBuf::from("/abs/end.tex")));
        assert_eq!(config.spellcheck.personal, Some(dir.path().join("words.txt")));
    }

    #[test]
    fn test_load_from_dir_without_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_serialize_empty_config() {
        let config = Config::default();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        // Empty config should have minimal content
        assert!(!toml.contains("[convert]"));
    }

    #[test]
    fn test_serialize_sample_config() {
        let config = Config::sample();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(toml.contains("[convert]"));
        assert!(toml.contains("code_marker = \"# output->LaTeX\""));
        assert!(toml.contains("markdown = \"literal\""));
        assert!(toml.contains("[spellcheck]"));
    }

    #[test]
    fn test_sample_has_no_markers() {
        let content = Config::sample_toml().unwrap();
        assert!(content.contains("[convert]\n# start = "));

        let parsed: Config = toml::from_str(&content).unwrap();
        assert!(parsed.convert.start.is_none());
        assert!(parsed.convert.stop.is_none());
        assert_eq!(parsed.convert.skip_cells, Some(0));
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("ConvertConfig"));
        assert!(schema.contains("minimal"));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::sample();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.convert.skip_cells, parsed.convert.skip_cells);
        assert_eq!(config.convert.markdown, parsed.convert.markdown);
        assert_eq!(config.spellcheck.lang, parsed.spellcheck.lang);
    }
}
