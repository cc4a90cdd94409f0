//! nb2tex: CLI tool to turn Jupyter notebooks into LaTeX articles

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::{CONFIG_FILE_NAME, Config, ConvertConfig, MarkdownMode};
use nb_format::{CellType, read_notebook};
use nb2tex_core::{
    ConverterRegistry, ConvertOptions, DEFAULT_CODE_MARKER, IgnoreConverter,
    LatexHeadingConverter, MarkedCodeOutputConverter, MinimalMarkdownConverter, NotebookConverter,
};
use nb2tex_spell::{SpellChecker, TerminalCorrector, WordList};

/// Dictionary language used when neither flag nor config names one
const DEFAULT_LANG: &str = "en_US";

#[derive(Parser, Debug)]
#[command(name = "nb2tex")]
#[command(about = "Turn Jupyter notebooks into LaTeX articles")]
#[command(version)]
#[command(after_help = "Examples:
  nb2tex convert paper.ipynb paper.tex
  nb2tex convert paper.ipynb paper.tex --start 'The paper starts here' --stop 'The paper ends here'
  nb2tex convert paper.ipynb body.tex --skip-cells 3 --file-before preamble.tex
  nb2tex spellcheck paper.ipynb paper.ipynb --personal words.txt
  nb2tex init                         # Write a sample _nb2tex.toml")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a notebook to a LaTeX document
    Convert(ConvertArgs),
    /// Interactively spell check the prose cells of a notebook
    Spellcheck(SpellcheckArgs),
    /// Write a sample configuration file
    Init(InitArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input notebook
    input: PathBuf,

    /// Output LaTeX file
    output: PathBuf,

    /// Number of leading cells to skip
    #[arg(long, value_name = "N")]
    skip_cells: Option<usize>,

    /// Skip cells up to and including the first one containing this text
    #[arg(long, value_name = "MARKER")]
    start: Option<String>,

    /// Stop before the first cell containing this text
    #[arg(long, value_name = "MARKER")]
    stop: Option<String>,

    /// Index of the first cell that is never converted
    #[arg(long, value_name = "N")]
    stop_cell: Option<usize>,

    /// File copied to the output before the converted cells
    #[arg(long, value_name = "PATH")]
    file_before: Option<PathBuf>,

    /// File copied to the output after the converted cells
    #[arg(long, value_name = "PATH")]
    file_after: Option<PathBuf>,

    /// Text marking code cells whose output is included, matched anywhere in the source [default: "# output->LaTeX"]
    #[arg(long, value_name = "STR")]
    code_marker: Option<String>,

    /// How markdown cells are rendered [default: literal]
    #[arg(long, value_enum)]
    markdown: Option<MarkdownMode>,

    /// Drop code cells entirely
    #[arg(long)]
    ignore_code: bool,

    /// Configuration file [default: _nb2tex.toml next to the input]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SpellcheckArgs {
    /// Input notebook
    input: PathBuf,

    /// Output notebook (may be the input)
    output: PathBuf,

    /// Word list or hunspell .dic file
    #[arg(long, value_name = "PATH")]
    dictionary: Option<PathBuf>,

    /// Personal word list, extended with added words
    #[arg(long, value_name = "PATH")]
    personal: Option<PathBuf>,

    /// Language of the system dictionary [default: en_US]
    #[arg(long)]
    lang: Option<String>,

    /// Configuration file [default: _nb2tex.toml next to the input]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Output path of the configuration file
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    output: PathBuf,

    /// Print the JSON schema of the configuration instead
    #[arg(long)]
    schema: bool,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Convert(args) => run_convert(&args, cli.quiet),
        Command::Spellcheck(args) => run_spellcheck(&args, cli.quiet),
        Command::Init(args) => run_init(&args, cli.quiet),
    }
}

/// Log to stderr, `RUST_LOG` overrides the level picked by -v/-q
fn init_logging(verbose: bool, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load `--config`, or `_nb2tex.toml` from the input's directory
fn load_config(explicit: Option<&Path>, input: &Path) -> Result<Config> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading config");
        return Config::load(path);
    }
    let dir = input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    match Config::load_from_dir(dir)? {
        Some(config) => {
            debug!(dir = %dir.display(), "loaded {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn ensure_input(input: &Path) -> Result<()> {
    if !input.is_file() {
        anyhow::bail!("Input notebook does not exist: {}", input.display());
    }
    Ok(())
}

fn run_convert(args: &ConvertArgs, quiet: bool) -> Result<()> {
    ensure_input(&args.input)?;
    let config = load_config(args.config.as_deref(), &args.input)?;
    let converter = build_converter(args, &config.convert)?;

    let notebook = read_notebook(&args.input)
        .with_context(|| format!("Failed to read: {}", args.input.display()))?;
    converter
        .convert(&notebook, &args.output)
        .with_context(|| format!("Failed to convert: {}", args.input.display()))?;

    if !quiet {
        println!("{}", args.output.display());
    }
    Ok(())
}

/// Combine flags and configuration into a converter; flags win
fn build_converter(args: &ConvertArgs, config: &ConvertConfig) -> Result<NotebookConverter> {
    let file_before = args.file_before.as_ref().or(config.file_before.as_ref());
    let file_after = args.file_after.as_ref().or(config.file_after.as_ref());

    let options = ConvertOptions {
        skip_cells: args.skip_cells.or(config.skip_cells).unwrap_or(0),
        start_marker: args.start.clone().or_else(|| config.start.clone()),
        stop_marker: args.stop.clone().or_else(|| config.stop.clone()),
        stop_cell: args.stop_cell.or(config.stop_cell),
        prologue: read_optional(file_before)?,
        epilogue: read_optional(file_after)?,
    };

    let mut headings = LatexHeadingConverter::default();
    if let Some(levels) = &config.heading_levels {
        headings = headings.with_levels(levels.clone());
    }
    if let Some(prefix) = &config.label_prefix {
        headings = headings.with_label_prefix(prefix.clone());
    }
    if let Some(separator) = &config.label_separator {
        headings = headings.with_label_separator(separator.clone());
    }

    let mut registry = ConverterRegistry::default();
    registry.insert(CellType::Heading, headings.clone());

    if args.ignore_code || config.ignore_code.unwrap_or(false) {
        registry.insert(CellType::Code, IgnoreConverter);
    } else {
        let marker = args
            .code_marker
            .clone()
            .or_else(|| config.code_marker.clone())
            .unwrap_or_else(|| DEFAULT_CODE_MARKER.to_string());
        registry.insert(CellType::Code, MarkedCodeOutputConverter::new(marker));
    }

    if args.markdown.or(config.markdown) == Some(MarkdownMode::Minimal) {
        registry.insert(CellType::Markdown, MinimalMarkdownConverter::new(headings));
    }

    Ok(NotebookConverter::new(options).with_converters(registry))
}

fn read_optional(path: Option<&PathBuf>) -> Result<Option<String>> {
    path.map(|path| {
        fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))
    })
    .transpose()
}

fn run_spellcheck(args: &SpellcheckArgs, quiet: bool) -> Result<()> {
    ensure_input(&args.input)?;
    let config = load_config(args.config.as_deref(), &args.input)?;
    let settings = &config.spellcheck;

    let mut dictionary = match args.dictionary.as_ref().or(settings.dictionary.as_ref()) {
        Some(path) => WordList::load(path)?,
        None => {
            let lang = args
                .lang
                .as_deref()
                .or(settings.lang.as_deref())
                .unwrap_or(DEFAULT_LANG);
            WordList::find(lang)?
        }
    };
    if let Some(personal) = args.personal.as_ref().or(settings.personal.as_ref()) {
        dictionary = dictionary.with_personal(personal)?;
    }
    if let Some(max) = settings.max_suggestions {
        dictionary = dictionary.with_max_suggestions(max);
    }

    let mut checker = SpellChecker::new(dictionary);
    let mut corrector = TerminalCorrector::stdio();
    let report = checker
        .check_file(&args.input, &args.output, &mut corrector)
        .with_context(|| format!("Failed to spell check: {}", args.input.display()))?;
    checker
        .dictionary()
        .save_personal()
        .context("Failed to save personal word list")?;

    if !quiet {
        println!("{}", args.output.display());
        eprintln!(
            "Checked {} words: {} misspelled, {} replaced, {} added{}",
            report.tokens_checked,
            report.misspellings,
            report.replacements,
            report.words_added,
            if report.stopped { " (stopped early)" } else { "" }
        );
    }
    Ok(())
}

fn run_init(args: &InitArgs, quiet: bool) -> Result<()> {
    if args.schema {
        println!("{}", Config::json_schema_string()?);
        return Ok(());
    }

    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let content = Config::sample_toml()?;
    fs::write(&args.output, content)
        .with_context(|| format!("Failed to write: {}", args.output.display()))?;

    if !quiet {
        println!("{}", args.output.display());
    }
    Ok(())
}
