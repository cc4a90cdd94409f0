//! Integration tests for the nb2tex binary

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn nb2tex() -> Command {
    Command::new(env!("CARGO_BIN_EXE_nb2tex"))
}

/// Copy the paper fixture into `dir` so a config file can sit next to it
fn paper_in(dir: &Path) -> PathBuf {
    let input = dir.join("paper.ipynb");
    fs::copy(fixtures_dir().join("paper.ipynb"), &input).expect("Failed to copy fixture");
    input
}

fn run(cmd: &mut Command) -> Output {
    let output = cmd.output().expect("Failed to run nb2tex");
    assert!(
        output.status.success(),
        "nb2tex failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

#[test]
fn test_convert_between_markers() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("paper.tex");

    let result = run(nb2tex()
        .arg("convert")
        .arg(fixtures_dir().join("paper.ipynb"))
        .arg(&output)
        .args(["--start", "The paper starts here"])
        .args(["--stop", "The paper ends here"]));

    assert_eq!(
        String::from_utf8(result.stdout).unwrap().trim(),
        output.display().to_string()
    );
    let content = fs::read_to_string(&output).expect("Failed to read output file");
    insta::assert_snapshot!("paper_between_markers", content);
}

#[test]
fn test_convert_uses_config_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = paper_in(dir.path());
    let output = dir.path().join("paper.tex");
    fs::write(
        dir.path().join("_nb2tex.toml"),
        r#"
[convert]
start = "The paper starts here"
stop = "The paper ends here"
heading_levels = ["section", "subsection"]
label_prefix = "sec:"
label_separator = "_"
"#,
    )
    .unwrap();

    run(nb2tex().arg("convert").arg(&input).arg(&output).arg("-q"));

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("\\subsection{Introduction}\n\\label{sec:introduction}\n"));
    assert!(content.contains("\\label{sec:summary_and_outlook}"));
    assert!(!content.contains("Notes to self"));
}

#[test]
fn test_flags_override_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = paper_in(dir.path());
    let output = dir.path().join("paper.tex");
    fs::write(dir.path().join("_nb2tex.toml"), "[convert]\nskip_cells = 12\n").unwrap();

    run(nb2tex()
        .arg("convert")
        .arg(&input)
        .arg(&output)
        .args(["--skip-cells", "11", "-q"]));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "The paper ends here\n\nScratch notes after the paper.\n\n"
    );
}

#[test]
fn test_convert_with_prologue_and_ignored_code() {
    let dir = tempfile::tempdir().unwrap();
    let before = dir.path().join("before.tex");
    let after = dir.path().join("after.tex");
    let output = dir.path().join("body.tex");
    fs::write(&before, "% generated\n").unwrap();
    fs::write(&after, "% end\n").unwrap();

    run(nb2tex()
        .arg("convert")
        .arg(fixtures_dir().join("paper.ipynb"))
        .arg(&output)
        .args(["--skip-cells", "3", "--stop-cell", "9", "--ignore-code"])
        .arg("--file-before")
        .arg(&before)
        .arg("--file-after")
        .arg(&after));

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "% generated\n\
         \\section{Introduction}\n\\label{sect:introduction}\n\n\
         Young stars are \\emph{bright} in X-rays \\citep{Feigelson1999}.\n\
         We observed them with \\textit{Chandra}.\n\n\
         \\subsection{Data reduction}\n\\label{sect:data-reduction}\n\n\
         % end\n"
    );
}

#[test]
fn test_missing_marker_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("paper.tex");

    let result = nb2tex()
        .arg("convert")
        .arg(fixtures_dir().join("paper.ipynb"))
        .arg(&output)
        .args(["--start", "no such marker"])
        .output()
        .expect("Failed to run nb2tex");

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Start marker not found"));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = nb2tex()
        .arg("convert")
        .arg(dir.path().join("missing.ipynb"))
        .arg(dir.path().join("out.tex"))
        .output()
        .expect("Failed to run nb2tex");
    assert!(!result.status.success());
}

#[test]
fn test_spellcheck_applies_answers() {
    let dir = tempfile::tempdir().unwrap();
    let input = paper_in(dir.path());
    let personal = dir.path().join("words.txt");

    let mut child = nb2tex()
        .arg("spellcheck")
        .arg(&input)
        .arg(&input)
        .arg("--dictionary")
        .arg(fixtures_dir().join("en_TEST.dic"))
        .arg("--personal")
        .arg(&personal)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run nb2tex");
    // rerun -> re-run, then add Chandra
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"r\nre-run\na\n")
        .unwrap();
    let result = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(result.status.success(), "nb2tex failed: {stderr}");
    assert!(stderr.contains(">>rerun<<"));
    assert!(stderr.contains("2 misspelled, 1 replaced, 1 added"));

    let notebook = nb_format::read_notebook(&input).unwrap();
    assert_eq!(
        notebook.cells()[0].source(),
        "Notes to self: re-run the fits before submission."
    );
    assert_eq!(fs::read_to_string(&personal).unwrap(), "Chandra\n");
}

#[test]
fn test_spellcheck_quit_on_end_of_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = paper_in(dir.path());
    let output = dir.path().join("checked.ipynb");

    let result = run(nb2tex()
        .arg("spellcheck")
        .arg(&input)
        .arg(&output)
        .arg("--dictionary")
        .arg(fixtures_dir().join("en_TEST.dic"))
        .stdin(Stdio::null()));

    assert!(String::from_utf8_lossy(&result.stderr).contains("stopped early"));
    assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());
}

#[test]
fn test_spellcheck_missing_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let input = paper_in(dir.path());

    let result = nb2tex()
        .arg("spellcheck")
        .arg(&input)
        .arg(&input)
        .arg("--dictionary")
        .arg(dir.path().join("none.dic"))
        .stdin(Stdio::null())
        .output()
        .expect("Failed to run nb2tex");

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("Failed to read dictionary"));
}

#[test]
fn test_init_config() {
    let dir = tempfile::tempdir().unwrap();
    let output_file = dir.path().join("_nb2tex.toml");

    run(nb2tex().arg("init").arg("-o").arg(&output_file));

    let content = fs::read_to_string(&output_file).expect("Failed to read config file");
    assert!(content.starts_with("#:schema https://"));
    let parsed: toml::Table = toml::from_str(&content).expect("Invalid TOML");
    assert_eq!(
        parsed["convert"]["code_marker"].as_str(),
        Some("# output->LaTeX")
    );
    assert_eq!(parsed["spellcheck"]["lang"].as_str(), Some("en_US"));

    // Existing files are kept unless forced
    let again = nb2tex()
        .arg("init")
        .arg("-o")
        .arg(&output_file)
        .output()
        .unwrap();
    assert!(!again.status.success());
    run(nb2tex().arg("init").arg("-o").arg(&output_file).arg("--force"));
}

#[test]
fn test_init_then_convert_without_markers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("note.ipynb");
    fs::write(
        &input,
        r#"{"cells": [{"cell_type": "markdown", "metadata": {}, "source": ["Plain text."]}],
            "metadata": {}, "nbformat": 4, "nbformat_minor": 5}"#,
    )
    .unwrap();
    let output = dir.path().join("note.tex");

    run(nb2tex().current_dir(dir.path()).arg("init"));
    assert!(dir.path().join("_nb2tex.toml").exists());
    run(nb2tex().arg("convert").arg(&input).arg(&output));

    assert_eq!(fs::read_to_string(&output).unwrap(), "Plain text.\n\n");
}

#[test]
fn test_init_schema() {
    let output = run(nb2tex().arg("init").arg("--schema"));

    let schema: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON schema");
    assert_eq!(schema["title"], "Config");
    assert!(schema["$defs"]["ConvertConfig"].is_object());
}
