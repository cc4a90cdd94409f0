//! Line-based interactive corrector

use crate::session::{Corrector, Decision, Misspelling};
use std::io::{self, BufRead, Write};

/// Asks for decisions on a line-based terminal
///
/// Answers: a suggestion number, `r` to type a replacement, `a` to add the
/// word to the personal dictionary, `i` (or an empty line) to ignore it,
/// `I` to ignore it everywhere and `q` to quit. End of input quits.
pub struct TerminalCorrector<R, W> {
    input: R,
    output: W,
}

impl TerminalCorrector<io::StdinLock<'static>, io::Stderr> {
    /// Read answers from stdin, prompt on stderr
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalCorrector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one line, `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn show(&mut self, issue: &Misspelling) -> io::Result<()> {
        let end = issue.offset + issue.word.len();
        writeln!(self.output)?;
        writeln!(
            self.output,
            "cell {}: {}>>{}<<{}",
            issue.cell,
            &issue.context[..issue.offset],
            issue.word,
            &issue.context[end..]
        )?;
        if issue.suggestions.is_empty() {
            writeln!(self.output, "  (no suggestions)")?;
        }
        for (i, suggestion) in issue.suggestions.iter().enumerate() {
            writeln!(self.output, "  {i}: {suggestion}")?;
        }
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{text}")?;
        self.output.flush()
    }
}

impl<R: BufRead, W: Write> Corrector for TerminalCorrector<R, W> {
    fn correct(&mut self, issue: &Misspelling) -> io::Result<Decision> {
        self.show(issue)?;
        loop {
            self.prompt("[number] r)eplace a)dd i)gnore I)gnore all q)uit > ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(Decision::Quit);
            };

            let decision = match answer.trim() {
                "" | "i" => Decision::Ignore,
                "I" => Decision::IgnoreAll,
                "a" => Decision::Add,
                "q" => Decision::Quit,
                "r" => {
                    self.prompt(&format!("replace {:?} with: ", issue.word))?;
                    match self.read_line()? {
                        Some(text) if !text.trim().is_empty() => {
                            Decision::Replace(text.trim().to_string())
                        }
                        Some(_) => continue,
                        None => return Ok(Decision::Quit),
                    }
                }
                other => match other.parse::<usize>() {
                    Ok(n) if n < issue.suggestions.len() => Decision::Accept(n),
                    _ => {
                        writeln!(self.output, "unrecognized answer {other:?}")?;
                        continue;
                    }
                },
            };
            return Ok(decision);
        }
    }
}
