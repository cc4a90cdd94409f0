//! Prose tokenizer for LaTeX-flavoured markdown
//!
//! Splits cell text into words and markup-like tokens. Only the byte spans
//! of tokens are recorded; everything between tokens (whitespace,
//! punctuation) is left for the caller to copy unchanged.

/// Commands whose braced arguments are identifiers rather than prose
const IDENTIFIER_COMMANDS: &[&str] = &[
    "label",
    "ref",
    "eqref",
    "autoref",
    "cref",
    "Cref",
    "pageref",
    "cite",
    "citep",
    "citet",
    "citealt",
    "citealp",
    "citeauthor",
    "citeyear",
    "url",
    "href",
    "begin",
    "end",
    "includegraphics",
    "input",
    "include",
    "bibliography",
    "bibliographystyle",
    "usepackage",
    "documentclass",
];

const URL_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "www."];

/// The kind of token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A natural-language word
    Word,
    /// A LaTeX command such as `\emph` or `\%`
    Command,
    /// An identifier argument such as `{sect:intro}` or `[p.~3]`
    Argument,
    /// Inline or display math delimited by `$`
    Math,
    /// A URL
    Url,
}

/// A token with its byte span in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Starting byte offset
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

/// Split `input` into tokens
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Tokenizer::new(input).collect()
}

/// Whether a token should be looked up in the dictionary
///
/// Markup is never checked: tokens starting with `\`, `$`, `{` or `[`,
/// URLs, and anything containing a digit.
pub fn is_checkable(token: &str) -> bool {
    let Some(first) = token.chars().next() else {
        return false;
    };
    first.is_alphabetic()
        && !token.contains("://")
        && !token.starts_with("www.")
        && !token.chars().any(|c| c.is_ascii_digit())
}

/// Iterator over the tokens of a string
pub struct Tokenizer<'a> {
    input: &'a str,
    /// Current byte position
    pos: usize,
    /// Identifier arguments still to be emitted for the last command
    pending_args: Option<ArgMode>,
}

#[derive(Debug, Clone, Copy)]
enum ArgMode {
    /// Every following `{..}` / `[..]` group
    All,
    /// Only the first `{..}` group (`\href{url}{text}`)
    First,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            pending_args: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.input[start..self.pos],
            start,
            end: self.pos,
        }
    }

    fn read_command(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1; // backslash
        let name_len = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_alphabetic)
            .count();

        if name_len == 0 {
            // Control symbol such as \% or \\
            if let Some(c) = self.peek() {
                self.pos += c.len_utf8();
            }
            return self.token(TokenKind::Command, start);
        }

        let name = &self.input[self.pos..self.pos + name_len];
        self.pos += name_len;
        if self.rest().starts_with('*') {
            self.pos += 1;
        }

        if IDENTIFIER_COMMANDS.contains(&name) {
            self.pending_args = Some(if name == "href" {
                ArgMode::First
            } else {
                ArgMode::All
            });
        }
        self.token(TokenKind::Command, start)
    }

    /// Consume a balanced group opened by `open`; unterminated groups run
    /// to the end of the input
    fn read_group(&mut self, open: char, close: char) -> Token<'a> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut escaped = false;
        for (offset, c) in self.rest().char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            if c == '\\' {
                escaped = true;
            } else if c == open {
                depth += 1;
            } else if c == close {
                depth -= 1;
                if depth == 0 {
                    self.pos += offset + c.len_utf8();
                    return self.token(TokenKind::Argument, start);
                }
            }
        }
        self.pos = self.input.len();
        self.token(TokenKind::Argument, start)
    }

    fn read_math(&mut self) -> Token<'a> {
        let start = self.pos;
        let delimiter = if self.rest().starts_with("$$") { "$$" } else { "$" };
        self.pos += delimiter.len();

        let body = self.rest();
        let mut escaped = false;
        let mut close = None;
        for (offset, c) in body.char_indices() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if body[offset..].starts_with(delimiter) {
                close = Some(offset);
                break;
            }
        }

        self.pos = match close {
            Some(offset) => self.pos + offset + delimiter.len(),
            None => self.input.len(),
        };
        self.token(TokenKind::Math, start)
    }

    fn read_url(&mut self) -> Token<'a> {
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| c.is_whitespace() || matches!(c, ')' | '>' | '}' | '"'))
            .unwrap_or(self.rest().len());
        self.pos += len;
        self.token(TokenKind::Url, start)
    }

    fn read_word(&mut self) -> Token<'a> {
        let start = self.pos;
        let mut chars = self.rest().char_indices().peekable();
        let mut end = 0;
        while let Some((offset, c)) = chars.next() {
            if c.is_alphanumeric() {
                end = offset + c.len_utf8();
            } else if matches!(c, '\'' | '\u{2019}' | '-') {
                // Joiners only count between letters: don't, X-ray
                match chars.peek() {
                    Some((_, next)) if next.is_alphabetic() => {}
                    _ => break,
                }
            } else {
                break;
            }
        }
        self.pos += end;
        self.token(TokenKind::Word, start)
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let c = self.peek()?;

            if let Some(mode) = self.pending_args {
                match c {
                    '{' => {
                        if matches!(mode, ArgMode::First) {
                            self.pending_args = None;
                        }
                        return Some(self.read_group('{', '}'));
                    }
                    '[' => return Some(self.read_group('[', ']')),
                    _ => self.pending_args = None,
                }
            }

            if c == '\\' {
                return Some(self.read_command());
            }
            if c == '$' {
                return Some(self.read_math());
            }
            if URL_PREFIXES.iter().any(|p| self.rest().starts_with(p)) {
                return Some(self.read_url());
            }
            if c.is_alphabetic() {
                return Some(self.read_word());
            }
            self.pos += c.len_utf8();
        }
    }
}
