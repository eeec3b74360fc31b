//! # Command Tokenizer
//!
//! Splits a datagram payload into command words and re-escapes words for
//! safe round-tripping.
//!
//! Grammar: words are separated by whitespace; double quotes group a word that
//! contains separators; a backslash escapes the next character both inside and
//! outside quotes; `//` outside quotes starts a comment that runs to the end
//! of the line.

/// Tokenized form of one command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    tokens: Vec<String>,
}

impl Args {
    /// Tokenize a raw command line.
    pub fn parse(line: &str) -> Self {
        let mut tokens = Vec::new();
        let mut token = String::new();
        let mut in_token = false;
        let mut in_quotes = false;
        let mut escaped = false;

        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if escaped {
                token.push(c);
                escaped = false;
                in_token = true;
                continue;
            }

            match c {
                '\\' => {
                    escaped = true;
                    in_token = true;
                }
                '"' => {
                    if in_quotes {
                        // Closing quote ends the word even if it is empty.
                        tokens.push(std::mem::take(&mut token));
                        in_token = false;
                    } else {
                        in_token = true;
                    }
                    in_quotes = !in_quotes;
                }
                '/' if !in_quotes && chars.peek() == Some(&'/') => break,
                c if c.is_whitespace() && !in_quotes => {
                    if in_token {
                        tokens.push(std::mem::take(&mut token));
                        in_token = false;
                    }
                }
                c => {
                    token.push(c);
                    in_token = true;
                }
            }
        }

        if in_token {
            tokens.push(token);
        }

        Self { tokens }
    }

    /// Build directly from pre-split tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Rejoin tokens from `start` onward into a single line, each word
    /// escaped so the result survives re-tokenization unchanged.
    pub fn escaped_from(&self, start: usize) -> String {
        self.tokens
            .iter()
            .skip(start)
            .map(|t| escape(t))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Escape one word so it re-parses as a single token: separators, comment
/// starts, and the quoting/expansion characters all get a backslash. A plain
/// word comes back unchanged.
pub fn escape(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let comment_start = c == '/' && matches!(chars.get(i + 1).copied(), Some('/' | '*'));
        let separator = (c.is_whitespace() || c.is_control()) || c == ';' || comment_start;
        let special = matches!(c, '$' | '"' | '\\');

        if separator || special {
            out.push('\\');
        }
        out.push(c);
    }

    out
}
