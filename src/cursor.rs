//! Record tokenizer and the forward-only token cursor.
//!
//! Splitting follows escaped-list rules: the delimiter separates tokens outside
//! quotes, quote characters toggle quoting and are dropped, and the escape
//! character may precede another escape, a quote, or `n` (newline).

/// Delimiter, quote and escape characters for splitting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: char,
    pub quote: char,
    pub escape: char,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: ',',
            quote: '"',
            escape: '\\',
        }
    }
}

impl Dialect {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("invalid escape sequence at byte {position}: {found:?}")]
    BadEscape { position: usize, found: char },
    #[error("escape character at end of record (byte {position})")]
    DanglingEscape { position: usize },
    #[error("unterminated quote opened at byte {position}")]
    UnterminatedQuote { position: usize },
}

/// Split one record into tokens. An empty record has no tokens.
pub fn tokenize(line: &str, dialect: &Dialect) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    if line.is_empty() {
        return Ok(tokens);
    }
    let mut current = String::new();
    let mut quote_open: Option<usize> = None;
    let mut chars = line.char_indices();
    while let Some((pos, c)) = chars.next() {
        if c == dialect.escape {
            match chars.next() {
                Some((_, e)) if e == dialect.escape || e == dialect.quote => current.push(e),
                Some((_, 'n')) => current.push('\n'),
                Some((_, e)) => return Err(TokenizeError::BadEscape { position: pos, found: e }),
                None => return Err(TokenizeError::DanglingEscape { position: pos }),
            }
        } else if c == dialect.delimiter && quote_open.is_none() {
            tokens.push(std::mem::take(&mut current));
        } else if c == dialect.quote {
            quote_open = match quote_open {
                Some(_) => None,
                None => Some(pos),
            };
        } else {
            current.push(c);
        }
    }
    if let Some(position) = quote_open {
        return Err(TokenizeError::UnterminatedQuote { position });
    }
    tokens.push(current);
    Ok(tokens)
}

/// Forward-only cursor over one record's tokens. A consumed token cannot be re-read.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    tokens: Vec<String>,
    position: usize,
}

impl TokenCursor {
    pub fn new(tokens: Vec<String>) -> Self {
        TokenCursor { tokens, position: 0 }
    }

    pub fn from_line(line: &str, dialect: &Dialect) -> Result<Self, TokenizeError> {
        tokenize(line, dialect).map(Self::new)
    }

    /// Consume the next token, or `None` when the record is exhausted.
    pub fn next_token(&mut self) -> Option<&str> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token.as_str())
    }

    /// Index of the next unconsumed token.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

impl<S: Into<String>> FromIterator<S> for TokenCursor {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TokenCursor::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str) -> Vec<String> {
        tokenize(line, &Dialect::default()).expect("tokenize")
    }

    #[test]
    fn plain_split_keeps_trailing_empty_token() {
        assert_eq!(split("42,PKT_RX,3,0a,"), ["42", "PKT_RX", "3", "0a", ""]);
        assert!(split("").is_empty());
        assert_eq!(split(","), ["", ""]);
    }

    #[test]
    fn quotes_protect_delimiters() {
        assert_eq!(split(r#"a,"b,c",d"#), ["a", "b,c", "d"]);
        assert_eq!(split(r#""say ""hi""""#), ["say hi"]);
    }

    #[test]
    fn escapes() {
        assert_eq!(split(r#"a\"b,c\\d,e\nf"#), ["a\"b", "c\\d", "e\nf"]);
        assert_eq!(
            tokenize(r"a\x", &Dialect::default()),
            Err(TokenizeError::BadEscape { position: 1, found: 'x' })
        );
        assert_eq!(
            tokenize(r"ab\", &Dialect::default()),
            Err(TokenizeError::DanglingEscape { position: 2 })
        );
        assert_eq!(
            tokenize(r#"a,"b"#, &Dialect::default()),
            Err(TokenizeError::UnterminatedQuote { position: 2 })
        );
    }

    #[test]
    fn custom_delimiter() {
        let d = Dialect::default().with_delimiter(';');
        assert_eq!(tokenize("1;2,3", &d).unwrap(), ["1", "2,3"]);
    }

    #[test]
    fn cursor_is_forward_only() {
        let mut c: TokenCursor = ["a", "b"].into_iter().collect();
        assert_eq!(c.remaining(), 2);
        assert_eq!(c.next_token(), Some("a"));
        assert_eq!(c.position(), 1);
        assert_eq!(c.next_token(), Some("b"));
        assert_eq!(c.next_token(), None);
        assert!(c.is_exhausted());
        assert_eq!(c.position(), 2);
    }
}
