use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::error::{Result, ScriptureLmError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Word,
    Number,
    Punct,
}

impl TokenKind {
    fn classify(text: &str) -> Self {
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            TokenKind::Number
        } else if text.chars().all(char::is_alphabetic) && !text.is_empty() {
            TokenKind::Word
        } else {
            TokenKind::Punct
        }
    }
}

/// A lexeme with UTF-8 byte offsets into its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl<'a> Token<'a> {
    pub fn is_number(&self) -> bool {
        self.kind == TokenKind::Number
    }

    pub fn is_word(&self) -> bool {
        self.kind == TokenKind::Word
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct && self.text.chars().eq(std::iter::once(c))
    }
}

fn lexeme_regex() -> &'static Regex {
    static LEXEME: OnceLock<Regex> = OnceLock::new();
    LEXEME.get_or_init(|| Regex::new(r"\d+|\p{L}+|\S").expect("lexeme pattern is valid"))
}

/// Source text plus its token sequence. Every non-whitespace character belongs to
/// exactly one token, so the gap between two tokens is always whitespace.
#[derive(Debug, Clone)]
pub struct TokenizedText<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
}

impl<'a> TokenizedText<'a> {
    pub fn new(source: &'a str) -> Self {
        let tokens = lexeme_regex()
            .find_iter(source)
            .map(|m| Token {
                text: m.as_str(),
                start: m.start(),
                end: m.end(),
                kind: TokenKind::classify(m.as_str()),
            })
            .collect();
        Self { source, tokens }
    }

    /// Accepts token boundaries produced by an external tokenizer.
    /// Spans must be ordered, non-overlapping, on char boundaries and separated only by whitespace.
    pub fn from_spans(source: &'a str, spans: &[(usize, usize)]) -> Result<Self> {
        let mut tokens = Vec::with_capacity(spans.len());
        let mut previous_end = 0usize;
        for &(start, end) in spans {
            if start >= end || end > source.len() {
                return Err(ScriptureLmError::InvalidInput(format!(
                    "token span {}..{} is empty or outside source of length {}",
                    start,
                    end,
                    source.len()
                )));
            }
            if start < previous_end {
                return Err(ScriptureLmError::InvalidInput(format!(
                    "token span {}..{} overlaps the previous token ending at {}",
                    start, end, previous_end
                )));
            }
            let (gap, text) = match (source.get(previous_end..start), source.get(start..end)) {
                (Some(gap), Some(text)) => (gap, text),
                _ => {
                    return Err(ScriptureLmError::InvalidInput(format!(
                        "token span {}..{} is not on a char boundary",
                        start, end
                    )))
                }
            };
            if !gap.chars().all(char::is_whitespace) {
                return Err(ScriptureLmError::InvalidInput(format!(
                    "non-whitespace text {:?} is not covered by any token",
                    gap
                )));
            }
            tokens.push(Token {
                text,
                start,
                end,
                kind: TokenKind::classify(text),
            });
            previous_end = end;
        }
        Ok(Self { source, tokens })
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tokens(&self) -> &[Token<'a>] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when token `i` ends exactly where token `i + 1` starts.
    pub fn adjacent(&self, i: usize) -> bool {
        match (self.tokens.get(i), self.tokens.get(i + 1)) {
            (Some(a), Some(b)) => a.end == b.start,
            _ => false,
        }
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }
}

struct CleanupPatterns {
    footnote_markers: Regex,
    bracketed: Regex,
    double_quotes: Regex,
    single_quotes: Regex,
    whitespace: Regex,
}

fn cleanup_patterns() -> &'static CleanupPatterns {
    static PATTERNS: OnceLock<CleanupPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CleanupPatterns {
        footnote_markers: Regex::new(r"[†‡*#¶]").expect("footnote pattern is valid"),
        bracketed: Regex::new(r"\[.*?\]").expect("bracket pattern is valid"),
        double_quotes: Regex::new(r"[“”„‟]").expect("quote pattern is valid"),
        single_quotes: Regex::new(r"[‘’‚‛]").expect("apostrophe pattern is valid"),
        whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
    })
}

/// Editorial cleanup for scraped verse and commentary text.
/// Changes offsets, so apply it before tokenization, never after.
pub fn normalize_text(text: &str) -> String {
    let p = cleanup_patterns();
    let text = p.footnote_markers.replace_all(text, "");
    let text = p.bracketed.replace_all(&text, "");
    let text = p.double_quotes.replace_all(&text, "\"");
    let text = p.single_quotes.replace_all(&text, "'");
    let text = p.whitespace.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexing_splits_words_numbers_and_punctuation() {
        let text = TokenizedText::new("See 1Cor. 13:4-7, and John 3:16!");
        let texts: Vec<&str> = text.tokens().iter().map(|t| t.text).collect();
        assert_eq!(
            texts,
            vec!["See", "1", "Cor", ".", "13", ":", "4", "-", "7", ",", "and", "John", "3", ":", "16", "!"]
        );
        let one = &text.tokens()[1];
        assert_eq!((one.start, one.end, one.kind), (4, 5, TokenKind::Number));
        assert!(text.adjacent(1), "'1' and 'Cor' touch");
        assert!(!text.adjacent(0), "'See' and '1' are separated by a space");
    }

    #[test]
    fn test_offsets_are_byte_offsets_into_source() {
        let source = "Ésaïe 53:5 — “healed”";
        let text = TokenizedText::new(source);
        for token in text.tokens() {
            assert_eq!(&source[token.start..token.end], token.text);
        }
        assert_eq!(text.tokens()[0].kind, TokenKind::Word);
        assert!(text.tokens().iter().any(|t| t.is_punct('—')));
    }

    #[test]
    fn test_from_spans_accepts_external_boundaries() -> Result<()> {
        let source = "Gen 1:1";
        let text = TokenizedText::from_spans(source, &[(0, 3), (4, 5), (5, 6), (6, 7)])?;
        assert_eq!(text.len(), 4);
        assert_eq!(text.tokens()[2].kind, TokenKind::Punct);
        Ok(())
    }

    #[test]
    fn test_from_spans_rejects_uncovered_text_and_overlaps() {
        assert!(TokenizedText::from_spans("Gen 1:1", &[(0, 3), (6, 7)]).is_err());
        assert!(TokenizedText::from_spans("Gen 1:1", &[(0, 3), (2, 5)]).is_err());
        assert!(TokenizedText::from_spans("Gen", &[(0, 9)]).is_err());
    }

    #[test]
    fn test_normalize_text_cleans_editorial_marks() {
        let raw = "In the beginning†  God [note: Heb. Elohim] created\n\n“the heaven” ¶ and the earth’s";
        assert_eq!(
            normalize_text(raw),
            "In the beginning God created \"the heaven\" and the earth's"
        );
    }
}
