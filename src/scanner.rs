//! Candidate detection: finds substrings that look like references without
//! deciding what they mean. Book names are matched with a token trie built from
//! the canon's name table, longest name first.

use std::collections::HashMap;

use crate::canon::{is_ordinal_suffix, numbered_prefix, Canon};
use crate::config::ReferenceConfig;
use crate::error::Result;
use crate::reference::{CandidateSpan, CitationForm};
use crate::tokenizer::{Token, TokenizedText};

const RANGE_DASHES: [char; 3] = ['-', '–', '—'];

// Tokens allowed between a citation and a following bare number that continues it.
const CONNECTOR_PUNCT: [char; 4] = [',', ';', '&', '.'];
const CONNECTOR_WORDS: [&str; 8] = ["and", "cf", "see", "also", "v", "vv", "verse", "verses"];

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: HashMap<String, TrieNode>,
    terminal: bool,
}

/// Book names keyed by normalized token sequence.
#[derive(Debug, Default, Clone)]
pub struct BookTrie {
    root: TrieNode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BookName {
    // Token index of the first name word after any numbered prefix.
    first_word: usize,
    // Exclusive token index.
    end: usize,
}

impl BookTrie {
    pub fn from_canon(canon: &Canon) -> Self {
        let mut trie = BookTrie::default();
        for key in canon.alias_keys() {
            trie.insert(key);
        }
        trie
    }

    fn insert(&mut self, key: &[String]) {
        let mut node = &mut self.root;
        for part in key {
            node = node.children.entry(part.clone()).or_default();
        }
        node.terminal = true;
    }

    /// Longest book name starting at token `pos`.
    fn longest_match(&self, text: &TokenizedText, pos: usize) -> Option<BookName> {
        let tokens = text.tokens();
        let first = tokens.get(pos)?;
        let mut node = &self.root;
        let mut i = pos;

        if let Some(n) = numbered_prefix(first.text) {
            if let Some(child) = self.root.children.get(&n.to_string()) {
                node = child;
                i = pos + 1;
                // "1st John": the suffix must touch the digit.
                if first.is_number()
                    && text.adjacent(pos)
                    && tokens.get(i).map_or(false, |t| is_ordinal_suffix(t.text))
                {
                    i += 1;
                }
            }
        }

        let first_word = i;
        let mut best = None;
        while let Some(token) = tokens.get(i) {
            if !(token.is_word() || token.is_number()) {
                break;
            }
            match node.children.get(&token.text.to_lowercase()) {
                Some(child) => {
                    node = child;
                    i += 1;
                    if node.terminal {
                        best = Some(BookName { first_word, end: i });
                    }
                }
                None => break,
            }
        }
        best
    }
}

/// Counters for one pass over a text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub candidates: usize,
    pub parse_failures: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NumericCitation {
    parts: Vec<u32>,
    form: CitationForm,
    // Exclusive token index.
    end: usize,
}

#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    trie: BookTrie,
    separators: Vec<char>,
    space_separator: bool,
    require_capitalized_book: bool,
}

impl ReferenceScanner {
    pub fn new(canon: &Canon, config: &ReferenceConfig) -> Result<Self> {
        Ok(Self {
            trie: BookTrie::from_canon(canon),
            separators: config.separator_chars()?,
            space_separator: config.space_separator,
            require_capitalized_book: config.require_capitalized_book,
        })
    }

    /// Lazily yields candidates in order of start offset. Calling it again
    /// restarts from the beginning of the text.
    pub fn scan<'a, 't>(&'a self, text: &'a TokenizedText<'t>) -> Candidates<'a, 't> {
        Candidates {
            scanner: self,
            text,
            pos: 0,
            covered_until: 0,
            previous_end: None,
            stats: ScanStats::default(),
        }
    }

    fn book_name_at(&self, text: &TokenizedText, pos: usize) -> Option<BookName> {
        let name = self.trie.longest_match(text, pos)?;
        if self.require_capitalized_book {
            let first_word = text.tokens().get(name.first_word)?;
            if !first_word.text.chars().next().map_or(false, char::is_uppercase) {
                return None;
            }
        }
        Some(name)
    }

    fn is_separator(&self, token: &Token) -> bool {
        let mut chars = token.text.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if self.separators.contains(&c))
    }

    /// Index of the verse number following the number at `prev`, if a separator joins them.
    fn verse_after(&self, text: &TokenizedText, prev: usize) -> std::result::Result<Option<usize>, &'static str> {
        let tokens = text.tokens();
        let Some(next) = tokens.get(prev + 1) else {
            return Ok(None);
        };

        if self.is_separator(next) && text.adjacent(prev) {
            if !text.adjacent(prev + 1) {
                // "3: then": the separator is ordinary punctuation.
                return Ok(None);
            }
            return match tokens.get(prev + 2) {
                Some(verse) if verse.is_number() => Ok(Some(prev + 2)),
                _ => Err("separator not followed by a verse number"),
            };
        }

        if self.space_separator && next.is_number() && !text.adjacent(prev) {
            return Ok(Some(prev + 1));
        }
        Ok(None)
    }

    /// Index of the number after a range dash following token `prev`.
    fn range_end_after(&self, text: &TokenizedText, prev: usize) -> std::result::Result<Option<usize>, &'static str> {
        let tokens = text.tokens();
        let Some(dash) = tokens.get(prev + 1) else {
            return Ok(None);
        };
        if !RANGE_DASHES.iter().any(|&d| dash.is_punct(d)) {
            return Ok(None);
        }
        match tokens.get(prev + 2) {
            Some(end) if end.is_number() => Ok(Some(prev + 2)),
            _ if text.adjacent(prev) => Err("range dash not followed by a number"),
            _ => Ok(None),
        }
    }

    /// Parses `C`, `C-C2`, `C:V`, `C:V-W` or `C:V-C2:W` starting at the number token `start`.
    fn parse_numeric(&self, text: &TokenizedText, start: usize) -> std::result::Result<NumericCitation, &'static str> {
        let tokens = text.tokens();
        let number = |i: usize| {
            tokens[i]
                .text
                .parse::<u32>()
                .map_err(|_| "number does not fit in 32 bits")
        };

        let chapter = number(start)?;
        let Some(verse_idx) = self.verse_after(text, start)? else {
            return Ok(match self.range_end_after(text, start)? {
                Some(end_idx) => NumericCitation {
                    parts: vec![chapter, number(end_idx)?],
                    form: CitationForm::ChapterRange,
                    end: end_idx + 1,
                },
                None => NumericCitation {
                    parts: vec![chapter],
                    form: CitationForm::Chapter,
                    end: start + 1,
                },
            });
        };

        let verse = number(verse_idx)?;
        let Some(end_idx) = self.range_end_after(text, verse_idx)? else {
            return Ok(NumericCitation {
                parts: vec![chapter, verse],
                form: CitationForm::ChapterVerse,
                end: verse_idx + 1,
            });
        };

        let range_end = number(end_idx)?;
        match self.verse_after(text, end_idx)? {
            // A space-separated number after a range is a new citation, not a cross-chapter end.
            Some(second_verse) if text.adjacent(end_idx) => Ok(NumericCitation {
                parts: vec![chapter, verse, range_end, number(second_verse)?],
                form: CitationForm::CrossChapterRange,
                end: second_verse + 1,
            }),
            _ => Ok(NumericCitation {
                parts: vec![chapter, verse, range_end],
                form: CitationForm::ChapterVerseRange,
                end: end_idx + 1,
            }),
        }
    }

    /// End of the tightly written run of numbers, separators and dashes starting at `start`.
    fn numeric_run_end(&self, text: &TokenizedText, start: usize) -> usize {
        let tokens = text.tokens();
        let mut i = start + 1;
        while i < tokens.len()
            && text.adjacent(i - 1)
            && (tokens[i].is_number()
                || self.is_separator(&tokens[i])
                || RANGE_DASHES.iter().any(|&d| tokens[i].is_punct(d)))
        {
            i += 1;
        }
        i
    }
}

/// Lazy candidate iterator returned by [`ReferenceScanner::scan`].
#[derive(Debug, Clone)]
pub struct Candidates<'a, 't> {
    scanner: &'a ReferenceScanner,
    text: &'a TokenizedText<'t>,
    pos: usize,
    // Tokens before this index belong to an earlier candidate.
    covered_until: usize,
    // Token end of the last candidate or failed parse.
    previous_end: Option<usize>,
    stats: ScanStats,
}

impl<'a, 't> Candidates<'a, 't> {
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    fn continues_previous(&self, pos: usize) -> bool {
        let Some(previous_end) = self.previous_end else {
            return false;
        };
        let between = match self.text.tokens().get(previous_end..pos) {
            Some(between) if !between.is_empty() => between,
            _ => return false,
        };
        between.iter().all(|t| {
            CONNECTOR_PUNCT.iter().any(|&c| t.is_punct(c))
                || (t.is_word() && CONNECTOR_WORDS.contains(&t.text.to_lowercase().as_str()))
        })
    }

    fn span(&self, first: usize, last: usize) -> (usize, usize, String) {
        let tokens = self.text.tokens();
        let (start, end) = (tokens[first].start, tokens[last].end);
        (start, end, self.text.slice(start, end).to_string())
    }

    fn finish(&mut self, end: usize) {
        self.covered_until = self.covered_until.max(end);
        self.previous_end = Some(end);
        self.stats.candidates += 1;
    }

    fn record_failure(&mut self, first: usize, numbers_start: usize, reason: &str) {
        let end = self.scanner.numeric_run_end(self.text, numbers_start);
        let (start_offset, end_offset, raw) = self.span(first, end - 1);
        log::debug!(
            "Skipping malformed citation {:?} at {}..{}: {}",
            raw,
            start_offset,
            end_offset,
            reason
        );
        self.covered_until = self.covered_until.max(end);
        self.previous_end = Some(end);
        self.stats.parse_failures += 1;
    }

    fn book_candidate(&mut self, pos: usize, name: BookName) -> Option<CandidateSpan> {
        let text = self.text;
        let tokens = text.tokens();
        let (hint_start, hint_end) = (tokens[pos].start, tokens[name.end - 1].end);
        let book_hint = text.slice(hint_start, hint_end).to_string();

        let mut after = name.end;
        if tokens.get(after).map_or(false, |t| t.is_punct('.')) && text.adjacent(after - 1) {
            after += 1;
        }

        let numbers_follow = tokens.get(after).map_or(false, Token::is_number);
        if !numbers_follow {
            self.finish(name.end);
            let (start, end, raw_text) = self.span(pos, name.end - 1);
            return Some(CandidateSpan {
                text_offset_start: start,
                text_offset_end: end,
                raw_text,
                book_hint: Some(book_hint),
                numeric_parts: Vec::new(),
                form: CitationForm::BookOnly,
                continues_previous: false,
            });
        }

        match self.scanner.parse_numeric(text, after) {
            Ok(NumericCitation { parts, form, end }) => {
                self.finish(end);
                let (start, end_offset, raw_text) = self.span(pos, end - 1);
                Some(CandidateSpan {
                    text_offset_start: start,
                    text_offset_end: end_offset,
                    raw_text,
                    book_hint: Some(book_hint),
                    numeric_parts: parts,
                    form,
                    continues_previous: false,
                })
            }
            Err(reason) => {
                self.record_failure(pos, after, reason);
                None
            }
        }
    }

    fn numeric_candidate(&mut self, pos: usize) -> Option<CandidateSpan> {
        let continues_previous = self.continues_previous(pos);
        match self.scanner.parse_numeric(self.text, pos) {
            Ok(NumericCitation { parts, form, end }) => {
                self.finish(end);
                let (start, end_offset, raw_text) = self.span(pos, end - 1);
                Some(CandidateSpan {
                    text_offset_start: start,
                    text_offset_end: end_offset,
                    raw_text,
                    book_hint: None,
                    numeric_parts: parts,
                    form,
                    continues_previous,
                })
            }
            Err(reason) => {
                self.record_failure(pos, pos, reason);
                None
            }
        }
    }
}

impl<'a, 't> Iterator for Candidates<'a, 't> {
    type Item = CandidateSpan;

    fn next(&mut self) -> Option<CandidateSpan> {
        while self.pos < self.text.len() {
            let pos = self.pos;
            self.pos += 1;

            // Names are tried at every position, so "1 John 3:16" also yields "John 3:16".
            if let Some(name) = self.scanner.book_name_at(self.text, pos) {
                if let Some(candidate) = self.book_candidate(pos, name) {
                    return Some(candidate);
                }
                continue;
            }

            if pos >= self.covered_until && self.text.tokens()[pos].is_number() {
                if let Some(candidate) = self.numeric_candidate(pos) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}
