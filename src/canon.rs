//! The closed 66-book canon: book order, chapter and verse counts, and the
//! name/abbreviation table every other component resolves against.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::canon_data::STANDARD_BOOKS;
use crate::error::{Result, ScriptureLmError};
use crate::reference::CanonicalReference;
use crate::tokenizer::{TokenKind, TokenizedText};

pub const CANON_BOOK_COUNT: usize = 66;
pub const OLD_TESTAMENT_BOOK_COUNT: usize = 39;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Testament {
    Old,
    New,
}

/// Static description of one book. `verses[c - 1]` is the verse count of chapter `c`.
#[derive(Debug, Clone, Copy)]
pub struct BookRecord {
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub variants: &'static [&'static str],
    pub testament: Testament,
    pub verses: &'static [u16],
}

impl BookRecord {
    pub fn chapter_count(&self) -> u32 {
        self.verses.len() as u32
    }
}

/// Ordered weakest-last: a full name outranks the canonical abbreviation,
/// which outranks a historical variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AliasKind {
    FullName,
    Canonical,
    Variant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AliasEntry {
    book_index: usize,
    kind: AliasKind,
    // Original-case tokens after the numbered prefix, e.g. ["Cor"] for "1Cor".
    surface: Vec<String>,
}

/// One book a name can denote, with the evidence used to rank it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookMatch {
    pub book_index: usize,
    pub kind: AliasKind,
    pub exact_case: bool,
}

/// Maps "1", "I", "First" (any case) to the book number of a numbered book.
pub(crate) fn numbered_prefix(token: &str) -> Option<u8> {
    match token.to_lowercase().as_str() {
        "1" | "i" | "first" => Some(1),
        "2" | "ii" | "second" => Some(2),
        "3" | "iii" | "third" => Some(3),
        _ => None,
    }
}

pub(crate) fn is_ordinal_suffix(token: &str) -> bool {
    matches!(token.to_lowercase().as_str(), "st" | "nd" | "rd")
}

/// Normalized lookup key for a book name plus its original-case tail.
/// Periods are ignored; any other punctuation makes the text a non-name.
pub(crate) fn alias_key(text: &str) -> Option<(Vec<String>, Vec<String>)> {
    let lexed = TokenizedText::new(text);
    let tokens: Vec<_> = lexed
        .tokens()
        .iter()
        .filter(|t| !t.is_punct('.'))
        .collect();

    let mut key = Vec::with_capacity(tokens.len());
    let mut surface = Vec::with_capacity(tokens.len());
    let mut rest = &tokens[..];

    if tokens.len() > 1 {
        if let Some(n) = numbered_prefix(tokens[0].text) {
            key.push(n.to_string());
            rest = &tokens[1..];
            if rest.len() > 1 && tokens[0].is_number() && is_ordinal_suffix(rest[0].text) {
                rest = &rest[1..];
            }
        }
    }

    for token in rest {
        if token.kind == TokenKind::Punct {
            return None;
        }
        key.push(token.text.to_lowercase());
        surface.push(token.text.to_string());
    }

    if surface.is_empty() {
        None
    } else {
        Some((key, surface))
    }
}

#[derive(Debug)]
pub struct Canon {
    books: Vec<BookRecord>,
    aliases: HashMap<Vec<String>, Vec<AliasEntry>>,
}

impl Canon {
    /// The process-wide canon. Built and checked once; later calls return the same instance.
    pub fn standard() -> Result<&'static Canon> {
        static STANDARD: OnceLock<Canon> = OnceLock::new();
        if let Some(canon) = STANDARD.get() {
            return Ok(canon);
        }
        let canon = Canon::from_books(STANDARD_BOOKS.to_vec())?;
        log::info!(
            "Canon loaded: {} books, {} chapters, {} verses, {} name keys",
            canon.len(),
            canon.books.iter().map(|b| b.verses.len()).sum::<usize>(),
            canon.total_verses(),
            canon.aliases.len()
        );
        Ok(STANDARD.get_or_init(|| canon))
    }

    /// Builds a canon from book records, failing on any self-consistency violation.
    pub fn from_books(books: Vec<BookRecord>) -> Result<Self> {
        if books.len() != CANON_BOOK_COUNT {
            return Err(ScriptureLmError::CanonData(format!(
                "expected {} books, found {}",
                CANON_BOOK_COUNT,
                books.len()
            )));
        }

        for (index, book) in books.iter().enumerate() {
            let expected = if index < OLD_TESTAMENT_BOOK_COUNT {
                Testament::Old
            } else {
                Testament::New
            };
            if book.testament != expected {
                return Err(ScriptureLmError::CanonData(format!(
                    "{} is listed as {:?} Testament at position {}",
                    book.name, book.testament, index
                )));
            }
            if book.verses.is_empty() {
                return Err(ScriptureLmError::CanonData(format!("{} has no chapters", book.name)));
            }
            if let Some(chapter) = book.verses.iter().position(|&v| v == 0) {
                return Err(ScriptureLmError::CanonData(format!(
                    "{} chapter {} has no verses",
                    book.name,
                    chapter + 1
                )));
            }
        }

        let mut aliases: HashMap<Vec<String>, Vec<AliasEntry>> = HashMap::new();
        for (book_index, book) in books.iter().enumerate() {
            let names = std::iter::once((book.name, AliasKind::FullName))
                .chain(std::iter::once((book.abbreviation, AliasKind::Canonical)))
                .chain(book.variants.iter().map(|v| (*v, AliasKind::Variant)));

            for (name, kind) in names {
                let (key, surface) = alias_key(name).ok_or_else(|| {
                    ScriptureLmError::CanonData(format!("{:?} is not a usable book name", name))
                })?;
                let entries = aliases.entry(key).or_default();

                // Only historical variants may be shared between books.
                if let Some(other) = entries.iter().find(|e| {
                    e.book_index != book_index
                        && (e.kind != AliasKind::Variant || kind != AliasKind::Variant)
                }) {
                    return Err(ScriptureLmError::CanonData(format!(
                        "name {:?} maps to both {} and {}",
                        name, books[other.book_index].name, book.name
                    )));
                }
                if let Some(existing) = entries.iter_mut().find(|e| e.book_index == book_index) {
                    existing.kind = existing.kind.min(kind);
                    continue;
                }
                entries.push(AliasEntry {
                    book_index,
                    kind,
                    surface,
                });
            }
        }

        Ok(Self { books, aliases })
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn book(&self, book_index: usize) -> Option<&BookRecord> {
        self.books.get(book_index)
    }

    pub fn chapter_count(&self, book_index: usize) -> Option<u32> {
        self.book(book_index).map(BookRecord::chapter_count)
    }

    pub fn verse_count(&self, book_index: usize, chapter: u32) -> Option<u32> {
        let book = self.book(book_index)?;
        let chapter_index = (chapter as usize).checked_sub(1)?;
        book.verses.get(chapter_index).map(|&v| u32::from(v))
    }

    pub fn total_verses(&self) -> usize {
        self.books
            .iter()
            .flat_map(|b| b.verses.iter())
            .map(|&v| v as usize)
            .sum()
    }

    /// The book a name or abbreviation denotes, if it denotes exactly one.
    pub fn book_index(&self, name: &str) -> Option<usize> {
        match self.book_matches(name).as_slice() {
            [only] => Some(only.book_index),
            _ => None,
        }
    }

    /// Every book `name` can denote, best first: exact-case match, then alias
    /// strength (full name, canonical abbreviation, historical variant), then canon order.
    pub fn book_matches(&self, name: &str) -> Vec<BookMatch> {
        let Some((key, surface)) = alias_key(name) else {
            return Vec::new();
        };
        let mut matches: Vec<BookMatch> = self
            .aliases
            .get(&key)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| BookMatch {
                        book_index: e.book_index,
                        kind: e.kind,
                        exact_case: e.surface == surface,
                    })
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_by_key(|m| (!m.exact_case, m.kind, m.book_index));
        matches
    }

    /// Normalized keys of every registered name, for building scanners.
    pub(crate) fn alias_keys(&self) -> impl Iterator<Item = &Vec<String>> {
        self.aliases.keys()
    }

    /// Renders `Book C:V` or `Book C:V-W`.
    pub fn format(&self, reference: &CanonicalReference) -> String {
        let name = self
            .book(reference.book_index())
            .map(|b| b.name)
            .unwrap_or("?");
        if reference.is_range() {
            format!(
                "{} {}:{}-{}",
                name,
                reference.chapter(),
                reference.verse_start(),
                reference.verse_end()
            )
        } else {
            format!("{} {}:{}", name, reference.chapter(), reference.verse_start())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon() -> &'static Canon {
        Canon::standard().expect("standard canon is consistent")
    }

    fn index_of(name: &str) -> usize {
        canon().book_index(name).expect("known book")
    }

    #[test]
    fn test_standard_canon_shape() {
        let canon = canon();
        assert_eq!(canon.len(), 66);
        assert_eq!(canon.total_verses(), 31_102);
        assert_eq!(canon.chapter_count(0), Some(50), "Genesis has 50 chapters");
        assert_eq!(canon.chapter_count(index_of("Psalms")), Some(150));
        assert_eq!(canon.verse_count(index_of("Psalms"), 119), Some(176));
        assert_eq!(canon.verse_count(index_of("John"), 3), Some(36));
        assert_eq!(canon.book(38).map(|b| b.name), Some("Malachi"));
        assert_eq!(canon.book(39).map(|b| b.testament), Some(Testament::New));
    }

    #[test]
    fn test_counts_out_of_range_are_none() {
        let canon = canon();
        assert_eq!(canon.chapter_count(66), None);
        assert_eq!(canon.verse_count(0, 0), None);
        assert_eq!(canon.verse_count(0, 51), None);
    }

    #[test]
    fn test_standard_is_a_singleton() {
        let a = Canon::standard().unwrap();
        let b = Canon::standard().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_book_index_by_name_abbreviation_and_variant() {
        assert_eq!(index_of("Genesis"), 0);
        assert_eq!(index_of("gen"), 0);
        assert_eq!(index_of("Gen."), 0);
        assert_eq!(index_of("1 Corinthians"), index_of("1Cor"));
        assert_eq!(index_of("I Corinthians"), index_of("1 Cor"));
        assert_eq!(index_of("First Corinthians"), index_of("1Co"));
        assert_eq!(index_of("1st Corinthians"), index_of("1 Corinthians"));
        assert_eq!(index_of("Song of Songs"), index_of("Song of Solomon"));
        assert_eq!(index_of("Revelation"), 65);
        assert_eq!(canon().book_index("Hezekiah"), None);
    }

    #[test]
    fn test_numbered_books_are_distinct() {
        assert_ne!(index_of("John"), index_of("1 John"));
        assert_ne!(index_of("1 John"), index_of("3 John"));
        assert_eq!(index_of("III John"), index_of("3 John"));
    }

    #[test]
    fn test_shared_variant_yields_every_book_in_priority_order() {
        let matches = canon().book_matches("Ph");
        let books: Vec<usize> = matches.iter().map(|m| m.book_index).collect();
        assert_eq!(books, vec![index_of("Philippians"), index_of("Philemon")]);
        assert!(matches.iter().all(|m| m.kind == AliasKind::Variant));
        assert_eq!(canon().book_index("Ph"), None, "ambiguous names have no single index");
    }

    #[test]
    fn test_exact_case_ranks_first() {
        let matches = canon().book_matches("Jud");
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.exact_case));
        let lower = canon().book_matches("jud");
        assert!(lower.iter().all(|m| !m.exact_case));
    }

    #[test]
    fn test_differently_cased_shared_variant_ranks_exact_case_before_canon_order() {
        let mut books = standard_books();
        books[64].variants = &["JUD", "Jd"];
        let canon = Canon::from_books(books).unwrap();

        let ranked = |name: &str| -> Vec<(usize, bool)> {
            canon.book_matches(name).iter().map(|m| (m.book_index, m.exact_case)).collect()
        };
        assert_eq!(ranked("JUD"), vec![(64, true), (6, false)]);
        assert_eq!(ranked("Jud"), vec![(6, true), (64, false)]);
        assert_eq!(ranked("jud"), vec![(6, false), (64, false)]);
        assert!(canon.book_matches("JUD").iter().all(|m| m.kind == AliasKind::Variant));
    }

    #[test]
    fn test_format_single_verse_and_range() {
        let canon = canon();
        let john = index_of("John");
        let single = CanonicalReference::verse(canon, john, 3, 16).unwrap();
        let range = CanonicalReference::new(canon, john, 3, 16, 18).unwrap();
        assert_eq!(canon.format(&single), "John 3:16");
        assert_eq!(canon.format(&range), "John 3:16-18");
    }

    fn standard_books() -> Vec<BookRecord> {
        STANDARD_BOOKS.to_vec()
    }

    #[test]
    fn test_wrong_book_count_fails_check() {
        let mut books = standard_books();
        books.pop();
        assert!(matches!(Canon::from_books(books), Err(ScriptureLmError::CanonData(_))));
    }

    #[test]
    fn test_empty_chapter_fails_check() {
        let mut books = standard_books();
        books[3].verses = &[10, 0, 12];
        assert!(matches!(Canon::from_books(books), Err(ScriptureLmError::CanonData(_))));

        let mut books = standard_books();
        books[7].verses = &[];
        assert!(Canon::from_books(books).is_err());
    }

    #[test]
    fn test_duplicate_abbreviation_across_books_fails_check() {
        let mut books = standard_books();
        books[1].abbreviation = "Gen";
        match Canon::from_books(books) {
            Err(ScriptureLmError::CanonData(msg)) => assert!(msg.contains("Genesis")),
            other => panic!("expected CanonData error, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_variant_shadowing_another_books_name_fails_check() {
        let mut books = standard_books();
        books[0].variants = &["Exodus"];
        assert!(Canon::from_books(books).is_err());
    }

    #[test]
    fn test_misplaced_testament_fails_check() {
        let mut books = standard_books();
        books[40].testament = Testament::Old;
        assert!(Canon::from_books(books).is_err());
    }
}
