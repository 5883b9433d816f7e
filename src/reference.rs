use serde::Serialize;
use std::fmt;

use crate::canon::Canon;

/// A verse or contiguous verse range inside one chapter, validated against the canon.
/// Fields are private so every value in circulation has passed [`CanonicalReference::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CanonicalReference {
    book_index: usize,
    chapter: u32,
    verse_start: u32,
    verse_end: u32,
}

impl CanonicalReference {
    pub fn new(
        canon: &Canon,
        book_index: usize,
        chapter: u32,
        verse_start: u32,
        verse_end: u32,
    ) -> Result<Self, Rejection> {
        let verse_count = canon
            .verse_count(book_index, chapter)
            .ok_or(Rejection::OutOfCanonBounds)?;
        if verse_start == 0 || verse_end == 0 || verse_start > verse_count || verse_end > verse_count {
            return Err(Rejection::OutOfCanonBounds);
        }
        if verse_start > verse_end {
            return Err(Rejection::InvertedRange);
        }
        Ok(Self {
            book_index,
            chapter,
            verse_start,
            verse_end,
        })
    }

    pub fn verse(canon: &Canon, book_index: usize, chapter: u32, verse: u32) -> Result<Self, Rejection> {
        Self::new(canon, book_index, chapter, verse, verse)
    }

    /// Every verse of `chapter`.
    pub fn whole_chapter(canon: &Canon, book_index: usize, chapter: u32) -> Result<Self, Rejection> {
        let last = canon
            .verse_count(book_index, chapter)
            .ok_or(Rejection::OutOfCanonBounds)?;
        Self::new(canon, book_index, chapter, 1, last)
    }

    pub fn book_index(&self) -> usize {
        self.book_index
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn verse_start(&self) -> u32 {
        self.verse_start
    }

    pub fn verse_end(&self) -> u32 {
        self.verse_end
    }

    pub fn is_range(&self) -> bool {
        self.verse_end > self.verse_start
    }

    /// Number of verses after the first; zero for a single verse.
    pub fn span_width(&self) -> u32 {
        self.verse_end - self.verse_start
    }

    pub fn contains(&self, other: &CanonicalReference) -> bool {
        self.book_index == other.book_index
            && self.chapter == other.chapter
            && self.verse_start <= other.verse_start
            && other.verse_end <= self.verse_end
    }

    /// The single-verse references this one covers, in order.
    pub fn verses(&self) -> impl Iterator<Item = CanonicalReference> + '_ {
        (self.verse_start..=self.verse_end).map(move |verse| CanonicalReference {
            verse_start: verse,
            verse_end: verse,
            ..*self
        })
    }
}

/// How the numeric part of a citation was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationForm {
    /// `Genesis`
    BookOnly,
    /// `Genesis 1`, or a bare `17`
    Chapter,
    /// `Genesis 1-2`, or a bare `17-19`
    ChapterRange,
    /// `Genesis 1:3`
    ChapterVerse,
    /// `Genesis 1:3-5`
    ChapterVerseRange,
    /// `Genesis 1:3-2:4`
    CrossChapterRange,
}

impl CitationForm {
    pub fn has_explicit_verse(&self) -> bool {
        matches!(
            self,
            CitationForm::ChapterVerse | CitationForm::ChapterVerseRange | CitationForm::CrossChapterRange
        )
    }
}

/// A substring that looks like a reference, before any canon lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSpan {
    pub text_offset_start: usize,
    pub text_offset_end: usize,
    pub raw_text: String,
    /// Book name as written, without a trailing period. `None` for numeric-only candidates.
    pub book_hint: Option<String>,
    pub numeric_parts: Vec<u32>,
    pub form: CitationForm,
    /// Numeric-only candidate joined to the previous candidate by list punctuation ("16, 17").
    pub continues_previous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    UnknownBook,
    NoBookContext,
    OutOfCanonBounds,
    WholeBookUnsupported,
    MultiChapterUnsupported,
    InvertedRange,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::UnknownBook => "unknown book",
            Rejection::NoBookContext => "no book context",
            Rejection::OutOfCanonBounds => "out of canon bounds",
            Rejection::WholeBookUnsupported => "whole-book reference unsupported",
            Rejection::MultiChapterUnsupported => "multi-chapter range unsupported",
            Rejection::InvertedRange => "inverted verse range",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl std::error::Error for Rejection {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ResolutionResult {
    Resolved(CanonicalReference),
    /// Every structurally valid reading, best first.
    Ambiguous(Vec<CanonicalReference>),
    Rejected(Rejection),
}

impl ResolutionResult {
    pub fn as_resolved(&self) -> Option<&CanonicalReference> {
        match self {
            ResolutionResult::Resolved(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionResult::Resolved(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ResolutionResult::Rejected(_))
    }
}

/// A candidate span and what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceMatch {
    pub start: usize,
    pub end: usize,
    pub raw_text: String,
    pub form: CitationForm,
    pub result: ResolutionResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon() -> &'static Canon {
        Canon::standard().unwrap()
    }

    #[test]
    fn test_bounds_are_checked_against_canon() {
        let canon = canon();
        assert!(CanonicalReference::verse(canon, 0, 1, 31).is_ok());
        assert_eq!(
            CanonicalReference::verse(canon, 0, 1, 32),
            Err(Rejection::OutOfCanonBounds)
        );
        assert_eq!(
            CanonicalReference::verse(canon, 0, 51, 1),
            Err(Rejection::OutOfCanonBounds)
        );
        assert_eq!(
            CanonicalReference::verse(canon, 0, 1, 0),
            Err(Rejection::OutOfCanonBounds)
        );
        assert_eq!(
            CanonicalReference::verse(canon, 66, 1, 1),
            Err(Rejection::OutOfCanonBounds)
        );
    }

    #[test]
    fn test_inverted_range_is_rejected_after_bounds() {
        let canon = canon();
        assert_eq!(
            CanonicalReference::new(canon, 0, 1, 5, 3),
            Err(Rejection::InvertedRange)
        );
        assert_eq!(
            CanonicalReference::new(canon, 0, 1, 40, 3),
            Err(Rejection::OutOfCanonBounds)
        );
    }

    #[test]
    fn test_whole_chapter_and_verse_expansion() {
        let canon = canon();
        let psalm_117 = CanonicalReference::whole_chapter(canon, 18, 117).unwrap();
        assert_eq!((psalm_117.verse_start(), psalm_117.verse_end()), (1, 2));
        assert_eq!(psalm_117.span_width(), 1);

        let verses: Vec<u32> = psalm_117.verses().map(|v| v.verse_start()).collect();
        assert_eq!(verses, vec![1, 2]);
        assert!(psalm_117.verses().all(|v| !v.is_range() && psalm_117.contains(&v)));
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(Rejection::OutOfCanonBounds.to_string(), "out of canon bounds");
        assert_eq!(Rejection::NoBookContext.to_string(), "no book context");
    }

    #[test]
    fn test_resolution_result_serializes_with_status_tag() {
        let canon = canon();
        let result = ResolutionResult::Resolved(CanonicalReference::verse(canon, 42, 3, 16).unwrap());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["value"]["chapter"], 3);

        let rejected = serde_json::to_value(ResolutionResult::Rejected(Rejection::UnknownBook)).unwrap();
        assert_eq!(rejected["value"], "unknown_book");
    }
}
