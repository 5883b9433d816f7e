//! Turns candidate spans into canonical references. Resolution is a fold over
//! the candidates in text order. The carried state is the last resolved
//! reference (for "John 3:16, 17"), whether the previous candidate resolved,
//! and the span of the last accepted candidate (for overlap suppression).

use rayon::prelude::*;

use crate::canon::Canon;
use crate::config::{OverlapPolicy, ReferenceConfig};
use crate::error::Result;
use crate::reference::{
    CandidateSpan, CanonicalReference, CitationForm, ReferenceMatch, Rejection, ResolutionResult,
};
use crate::scanner::{ReferenceScanner, ScanStats};
use crate::tokenizer::TokenizedText;

/// The last unambiguous resolution and whether it was read at verse granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastResolved {
    pub reference: CanonicalReference,
    pub explicit_verse: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverState {
    pub last: Option<LastResolved>,
    // The previous candidate was ambiguous or rejected; a list continuing it has no book.
    previous_unresolved: bool,
    claimed: Option<(usize, usize)>,
}

#[derive(Debug, Clone)]
pub struct ReferenceResolver<'c> {
    canon: &'c Canon,
    book_level_granularity: bool,
    overlap_policy: OverlapPolicy,
}

// A resolved reference plus the granularity it was read at.
type Reading = std::result::Result<(CanonicalReference, bool), Rejection>;

impl<'c> ReferenceResolver<'c> {
    pub fn new(canon: &'c Canon, config: &ReferenceConfig) -> Self {
        Self {
            canon,
            book_level_granularity: config.book_level_granularity,
            overlap_policy: config.overlap_policy,
        }
    }

    /// Resolves candidates in order. The output depends only on the candidate sequence.
    pub fn resolve_all<I>(&self, candidates: I) -> Vec<ReferenceMatch>
    where
        I: IntoIterator<Item = CandidateSpan>,
    {
        let (_, matches) = candidates.into_iter().fold(
            (ResolverState::default(), Vec::new()),
            |(state, mut matches), candidate| {
                let (state, resolved) = self.step(state, candidate);
                matches.extend(resolved);
                (state, matches)
            },
        );
        matches
    }

    /// One fold step. Returns `None` when the candidate is suppressed as nested
    /// inside an earlier accepted candidate.
    pub fn step(&self, state: ResolverState, candidate: CandidateSpan) -> (ResolverState, Option<ReferenceMatch>) {
        let span = (candidate.text_offset_start, candidate.text_offset_end);
        if self.overlap_policy == OverlapPolicy::PreferOutermost {
            if let Some((start, end)) = state.claimed {
                if start <= span.0 && span.1 <= end {
                    log::trace!("Suppressing nested candidate {:?}", candidate.raw_text);
                    return (state, None);
                }
            }
        }

        let (result, verse_level) = self.resolve_candidate(&state, &candidate);
        let mut next = state;
        next.previous_unresolved = !result.is_resolved();
        match &result {
            ResolutionResult::Resolved(reference) => {
                next.last = Some(LastResolved {
                    reference: *reference,
                    explicit_verse: verse_level,
                });
                next.claimed = Some(span);
            }
            ResolutionResult::Ambiguous(_) => next.claimed = Some(span),
            ResolutionResult::Rejected(rejection) => {
                log::debug!("Rejected {:?}: {}", candidate.raw_text, rejection);
            }
        }

        let matched = ReferenceMatch {
            start: candidate.text_offset_start,
            end: candidate.text_offset_end,
            raw_text: candidate.raw_text,
            form: candidate.form,
            result,
        };
        (next, Some(matched))
    }

    fn resolve_candidate(&self, state: &ResolverState, candidate: &CandidateSpan) -> (ResolutionResult, bool) {
        match &candidate.book_hint {
            Some(hint) => self.resolve_named(hint, candidate),
            None => self.resolve_numeric_only(state, candidate),
        }
    }

    fn resolve_named(&self, hint: &str, candidate: &CandidateSpan) -> (ResolutionResult, bool) {
        let matches = self.canon.book_matches(hint);
        if matches.is_empty() {
            return (ResolutionResult::Rejected(Rejection::UnknownBook), false);
        }

        let readings: Vec<Reading> = matches
            .iter()
            .map(|m| self.interpret(m.book_index, candidate.form, &candidate.numeric_parts))
            .collect();
        let mut valid: Vec<(CanonicalReference, bool)> = readings.iter().filter_map(|r| r.ok()).collect();

        match valid.len() {
            0 => {
                let rejection = readings
                    .iter()
                    .find_map(|r| r.err())
                    .unwrap_or(Rejection::UnknownBook);
                (ResolutionResult::Rejected(rejection), false)
            }
            1 => {
                let (reference, verse_level) = valid.remove(0);
                (ResolutionResult::Resolved(reference), verse_level)
            }
            _ => (
                ResolutionResult::Ambiguous(valid.into_iter().map(|(r, _)| r).collect()),
                false,
            ),
        }
    }

    fn resolve_numeric_only(&self, state: &ResolverState, candidate: &CandidateSpan) -> (ResolutionResult, bool) {
        // "Ph 1:1, 2": the list continues a citation that did not resolve, so an
        // older book would be a guess.
        let last = match state.last {
            Some(_) if candidate.continues_previous && state.previous_unresolved => None,
            last => last,
        };
        let Some(last) = last else {
            return (ResolutionResult::Rejected(Rejection::NoBookContext), false);
        };
        let parts = &candidate.numeric_parts;
        let part = |i: usize| parts.get(i).copied().ok_or(Rejection::OutOfCanonBounds);
        let book = last.reference.book_index();
        let chapter = last.reference.chapter();

        let reading: Reading = match candidate.form {
            // "John 3:16, 17": after a verse citation a bare number is another verse.
            CitationForm::Chapter if last.explicit_verse => part(0)
                .and_then(|verse| CanonicalReference::verse(self.canon, book, chapter, verse))
                .map(|r| (r, true)),
            CitationForm::ChapterRange if last.explicit_verse => part(0)
                .and_then(|start| CanonicalReference::new(self.canon, book, chapter, start, part(1)?))
                .map(|r| (r, true)),
            // "Genesis 1, 3" or "John 3 then 5": a chapter of the same book.
            form => self.interpret(book, form, parts),
        };

        match reading {
            Ok((reference, verse_level)) => (ResolutionResult::Resolved(reference), verse_level),
            Err(rejection) => (ResolutionResult::Rejected(rejection), false),
        }
    }

    /// Reads the numeric parts of a citation against one specific book.
    fn interpret(&self, book: usize, form: CitationForm, parts: &[u32]) -> Reading {
        let canon = self.canon;
        let single_chapter = canon.chapter_count(book) == Some(1);
        let part = |i: usize| parts.get(i).copied().ok_or(Rejection::OutOfCanonBounds);

        match form {
            CitationForm::BookOnly if self.book_level_granularity => {
                CanonicalReference::verse(canon, book, 1, 1).map(|r| (r, false))
            }
            CitationForm::BookOnly => Err(Rejection::WholeBookUnsupported),
            // "Jude 3" names a verse, there being only one chapter.
            CitationForm::Chapter if single_chapter => {
                CanonicalReference::verse(canon, book, 1, part(0)?).map(|r| (r, true))
            }
            CitationForm::Chapter => CanonicalReference::whole_chapter(canon, book, part(0)?).map(|r| (r, false)),
            CitationForm::ChapterRange if single_chapter => {
                CanonicalReference::new(canon, book, 1, part(0)?, part(1)?).map(|r| (r, true))
            }
            CitationForm::ChapterRange => {
                let (first, last) = (part(0)?, part(1)?);
                let first_chapter = CanonicalReference::whole_chapter(canon, book, first)?;
                CanonicalReference::whole_chapter(canon, book, last)?;
                if first == last {
                    Ok((first_chapter, false))
                } else if first > last {
                    Err(Rejection::InvertedRange)
                } else {
                    Err(Rejection::MultiChapterUnsupported)
                }
            }
            CitationForm::ChapterVerse => {
                CanonicalReference::verse(canon, book, part(0)?, part(1)?).map(|r| (r, true))
            }
            CitationForm::ChapterVerseRange => {
                CanonicalReference::new(canon, book, part(0)?, part(1)?, part(2)?).map(|r| (r, true))
            }
            CitationForm::CrossChapterRange => {
                let (chapter, verse, end_chapter, end_verse) = (part(0)?, part(1)?, part(2)?, part(3)?);
                if chapter == end_chapter {
                    return CanonicalReference::new(canon, book, chapter, verse, end_verse).map(|r| (r, true));
                }
                CanonicalReference::verse(canon, book, chapter, verse)?;
                CanonicalReference::verse(canon, book, end_chapter, end_verse)?;
                if chapter > end_chapter {
                    Err(Rejection::InvertedRange)
                } else {
                    Err(Rejection::MultiChapterUnsupported)
                }
            }
        }
    }
}

/// Scanner and resolver behind one call: text in, ordered matches out.
#[derive(Debug, Clone)]
pub struct ReferenceEngine<'c> {
    scanner: ReferenceScanner,
    resolver: ReferenceResolver<'c>,
}

impl<'c> ReferenceEngine<'c> {
    pub fn new(canon: &'c Canon, config: &ReferenceConfig) -> Result<Self> {
        Ok(Self {
            scanner: ReferenceScanner::new(canon, config)?,
            resolver: ReferenceResolver::new(canon, config),
        })
    }

    pub fn scanner(&self) -> &ReferenceScanner {
        &self.scanner
    }

    pub fn resolver(&self) -> &ReferenceResolver<'c> {
        &self.resolver
    }

    pub fn resolve_references(&self, text: &str) -> Vec<ReferenceMatch> {
        self.resolve_tokenized(&TokenizedText::new(text)).0
    }

    /// Resolves pre-tokenized text and reports scan counters alongside the matches.
    pub fn resolve_tokenized(&self, text: &TokenizedText) -> (Vec<ReferenceMatch>, ScanStats) {
        let mut candidates = self.scanner.scan(text);
        let matches = self.resolver.resolve_all(candidates.by_ref());
        let stats = candidates.stats();
        if stats.parse_failures > 0 {
            log::debug!(
                "{} malformed citation(s) skipped while scanning {} tokens",
                stats.parse_failures,
                text.len()
            );
        }
        (matches, stats)
    }

    /// Texts are independent, so a batch resolves in parallel.
    pub fn resolve_batch<S>(&self, texts: &[S]) -> Vec<Vec<ReferenceMatch>>
    where
        S: AsRef<str> + Sync,
    {
        texts
            .par_iter()
            .map(|text| self.resolve_references(text.as_ref()))
            .collect()
    }
}
