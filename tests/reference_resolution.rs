use proptest::prelude::*;
use std::error::Error;

use scripture_lm::config::{OverlapPolicy, ReferenceConfig};
use scripture_lm::tokenizer::normalize_text;
use scripture_lm::{
    resolve_references, Canon, CanonicalReference, CitationForm, ReferenceEngine, Rejection, ResolutionResult,
};

fn citations(text: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let canon = Canon::standard()?;
    Ok(resolve_references(text)?
        .iter()
        .filter_map(|m| m.result.as_resolved())
        .map(|r| canon.format(r))
        .collect())
}

#[test]
fn test_commentary_paragraph() -> Result<(), Box<dyn Error>> {
    let text = "Compare John 3:16, 17 with Rom. 8:28; cf. 1 Cor 13:4-7 and Ps 23. \
                Jude 3 says the same, but Hezekiah 4:2 does not exist.";
    assert_eq!(
        citations(text)?,
        vec![
            "John 3:16",
            "John 3:17",
            "Romans 8:28",
            "1 Corinthians 13:4-7",
            "Psalms 23:1-6",
            "Jude 1:3",
        ]
    );
    Ok(())
}

#[test]
fn test_matches_carry_source_offsets() -> Result<(), Box<dyn Error>> {
    let text = "«Ésaïe» aside, see Isaiah 53:5 — and Genesis 50:26.";
    let matches = resolve_references(text)?;
    assert_eq!(matches.len(), 2);
    for m in &matches {
        assert_eq!(&text[m.start..m.end], m.raw_text);
    }
    assert_eq!(matches[0].raw_text, "Isaiah 53:5");
    assert_eq!(matches[1].form, CitationForm::ChapterVerse);
    Ok(())
}

#[test]
fn test_rejections_are_reported_not_dropped() -> Result<(), Box<dyn Error>> {
    let matches = resolve_references("John 22:1 then 4:5, Genesis, Gen 5-7")?;
    let results: Vec<&ResolutionResult> = matches.iter().map(|m| &m.result).collect();
    assert_eq!(
        results,
        vec![
            &ResolutionResult::Rejected(Rejection::OutOfCanonBounds),
            &ResolutionResult::Rejected(Rejection::NoBookContext),
            &ResolutionResult::Rejected(Rejection::WholeBookUnsupported),
            &ResolutionResult::Rejected(Rejection::MultiChapterUnsupported),
        ]
    );
    Ok(())
}

#[test]
fn test_ambiguous_abbreviation_lists_every_reading() -> Result<(), Box<dyn Error>> {
    let canon = Canon::standard()?;
    let matches = resolve_references("Ph 1:1 and Ph 4:13")?;
    let ResolutionResult::Ambiguous(readings) = &matches[0].result else {
        panic!("expected an ambiguous result, got {:?}", matches[0].result);
    };
    let names: Vec<String> = readings.iter().map(|r| canon.format(r)).collect();
    assert_eq!(names, vec!["Philippians 1:1", "Philemon 1:1"]);

    // Philemon has one chapter, so only Philippians can be meant here.
    let narrowed = matches[1].result.as_resolved().map(|r| canon.format(r));
    assert_eq!(narrowed.as_deref(), Some("Philippians 4:13"));
    Ok(())
}

#[test]
fn test_normalized_text_resolves_after_cleanup() -> Result<(), Box<dyn Error>> {
    let raw = "“For God so loved”† [see note] (John\n3:16)";
    let clean = normalize_text(raw);
    assert_eq!(citations(&clean)?, vec!["John 3:16"]);
    Ok(())
}

#[test]
fn test_keep_all_exposes_nested_candidates() -> Result<(), Box<dyn Error>> {
    let canon = Canon::standard()?;
    let config = ReferenceConfig {
        overlap_policy: OverlapPolicy::KeepAll,
        ..ReferenceConfig::default()
    };
    let engine = ReferenceEngine::new(canon, &config)?;
    let matches = engine.resolve_references("1 John 1:9");
    let resolved: Vec<String> = matches
        .iter()
        .filter_map(|m| m.result.as_resolved())
        .map(|r| canon.format(r))
        .collect();
    assert_eq!(resolved, vec!["1 John 1:9", "John 1:9"]);
    Ok(())
}

fn in_canon_verse() -> impl Strategy<Value = (usize, u32, u32)> {
    let canon = Canon::standard().expect("standard canon");
    (0..canon.len())
        .prop_flat_map(move |book| {
            let chapters = canon.chapter_count(book).unwrap_or(1);
            (Just(book), 1..=chapters)
        })
        .prop_flat_map(move |(book, chapter)| {
            let verses = canon.verse_count(book, chapter).unwrap_or(1);
            (Just(book), Just(chapter), 1..=verses)
        })
}

const FRAGMENTS: &[&str] = &[
    "John", "Gen", "1", "3", "16", "150", ":", ".", "-", ",", ";", " ", " ", "and", "cf", "Ph", "Jude", "I",
    "Kings", "Song", "of", "Songs", "vv", "0", "99999999999", "—", "é",
];

proptest! {
    #[test]
    fn prop_formatted_reference_resolves_back((book, chapter, verse) in in_canon_verse()) {
        let canon = Canon::standard().unwrap();
        let reference = CanonicalReference::verse(canon, book, chapter, verse).unwrap();
        let text = format!("as written in {} today", canon.format(&reference));
        let matches = resolve_references(&text).unwrap();
        prop_assert_eq!(matches.len(), 1);
        prop_assert_eq!(matches[0].result.as_resolved(), Some(&reference));
    }

    #[test]
    fn prop_arbitrary_text_never_panics_and_stays_in_bounds(text in "\\PC{0,120}") {
        let canon = Canon::standard().unwrap();
        for m in resolve_references(&text).unwrap() {
            prop_assert!(m.start < m.end && m.end <= text.len());
            prop_assert_eq!(&text[m.start..m.end], m.raw_text.as_str());
            if let Some(r) = m.result.as_resolved() {
                let verses = canon.verse_count(r.book_index(), r.chapter()).unwrap();
                prop_assert!(1 <= r.verse_start() && r.verse_start() <= r.verse_end());
                prop_assert!(r.verse_end() <= verses);
            }
        }
    }

    #[test]
    fn prop_resolution_is_deterministic_and_ordered(
        parts in prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40)
    ) {
        let text: String = parts.concat();
        let first = resolve_references(&text).unwrap();
        let second = resolve_references(&text).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.windows(2).all(|w| w[0].start <= w[1].start));
    }
}
