//! Scripture-aware transformer inputs: reference detection and canonicalization
//! against the 66-book canon, a verse embedding index, and a fusion layer that
//! feeds both into a GPT-2 style decoder.

pub mod attention;
pub mod canon;
mod canon_data;
pub mod common;
pub mod config;
pub mod error;
pub mod fusion;
pub mod mlp;
pub mod model;
pub mod pipeline;
pub mod reference;
pub mod resolver;
pub mod scanner;
pub mod tokenizer;
pub mod verse_index;

pub use canon::{Canon, Testament};
pub use config::{BiblicalTransformerConfig, FusionMode, OverlapPolicy, ReferenceConfig};
pub use error::{Result, ScriptureLmError};
pub use fusion::{AttentionBiasMatrix, ConceptId, EmbeddingFusionLayer, FusionInput, ModelToken};
pub use model::{BiblicalTransformer, ModelOutput};
pub use pipeline::{PreparedSequence, ScripturePipeline, SequenceInput};
pub use reference::{
    CandidateSpan, CanonicalReference, CitationForm, ReferenceMatch, Rejection, ResolutionResult,
};
pub use resolver::ReferenceEngine;
pub use scanner::ReferenceScanner;
pub use tokenizer::{normalize_text, TokenizedText};
pub use verse_index::{VerseEmbeddingIndex, VerseEmbeddingKey};

/// Resolves every reference in `text` with the standard canon and default settings.
pub fn resolve_references(text: &str) -> Result<Vec<ReferenceMatch>> {
    let engine = ReferenceEngine::new(Canon::standard()?, &ReferenceConfig::default())?;
    Ok(engine.resolve_references(text))
}
