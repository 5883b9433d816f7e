use rayon::prelude::*;
use std::path::Path;

use crate::canon::Canon;
use crate::config::BiblicalTransformerConfig;
use crate::error::{Result, ScriptureLmError};
use crate::fusion::{AttentionBiasMatrix, ConceptId, FusionInput, ModelToken};
use crate::model::{BiblicalTransformer, ModelOutput};
use crate::reference::ReferenceMatch;
use crate::resolver::ReferenceEngine;
use crate::verse_index::{AssignmentReport, VerseEmbeddingIndex};

/// One sequence of a batch: its source text, the model tokens over that text,
/// and the concept tagger's output (one entry per token).
#[derive(Debug, Clone, Copy)]
pub struct SequenceInput<'a> {
    pub text: &'a str,
    pub tokens: &'a [ModelToken],
    pub concept_tags: &'a [Option<ConceptId>],
}

#[derive(Debug, Clone)]
pub struct PreparedSequence {
    pub references: Vec<ReferenceMatch>,
    pub inputs: Vec<FusionInput>,
    pub attention_bias: AttentionBiasMatrix,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub sequences: usize,
    pub resolved_references: usize,
    pub slots: AssignmentReport,
}

/// End-to-end path from raw text to model outputs.
///
/// Reference resolution and fusion run in parallel across sequences. Verse
/// slot assignment is the only write to shared state and runs serially between them.
#[derive(Debug)]
pub struct ScripturePipeline {
    config: BiblicalTransformerConfig,
    canon: &'static Canon,
    engine: ReferenceEngine<'static>,
    verse_index: VerseEmbeddingIndex,
    model: BiblicalTransformer,
}

impl ScripturePipeline {
    /// Validates the config before anything is built; a canon mismatch never reaches a forward pass.
    pub fn new(config: BiblicalTransformerConfig) -> Result<Self> {
        config.validate()?;
        let verse_index = VerseEmbeddingIndex::from_config(&config)?;
        Self::with_verse_index(config, verse_index)
    }

    /// Builds a pipeline around a previously saved verse index.
    pub fn with_verse_index(config: BiblicalTransformerConfig, verse_index: VerseEmbeddingIndex) -> Result<Self> {
        config.validate()?;
        if verse_index.dim() != config.verse_embedding_size as usize {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "verse index width {} does not match verse_embedding_size {}",
                verse_index.dim(),
                config.verse_embedding_size
            )));
        }
        let canon = Canon::standard()?;
        let engine = ReferenceEngine::new(canon, &config.references)?;
        let model = BiblicalTransformer::new(&config)?;
        Ok(Self {
            config,
            canon,
            engine,
            verse_index,
            model,
        })
    }

    pub fn config(&self) -> &BiblicalTransformerConfig {
        &self.config
    }

    pub fn canon(&self) -> &'static Canon {
        self.canon
    }

    pub fn engine(&self) -> &ReferenceEngine<'static> {
        &self.engine
    }

    pub fn model(&self) -> &BiblicalTransformer {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut BiblicalTransformer {
        &mut self.model
    }

    pub fn verse_index(&self) -> &VerseEmbeddingIndex {
        &self.verse_index
    }

    pub fn verse_index_mut(&mut self) -> &mut VerseEmbeddingIndex {
        &mut self.verse_index
    }

    pub fn resolve_references(&self, text: &str) -> Vec<ReferenceMatch> {
        self.engine.resolve_references(text)
    }

    fn fuse_sequence(&self, sequence: &SequenceInput, references: Vec<ReferenceMatch>) -> Result<PreparedSequence> {
        let max_positions = self.config.max_position_embeddings as usize;
        if sequence.tokens.len() > max_positions {
            return Err(ScriptureLmError::InvalidInput(format!(
                "sequence of {} tokens exceeds max_position_embeddings ({})",
                sequence.tokens.len(),
                max_positions
            )));
        }
        let positions: Vec<usize> = (0..sequence.tokens.len()).collect();
        let (inputs, attention_bias) = self.model.fusion().fuse(
            sequence.tokens,
            &positions,
            sequence.concept_tags,
            &references,
            &self.verse_index,
        )?;
        Ok(PreparedSequence {
            references,
            inputs,
            attention_bias,
        })
    }

    /// Resolves, optionally assigns verse slots, and fuses every sequence.
    /// With `assign_slots` off the verse index is read-only, as at inference.
    pub fn prepare_batch(
        &mut self,
        batch: &[SequenceInput],
        assign_slots: bool,
    ) -> Result<(Vec<PreparedSequence>, BatchReport)> {
        let engine = &self.engine;
        let references: Vec<Vec<ReferenceMatch>> = batch
            .par_iter()
            .map(|sequence| engine.resolve_references(sequence.text))
            .collect();

        let resolved = references
            .iter()
            .flatten()
            .filter_map(|m| m.result.as_resolved());
        let mut report = BatchReport {
            sequences: batch.len(),
            resolved_references: resolved.clone().count(),
            slots: AssignmentReport::default(),
        };
        if assign_slots {
            report.slots = self.verse_index.assign_all(resolved);
        }

        let this = &*self;
        let prepared = batch
            .par_iter()
            .zip(references)
            .map(|(sequence, refs)| this.fuse_sequence(sequence, refs))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Prepared {} sequences: {} resolved references, {} new slots, {} past capacity",
            report.sequences,
            report.resolved_references,
            report.slots.newly_assigned,
            report.slots.newly_exhausted
        );
        Ok((prepared, report))
    }

    pub fn forward(&self, prepared: &PreparedSequence) -> Result<ModelOutput> {
        self.model.forward(&prepared.inputs, &prepared.attention_bias)
    }

    pub fn forward_batch(&self, prepared: &[PreparedSequence]) -> Result<Vec<ModelOutput>> {
        prepared.par_iter().map(|p| self.forward(p)).collect()
    }

    pub fn save_verse_index(&self, path: &Path) -> Result<()> {
        self.verse_index.save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ResolutionResult;
    use crate::verse_index::FALLBACK_SLOT;

    fn config() -> BiblicalTransformerConfig {
        BiblicalTransformerConfig {
            vocab_size: 64,
            max_position_embeddings: 32,
            hidden_size: 8,
            num_hidden_layers: 1,
            num_attention_heads: 2,
            theological_embedding_size: 4,
            num_theological_concepts: 4,
            verse_embedding_size: 4,
            verse_embedding_capacity: 4,
            ..Default::default()
        }
    }

    // One model token per whitespace-separated word.
    fn word_tokens(text: &str) -> Vec<ModelToken> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for word in text.split(' ') {
            tokens.push(ModelToken {
                id: (word.len() % 64) as u32,
                start: offset,
                end: offset + word.len(),
            });
            offset += word.len() + 1;
        }
        tokens
    }

    #[test]
    fn test_wrong_book_count_fails_before_any_forward() {
        let bad = BiblicalTransformerConfig {
            num_bible_books: 39,
            ..config()
        };
        assert!(matches!(
            ScripturePipeline::new(bad),
            Err(ScriptureLmError::ConfigMismatch(_))
        ));
    }

    #[test]
    fn test_prepare_and_forward_batch() -> Result<()> {
        let mut pipeline = ScripturePipeline::new(config())?;
        let texts = ["read John 3:16 today", "no references here", "Gen 1:1 and Ph 1:1"];
        let tokens: Vec<Vec<ModelToken>> = texts.iter().map(|t| word_tokens(t)).collect();
        let tags: Vec<Vec<Option<ConceptId>>> = tokens.iter().map(|t| vec![None; t.len()]).collect();
        let batch: Vec<SequenceInput> = texts
            .iter()
            .zip(&tokens)
            .zip(&tags)
            .map(|((text, tokens), tags)| SequenceInput {
                text,
                tokens,
                concept_tags: tags,
            })
            .collect();

        let (prepared, report) = pipeline.prepare_batch(&batch, true)?;
        assert_eq!(report.sequences, 3);
        assert_eq!(report.resolved_references, 2, "Ph 1:1 is ambiguous and does not count");
        assert_eq!(report.slots.newly_assigned, 2);
        assert!(prepared[1].attention_bias.is_zero());
        assert!(!prepared[0].attention_bias.is_zero());
        assert!(matches!(prepared[2].references[1].result, ResolutionResult::Ambiguous(_)));

        let outputs = pipeline.forward_batch(&prepared)?;
        assert_eq!(outputs.len(), 3);
        assert_eq!(outputs[0].logits.shape(), &[4, 64]);
        Ok(())
    }

    #[test]
    fn test_inference_mode_leaves_index_untouched() -> Result<()> {
        let mut pipeline = ScripturePipeline::new(config())?;
        let text = "see Rom 8:28";
        let tokens = word_tokens(text);
        let tags: Vec<Option<ConceptId>> = vec![None; tokens.len()];
        let batch = [SequenceInput {
            text,
            tokens: &tokens,
            concept_tags: &tags,
        }];
        let (prepared, report) = pipeline.prepare_batch(&batch, false)?;
        assert_eq!(report.slots, AssignmentReport::default());
        assert_eq!(pipeline.verse_index().assigned(), 0);

        let reference = prepared[0].references[0].result.as_resolved().copied().unwrap();
        assert_eq!(pipeline.verse_index().slot_of(&reference), FALLBACK_SLOT);
        assert_eq!(
            prepared[0].inputs[1].verse_embedding.as_ref().map(|v| v.view()),
            Some(pipeline.verse_index().fallback())
        );
        Ok(())
    }

    #[test]
    fn test_overlong_sequence_is_rejected() -> Result<()> {
        let mut pipeline = ScripturePipeline::new(config())?;
        let text = vec!["a"; 40].join(" ");
        let tokens = word_tokens(&text);
        let tags: Vec<Option<ConceptId>> = vec![None; tokens.len()];
        let batch = [SequenceInput {
            text: &text,
            tokens: &tokens,
            concept_tags: &tags,
        }];
        assert!(matches!(
            pipeline.prepare_batch(&batch, true),
            Err(ScriptureLmError::InvalidInput(_))
        ));
        Ok(())
    }
}
