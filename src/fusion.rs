//! Per-token input construction and the reference-group attention bias.
//!
//! Token and position embeddings are summed as usual. The theological and
//! verse channels go through bias-free projections and are added on top only
//! when present, so a token with neither channel gets exactly
//! `token_embedding + position_embedding`.

use ndarray::{concatenate, s, Array1, Array2, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::init_uniform;
use crate::config::{BiblicalTransformerConfig, FusionMode};
use crate::error::{Result, ScriptureLmError};
use crate::reference::{CanonicalReference, ReferenceMatch};
use crate::verse_index::VerseEmbeddingIndex;

/// Index into the theological concept table, as produced by the concept tagger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConceptId(pub u32);

/// One model token: vocabulary id and its byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelToken {
    pub id: u32,
    pub start: usize,
    pub end: usize,
}

impl ModelToken {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusionInput {
    pub token_embedding: Array1<f32>,
    pub position_embedding: Array1<f32>,
    pub theological_embedding: Option<Array1<f32>>,
    pub verse_embedding: Option<Array1<f32>>,
    /// `verse_end - verse_start` of the covering reference.
    pub verse_span_width: Option<u32>,
}

impl FusionInput {
    pub fn has_side_channel(&self) -> bool {
        self.theological_embedding.is_some() || self.verse_embedding.is_some()
    }
}

/// `[seq_len, seq_len]` additive attention bias.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionBiasMatrix(Array2<f32>);

impl AttentionBiasMatrix {
    pub fn zeros(seq_len: usize) -> Self {
        Self(Array2::zeros((seq_len, seq_len)))
    }

    /// Sets `scale` on every ordered pair `(i, j)` of tokens sharing a group, `i == j` included.
    pub fn from_groups(seq_len: usize, groups: &[Vec<usize>], scale: f32) -> Self {
        let mut bias = Array2::zeros((seq_len, seq_len));
        for group in groups {
            for &i in group {
                for &j in group {
                    bias[[i, j]] = scale;
                }
            }
        }
        Self(bias)
    }

    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.0.get((i, j)).copied()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.0
    }
}

// Log-scaled so a whole-chapter width (up to 175) stays on the order of the embedding features.
fn span_width_feature(width: u32) -> f32 {
    (width as f32).ln_1p()
}

#[derive(Debug, Clone)]
enum SideProjection {
    Additive {
        theological: Array2<f32>, // [theo, hidden]
        verse: Array2<f32>,       // [verse + 1, hidden]
    },
    Concatenate {
        joint: Array2<f32>, // [theo + verse + 1, hidden]
    },
}

#[derive(Debug, Clone)]
pub struct EmbeddingFusionLayer {
    pub(crate) wte: Array2<f32>, // [vocab, hidden]
    pub(crate) wpe: Array2<f32>, // [max_positions, hidden]
    pub(crate) concept_embeddings: Array2<f32>, // [num_concepts, theo]
    side: SideProjection,
    bias_scale: f32,
    verse_size: usize,
}

impl EmbeddingFusionLayer {
    pub fn new(config: &BiblicalTransformerConfig) -> Result<Self> {
        config.validate()?;
        let hidden = config.hidden_size as usize;
        let theo = config.theological_embedding_size as usize;
        let verse = config.verse_embedding_size as usize;
        let range = config.initializer_range;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let wte = init_uniform(config.vocab_size as usize, hidden, range, &mut rng);
        let wpe = init_uniform(config.max_position_embeddings as usize, hidden, range, &mut rng);
        let concept_embeddings = init_uniform(config.num_theological_concepts as usize, theo, range, &mut rng);
        let side = match config.fusion_mode {
            FusionMode::Additive => SideProjection::Additive {
                theological: init_uniform(theo, hidden, range, &mut rng),
                verse: init_uniform(verse + 1, hidden, range, &mut rng),
            },
            FusionMode::Concatenate => SideProjection::Concatenate {
                joint: init_uniform(theo + verse + 1, hidden, range, &mut rng),
            },
        };

        Ok(Self {
            wte,
            wpe,
            concept_embeddings,
            side,
            bias_scale: config.attention_bias_init,
            verse_size: verse,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.wte.ncols()
    }

    pub fn bias_scale(&self) -> f32 {
        self.bias_scale
    }

    /// Replaces the shared reference-group bias. It must stay positive and finite.
    pub fn set_bias_scale(&mut self, scale: f32) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ScriptureLmError::InvalidInput(format!(
                "attention bias scale must be a positive finite number, got {}",
                scale
            )));
        }
        self.bias_scale = scale;
        Ok(())
    }

    /// Gathers every channel for each token and builds the sequence's bias matrix.
    /// Only `Resolved` matches contribute; ambiguous and rejected spans are ignored.
    pub fn fuse(
        &self,
        tokens: &[ModelToken],
        positions: &[usize],
        concept_tags: &[Option<ConceptId>],
        matches: &[ReferenceMatch],
        verse_index: &VerseEmbeddingIndex,
    ) -> Result<(Vec<FusionInput>, AttentionBiasMatrix)> {
        if positions.len() != tokens.len() || concept_tags.len() != tokens.len() {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "{} tokens but {} positions and {} concept tags",
                tokens.len(),
                positions.len(),
                concept_tags.len()
            )));
        }
        if verse_index.dim() != self.verse_size {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "verse index width {} does not match verse_embedding_size {}",
                verse_index.dim(),
                self.verse_size
            )));
        }

        let resolved: Vec<(usize, usize, &CanonicalReference)> = matches
            .iter()
            .filter_map(|m| m.result.as_resolved().map(|r| (m.start, m.end, r)))
            .collect();

        let mut groups: BTreeMap<CanonicalReference, Vec<usize>> = BTreeMap::new();
        let mut inputs = Vec::with_capacity(tokens.len());
        for (i, ((token, &position), concept)) in tokens.iter().zip(positions).zip(concept_tags).enumerate() {
            let token_embedding = self.row(&self.wte, token.id as usize, "token id")?;
            let position_embedding = self.row(&self.wpe, position, "position")?;
            let theological_embedding = match concept {
                Some(ConceptId(id)) => Some(self.row(&self.concept_embeddings, *id as usize, "concept id")?),
                None => None,
            };

            let mut covering = resolved
                .iter()
                .filter(|(start, end, _)| token.overlaps(*start, *end))
                .peekable();
            let first = covering.peek().map(|(_, _, r)| **r);
            for (_, _, reference) in covering {
                let group = groups.entry(**reference).or_default();
                if group.last() != Some(&i) {
                    group.push(i);
                }
            }

            inputs.push(FusionInput {
                token_embedding,
                position_embedding,
                theological_embedding,
                verse_embedding: first.map(|r| verse_index.lookup(&r).to_owned()),
                verse_span_width: first.map(|r| r.span_width()),
            });
        }

        let groups: Vec<Vec<usize>> = groups.into_values().collect();
        let bias = AttentionBiasMatrix::from_groups(tokens.len(), &groups, self.bias_scale);
        Ok((inputs, bias))
    }

    fn row(&self, table: &Array2<f32>, index: usize, what: &str) -> Result<Array1<f32>> {
        if index >= table.nrows() {
            return Err(ScriptureLmError::InvalidInput(format!(
                "{} {} is out of range for a table of {} rows",
                what,
                index,
                table.nrows()
            )));
        }
        Ok(table.row(index).to_owned())
    }

    /// Projects fused inputs to `[seq_len, hidden_size]`.
    pub fn project(&self, inputs: &[FusionInput]) -> Result<Array2<f32>> {
        let hidden = self.hidden_size();
        let mut output = Array2::<f32>::zeros((inputs.len(), hidden));
        for (i, input) in inputs.iter().enumerate() {
            if input.token_embedding.len() != hidden || input.position_embedding.len() != hidden {
                return Err(ScriptureLmError::ShapeMismatch(format!(
                    "token {} has embeddings of width {}/{}, expected {}",
                    i,
                    input.token_embedding.len(),
                    input.position_embedding.len(),
                    hidden
                )));
            }
            let mut row = &input.token_embedding + &input.position_embedding;
            if input.has_side_channel() {
                row += &self.side_channels(input)?;
            }
            output.slice_mut(s![i, ..]).assign(&row);
        }
        Ok(output)
    }

    fn side_channels(&self, input: &FusionInput) -> Result<Array1<f32>> {
        let theo_size = self.concept_embeddings.ncols();
        let verse_features = input.verse_embedding.as_ref().map(|v| {
            let mut features = Array1::zeros(self.verse_size + 1);
            features.slice_mut(s![..self.verse_size]).assign(v);
            features[self.verse_size] = span_width_feature(input.verse_span_width.unwrap_or(0));
            features
        });
        let check = |v: &Array1<f32>, expected: usize, what: &str| {
            if v.len() == expected {
                Ok(())
            } else {
                Err(ScriptureLmError::ShapeMismatch(format!(
                    "{} embedding has width {}, expected {}",
                    what,
                    v.len(),
                    expected
                )))
            }
        };
        if let Some(theo) = &input.theological_embedding {
            check(theo, theo_size, "theological")?;
        }
        if let Some(verse) = &input.verse_embedding {
            check(verse, self.verse_size, "verse")?;
        }

        match &self.side {
            SideProjection::Additive { theological, verse } => {
                let mut sum = Array1::zeros(self.hidden_size());
                if let Some(theo) = &input.theological_embedding {
                    sum += &theo.dot(theological);
                }
                if let Some(features) = &verse_features {
                    sum += &features.dot(verse);
                }
                Ok(sum)
            }
            SideProjection::Concatenate { joint } => {
                let theo = input
                    .theological_embedding
                    .clone()
                    .unwrap_or_else(|| Array1::zeros(theo_size));
                let verse = verse_features.unwrap_or_else(|| Array1::zeros(self.verse_size + 1));
                let stacked = concatenate(Axis(0), &[theo.view(), verse.view()])?;
                Ok(stacked.dot(joint))
            }
        }
    }

    /// Tied output head: hidden states against the token embedding table.
    pub fn lm_logits(&self, hidden: ArrayView2<f32>) -> Array2<f32> {
        hidden.dot(&self.wte.t())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Canon;
    use crate::reference::{CitationForm, Rejection, ResolutionResult};
    use approx::assert_abs_diff_eq;

    fn small_config(mode: FusionMode) -> BiblicalTransformerConfig {
        BiblicalTransformerConfig {
            vocab_size: 50,
            max_position_embeddings: 16,
            hidden_size: 8,
            num_hidden_layers: 1,
            num_attention_heads: 2,
            theological_embedding_size: 4,
            num_theological_concepts: 10,
            verse_embedding_size: 3,
            verse_embedding_capacity: 8,
            initializer_range: 0.1,
            fusion_mode: mode,
            ..Default::default()
        }
    }

    fn tokens(spans: &[(usize, usize)]) -> Vec<ModelToken> {
        spans
            .iter()
            .enumerate()
            .map(|(i, &(start, end))| ModelToken { id: i as u32 + 1, start, end })
            .collect()
    }

    fn resolved_match(start: usize, end: usize, chapter: u32, verse: u32) -> ReferenceMatch {
        let reference = CanonicalReference::verse(Canon::standard().unwrap(), 42, chapter, verse).unwrap();
        ReferenceMatch {
            start,
            end,
            raw_text: String::new(),
            form: CitationForm::ChapterVerse,
            result: ResolutionResult::Resolved(reference),
        }
    }

    #[test]
    fn test_no_references_is_plain_token_plus_position() -> Result<()> {
        for mode in [FusionMode::Additive, FusionMode::Concatenate] {
            let config = small_config(mode);
            let layer = EmbeddingFusionLayer::new(&config)?;
            let index = VerseEmbeddingIndex::from_config(&config)?;
            let toks = tokens(&[(0, 2), (3, 5), (6, 9)]);
            let positions = [0, 1, 2];

            let (inputs, bias) = layer.fuse(&toks, &positions, &[None, None, None], &[], &index)?;
            assert!(bias.is_zero(), "bias must be zero without references");
            let projected = layer.project(&inputs)?;
            for (i, token) in toks.iter().enumerate() {
                let expected = &layer.wte.row(token.id as usize) + &layer.wpe.row(i);
                for (a, b) in projected.row(i).iter().zip(expected.iter()) {
                    assert_eq!(a, b, "fusion drifted from token+position in {:?} mode", mode);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_unresolved_matches_do_not_fire() -> Result<()> {
        let config = small_config(FusionMode::Additive);
        let layer = EmbeddingFusionLayer::new(&config)?;
        let index = VerseEmbeddingIndex::from_config(&config)?;
        let toks = tokens(&[(0, 4), (5, 9)]);
        let rejected = ReferenceMatch {
            start: 0,
            end: 9,
            raw_text: "Gen 51:1".to_string(),
            form: CitationForm::ChapterVerse,
            result: ResolutionResult::Rejected(Rejection::OutOfCanonBounds),
        };
        let (inputs, bias) = layer.fuse(&toks, &[0, 1], &[None, None], &[rejected], &index)?;
        assert!(bias.is_zero());
        assert!(inputs.iter().all(|input| !input.has_side_channel()));
        Ok(())
    }

    #[test]
    fn test_bias_groups_tokens_by_reference() -> Result<()> {
        let config = small_config(FusionMode::Additive);
        let layer = EmbeddingFusionLayer::new(&config)?;
        let index = VerseEmbeddingIndex::from_config(&config)?;
        // "see John 3:16 and John 3:17"
        let toks = tokens(&[(0, 3), (4, 8), (9, 13), (14, 17), (18, 22), (23, 27)]);
        let matches = [resolved_match(4, 13, 3, 16), resolved_match(18, 27, 3, 17)];

        let (inputs, bias) = layer.fuse(&toks, &[0, 1, 2, 3, 4, 5], &[None; 6], &matches, &index)?;
        let scale = layer.bias_scale();
        assert_eq!(bias.get(1, 2), Some(scale));
        assert_eq!(bias.get(2, 1), Some(scale));
        assert_eq!(bias.get(1, 1), Some(scale));
        assert_eq!(bias.get(4, 5), Some(scale));
        assert_eq!(bias.get(1, 4), Some(0.0), "different references are not grouped");
        assert_eq!(bias.get(0, 1), Some(0.0));
        assert_eq!(bias.get(3, 3), Some(0.0), "uncovered tokens get no bias");

        assert!(inputs[0].verse_embedding.is_none());
        assert_eq!(inputs[1].verse_embedding.as_ref().map(|v| v.len()), Some(3));
        assert_eq!(inputs[1].verse_span_width, Some(0));
        Ok(())
    }

    #[test]
    fn test_unseen_verse_uses_fallback_embedding() -> Result<()> {
        let config = small_config(FusionMode::Additive);
        let layer = EmbeddingFusionLayer::new(&config)?;
        let index = VerseEmbeddingIndex::from_config(&config)?;
        let toks = tokens(&[(0, 9)]);
        let (inputs, _) = layer.fuse(&toks, &[0], &[None], &[resolved_match(0, 9, 3, 16)], &index)?;
        assert_eq!(inputs[0].verse_embedding.as_ref().map(|v| v.view()), Some(index.fallback()));
        Ok(())
    }

    #[test]
    fn test_side_channels_change_projection_in_both_modes() -> Result<()> {
        for mode in [FusionMode::Additive, FusionMode::Concatenate] {
            let config = small_config(mode);
            let layer = EmbeddingFusionLayer::new(&config)?;
            let mut index = VerseEmbeddingIndex::from_config(&config)?;
            let m = resolved_match(0, 4, 3, 16);
            index.assign(m.result.as_resolved().unwrap());

            let toks = tokens(&[(0, 4), (5, 8)]);
            let (inputs, _) = layer.fuse(&toks, &[0, 1], &[Some(ConceptId(3)), None], &[m], &index)?;
            let projected = layer.project(&inputs)?;
            assert_eq!(projected.shape(), &[2, 8]);

            let plain = &inputs[0].token_embedding + &inputs[0].position_embedding;
            let drift: f32 = projected.row(0).iter().zip(plain.iter()).map(|(a, b)| (a - b).abs()).sum();
            assert!(drift > 0.0, "side channels had no effect in {:?} mode", mode);
            let plain_second = &inputs[1].token_embedding + &inputs[1].position_embedding;
            for (a, b) in projected.row(1).iter().zip(plain_second.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 0.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_span_width_feature_is_log_scaled() {
        assert_eq!(span_width_feature(0), 0.0);
        assert_abs_diff_eq!(span_width_feature(175), 176f32.ln(), epsilon = 1e-6);
        assert!(span_width_feature(175) < 6.0);
        assert!(span_width_feature(3) < span_width_feature(4));
    }

    #[test]
    fn test_set_bias_scale_rejects_non_positive_values() -> Result<()> {
        let mut layer = EmbeddingFusionLayer::new(&small_config(FusionMode::Additive))?;
        layer.set_bias_scale(2.5)?;
        assert_eq!(layer.bias_scale(), 2.5);
        for bad in [0.0, -1.0, f32::NAN] {
            assert!(layer.set_bias_scale(bad).is_err());
        }
        assert_eq!(layer.bias_scale(), 2.5);
        Ok(())
    }

    #[test]
    fn test_out_of_range_inputs_are_errors() -> Result<()> {
        let config = small_config(FusionMode::Additive);
        let layer = EmbeddingFusionLayer::new(&config)?;
        let index = VerseEmbeddingIndex::from_config(&config)?;
        let toks = tokens(&[(0, 1)]);
        assert!(layer.fuse(&toks, &[16], &[None], &[], &index).is_err(), "position past the table");
        assert!(layer
            .fuse(&toks, &[0], &[Some(ConceptId(10))], &[], &index)
            .is_err());
        assert!(layer.fuse(&toks, &[0, 1], &[None], &[], &index).is_err());

        let bad_token = [ModelToken { id: 50, start: 0, end: 1 }];
        assert!(layer.fuse(&bad_token, &[0], &[None], &[], &index).is_err());
        Ok(())
    }
}
