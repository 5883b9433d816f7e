use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::attention::MultiHeadAttention;
use crate::common::LayerNorm;
use crate::config::BiblicalTransformerConfig;
use crate::error::{Result, ScriptureLmError};
use crate::fusion::{AttentionBiasMatrix, EmbeddingFusionLayer, FusionInput};
use crate::mlp::MLP;

#[derive(Debug, Clone)]
pub struct TransformerBlock {
    ln_1: LayerNorm,
    attn: MultiHeadAttention,
    ln_2: LayerNorm,
    mlp: MLP,
}

impl TransformerBlock {
    pub fn new(config: &BiblicalTransformerConfig, rng: &mut StdRng) -> Result<Self> {
        let n_embd = config.hidden_size as usize;
        let range = config.initializer_range;
        Ok(Self {
            ln_1: LayerNorm::new(n_embd, config.layer_norm_epsilon)?,
            attn: MultiHeadAttention::with_random_weights(
                config.num_attention_heads as usize,
                n_embd,
                range,
                rng,
            )?,
            ln_2: LayerNorm::new(n_embd, config.layer_norm_epsilon)?,
            mlp: MLP::with_random_weights(n_embd, config.inner_size(), range, rng)?,
        })
    }

    /// Pre-norm residual block over `[seq_len, n_embd]`.
    pub fn forward(
        &self,
        hidden_states: &Array2<f32>,
        attention_bias: Option<&AttentionBiasMatrix>,
        causal: bool,
    ) -> Result<Array2<f32>> {
        let attn_out = self
            .attn
            .forward(&self.ln_1.forward(hidden_states)?, attention_bias, causal)?;
        let residual = hidden_states + &attn_out;
        let mlp_out = self.mlp.forward(&self.ln_2.forward(&residual)?)?;
        Ok(residual + &mlp_out)
    }
}

/// Final hidden states and next-token logits for one sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    pub hidden_states: Array2<f32>, // [seq_len, hidden_size]
    pub logits: Array2<f32>,        // [seq_len, vocab_size]
}

/// GPT-2 style decoder whose input layer is the structured fusion layer.
///
/// Every block receives the same reference-group bias matrix; the bias scale
/// is a single parameter owned by the fusion layer.
///
/// # Arguments
/// * `config`: a validated `BiblicalTransformerConfig`. `new` validates again and
///   fails with `ConfigMismatch` before allocating anything.
#[derive(Debug, Clone)]
pub struct BiblicalTransformer {
    config: BiblicalTransformerConfig,
    fusion: EmbeddingFusionLayer,
    h: Vec<TransformerBlock>,
    ln_f: LayerNorm,
}

impl BiblicalTransformer {
    pub fn new(config: &BiblicalTransformerConfig) -> Result<Self> {
        config.validate()?;
        let fusion = EmbeddingFusionLayer::new(config)?;
        // Block weights draw from their own stream so changing the embedding sizes
        // does not reshuffle them.
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(2));
        let h = (0..config.num_hidden_layers)
            .map(|_| TransformerBlock::new(config, &mut rng))
            .collect::<Result<Vec<_>>>()?;
        let ln_f = LayerNorm::new(config.hidden_size as usize, config.layer_norm_epsilon)?;

        log::info!(
            "Initialized BiblicalTransformer: {} layers, hidden {}, {} heads, fusion {:?}",
            config.num_hidden_layers,
            config.hidden_size,
            config.num_attention_heads,
            config.fusion_mode
        );
        Ok(Self {
            config: config.clone(),
            fusion,
            h,
            ln_f,
        })
    }

    pub fn config(&self) -> &BiblicalTransformerConfig {
        &self.config
    }

    pub fn fusion(&self) -> &EmbeddingFusionLayer {
        &self.fusion
    }

    pub fn fusion_mut(&mut self) -> &mut EmbeddingFusionLayer {
        &mut self.fusion
    }

    pub fn num_layers(&self) -> usize {
        self.h.len()
    }

    pub fn forward(&self, inputs: &[FusionInput], attention_bias: &AttentionBiasMatrix) -> Result<ModelOutput> {
        if inputs.is_empty() {
            return Err(ScriptureLmError::InvalidInput(
                "cannot run the model on an empty sequence".to_string(),
            ));
        }
        if attention_bias.len() != inputs.len() {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "attention bias covers {} tokens, sequence has {}",
                attention_bias.len(),
                inputs.len()
            )));
        }

        // An all-zero bias is skipped so reference-free text runs the plain attention path.
        let bias = (!attention_bias.is_zero()).then_some(attention_bias);
        let mut hidden_states = self.fusion.project(inputs)?;
        for block in &self.h {
            hidden_states = block.forward(&hidden_states, bias, self.config.causal)?;
        }
        let hidden_states = self.ln_f.forward(&hidden_states)?;
        let logits = self.fusion.lm_logits(hidden_states.view());
        Ok(ModelOutput {
            hidden_states,
            logits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::{ConceptId, ModelToken};
    use crate::verse_index::VerseEmbeddingIndex;
    use approx::assert_abs_diff_eq;

    fn tiny_config() -> BiblicalTransformerConfig {
        BiblicalTransformerConfig {
            vocab_size: 32,
            max_position_embeddings: 16,
            hidden_size: 8,
            num_hidden_layers: 2,
            num_attention_heads: 2,
            theological_embedding_size: 4,
            num_theological_concepts: 8,
            verse_embedding_size: 4,
            verse_embedding_capacity: 16,
            initializer_range: 0.2,
            ..Default::default()
        }
    }

    fn plain_inputs(model: &BiblicalTransformer, n: usize) -> Result<(Vec<FusionInput>, AttentionBiasMatrix)> {
        let config = model.config();
        let index = VerseEmbeddingIndex::from_config(config)?;
        let tokens: Vec<ModelToken> = (0..n)
            .map(|i| ModelToken { id: (i * 3 % 32) as u32, start: i * 2, end: i * 2 + 1 })
            .collect();
        let positions: Vec<usize> = (0..n).collect();
        let tags: Vec<Option<ConceptId>> = vec![None; n];
        model.fusion().fuse(&tokens, &positions, &tags, &[], &index)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = BiblicalTransformerConfig {
            num_bible_books: 73,
            ..tiny_config()
        };
        assert!(matches!(
            BiblicalTransformer::new(&config),
            Err(ScriptureLmError::ConfigMismatch(_))
        ));
    }

    #[test]
    fn test_forward_shapes() -> Result<()> {
        let model = BiblicalTransformer::new(&tiny_config())?;
        assert_eq!(model.num_layers(), 2);
        let (inputs, bias) = plain_inputs(&model, 5)?;
        let output = model.forward(&inputs, &bias)?;
        assert_eq!(output.hidden_states.shape(), &[5, 8]);
        assert_eq!(output.logits.shape(), &[5, 32]);
        assert!(output.logits.iter().all(|v| v.is_finite()));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_output() -> Result<()> {
        let a = BiblicalTransformer::new(&tiny_config())?;
        let b = BiblicalTransformer::new(&tiny_config())?;
        let (inputs, bias) = plain_inputs(&a, 4)?;
        assert_eq!(a.forward(&inputs, &bias)?, b.forward(&inputs, &bias)?);
        Ok(())
    }

    #[test]
    fn test_causal_prefix_is_unaffected_by_later_tokens() -> Result<()> {
        let model = BiblicalTransformer::new(&tiny_config())?;
        let (inputs, bias) = plain_inputs(&model, 6)?;
        let full = model.forward(&inputs, &bias)?;
        let (prefix_inputs, prefix_bias) = plain_inputs(&model, 3)?;
        let prefix = model.forward(&prefix_inputs, &prefix_bias)?;
        for i in 0..3 {
            for j in 0..8 {
                assert_abs_diff_eq!(full.hidden_states[[i, j]], prefix.hidden_states[[i, j]], epsilon = 1e-5);
            }
        }
        Ok(())
    }

    #[test]
    fn test_bias_changes_output() -> Result<()> {
        let model = BiblicalTransformer::new(&tiny_config())?;
        let (inputs, zero_bias) = plain_inputs(&model, 4)?;
        let grouped = AttentionBiasMatrix::from_groups(4, &[vec![0, 2]], 3.0);
        let plain = model.forward(&inputs, &zero_bias)?;
        let biased = model.forward(&inputs, &grouped)?;
        assert_ne!(plain.hidden_states, biased.hidden_states);
        Ok(())
    }

    #[test]
    fn test_forward_rejects_mismatched_bias_and_empty_input() -> Result<()> {
        let model = BiblicalTransformer::new(&tiny_config())?;
        let (inputs, _) = plain_inputs(&model, 3)?;
        assert!(model.forward(&inputs, &AttentionBiasMatrix::zeros(2)).is_err());
        assert!(model.forward(&[], &AttentionBiasMatrix::zeros(0)).is_err());
        Ok(())
    }
}
