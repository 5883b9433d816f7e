use ndarray::{s, Array1, Array2};
use rand::rngs::StdRng;

use crate::common::{init_uniform, softmax_rows};
use crate::error::{Result, ScriptureLmError};
use crate::fusion::AttentionBiasMatrix;

#[derive(Debug, Clone)]
pub struct MultiHeadAttention {
    pub(crate) n_head: usize,
    pub(crate) n_embd: usize,
    pub(crate) head_dim: usize,
    pub(crate) c_attn_w: Array2<f32>, // Shape: [n_embd, 3 * n_embd]
    pub(crate) c_attn_b: Array1<f32>, // Shape: [3 * n_embd]
    pub(crate) c_proj_w: Array2<f32>, // Shape: [n_embd, n_embd]
    pub(crate) c_proj_b: Array1<f32>, // Shape: [n_embd]
}

impl MultiHeadAttention {
    pub fn new(n_head: usize, n_embd: usize) -> Result<Self> {
        if n_head == 0 || n_embd == 0 || n_embd % n_head != 0 {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "n_embd ({}) must be a positive multiple of n_head ({})",
                n_embd, n_head
            )));
        }
        Ok(Self {
            n_head,
            n_embd,
            head_dim: n_embd / n_head,
            c_attn_w: Array2::zeros((n_embd, 3 * n_embd)),
            c_attn_b: Array1::zeros(3 * n_embd),
            c_proj_w: Array2::zeros((n_embd, n_embd)),
            c_proj_b: Array1::zeros(n_embd),
        })
    }

    pub fn with_random_weights(n_head: usize, n_embd: usize, range: f32, rng: &mut StdRng) -> Result<Self> {
        let mut mha = Self::new(n_head, n_embd)?;
        mha.c_attn_w = init_uniform(n_embd, 3 * n_embd, range, rng);
        mha.c_proj_w = init_uniform(n_embd, n_embd, range, rng);
        Ok(mha)
    }

    pub fn forward(
        &self,
        hidden_states: &Array2<f32>,
        attention_bias: Option<&AttentionBiasMatrix>,
        causal: bool,
    ) -> Result<Array2<f32>> {
        self.forward_with_probs(hidden_states, attention_bias, causal)
            .map(|(output, _)| output)
    }

    /// Forward pass over `[seq_len, n_embd]`, also returning each head's attention probabilities.
    /// The bias matrix is added to the scaled scores of every head before the causal mask.
    pub fn forward_with_probs(
        &self,
        hidden_states: &Array2<f32>,
        attention_bias: Option<&AttentionBiasMatrix>,
        causal: bool,
    ) -> Result<(Array2<f32>, Vec<Array2<f32>>)> {
        let (seq_len, width) = hidden_states.dim();
        if width != self.n_embd {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "Expected hidden_states of shape [seq_len, {}], got {:?}",
                self.n_embd,
                hidden_states.shape()
            )));
        }
        if let Some(bias) = attention_bias {
            if bias.len() != seq_len {
                return Err(ScriptureLmError::ShapeMismatch(format!(
                    "attention bias is {0}x{0} but the sequence has {1} tokens",
                    bias.len(),
                    seq_len
                )));
            }
        }

        let qkv = hidden_states.dot(&self.c_attn_w) + &self.c_attn_b;
        let scale = (self.head_dim as f32).sqrt();
        let mut context = Array2::<f32>::zeros((seq_len, self.n_embd));
        let mut head_probs = Vec::with_capacity(self.n_head);

        for h in 0..self.n_head {
            let offset = h * self.head_dim;
            let q = qkv.slice(s![.., offset..offset + self.head_dim]);
            let k = qkv.slice(s![.., self.n_embd + offset..self.n_embd + offset + self.head_dim]);
            let v = qkv.slice(s![.., 2 * self.n_embd + offset..2 * self.n_embd + offset + self.head_dim]);

            let mut scores = q.dot(&k.t()) / scale;
            if let Some(bias) = attention_bias {
                scores += bias.as_array();
            }
            if causal {
                for i in 0..seq_len {
                    for j in (i + 1)..seq_len {
                        scores[[i, j]] = f32::NEG_INFINITY;
                    }
                }
            }

            let probs = softmax_rows(&scores);
            context
                .slice_mut(s![.., offset..offset + self.head_dim])
                .assign(&probs.dot(&v));
            head_probs.push(probs);
        }

        let output = context.dot(&self.c_proj_w) + &self.c_proj_b;
        Ok((output, head_probs))
    }
}
