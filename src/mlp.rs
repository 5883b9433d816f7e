use ndarray::{Array1, Array2};
use rand::rngs::StdRng;

use crate::common::{gelu, init_uniform};
use crate::error::{Result, ScriptureLmError};

/// Position-wise feed-forward block: `n_embd -> n_inner -> n_embd` with GELU in between.
#[derive(Debug, Clone)]
pub struct MLP {
    pub(crate) c_fc_weight: Array2<f32>,   // [n_embd, n_inner]
    pub(crate) c_fc_bias: Array1<f32>,     // [n_inner]
    pub(crate) c_proj_weight: Array2<f32>, // [n_inner, n_embd]
    pub(crate) c_proj_bias: Array1<f32>,   // [n_embd]
}

impl MLP {
    pub fn new(n_embd: usize, n_inner: usize) -> Result<Self> {
        if n_embd == 0 || n_inner == 0 {
            return Err(ScriptureLmError::ConfigMismatch(
                "n_embd and n_inner must be positive".to_string(),
            ));
        }
        Ok(Self {
            c_fc_weight: Array2::zeros((n_embd, n_inner)),
            c_fc_bias: Array1::zeros(n_inner),
            c_proj_weight: Array2::zeros((n_inner, n_embd)),
            c_proj_bias: Array1::zeros(n_embd),
        })
    }

    pub fn with_random_weights(n_embd: usize, n_inner: usize, range: f32, rng: &mut StdRng) -> Result<Self> {
        let mut mlp = Self::new(n_embd, n_inner)?;
        mlp.c_fc_weight = init_uniform(n_embd, n_inner, range, rng);
        mlp.c_proj_weight = init_uniform(n_inner, n_embd, range, rng);
        Ok(mlp)
    }

    pub fn forward(&self, hidden_states: &Array2<f32>) -> Result<Array2<f32>> {
        if hidden_states.ncols() != self.c_fc_weight.nrows() {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "Input embedding dimension ({}) does not match model n_embd ({})",
                hidden_states.ncols(),
                self.c_fc_weight.nrows()
            )));
        }
        let inner = (hidden_states.dot(&self.c_fc_weight) + &self.c_fc_bias).mapv(gelu);
        Ok(inner.dot(&self.c_proj_weight) + &self.c_proj_bias)
    }
}
