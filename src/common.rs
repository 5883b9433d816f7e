use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{Result, ScriptureLmError};

#[derive(Debug, Clone)]
pub struct LayerNorm {
    pub(crate) weight: Array1<f32>, // gamma
    pub(crate) bias: Array1<f32>,   // beta
    epsilon: f32,
}

impl LayerNorm {
    pub fn new(n_embd: usize, epsilon: f32) -> Result<Self> {
        if n_embd == 0 {
            return Err(ScriptureLmError::ConfigMismatch(
                "LayerNorm width must be positive".to_string(),
            ));
        }
        Ok(Self {
            weight: Array1::ones(n_embd),
            bias: Array1::zeros(n_embd),
            epsilon,
        })
    }

    /// Normalizes each row of `[seq_len, n_embd]`.
    pub fn forward(&self, x: &Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.weight.len() {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "LayerNorm expects width {}, got {}",
                self.weight.len(),
                x.ncols()
            )));
        }
        let axis = Axis(1);
        let mean = x
            .mean_axis(axis)
            .ok_or_else(|| ScriptureLmError::ShapeMismatch("LayerNorm over an empty axis".to_string()))?
            .insert_axis(axis);
        let variance = x.var_axis(axis, 0.0).insert_axis(axis);

        let std_dev_inv = (&variance + self.epsilon).mapv(|v| 1.0 / v.sqrt());
        let normalized = (x - &mean) * std_dev_inv;
        Ok(normalized * &self.weight + &self.bias)
    }
}

// GELU, tanh approximation
pub fn gelu(x: f32) -> f32 {
    0.5 * x * (1.0 + libm::tanhf((2.0f32 / std::f32::consts::PI).sqrt() * (x + 0.044715 * x.powi(3))))
}

/// Row-wise softmax. Rows that are entirely `-inf` come out as all zeros.
pub fn softmax_rows(input: &Array2<f32>) -> Array2<f32> {
    let axis = Axis(1);
    let max_val = input
        .fold_axis(axis, f32::NEG_INFINITY, |&a, &b| a.max(b))
        .mapv(|m| if m.is_finite() { m } else { 0.0 })
        .insert_axis(axis);
    let exp_values = (input - &max_val).mapv(f32::exp);
    let sum = exp_values
        .sum_axis(axis)
        .mapv(|s| if s > 0.0 { s } else { 1.0 })
        .insert_axis(axis);
    &exp_values / &sum
}

/// `[rows, cols]` drawn uniformly from `(-range, range)`; zeros when `range` is not positive.
pub fn init_uniform(rows: usize, cols: usize, range: f32, rng: &mut StdRng) -> Array2<f32> {
    if range > 0.0 {
        Array2::from_shape_simple_fn((rows, cols), || rng.gen_range(-range..range))
    } else {
        Array2::zeros((rows, cols))
    }
}
