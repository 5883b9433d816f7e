use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::canon::CANON_BOOK_COUNT;
use crate::error::{Result, ScriptureLmError};

/// How the side channels are folded into the hidden-size input vector.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FusionMode {
    /// Each side channel gets its own projection; projections are summed.
    #[default]
    Additive,
    /// Side channels are concatenated and projected by one joint map.
    Concatenate,
}

/// What to do with a candidate nested inside another candidate's span.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Drop a candidate fully contained in an earlier candidate that was not rejected.
    #[default]
    PreferOutermost,
    /// Resolve every candidate independently.
    KeepAll,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReferenceConfig {
    pub chapter_verse_separators: Vec<String>,
    pub space_separator: bool,
    pub require_capitalized_book: bool,
    pub book_level_granularity: bool,
    pub overlap_policy: OverlapPolicy,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            chapter_verse_separators: vec![":".to_string(), ".".to_string()],
            space_separator: false,
            require_capitalized_book: true,
            book_level_granularity: false,
            overlap_policy: OverlapPolicy::PreferOutermost,
        }
    }
}

impl ReferenceConfig {
    pub fn separator_chars(&self) -> Result<Vec<char>> {
        self.chapter_verse_separators
            .iter()
            .map(|sep| {
                let mut chars = sep.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if !c.is_alphanumeric() && !c.is_whitespace() => Ok(c),
                    _ => Err(ScriptureLmError::ConfigMismatch(format!(
                        "chapter/verse separator {:?} must be a single punctuation character",
                        sep
                    ))),
                }
            })
            .collect()
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BiblicalTransformerConfig {
    pub vocab_size: i32,
    #[serde(alias = "n_positions")]
    pub max_position_embeddings: i32,
    #[serde(alias = "n_embd")]
    pub hidden_size: i32,
    #[serde(alias = "n_layer")]
    pub num_hidden_layers: i32,
    #[serde(alias = "n_head")]
    pub num_attention_heads: i32,
    #[serde(default, alias = "n_inner")]
    pub intermediate_size: Option<i32>,
    #[serde(default = "default_layer_norm_epsilon")]
    pub layer_norm_epsilon: f32,
    #[serde(default = "default_initializer_range")]
    pub initializer_range: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_num_bible_books")]
    pub num_bible_books: i32,
    pub theological_embedding_size: i32,
    #[serde(default = "default_num_theological_concepts")]
    pub num_theological_concepts: i32,
    pub verse_embedding_size: i32,
    #[serde(default = "default_verse_embedding_capacity")]
    pub verse_embedding_capacity: i32,
    #[serde(default)]
    pub fusion_mode: FusionMode,
    #[serde(default = "default_attention_bias_init")]
    pub attention_bias_init: f32,
    #[serde(default = "default_causal")]
    pub causal: bool,
    #[serde(default)]
    pub references: ReferenceConfig,
}

fn default_layer_norm_epsilon() -> f32 {
    1e-5
}

fn default_initializer_range() -> f32 {
    0.02
}

fn default_seed() -> u64 {
    42
}

fn default_num_bible_books() -> i32 {
    CANON_BOOK_COUNT as i32
}

fn default_num_theological_concepts() -> i32 {
    256
}

// One slot per verse of the standard versification.
fn default_verse_embedding_capacity() -> i32 {
    31_102
}

fn default_attention_bias_init() -> f32 {
    1.0
}

fn default_causal() -> bool {
    true
}

impl Default for BiblicalTransformerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1024,
            max_position_embeddings: 512,
            hidden_size: 64,
            num_hidden_layers: 2,
            num_attention_heads: 4,
            intermediate_size: None,
            layer_norm_epsilon: default_layer_norm_epsilon(),
            initializer_range: default_initializer_range(),
            seed: default_seed(),
            num_bible_books: default_num_bible_books(),
            theological_embedding_size: 16,
            num_theological_concepts: default_num_theological_concepts(),
            verse_embedding_size: 16,
            verse_embedding_capacity: default_verse_embedding_capacity(),
            fusion_mode: FusionMode::Additive,
            attention_bias_init: default_attention_bias_init(),
            causal: default_causal(),
            references: ReferenceConfig::default(),
        }
    }
}

impl BiblicalTransformerConfig {
    /// Reads a JSON config, either flat or nested under `model_params`, and validates it.
    pub fn load(config_path: &str) -> Result<Self> {
        if !Path::new(config_path).exists() {
            return Err(ScriptureLmError::InvalidInput(format!(
                "Config file not found at: {}",
                config_path
            )));
        }

        let mut file = File::open(config_path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = Self::from_json_str(&contents)?;
        log::info!(
            "Loaded config from {} (hidden_size={}, layers={}, fusion={:?})",
            config_path,
            config.hidden_size,
            config.num_hidden_layers,
            config.fusion_mode
        );
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(contents)?;
        if let Some(model_params) = value.get_mut("model_params") {
            value = model_params.take();
        }
        let config: BiblicalTransformerConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_bible_books != CANON_BOOK_COUNT as i32 {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "num_bible_books must be {}, got {}",
                CANON_BOOK_COUNT, self.num_bible_books
            )));
        }

        let positive = [
            ("vocab_size", self.vocab_size),
            ("max_position_embeddings", self.max_position_embeddings),
            ("hidden_size", self.hidden_size),
            ("num_hidden_layers", self.num_hidden_layers),
            ("num_attention_heads", self.num_attention_heads),
            ("theological_embedding_size", self.theological_embedding_size),
            ("num_theological_concepts", self.num_theological_concepts),
            ("verse_embedding_size", self.verse_embedding_size),
            ("verse_embedding_capacity", self.verse_embedding_capacity),
            ("intermediate_size", self.intermediate_size.unwrap_or(1)),
        ];
        for (name, value) in positive {
            if value <= 0 {
                return Err(ScriptureLmError::ConfigMismatch(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.hidden_size % self.num_attention_heads != 0 {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "hidden_size ({}) must be divisible by num_attention_heads ({})",
                self.hidden_size, self.num_attention_heads
            )));
        }
        if self.layer_norm_epsilon.is_nan() || self.layer_norm_epsilon <= 0.0 {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "layer_norm_epsilon must be positive, got {}",
                self.layer_norm_epsilon
            )));
        }
        if !self.attention_bias_init.is_finite() || self.attention_bias_init <= 0.0 {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "attention_bias_init must be a positive finite number, got {}",
                self.attention_bias_init
            )));
        }

        self.references.separator_chars()?;
        Ok(())
    }

    pub fn inner_size(&self) -> usize {
        self.intermediate_size.unwrap_or(4 * self.hidden_size) as usize
    }
}
