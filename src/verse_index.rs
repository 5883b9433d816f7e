//! Trainable verse embedding table addressed by [`VerseEmbeddingKey`].
//!
//! Row 0 is the reserved unknown-verse embedding. Other rows are handed out
//! lazily, one per key, until the configured capacity is reached; after that,
//! new keys are pinned to row 0 for the lifetime of the index and counted.

use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use safetensors::tensor::TensorView;
use safetensors::{Dtype, SafeTensors};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::common::init_uniform;
use crate::config::BiblicalTransformerConfig;
use crate::error::{Result, ScriptureLmError};
use crate::reference::CanonicalReference;

pub const FALLBACK_SLOT: usize = 0;
const TENSOR_NAME: &str = "verse_embeddings";
const FORMAT_TAG: &str = "verse-embedding-index/1";

/// Composite key over `(book_index, chapter, verse_start)`. Ranges key on their
/// first verse; the width travels separately as a scalar feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VerseEmbeddingKey(u32);

impl VerseEmbeddingKey {
    // 10 bits each for chapter and verse covers Psalms 150 and Psalm 119:176.
    const FIELD_BITS: u32 = 10;
    const FIELD_MASK: u32 = (1 << Self::FIELD_BITS) - 1;

    pub fn from_reference(reference: &CanonicalReference) -> Self {
        let book = reference.book_index() as u32;
        Self(
            (book << (2 * Self::FIELD_BITS))
                | ((reference.chapter() & Self::FIELD_MASK) << Self::FIELD_BITS)
                | (reference.verse_start() & Self::FIELD_MASK),
        )
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// `(book_index, chapter, verse_start)`
    pub fn parts(&self) -> (usize, u32, u32) {
        (
            (self.0 >> (2 * Self::FIELD_BITS)) as usize,
            (self.0 >> Self::FIELD_BITS) & Self::FIELD_MASK,
            self.0 & Self::FIELD_MASK,
        )
    }
}

impl From<&CanonicalReference> for VerseEmbeddingKey {
    fn from(reference: &CanonicalReference) -> Self {
        Self::from_reference(reference)
    }
}

/// Outcome of one serialized slot-assignment pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentReport {
    pub newly_assigned: usize,
    pub newly_exhausted: usize,
}

#[derive(Debug, Clone)]
pub struct VerseEmbeddingIndex {
    table: Array2<f32>, // [capacity + 1, dim]
    slots: HashMap<VerseEmbeddingKey, usize>,
    capacity: usize,
    next_slot: usize,
    capacity_exhausted: u64,
}

#[derive(Serialize, Deserialize)]
struct SlotAssignment {
    key: VerseEmbeddingKey,
    slot: usize,
}

impl VerseEmbeddingIndex {
    pub fn new(capacity: usize, dim: usize, initializer_range: f32, seed: u64) -> Result<Self> {
        if capacity == 0 || dim == 0 {
            return Err(ScriptureLmError::ConfigMismatch(format!(
                "verse embedding index needs positive capacity and width, got {} x {}",
                capacity, dim
            )));
        }
        let mut rng = StdRng::seed_from_u64(seed);
        Ok(Self {
            table: init_uniform(capacity + 1, dim, initializer_range, &mut rng),
            slots: HashMap::new(),
            capacity,
            next_slot: 1,
            capacity_exhausted: 0,
        })
    }

    pub fn from_config(config: &BiblicalTransformerConfig) -> Result<Self> {
        Self::new(
            config.verse_embedding_capacity as usize,
            config.verse_embedding_size as usize,
            config.initializer_range,
            config.seed.wrapping_add(1),
        )
    }

    pub fn dim(&self) -> usize {
        self.table.ncols()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys holding a slot of their own.
    pub fn assigned(&self) -> usize {
        self.next_slot - 1
    }

    pub fn is_full(&self) -> bool {
        self.assigned() >= self.capacity
    }

    /// Number of distinct keys that arrived after the table was full.
    pub fn capacity_exhausted(&self) -> u64 {
        self.capacity_exhausted
    }

    pub fn table(&self) -> &Array2<f32> {
        &self.table
    }

    pub fn slot_of(&self, reference: &CanonicalReference) -> usize {
        self.slots
            .get(&VerseEmbeddingKey::from_reference(reference))
            .copied()
            .unwrap_or(FALLBACK_SLOT)
    }

    /// Never fails: unseen and pinned keys read the fallback row.
    pub fn lookup(&self, reference: &CanonicalReference) -> ArrayView1<'_, f32> {
        self.table.row(self.slot_of(reference))
    }

    pub fn fallback(&self) -> ArrayView1<'_, f32> {
        self.table.row(FALLBACK_SLOT)
    }

    /// Gives `reference` a slot if it has none. Returns the slot it now maps to.
    pub fn assign(&mut self, reference: &CanonicalReference) -> usize {
        self.assign_key(VerseEmbeddingKey::from_reference(reference)).0
    }

    pub fn lookup_or_assign(&mut self, reference: &CanonicalReference) -> ArrayView1<'_, f32> {
        let slot = self.assign(reference);
        self.table.row(slot)
    }

    /// Serialized assignment for a batch of references, in iteration order.
    pub fn assign_all<'r, I>(&mut self, references: I) -> AssignmentReport
    where
        I: IntoIterator<Item = &'r CanonicalReference>,
    {
        let mut report = AssignmentReport::default();
        for reference in references {
            match self.assign_key(VerseEmbeddingKey::from_reference(reference)) {
                (_, Some(true)) => report.newly_assigned += 1,
                (_, Some(false)) => report.newly_exhausted += 1,
                (_, None) => {}
            }
        }
        report
    }

    // Some(true): fresh slot, Some(false): newly pinned to fallback, None: already known.
    fn assign_key(&mut self, key: VerseEmbeddingKey) -> (usize, Option<bool>) {
        if let Some(&slot) = self.slots.get(&key) {
            return (slot, None);
        }
        if self.is_full() {
            if self.capacity_exhausted == 0 {
                log::warn!(
                    "Verse embedding capacity ({}) exhausted; unseen verses now share the fallback embedding",
                    self.capacity
                );
            }
            self.capacity_exhausted += 1;
            self.slots.insert(key, FALLBACK_SLOT);
            return (FALLBACK_SLOT, Some(false));
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots.insert(key, slot);
        (slot, Some(true))
    }

    /// Plain SGD step on one row.
    pub fn apply_gradient(&mut self, slot: usize, gradient: ArrayView1<f32>, learning_rate: f32) -> Result<()> {
        if slot >= self.table.nrows() || gradient.len() != self.dim() {
            return Err(ScriptureLmError::ShapeMismatch(format!(
                "gradient of width {} for slot {} does not fit a {}x{} table",
                gradient.len(),
                slot,
                self.table.nrows(),
                self.dim()
            )));
        }
        self.table
            .row_mut(slot)
            .scaled_add(-learning_rate, &gradient);
        Ok(())
    }

    /// Writes the table and slot map as a safetensors file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = self
            .table
            .as_slice()
            .ok_or_else(|| ScriptureLmError::Checkpoint("embedding table is not contiguous".to_string()))?;
        let view = TensorView::new(
            Dtype::F32,
            vec![self.table.nrows(), self.dim()],
            bytemuck::cast_slice(data),
        )?;

        let mut assignments: Vec<SlotAssignment> = self
            .slots
            .iter()
            .map(|(&key, &slot)| SlotAssignment { key, slot })
            .collect();
        assignments.sort_by_key(|a| (a.slot, a.key));

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), FORMAT_TAG.to_string());
        metadata.insert("capacity".to_string(), self.capacity.to_string());
        metadata.insert("capacity_exhausted".to_string(), self.capacity_exhausted.to_string());
        metadata.insert("slot_assignments".to_string(), serde_json::to_string(&assignments)?);

        let bytes = safetensors::serialize([(TENSOR_NAME, &view)], &Some(metadata))?;
        fs::write(path, bytes)?;
        log::info!(
            "Saved verse embedding index to {} ({} of {} slots assigned)",
            path.display(),
            self.assigned(),
            self.capacity
        );
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let (_, header) = SafeTensors::read_metadata(&bytes)?;
        let metadata = header
            .metadata()
            .as_ref()
            .ok_or_else(|| ScriptureLmError::Checkpoint("missing metadata".to_string()))?;
        let field = |name: &str| {
            metadata
                .get(name)
                .ok_or_else(|| ScriptureLmError::Checkpoint(format!("missing metadata field {:?}", name)))
        };
        if field("format")? != FORMAT_TAG {
            return Err(ScriptureLmError::Checkpoint(format!(
                "unsupported format {:?}",
                field("format")?
            )));
        }
        let parse_number = |name: &str| {
            field(name)?
                .parse::<u64>()
                .map_err(|e| ScriptureLmError::Checkpoint(format!("bad {}: {}", name, e)))
        };
        let capacity = parse_number("capacity")? as usize;
        let capacity_exhausted = parse_number("capacity_exhausted")?;
        let assignments: Vec<SlotAssignment> = serde_json::from_str(field("slot_assignments")?)?;

        let tensors = SafeTensors::deserialize(&bytes)?;
        let tensor = tensors.tensor(TENSOR_NAME)?;
        if tensor.dtype() != Dtype::F32 {
            return Err(ScriptureLmError::Checkpoint(format!(
                "expected F32 embeddings, found {:?}",
                tensor.dtype()
            )));
        }
        let shape = tensor.shape();
        if shape.len() != 2 || shape[0] != capacity + 1 || shape[1] == 0 {
            return Err(ScriptureLmError::Checkpoint(format!(
                "embedding shape {:?} does not match capacity {}",
                shape, capacity
            )));
        }
        let values: Vec<f32> = tensor
            .data()
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let table = Array2::from_shape_vec((shape[0], shape[1]), values)?;

        let mut slots = HashMap::with_capacity(assignments.len());
        let mut next_slot = 1;
        for SlotAssignment { key, slot } in assignments {
            if slot > capacity || slots.insert(key, slot).is_some() {
                return Err(ScriptureLmError::Checkpoint(format!(
                    "invalid assignment of key {} to slot {}",
                    key.value(),
                    slot
                )));
            }
            next_slot = next_slot.max(slot + 1);
        }
        let distinct = slots.values().filter(|&&s| s != FALLBACK_SLOT).count();
        if distinct != next_slot - 1 {
            return Err(ScriptureLmError::Checkpoint(
                "slot assignments are not a dense prefix of the table".to_string(),
            ));
        }

        log::info!(
            "Loaded verse embedding index from {} ({} of {} slots assigned)",
            path.display(),
            distinct,
            capacity
        );
        Ok(Self {
            table,
            slots,
            capacity,
            next_slot,
            capacity_exhausted,
        })
    }
}
