// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The evaluation loop only needs one capability from the ML
// layer: turn a batch of examples into classification rows.
// Programming against this trait keeps the loop free of Burn
// types, so it can be exercised with a stub classifier.
//
// Implementations:
//   - EvaluationSession → restored Burn model + softmax
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::classification::Classification;

/// Anything that can score a batch of examples.
pub trait BatchClassifier<Batch> {
    /// One row per example in the batch, in batch order.
    fn classify(&self, batch: Batch) -> Result<Vec<Classification>>;
}
