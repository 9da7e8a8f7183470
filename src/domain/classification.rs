// ============================================================
// Layer 3 — Classification Rows
// ============================================================
// The evaluation loop reduces every validation example to one
// row: the model's probability for each class, plus the class
// the example actually belongs to.
//
//   scores      = [0.01, 0.02, 0.90, 0.07]   (softmax output)
//   true_label  = 2
//   predicted   = argmax(scores) = 2
//
// Everything in the report is derived from a Vec of these rows,
// so nothing after the forward pass needs the model or Burn.
//
// Reference: Rust Book §8 (Vectors, HashMaps)

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// The model's probability vector for one example, paired with
/// the example's true class.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// One probability per model class, indexed by class id
    pub scores:     Vec<f32>,

    /// The class the example actually belongs to
    pub true_label: usize,
}

impl Classification {
    pub fn new(scores: Vec<f32>, true_label: usize) -> Self {
        Self { scores, true_label }
    }

    /// Index of the highest score. Ties resolve to the lowest index.
    /// Returns None for an empty score vector.
    pub fn predicted_label(&self) -> Option<usize> {
        argmax(&self.scores)
    }

    /// Score assigned to `label`, if the vector is wide enough.
    pub fn score_for(&self, label: usize) -> Option<f32> {
        self.scores.get(label).copied()
    }
}

/// Index of the largest value; first one wins on ties.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// The distinct true labels seen during classification, ascending.
pub fn labels_from_classifications(rows: &[Classification]) -> Vec<usize> {
    rows.iter()
        .map(|c| c.true_label)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of examples per true label.
/// Labels with no examples are absent rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassDistribution {
    /// label → example count, ordered by label
    pub counts: BTreeMap<usize, usize>,
}

impl ClassDistribution {
    pub fn from_classifications(rows: &[Classification]) -> Self {
        let mut counts = BTreeMap::new();
        for row in rows {
            *counts.entry(row.true_label).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, label: usize) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}
