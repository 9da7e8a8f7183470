// ============================================================
// Layer 3 — One-vs-Rest ROC Curves
// ============================================================
// For every label c we treat "true label == c" as the positive
// class and the model's probability for c as the score. The
// curve is sampled at `steps` evenly spaced thresholds over
// [0, 1]:
//
//   t_k = k / (steps - 1),  k = 0 .. steps
//
// At each threshold a row counts as predicted positive when
// score >= t_k, giving
//
//   TPR = TP / P        FPR = FP / N
//
// Because softmax scores live in [0, 1], t_0 = 0 marks every
// row positive (TPR = FPR = 1) and the last threshold only
// keeps rows scored at exactly 1.0.
//
// AUC is the trapezoidal area under the (FPR, TPR) points.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::domain::classification::Classification;

/// Threshold count used when the caller doesn't pick one
pub const DEFAULT_ROC_STEPS: usize = 1000;

/// One label's curve. `thresholds`, `tpr` and `fpr` are parallel
/// vectors, one entry per threshold, in ascending threshold order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    /// The class treated as positive
    pub label:      usize,

    /// t_k = k / (steps - 1)
    pub thresholds: Vec<f32>,

    /// True positive rate at each threshold
    pub tpr:        Vec<f64>,

    /// False positive rate at each threshold
    pub fpr:        Vec<f64>,

    /// Rows whose true label is `label` (P)
    pub positives:  usize,

    /// All other rows (N)
    pub negatives:  usize,
}

impl RocCurve {
    /// Sample the one-vs-rest curve for `label`.
    pub fn one_vs_rest(rows: &[Classification], label: usize, steps: usize) -> Result<Self> {
        if steps < 2 {
            bail!("ROC needs at least 2 thresholds, got {steps}");
        }

        // Pull (score, is_positive) once so each threshold is a single pass
        let mut scored = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let Some(score) = row.score_for(label) else {
                bail!(
                    "row {i} has {} scores; no score column for label {label}",
                    row.scores.len()
                );
            };
            scored.push((score, row.true_label == label));
        }

        let positives = scored.iter().filter(|(_, p)| *p).count();
        let negatives = scored.len() - positives;

        let mut thresholds = Vec::with_capacity(steps);
        let mut tpr        = Vec::with_capacity(steps);
        let mut fpr        = Vec::with_capacity(steps);

        for k in 0..steps {
            let t = k as f32 / (steps - 1) as f32;
            let (mut tp, mut fp) = (0usize, 0usize);
            for &(score, is_positive) in &scored {
                if score >= t {
                    if is_positive { tp += 1 } else { fp += 1 }
                }
            }
            thresholds.push(t);
            tpr.push(rate(tp, positives));
            fpr.push(rate(fp, negatives));
        }

        Ok(Self { label, thresholds, tpr, fpr, positives, negatives })
    }

    /// Area under the curve, trapezoidal rule over points sorted by FPR.
    pub fn auc(&self) -> f64 {
        let mut points: Vec<(f64, f64)> = self.fpr.iter()
            .copied()
            .zip(self.tpr.iter().copied())
            .collect();
        // Ascending FPR; ties broken by ascending TPR so vertical
        // segments contribute nothing
        points.sort_by(|a, b| {
            a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
        });

        // Anchor the curve at (0,0) and (1,1)
        let mut area = 0.0;
        let mut prev = (0.0, 0.0);
        for &p in points.iter().chain(std::iter::once(&(1.0, 1.0))) {
            area += (p.0 - prev.0) * (p.1 + prev.1) / 2.0;
            prev = p;
        }
        area.clamp(0.0, 1.0)
    }
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { count as f64 / total as f64 }
}

/// One ROC curve per label, in the order of `labels`.
pub fn create_ovr_roc(
    rows:   &[Classification],
    labels: &[usize],
    steps:  usize,
) -> Result<Vec<RocCurve>> {
    labels.iter()
        .map(|&label| RocCurve::one_vs_rest(rows, label, steps))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(scores: &[f32], label: usize) -> Classification {
        Classification::new(scores.to_vec(), label)
    }

    fn perfect_rows() -> Vec<Classification> {
        vec![
            row(&[0.9, 0.1], 0),
            row(&[0.8, 0.2], 0),
            row(&[0.3, 0.7], 1),
            row(&[0.1, 0.9], 1),
        ]
    }

    #[test]
    fn test_threshold_grid() {
        let curve = RocCurve::one_vs_rest(&perfect_rows(), 0, 5).unwrap();
        assert_eq!(curve.thresholds, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(curve.tpr.len(), 5);
        assert_eq!(curve.fpr.len(), 5);
    }

    #[test]
    fn test_zero_threshold_accepts_everything() {
        let curve = RocCurve::one_vs_rest(&perfect_rows(), 1, 10).unwrap();
        assert_eq!(curve.tpr[0], 1.0);
        assert_eq!(curve.fpr[0], 1.0);
        assert_eq!(curve.positives, 2);
        assert_eq!(curve.negatives, 2);
    }

    #[test]
    fn test_perfect_scorer_has_unit_auc() {
        let curve = RocCurve::one_vs_rest(&perfect_rows(), 0, 1000).unwrap();
        assert!((curve.auc() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_scorer_has_zero_auc() {
        let rows = vec![
            row(&[0.1, 0.9], 0),
            row(&[0.2, 0.8], 0),
            row(&[0.9, 0.1], 1),
            row(&[0.8, 0.2], 1),
        ];
        let curve = RocCurve::one_vs_rest(&rows, 0, 1000).unwrap();
        assert!(curve.auc().abs() < 1e-9);
    }

    #[test]
    fn test_constant_scorer_is_chance() {
        let rows = vec![
            row(&[0.5, 0.5], 0),
            row(&[0.5, 0.5], 1),
        ];
        let curve = RocCurve::one_vs_rest(&rows, 0, 101).unwrap();
        assert!((curve.auc() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rates_are_monotone_non_increasing() {
        let rows = vec![
            row(&[0.6, 0.3, 0.1], 0),
            row(&[0.2, 0.5, 0.3], 1),
            row(&[0.4, 0.4, 0.2], 2),
            row(&[0.1, 0.1, 0.8], 2),
        ];
        let curve = RocCurve::one_vs_rest(&rows, 2, 50).unwrap();
        for w in curve.tpr.windows(2) {
            assert!(w[1] <= w[0]);
        }
        for w in curve.fpr.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_missing_negatives_gives_zero_fpr() {
        let rows = vec![row(&[0.7, 0.3], 0)];
        let curve = RocCurve::one_vs_rest(&rows, 0, 3).unwrap();
        assert!(curve.fpr.iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_too_few_steps_is_error() {
        assert!(RocCurve::one_vs_rest(&perfect_rows(), 0, 1).is_err());
    }

    #[test]
    fn test_label_without_score_column_is_error() {
        assert!(RocCurve::one_vs_rest(&perfect_rows(), 5, 10).is_err());
    }

    #[test]
    fn test_one_curve_per_label() {
        let curves = create_ovr_roc(&perfect_rows(), &[0, 1], 20).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].label, 0);
        assert_eq!(curves[1].label, 1);
    }
}
