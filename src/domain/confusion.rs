// ============================================================
// Layer 3 — Confusion Matrix
// ============================================================
// Rows are true labels, columns are predicted labels, both
// indexed by position in the `labels` list:
//
//                 predicted
//               l0   l1   l2
//   true  l0  [ 48    1    1 ]
//         l1  [  0   50    0 ]
//         l2  [  3    0   47 ]
//
// The label list is the set of TRUE labels seen during
// classification. A prediction that falls outside that list
// (the model picked a class no example actually has) cannot
// be placed in a column, so it is tallied separately in
// `unlisted_predictions` instead of being silently dropped.

use serde::Serialize;

use crate::domain::classification::Classification;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    /// The label for each row/column, ascending
    pub labels: Vec<usize>,

    /// counts[true_index][predicted_index]
    pub counts: Vec<Vec<usize>>,

    /// Rows whose predicted label is not in `labels`
    pub unlisted_predictions: usize,
}

impl ConfusionMatrix {
    pub fn from_classifications(rows: &[Classification], labels: &[usize]) -> Self {
        let n = labels.len();
        let mut counts = vec![vec![0usize; n]; n];
        let mut unlisted_predictions = 0;

        for row in rows {
            let Some(t) = labels.iter().position(|&l| l == row.true_label) else {
                // Caller passed a label list that does not cover this row
                tracing::debug!("Skipping row with unlisted true label {}", row.true_label);
                continue;
            };
            let predicted = row
                .predicted_label()
                .and_then(|p| labels.iter().position(|&l| l == p));
            match predicted {
                Some(p) => counts[t][p] += 1,
                None    => unlisted_predictions += 1,
            }
        }

        if unlisted_predictions > 0 {
            tracing::warn!(
                "{} predictions fell outside the {} observed labels",
                unlisted_predictions,
                n,
            );
        }

        Self { labels: labels.to_vec(), counts, unlisted_predictions }
    }

    /// Number of rows placed in the matrix
    pub fn total(&self) -> usize {
        self.counts.iter().map(|r| r.iter().sum::<usize>()).sum()
    }

    /// Sum of the diagonal
    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Fraction of all evaluated rows (including unlisted predictions)
    /// that were classified correctly.
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total() + self.unlisted_predictions)
    }

    fn row_sum(&self, i: usize) -> usize {
        self.counts[i].iter().sum()
    }

    fn column_sum(&self, j: usize) -> usize {
        self.counts.iter().map(|r| r[j]).sum()
    }

    /// TP / (TP + FP) for the label at `index`
    pub fn precision(&self, index: usize) -> f64 {
        ratio(self.counts[index][index], self.column_sum(index))
    }

    /// TP / (TP + FN) for the label at `index`
    pub fn recall(&self, index: usize) -> f64 {
        ratio(self.counts[index][index], self.row_sum(index))
    }

    pub fn f1(&self, index: usize) -> f64 {
        let p = self.precision(index);
        let r = self.recall(index);
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn row(scores: &[f32], label: usize) -> Classification {
        Classification::new(scores.to_vec(), label)
    }

    #[test]
    fn test_counts_true_rows_predicted_columns() {
        let rows = vec![
            row(&[0.9, 0.1, 0.0], 0),
            row(&[0.2, 0.8, 0.0], 0), // true 0, predicted 1
            row(&[0.1, 0.9, 0.0], 1),
            row(&[0.0, 0.1, 0.9], 2),
        ];
        let cm = ConfusionMatrix::from_classifications(&rows, &[0, 1, 2]);
        assert_eq!(cm.counts, vec![
            vec![1, 1, 0],
            vec![0, 1, 0],
            vec![0, 0, 1],
        ]);
        assert_eq!(cm.total(), 4);
        assert_eq!(cm.correct(), 3);
        assert!((cm.accuracy() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_row_sums_match_true_label_counts() {
        let rows = vec![
            row(&[0.6, 0.4], 0),
            row(&[0.3, 0.7], 0),
            row(&[0.4, 0.6], 1),
        ];
        let cm = ConfusionMatrix::from_classifications(&rows, &[0, 1]);
        assert_eq!(cm.counts[0].iter().sum::<usize>(), 2);
        assert_eq!(cm.counts[1].iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_prediction_outside_labels_is_tallied() {
        // Only labels 0 and 1 were seen, but the model predicts class 2
        let rows = vec![
            row(&[0.1, 0.1, 0.8], 0),
            row(&[0.1, 0.9, 0.0], 1),
        ];
        let cm = ConfusionMatrix::from_classifications(&rows, &[0, 1]);
        assert_eq!(cm.unlisted_predictions, 1);
        assert_eq!(cm.total(), 1);
        assert!((cm.accuracy() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_precision_recall_f1() {
        let rows = vec![
            row(&[0.9, 0.1], 0),
            row(&[0.9, 0.1], 0),
            row(&[0.8, 0.2], 1), // false positive for 0
            row(&[0.3, 0.7], 1),
        ];
        let cm = ConfusionMatrix::from_classifications(&rows, &[0, 1]);
        assert!((cm.precision(0) - 2.0 / 3.0).abs() < 1e-9);
        assert!((cm.recall(0) - 1.0).abs() < 1e-9);
        assert!((cm.recall(1) - 0.5).abs() < 1e-9);
        assert!((cm.f1(0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_never_predicted_label_has_zero_precision() {
        let rows = vec![row(&[0.9, 0.1], 0), row(&[0.9, 0.1], 1)];
        let cm = ConfusionMatrix::from_classifications(&rows, &[0, 1]);
        assert_eq!(cm.precision(1), 0.0);
        assert_eq!(cm.f1(1), 0.0);
    }

    #[test]
    fn test_empty_rows() {
        let cm = ConfusionMatrix::from_classifications(&[], &[]);
        assert_eq!(cm.total(), 0);
        assert_eq!(cm.accuracy(), 0.0);
    }
}
