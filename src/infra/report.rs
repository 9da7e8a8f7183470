// ============================================================
// Layer 6 — Evaluation Report Writer
// ============================================================
// Writes the evaluation results as structured data. Rendering
// (plots, HTML) is left to whatever consumes these files.
//
// Output files, both in the report directory:
//   {name}.json            — full report (see EvaluationReport)
//   {name}_confusion.csv   — confusion matrix, one row per true
//                            label, header row of predicted labels
//
// Example CSV output:
//   true\predicted,0,1,2
//   0,48,1,1
//   1,0,50,0
//   2,3,0,47
//
// Report names follow {base}_evaluate_{timestamp} so repeated
// runs against the same model never overwrite each other.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::application::evaluate_use_case::EvaluateConfig;
use crate::domain::{
    classification::ClassDistribution,
    confusion::ConfusionMatrix,
    roc::RocCurve,
};

/// Per-label summary derived from the confusion matrix and ROC curve
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    /// Class index
    pub label:     usize,

    /// Display name from the graph's label map
    pub name:      String,

    /// How many validation examples carry this label
    pub support:   usize,

    /// TP / (TP + FP); 0.0 if the label was never predicted
    pub precision: f64,

    /// TP / (TP + FN)
    pub recall:    f64,

    /// Harmonic mean of precision and recall
    pub f1:        f64,

    /// Area under this label's one-vs-rest ROC curve
    pub auc:       f64,
}

/// Everything one evaluation run produced, serialised as `{name}.json`.
///
/// The config is echoed in full so a report can be traced back to the
/// exact checkpoint, graph and dataset that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// {base}_evaluate_{timestamp}; also the output file stem
    pub name:               String,

    /// RFC 3339 local time the report was assembled
    pub created_at:         String,

    /// The settings of this run
    pub config:             EvaluateConfig,

    /// Graph name of the evaluated model
    pub model_name:         String,

    /// Number of classified examples
    pub samples:            usize,

    /// Correct predictions / samples
    pub accuracy:           f64,

    /// True labels seen, ascending; indexes every per-label list below
    pub labels:             Vec<usize>,

    /// Display name for each entry of `labels`
    pub label_names:        Vec<String>,

    pub class_metrics:      Vec<ClassMetrics>,
    pub class_distribution: ClassDistribution,
    pub confusion_matrix:   ConfusionMatrix,
    pub roc_curves:         Vec<RocCurve>,

    /// Record fields left out of the dataset summary
    pub ignored_fields:     Vec<String>,
}

impl EvaluationReport {
    /// Assemble the report; `label_name` maps a class index to display text.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name:               String,
        created_at:         DateTime<Local>,
        config:             EvaluateConfig,
        model_name:         String,
        confusion_matrix:   ConfusionMatrix,
        roc_curves:         Vec<RocCurve>,
        class_distribution: ClassDistribution,
        label_name:         impl Fn(usize) -> String,
        ignored_fields:     &[&str],
    ) -> Self {
        let labels = confusion_matrix.labels.clone();
        let class_metrics = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| ClassMetrics {
                label,
                name:      label_name(label),
                support:   class_distribution.count(label),
                precision: confusion_matrix.precision(i),
                recall:    confusion_matrix.recall(i),
                f1:        confusion_matrix.f1(i),
                auc:       roc_curves
                    .iter()
                    .find(|c| c.label == label)
                    .map(RocCurve::auc)
                    .unwrap_or(0.0),
            })
            .collect();

        Self {
            name,
            created_at: created_at.to_rfc3339(),
            config,
            model_name,
            samples:     class_distribution.total(),
            accuracy:    confusion_matrix.accuracy(),
            label_names: labels.iter().map(|&l| label_name(l)).collect(),
            labels,
            class_metrics,
            class_distribution,
            confusion_matrix,
            roc_curves,
            ignored_fields: ignored_fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// `{base}_evaluate_{YYYY-MM-DD_HH-MM-SS.ffffff}`
pub fn report_name(base: &str, now: &DateTime<Local>) -> String {
    format!("{base}_evaluate_{}", now.format("%Y-%m-%d_%H-%M-%S%.6f"))
}

pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `{name}.json` and `{name}_confusion.csv`; returns the JSON path.
    pub fn write(&self, report: &EvaluationReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Cannot create report dir '{}'", self.dir.display())
        })?;

        let json_path = self.dir.join(format!("{}.json", report.name));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&json_path, json)
            .with_context(|| format!("Cannot write report '{}'", json_path.display()))?;

        let csv_path = self.dir.join(format!("{}_confusion.csv", report.name));
        write_confusion_csv(&csv_path, &report.confusion_matrix)?;

        tracing::info!("Wrote evaluation report '{}'", json_path.display());
        Ok(json_path)
    }
}

fn write_confusion_csv(path: &Path, cm: &ConfusionMatrix) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut w = BufWriter::new(file);

    write!(w, "true\\predicted")?;
    for label in &cm.labels {
        write!(w, ",{label}")?;
    }
    writeln!(w)?;

    for (label, row) in cm.labels.iter().zip(&cm.counts) {
        write!(w, "{label}")?;
        for count in row {
            write!(w, ",{count}")?;
        }
        writeln!(w)?;
    }
    w.flush()?;

    tracing::debug!("Wrote confusion matrix CSV '{}'", path.display());
    Ok(())
}
