// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Runs the evaluation pipeline in order:
//
//   Step 1: Restore the model session     (Layer 5 - ml)
//   Step 2: Open the validation set       (Layer 4 - data)
//   Step 3: Classify every batch          (Layer 5 - ml)
//   Step 4: Collect the observed labels   (Layer 3 - domain)
//   Step 5: Build the confusion matrix    (Layer 3 - domain)
//   Step 6: Build one-vs-rest ROC curves  (Layer 3 - domain)
//   Step 7: Write the report              (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §4 (DataLoader)

use anyhow::{bail, Result};
use burn::data::dataloader::DataLoaderBuilder;
use chrono::Local;
use serde::Serialize;
use std::path::PathBuf;

use crate::data::{batcher::ImageBatcher, dataset::{ValidationSet, IGNORED_FIELDS}};
use crate::domain::{
    classification::{labels_from_classifications, ClassDistribution, Classification},
    confusion::ConfusionMatrix,
    roc::{create_ovr_roc, DEFAULT_ROC_STEPS},
    traits::BatchClassifier,
};
use crate::infra::report::{report_name, EvaluationReport, ReportWriter};
use crate::ml::{
    session::{EvaluationSession, TensorNames},
    EvalBackend,
};

// ─── Evaluation Configuration ────────────────────────────────────────────────
// Everything one evaluation run needs. Serialisable so the exact
// settings are echoed into the report they produced.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluateConfig {
    /// JSON graph manifest (named tensors + architecture)
    pub graph_location:          String,

    /// Directory searched for the latest checkpoint
    pub checkpoint_dir:          String,

    /// Tensor names bound against the graph; each must name the
    /// tensor of the matching role
    pub input_tensor_name:       String,
    pub classifier_tensor_name:  String,
    pub hold_prob_name:          String,

    /// JSON-lines validation records
    pub validation_set_location: String,

    /// Examples per forward pass; the last batch may be smaller
    pub batch_size:              usize,

    /// Prefix of the report file names
    pub report_name_base:        String,

    /// Value for CUDA_VISIBLE_DEVICES; empty = leave unset
    pub gpus:                    String,

    /// Created if missing
    pub report_dir:              String,

    /// Shuffle seed; None draws a random one
    pub seed:                    Option<u64>,

    /// Points per ROC curve
    pub roc_thresholds:          usize,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            graph_location:          "./model/mnist.meta.json".to_string(),
            checkpoint_dir:          "./model".to_string(),
            input_tensor_name:       "lenet_mnist_model/X:0".to_string(),
            classifier_tensor_name:  "lenet_mnist_model/Y_Prediction/y_pred:0".to_string(),
            hold_prob_name:          "lenet_mnist_model/hold_prob:0".to_string(),
            validation_set_location: "./records/valid/mnist_valid.jsonl".to_string(),
            batch_size:              50,
            report_name_base:        "lenet_mnist".to_string(),
            gpus:                    String::new(),
            report_dir:              "./reports/".to_string(),
            seed:                    None,
            roc_thresholds:          DEFAULT_ROC_STEPS,
        }
    }
}

impl EvaluateConfig {
    pub fn tensor_names(&self) -> TensorNames {
        TensorNames {
            input:      self.input_tensor_name.clone(),
            classifier: self.classifier_tensor_name.clone(),
            hold_prob:  self.hold_prob_name.clone(),
        }
    }
}

/// Metrics computed from the classification rows, before any I/O
#[derive(Debug, Clone)]
pub struct EvaluationResults {
    /// Distinct true labels, ascending
    pub labels:       Vec<usize>,
    pub confusion:    ConfusionMatrix,

    /// One curve per entry of `labels`, same order
    pub roc_curves:   Vec<crate::domain::roc::RocCurve>,
    pub distribution: ClassDistribution,
}

// ─── EvaluateUseCase ──────────────────────────────────────────────────────────
pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    /// Run the full pipeline; returns the path of the written JSON report.
    pub fn execute(&self) -> Result<PathBuf> {
        let cfg = &self.config;
        if cfg.batch_size == 0 {
            bail!("batch size must be at least 1");
        }

        // ── Step 1: Restore graph + latest checkpoint ─────────────────────────
        let device  = <EvalBackend as burn::tensor::backend::Backend>::Device::default();
        let session = EvaluationSession::<EvalBackend>::restore(
            &cfg.graph_location,
            &cfg.checkpoint_dir,
            &cfg.tensor_names(),
            device.clone(),
        )?;

        // ── Step 2: Validation set + shuffled loader ──────────────────────────
        let valid = ValidationSet::open(
            &cfg.validation_set_location,
            &session.graph().model.record_shape(),
        )?;
        let sample_count = valid.sample_count();
        let seed = cfg.seed.unwrap_or_else(rand::random);
        tracing::debug!("Shuffling validation set with seed {}", seed);

        let loader = DataLoaderBuilder::new(ImageBatcher::<EvalBackend>::new(device))
            .batch_size(cfg.batch_size)
            .shuffle(seed)
            .num_workers(1)
            .build(valid);

        // ── Step 3: Classify until the loader is exhausted ────────────────────
        let classifications = accumulate_classifications(&session, loader.iter())?;
        tracing::info!(
            "Finished classifications against the dataset ({} of {} examples)",
            classifications.len(),
            sample_count,
        );

        // ── Steps 4–6: Metrics ────────────────────────────────────────────────
        let results = compute_results(&classifications, cfg.roc_thresholds)?;
        tracing::info!("Labels seen during classification: {:?}", results.labels);

        // ── Step 7: Report ────────────────────────────────────────────────────
        let now    = Local::now();
        let graph  = session.graph();
        let report = EvaluationReport::new(
            report_name(&cfg.report_name_base, &now),
            now,
            cfg.clone(),
            graph.name.clone(),
            results.confusion,
            results.roc_curves,
            results.distribution,
            |label| graph.label_name(label),
            &IGNORED_FIELDS,
        );
        tracing::info!(
            "Accuracy {:.2}% over {} examples",
            report.accuracy * 100.0,
            report.samples,
        );

        ReportWriter::new(&cfg.report_dir).write(&report)
    }
}

/// Classify every batch the iterator yields. The iterator running
/// dry is the normal end of evaluation.
pub fn accumulate_classifications<C, Batch, I>(
    classifier: &C,
    batches:    I,
) -> Result<Vec<Classification>>
where
    C: BatchClassifier<Batch>,
    I: IntoIterator<Item = Batch>,
{
    let mut rows    = Vec::new();
    let mut batches_seen = 0usize;

    for batch in batches {
        rows.extend(classifier.classify(batch)?);
        batches_seen += 1;
        tracing::debug!("Batch {}: {} rows so far", batches_seen, rows.len());
    }

    if rows.is_empty() {
        bail!("The validation set produced no classifications");
    }
    Ok(rows)
}

/// Labels, confusion matrix, ROC curves, and class counts.
pub fn compute_results(rows: &[Classification], roc_steps: usize) -> Result<EvaluationResults> {
    let labels = labels_from_classifications(rows);

    let confusion = ConfusionMatrix::from_classifications(rows, &labels);
    tracing::info!("Finished creating confusion matrix");

    let roc_curves = create_ovr_roc(rows, &labels, roc_steps)?;
    tracing::info!("Finished ROC calculations");

    Ok(EvaluationResults {
        labels,
        confusion,
        roc_curves,
        distribution: ClassDistribution::from_classifications(rows),
    })
}
