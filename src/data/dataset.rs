// ============================================================
// Layer 4 — Validation Set
// ============================================================
// Reads held-out examples from a JSON-lines file, one record
// per line:
//
//   {"input": [0.0, 0.1, ...], "label": [0, 0, 1, 0, ...], "depth": 1}
//
//   input — flattened image, row-major height × width × depth
//   label — one-hot vector; the true class is its argmax
//   depth — channel count, optional
//
// Every record is checked against the shape the model graph
// declares (input size, label width, depth), so a mismatched
// dataset fails on open with the offending line number instead
// of deep inside a reshape or at ROC time.
//
// Reference: Burn Book §4 (Datasets)
//            serde_json documentation

use anyhow::{bail, Context, Result};
use burn::data::dataset::Dataset;
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::domain::classification::argmax;

/// Record fields that carry no information for the report
pub const IGNORED_FIELDS: [&str; 2] = ["input", "depth"];

/// One validation example as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageSample {
    /// Pixel values, length = height * width * depth
    pub input: Vec<f32>,

    /// One-hot label, length = number of model classes
    pub label: Vec<f32>,

    /// Channel count the record was written with, if recorded
    #[serde(default)]
    pub depth: Option<usize>,
}

impl ImageSample {
    /// The index of the hot entry in `label`
    pub fn true_class(&self) -> Option<usize> {
        argmax(&self.label)
    }
}

/// What every record must look like to be fed to the model.
/// Built from the graph's architecture by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordShape {
    /// Values per flattened image
    pub input_len:   usize,

    /// Width of the one-hot label (= model output width)
    pub num_classes: usize,

    /// Image channels; a record's `depth`, when present, must match
    pub depth:       usize,
}

impl RecordShape {
    /// Reject `sample` with a message naming `line_no` if it doesn't fit.
    fn check(&self, sample: &ImageSample, line_no: usize, path: &Path) -> Result<()> {
        if sample.input.len() != self.input_len {
            bail!(
                "Record at line {line_no} of '{}' has {} input values, expected {}",
                path.display(),
                sample.input.len(),
                self.input_len,
            );
        }
        if sample.label.len() != self.num_classes {
            bail!(
                "Record at line {line_no} of '{}' has a label of width {}, but the model has {} classes",
                path.display(),
                sample.label.len(),
                self.num_classes,
            );
        }
        if let Some(depth) = sample.depth {
            if depth != self.depth {
                bail!(
                    "Record at line {line_no} of '{}' has depth {depth}, expected {}",
                    path.display(),
                    self.depth,
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ValidationSet {
    /// Every record that passed the shape checks, in file order
    samples: Vec<ImageSample>,
}

impl ValidationSet {
    /// Load and validate every record in the JSON-lines file at `path`.
    pub fn open(path: impl AsRef<Path>, shape: &RecordShape) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| {
            format!("Cannot open validation set '{}'", path.display())
        })?;

        let mut samples = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line_no = i + 1;
            let line = line.with_context(|| {
                format!("Failed reading '{}' at line {line_no}", path.display())
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let sample: ImageSample = serde_json::from_str(&line).with_context(|| {
                format!("Malformed record in '{}' at line {line_no}", path.display())
            })?;
            shape.check(&sample, line_no, path)?;
            samples.push(sample);
        }

        tracing::info!(
            "Loaded {} validation examples from '{}'",
            samples.len(),
            path.display()
        );
        Ok(Self { samples })
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<ImageSample> for ValidationSet {
    fn get(&self, index: usize) -> Option<ImageSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
