// ============================================================
// Layer 5 — Evaluation Session
// ============================================================
// A restored model ready to score validation batches:
//
//   1. Load the graph manifest
//   2. Bind the caller's input / classifier / hold-prob tensor
//      names against it (each must name the right role)
//   3. Rebuild the architecture with hold probability 1.0
//   4. Load the latest checkpoint's weights into it
//
// Classifying a batch runs the forward pass and applies softmax
// to the classifier output, so every row handed to the metrics
// layer is a probability vector.

use anyhow::{anyhow, bail, Result};
use burn::prelude::*;
use std::path::Path;

use crate::data::batcher::ImageBatch;
use crate::domain::{classification::Classification, traits::BatchClassifier};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::graph::{ModelGraph, TensorRole};
use crate::ml::model::LeNetModel;

/// Keep probability fed at evaluation time — dropout off
pub const EVAL_HOLD_PROB: f64 = 1.0;

/// The tensor names a caller wants bound
#[derive(Debug, Clone)]
pub struct TensorNames {
    pub input:      String,
    pub classifier: String,
    pub hold_prob:  String,
}

pub struct EvaluationSession<B: Backend> {
    graph:  ModelGraph,
    model:  LeNetModel<B>,
}

impl<B: Backend> EvaluationSession<B> {
    pub fn restore(
        graph_location: impl AsRef<Path>,
        checkpoint_dir: impl AsRef<Path>,
        names:          &TensorNames,
        device:         B::Device,
    ) -> Result<Self> {
        let graph = ModelGraph::load(graph_location)?;
        Self::from_graph(graph, &CheckpointManager::new(checkpoint_dir.as_ref()), names, device)
    }

    pub fn from_graph(
        graph:  ModelGraph,
        ckpt:   &CheckpointManager,
        names:  &TensorNames,
        device: B::Device,
    ) -> Result<Self> {
        graph.bind(&names.input, TensorRole::Input)?;
        graph.bind(&names.classifier, TensorRole::Classifier)?;
        graph.bind(&names.hold_prob, TensorRole::HoldProb)?;
        tracing::debug!(
            "Bound input='{}' classifier='{}' hold_prob='{}' (fed {})",
            names.input, names.classifier, names.hold_prob, EVAL_HOLD_PROB,
        );

        graph.model.check()?;
        let model = graph.model.init::<B>(EVAL_HOLD_PROB, &device);
        let model = ckpt.load_model(model, &device)?;
        tracing::info!(
            "Model '{}' restored: {} classes, input {}x{}x{}",
            graph.name,
            graph.model.num_classes,
            graph.model.image_height,
            graph.model.image_width,
            graph.model.image_depth,
        );

        Ok(Self { graph, model })
    }

    pub fn graph(&self) -> &ModelGraph { &self.graph }

    /// Softmax probabilities for a batch — shape [batch, num_classes]
    pub fn predict(&self, inputs: Tensor<B, 2>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.model.forward(inputs), 1)
    }
}

impl<B: Backend> BatchClassifier<ImageBatch<B>> for EvaluationSession<B> {
    fn classify(&self, batch: ImageBatch<B>) -> Result<Vec<Classification>> {
        let probs = self.predict(batch.inputs);
        let [rows, classes] = probs.dims();
        if rows != batch.true_classes.len() {
            bail!("Model returned {rows} rows for a batch of {}", batch.true_classes.len());
        }

        let flat: Vec<f32> = probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))?;

        Ok(flat
            .chunks(classes.max(1))
            .zip(batch.true_classes)
            .map(|(scores, label)| Classification::new(scores.to_vec(), label))
            .collect())
    }
}
