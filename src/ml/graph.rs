// ============================================================
// Layer 5 — Model Graph Manifest
// ============================================================
// A JSON description of a trained model: which named tensors
// a caller may bind, and the architecture needed to rebuild
// the model before loading its weights.
//
//   {
//     "name": "lenet_mnist_model",
//     "input":      { "name": "lenet_mnist_model/X:0", "shape": [28, 28, 1] },
//     "classifier": { "name": "lenet_mnist_model/Y_Prediction/y_pred:0" },
//     "hold_prob":  { "name": "lenet_mnist_model/hold_prob:0" },
//     "model":      { "num_classes": 10, ... },
//     "label_names": ["zero", "one", ...]
//   }
//
// Tensor names are looked up exactly as written; resolving a
// name tells the caller what ROLE that tensor plays, so binding
// e.g. the hold-probability name as the input is rejected.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};

use crate::ml::model::LeNetConfig;

/// A named tensor in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorSpec {
    /// Name callers bind against, e.g. "lenet_mnist_model/X:0"
    pub name: String,

    /// Per-example shape; empty when the graph doesn't state one.
    /// Only the input tensor's shape is checked.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shape: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorRole {
    Input,
    Classifier,
    HoldProb,
}

impl fmt::Display for TensorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorRole::Input      => write!(f, "input"),
            TensorRole::Classifier => write!(f, "classifier"),
            TensorRole::HoldProb   => write!(f, "hold probability"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGraph {
    /// Scope name of the model, echoed into the report
    pub name:       String,

    /// Where images are fed — shape [height, width, depth]
    pub input:      TensorSpec,

    /// Un-normalised class scores; softmax is applied on top
    pub classifier: TensorSpec,

    /// Dropout keep probability placeholder
    pub hold_prob:  TensorSpec,

    /// Architecture to rebuild before the weights are loaded
    pub model:      LeNetConfig,

    /// Display name per class index; indices are used when absent
    #[serde(default)]
    pub label_names: Option<Vec<String>>,
}

impl ModelGraph {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).with_context(|| {
            format!("Cannot read model graph from '{}'", path.display())
        })?;
        let graph: Self = serde_json::from_str(&json).with_context(|| {
            format!("Malformed model graph '{}'", path.display())
        })?;
        graph.validate()?;
        tracing::debug!("Loaded model graph '{}' from '{}'", graph.name, path.display());
        Ok(graph)
    }

    #[cfg(test)]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Cannot write model graph to '{}'", path.display()))
    }

    /// The architecture must be buildable, and the input shape must
    /// agree with the architecture it feeds.
    fn validate(&self) -> Result<()> {
        let m = &self.model;
        m.check()
            .with_context(|| format!("Graph '{}' has an unusable architecture", self.name))?;

        let expected = [m.image_height, m.image_width, m.image_depth];
        if !self.input.shape.is_empty() && self.input.shape != expected {
            bail!(
                "Input tensor '{}' has shape {:?} but the model expects {:?}",
                self.input.name, self.input.shape, expected,
            );
        }
        if let Some(names) = &self.label_names {
            if names.len() != m.num_classes {
                bail!(
                    "Graph lists {} label names for {} classes",
                    names.len(), m.num_classes,
                );
            }
        }
        Ok(())
    }

    /// Which role the tensor called `name` plays in this graph.
    pub fn resolve(&self, name: &str) -> Result<TensorRole> {
        let declared = [
            (&self.input,      TensorRole::Input),
            (&self.classifier, TensorRole::Classifier),
            (&self.hold_prob,  TensorRole::HoldProb),
        ];
        declared.iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, role)| *role)
            .with_context(|| {
                format!(
                    "Tensor '{}' not found in graph '{}'. Declared tensors: '{}', '{}', '{}'",
                    name, self.name, self.input.name, self.classifier.name, self.hold_prob.name,
                )
            })
    }

    /// Resolve `name` and require it to play `role`.
    pub fn bind(&self, name: &str, role: TensorRole) -> Result<()> {
        let found = self.resolve(name)?;
        if found != role {
            bail!("Tensor '{name}' is the {found} tensor, not the {role} tensor");
        }
        Ok(())
    }

    /// Display name for a class index; falls back to the index itself.
    pub fn label_name(&self, label: usize) -> String {
        self.label_names
            .as_ref()
            .and_then(|names| names.get(label).cloned())
            .unwrap_or_else(|| label.to_string())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn named(name: &str) -> TensorSpec {
        TensorSpec { name: name.to_string(), shape: Vec::new() }
    }

    pub(crate) fn lenet_graph(model: LeNetConfig) -> ModelGraph {
        ModelGraph {
            name:       "lenet_mnist_model".to_string(),
            input:      TensorSpec {
                name:  "lenet_mnist_model/X:0".to_string(),
                shape: vec![model.image_height, model.image_width, model.image_depth],
            },
            classifier: named("lenet_mnist_model/Y_Prediction/y_pred:0"),
            hold_prob:  named("lenet_mnist_model/hold_prob:0"),
            model,
            label_names: None,
        }
    }

    #[test]
    fn test_resolve_roles() {
        let g = lenet_graph(LeNetConfig::new());
        assert_eq!(g.resolve("lenet_mnist_model/X:0").unwrap(), TensorRole::Input);
        assert_eq!(
            g.resolve("lenet_mnist_model/Y_Prediction/y_pred:0").unwrap(),
            TensorRole::Classifier,
        );
        assert_eq!(g.resolve("lenet_mnist_model/hold_prob:0").unwrap(), TensorRole::HoldProb);
    }

    #[test]
    fn test_unknown_tensor_lists_declared_names() {
        let g   = lenet_graph(LeNetConfig::new());
        let err = g.resolve("nope:0").unwrap_err().to_string();
        assert!(err.contains("nope:0"));
        assert!(err.contains("lenet_mnist_model/X:0"));
    }

    #[test]
    fn test_bind_rejects_wrong_role() {
        let g = lenet_graph(LeNetConfig::new());
        assert!(g.bind("lenet_mnist_model/hold_prob:0", TensorRole::Input).is_err());
        assert!(g.bind("lenet_mnist_model/X:0", TensorRole::Input).is_ok());
    }

    #[test]
    fn test_save_load_keeps_architecture() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("mnist.meta.json");
        let g    = lenet_graph(LeNetConfig::new().with_num_classes(4));
        g.save(&path).unwrap();

        let loaded = ModelGraph::load(&path).unwrap();
        assert_eq!(loaded.model.num_classes, 4);
        assert_eq!(loaded.input.shape, vec![28, 28, 1]);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut g = lenet_graph(LeNetConfig::new());
        g.input.shape = vec![32, 32, 3];
        g.save(&path).unwrap();
        assert!(ModelGraph::load(&path).is_err());
    }

    #[test]
    fn test_even_kernel_is_rejected() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("even.json");
        lenet_graph(LeNetConfig::new().with_kernel_size(4)).save(&path).unwrap();

        let err = ModelGraph::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("kernel_size must be odd"));
    }

    #[test]
    fn test_label_name_fallback() {
        let mut g = lenet_graph(LeNetConfig::new().with_num_classes(2));
        assert_eq!(g.label_name(1), "1");
        g.label_names = Some(vec!["cat".into(), "dog".into()]);
        assert_eq!(g.label_name(1), "dog");
    }
}
