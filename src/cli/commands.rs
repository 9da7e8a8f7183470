// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// Every evaluation flag with its default. Long names are
// kebab-case; the snake_case spellings (--graph_location, ...)
// are accepted as aliases so existing run scripts keep working.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::Args;

use crate::application::evaluate_use_case::EvaluateConfig;

#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// The location of the model graph manifest
    #[arg(long, visible_alias = "graph_location", default_value = "./model/mnist.meta.json")]
    pub graph_location: String,

    /// The directory holding the model checkpoints
    #[arg(long, visible_alias = "checkpoint_dir", default_value = "./model")]
    pub checkpoint_dir: String,

    /// The name of the input tensor in the model graph
    #[arg(long, visible_alias = "input_tensor_name", default_value = "lenet_mnist_model/X:0")]
    pub input_tensor_name: String,

    /// The name of the tensor that contains the classification scores
    #[arg(
        long,
        visible_alias = "classifier_tensor_name",
        default_value = "lenet_mnist_model/Y_Prediction/y_pred:0"
    )]
    pub classifier_tensor_name: String,

    /// The tensor with the hold (dropout keep) probability
    #[arg(long, visible_alias = "hold_prob_name", default_value = "lenet_mnist_model/hold_prob:0")]
    pub hold_prob_name: String,

    /// The location of the validation examples to use for evaluation
    #[arg(
        long,
        visible_alias = "validation_set_location",
        default_value = "./records/valid/mnist_valid.jsonl"
    )]
    pub validation_set_location: String,

    /// The batch size to use for feeding validation examples
    #[arg(long, visible_alias = "batch_size", default_value_t = 50)]
    pub batch_size: usize,

    /// The base name for the reports
    #[arg(long, visible_alias = "report_name_base", default_value = "lenet_mnist")]
    pub report_name_base: String,

    /// Sets the GPUs to use (exported as CUDA_VISIBLE_DEVICES)
    #[arg(long, default_value = "")]
    pub gpus: String,

    /// Where to save the reports
    #[arg(long, visible_alias = "report_dir", default_value = "./reports/")]
    pub report_dir: String,

    /// Seed for shuffling the validation set; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of evenly spaced thresholds per ROC curve
    #[arg(long, visible_alias = "roc_thresholds", default_value_t = 1000)]
    pub roc_thresholds: usize,
}

/// The boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            graph_location:          a.graph_location,
            checkpoint_dir:          a.checkpoint_dir,
            input_tensor_name:       a.input_tensor_name,
            classifier_tensor_name:  a.classifier_tensor_name,
            hold_prob_name:          a.hold_prob_name,
            validation_set_location: a.validation_set_location,
            batch_size:              a.batch_size,
            report_name_base:        a.report_name_base,
            gpus:                    a.gpus,
            report_dir:              a.report_dir,
            seed:                    a.seed,
            roc_thresholds:          a.roc_thresholds,
        }
    }
}
