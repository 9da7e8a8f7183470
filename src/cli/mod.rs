// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the evaluation flags with clap, applies the GPU
// selection, and hands off to the application layer. The only
// output this layer produces is the final report location.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::EvaluateArgs;

use crate::application::evaluate_use_case::EvaluateUseCase;
use crate::infra::device::select_gpus;

#[derive(Parser, Debug)]
#[command(
    name = "model-eval",
    version,
    about = "Evaluate a trained image classifier checkpoint against a validation set."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: EvaluateArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Must happen before any backend picks a device
        select_gpus(&self.args.gpus);

        tracing::info!("Evaluating against '{}'", self.args.validation_set_location);
        let use_case = EvaluateUseCase::new(self.args.into());
        let report   = use_case.execute()?;

        println!("Evaluation report written to {}", report.display());
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::evaluate_use_case::EvaluateConfig;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["model-eval"]).unwrap();
        assert_eq!(cli.args.batch_size, 50);
        assert_eq!(cli.args.checkpoint_dir, "./model");
        assert_eq!(cli.args.report_name_base, "lenet_mnist");
        assert!(cli.args.seed.is_none());
    }

    #[test]
    fn test_snake_case_aliases() {
        let cli = Cli::try_parse_from([
            "model-eval",
            "--graph_location", "g.json",
            "--batch_size", "8",
            "--report-dir", "out",
            "--gpus", "0,1",
        ]).unwrap();
        assert_eq!(cli.args.graph_location, "g.json");
        assert_eq!(cli.args.batch_size, 8);
        assert_eq!(cli.args.report_dir, "out");
        assert_eq!(cli.args.gpus, "0,1");
    }

    #[test]
    fn test_args_convert_to_config() {
        let cli = Cli::try_parse_from(["model-eval", "--seed", "7"]).unwrap();
        let cfg: EvaluateConfig = cli.args.into();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.hold_prob_name, "lenet_mnist_model/hold_prob:0");
        assert_eq!(cfg.roc_thresholds, 1000);
    }

    #[test]
    fn test_rejects_non_numeric_batch_size() {
        assert!(Cli::try_parse_from(["model-eval", "--batch-size", "many"]).is_err());
    }
}
