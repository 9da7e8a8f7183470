// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Locates and restores model weights saved with Burn's
// CompactRecorder.
//
// Directory layout:
//   model/
//     model_epoch_1.mpk.gz   ← weights after epoch 1
//     model_epoch_2.mpk.gz   ← weights after epoch 2
//     ...
//     latest_epoch.json      ← optional pointer to the newest epoch
//
// "Latest checkpoint" means the epoch named in latest_epoch.json
// when that file exists. Without it we fall back to scanning the
// directory for the highest model_epoch_N, so a directory copied
// without its pointer file still evaluates.
//
// CompactRecorder is type-safe: loading fails if the record's
// architecture doesn't match the model it is loaded into, which
// is how a graph manifest that disagrees with the weights shows up.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::LeNetModel;

const LATEST_POINTER: &str = "latest_epoch.json";
const RECORD_PREFIX:  &str = "model_epoch_";
const RECORD_SUFFIX:  &str = ".mpk.gz";

/// Finds and loads checkpoints in one directory.
pub struct CheckpointManager {
    /// Directory holding model_epoch_N.mpk.gz and latest_epoch.json
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, epoch: usize) -> PathBuf {
        // Without extension — the recorder adds it
        self.dir.join(format!("{RECORD_PREFIX}{epoch}"))
    }

    /// Save model weights for `epoch` and point latest_epoch.json at it.
    /// Training is out of scope for this tool; tests use this to
    /// produce checkpoints to restore.
    #[cfg(test)]
    pub fn save_model<B: Backend>(&self, model: &LeNetModel<B>, epoch: usize) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("Cannot create checkpoint dir '{}'", self.dir.display())
        })?;

        let path = self.record_path(epoch);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        fs::write(self.dir.join(LATEST_POINTER), serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write {LATEST_POINTER}"))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Restore the latest checkpoint into `model`.
    pub fn load_model<B: Backend>(
        &self,
        model:  LeNetModel<B>,
        device: &B::Device,
    ) -> Result<LeNetModel<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.record_path(epoch);

        tracing::info!("Restoring checkpoint '{}'", path.display());

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Does the graph match the trained model?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// The pointer file's epoch, else the highest epoch on disk.
    pub fn latest_epoch(&self) -> Result<usize> {
        let pointer = self.dir.join(LATEST_POINTER);
        if pointer.exists() {
            let s = fs::read_to_string(&pointer)
                .with_context(|| format!("Cannot read '{}'", pointer.display()))?;
            return serde_json::from_str::<usize>(s.trim())
                .with_context(|| format!("'{}' does not hold an epoch number", pointer.display()));
        }

        match self.scan_epochs()?.into_iter().max() {
            Some(epoch) => Ok(epoch),
            None => bail!("No checkpoint found in '{}'", self.dir.display()),
        }
    }

    fn scan_epochs(&self) -> Result<Vec<usize>> {
        let entries = fs::read_dir(&self.dir).with_context(|| {
            format!("Cannot read checkpoint dir '{}'", self.dir.display())
        })?;

        let mut epochs = Vec::new();
        for entry in entries {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(epoch) = parse_epoch(name) {
                epochs.push(epoch);
            }
        }
        Ok(epochs)
    }
}

/// "model_epoch_12.mpk.gz" → Some(12)
fn parse_epoch(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(RECORD_PREFIX)?
        .strip_suffix(RECORD_SUFFIX)?
        .parse()
        .ok()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epoch() {
        assert_eq!(parse_epoch("model_epoch_12.mpk.gz"), Some(12));
        assert_eq!(parse_epoch("model_epoch_x.mpk.gz"), None);
        assert_eq!(parse_epoch("latest_epoch.json"), None);
    }

    #[test]
    fn test_pointer_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("model_epoch_9.mpk.gz"), b"").unwrap();
        fs::write(dir.path().join(LATEST_POINTER), "3").unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert_eq!(ckpt.latest_epoch().unwrap(), 3);
    }

    #[test]
    fn test_scan_falls_back_to_highest_epoch() {
        let dir = tempfile::tempdir().unwrap();
        for e in [1, 10, 2] {
            fs::write(dir.path().join(format!("model_epoch_{e}.mpk.gz")), b"").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert_eq!(ckpt.latest_epoch().unwrap(), 10);
    }

    #[test]
    fn test_empty_dir_has_no_checkpoint() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path());
        assert!(ckpt.latest_epoch().is_err());
    }

    #[test]
    fn test_missing_dir_is_error() {
        let ckpt = CheckpointManager::new("/no/such/checkpoint/dir");
        assert!(ckpt.latest_epoch().is_err());
    }
}
