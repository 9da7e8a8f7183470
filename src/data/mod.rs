// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Takes the validation set from disk to tensor batches:
//
//   valid.jsonl
//       │
//       ▼
//   ValidationSet     → parses + validates records,
//       │               implements Burn's Dataset trait
//       ▼
//   ImageBatcher      → stacks samples into [N, F] tensors
//       │
//       ▼
//   DataLoader        → shuffles and feeds batches to the
//                       evaluation loop until exhausted
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// JSON-lines validation records, implements Burn's Dataset trait
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
