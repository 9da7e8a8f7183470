// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that touch the filesystem or the
// process environment:
//
//   checkpoint.rs — locating the latest checkpoint and loading
//                   its weights with Burn's CompactRecorder
//
//   report.rs     — assembling the evaluation report and
//                   writing it as JSON + confusion matrix CSV
//
//   device.rs     — GPU selection via CUDA_VISIBLE_DEVICES
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint discovery and loading
pub mod checkpoint;

/// Evaluation report assembly and output
pub mod report;

/// GPU visibility for the evaluation backend
pub mod device;
