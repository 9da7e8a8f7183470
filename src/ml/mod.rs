// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model code lives here. The data layer only touches
// Burn's Dataset / Batcher traits; the domain layer not at all.
//
//   model.rs   — LeNet-style convolutional classifier
//   graph.rs   — JSON graph manifest: named tensors + architecture
//   session.rs — restored model that turns batches into
//                softmax classification rows
//
// Backend: NdArray (CPU) by default, Wgpu with `--features wgpu`.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Records)
//            LeCun et al. (1998) Gradient-Based Learning

/// LeNet convolutional classifier
pub mod model;

/// Model graph manifest and tensor name binding
pub mod graph;

/// Restored model that scores validation batches
pub mod session;

#[cfg(feature = "wgpu")]
pub type EvalBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type EvalBackend = burn::backend::NdArray;
