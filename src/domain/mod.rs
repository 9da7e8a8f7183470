// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types for the evaluation core: a classification
// row, the confusion matrix, and one-vs-rest ROC curves.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything downstream of the model (metrics, report data)
// is computed from a Vec<Classification>, so this layer can
// be unit tested without a backend or a checkpoint.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One (prediction vector, true label) pair
pub mod classification;

// Confusion matrix over the labels seen during evaluation
pub mod confusion;

// Per-class one-vs-rest ROC curves
pub mod roc;

// Core abstractions (traits) that other layers implement
pub mod traits;
